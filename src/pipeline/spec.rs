//! Pipeline specification.

use crate::errors::EngineError;
use crate::modules::Module;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A named unit of work carrying four ordered module lists.
///
/// Pipelines are registered before the first execution and are immutable
/// for the duration of a run. Names are unique case-insensitively. An
/// isolated pipeline may neither declare nor be declared a dependency;
/// its phases form a private linear chain.
#[derive(Clone, Default)]
pub struct Pipeline {
    /// The pipeline name.
    pub name: String,
    /// Modules of the Input phase.
    pub input_modules: Vec<Arc<dyn Module>>,
    /// Modules of the Process phase.
    pub process_modules: Vec<Arc<dyn Module>>,
    /// Modules of the Transform phase.
    pub transform_modules: Vec<Arc<dyn Module>>,
    /// Modules of the Output phase.
    pub output_modules: Vec<Arc<dyn Module>>,
    /// Names of pipelines whose Process output this pipeline depends on.
    pub dependencies: HashSet<String>,
    /// Whether the pipeline is isolated from the rest of the graph.
    pub isolated: bool,
}

impl Pipeline {
    /// Creates a new pipeline with the given name and no modules.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, EngineError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::InvalidPipeline(
                "Pipeline name cannot be empty or whitespace-only".to_string(),
            ));
        }
        Ok(Self {
            name,
            ..Self::default()
        })
    }

    /// Sets the Input phase modules.
    #[must_use]
    pub fn with_input_modules(mut self, modules: Vec<Arc<dyn Module>>) -> Self {
        self.input_modules = modules;
        self
    }

    /// Sets the Process phase modules.
    #[must_use]
    pub fn with_process_modules(mut self, modules: Vec<Arc<dyn Module>>) -> Self {
        self.process_modules = modules;
        self
    }

    /// Sets the Transform phase modules.
    #[must_use]
    pub fn with_transform_modules(mut self, modules: Vec<Arc<dyn Module>>) -> Self {
        self.transform_modules = modules;
        self
    }

    /// Sets the Output phase modules.
    #[must_use]
    pub fn with_output_modules(mut self, modules: Vec<Arc<dyn Module>>) -> Self {
        self.output_modules = modules;
        self
    }

    /// Adds a dependency on another pipeline's Process output.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.insert(name.into());
        self
    }

    /// Sets the dependency names.
    #[must_use]
    pub fn with_dependencies(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.dependencies = names.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the pipeline as isolated.
    #[must_use]
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Validates the pipeline definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is isolated but declares
    /// dependencies.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.isolated && !self.dependencies.is_empty() {
            return Err(EngineError::InvalidPipeline(format!(
                "Isolated pipeline '{}' cannot declare dependencies",
                self.name
            )));
        }
        Ok(())
    }

    /// Releases module resources across all four phases.
    pub fn dispose(&self) {
        for module in self
            .input_modules
            .iter()
            .chain(&self.process_modules)
            .chain(&self.transform_modules)
            .chain(&self.output_modules)
        {
            module.dispose();
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("input_modules", &self.input_modules.len())
            .field("process_modules", &self.process_modules.len())
            .field("transform_modules", &self.transform_modules.len())
            .field("output_modules", &self.output_modules.len())
            .field("dependencies", &self.dependencies)
            .field("isolated", &self.isolated)
            .finish()
    }
}
