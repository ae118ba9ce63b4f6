//! Registry of pipelines keyed by case-insensitive name.

use super::Pipeline;
use crate::errors::EngineError;
use std::collections::HashMap;

/// An ordered collection of pipelines with case-insensitive unique names.
///
/// Registration order is preserved; the graph builder visits pipelines in
/// that order.
#[derive(Debug, Default)]
pub struct PipelineCollection {
    order: Vec<String>,
    pipelines: HashMap<String, Pipeline>,
}

impl PipelineCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    /// Registers a pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline fails validation or a pipeline
    /// with the same case-insensitive name is already registered.
    pub fn add(&mut self, pipeline: Pipeline) -> Result<(), EngineError> {
        pipeline.validate()?;

        let key = Self::key(&pipeline.name);
        if self.pipelines.contains_key(&key) {
            return Err(EngineError::InvalidPipeline(format!(
                "A pipeline named '{}' is already registered",
                pipeline.name
            )));
        }

        self.order.push(key.clone());
        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    /// Looks up a pipeline by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(&Self::key(name))
    }

    /// Returns whether a pipeline with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(&Self::key(name))
    }

    /// Iterates pipelines in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Pipeline> {
        self.order.iter().filter_map(|key| self.pipelines.get(key))
    }

    /// Returns the number of registered pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
