//! Error types for the quarry engine.
//!
//! Graph-build errors (`UnknownDependency`, `IsolatedDependency`,
//! `CycleDetected`) are fatal and abort a run before any phase executes.
//! `ModuleFailure` is confined to the phase it occurred in; downstream
//! phases skip while independent branches keep running.

use thiserror::Error;

/// The main error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A pipeline declared a dependency on a pipeline that is not registered.
    #[error("Pipeline '{pipeline}' has dependency on unknown pipeline '{dependency}'")]
    UnknownDependency {
        /// The pipeline declaring the dependency.
        pipeline: String,
        /// The missing dependency name.
        dependency: String,
    },

    /// A pipeline declared a dependency on an isolated pipeline.
    #[error("Pipeline '{pipeline}' has dependency on isolated pipeline '{dependency}'")]
    IsolatedDependency {
        /// The pipeline declaring the dependency.
        pipeline: String,
        /// The isolated dependency name.
        dependency: String,
    },

    /// A dependency cycle was detected among non-isolated pipelines.
    #[error("Pipeline cyclical dependency detected involving '{pipeline}'")]
    CycleDetected {
        /// A pipeline on the cycle.
        pipeline: String,
    },

    /// A module raised during execution, aborting its phase.
    #[error("Module '{module}' failed: {message}")]
    ModuleFailure {
        /// The type name of the failing module.
        module: String,
        /// The underlying error message.
        message: String,
    },

    /// A pipeline definition or registration was rejected.
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Cooperative cancellation was observed.
    #[error("Execution was cancelled")]
    Cancelled,

    /// `execute` was invoked after `dispose`.
    #[error("Engine has been disposed")]
    Disposed,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Returns true if this error represents cooperative cancellation.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Wraps an arbitrary error message as a module failure.
    #[must_use]
    pub fn module_failure(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleFailure {
            module: module.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_detected_message() {
        let err = EngineError::CycleDetected {
            pipeline: "posts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Pipeline cyclical dependency detected involving 'posts'"
        );
    }

    #[test]
    fn test_isolated_dependency_message() {
        let err = EngineError::IsolatedDependency {
            pipeline: "feed".to_string(),
            dependency: "assets".to_string(),
        };
        assert!(err.to_string().contains("feed"));
        assert!(err.to_string().contains("isolated pipeline 'assets'"));
    }

    #[test]
    fn test_is_cancellation() {
        assert!(EngineError::Cancelled.is_cancellation());
        assert!(!EngineError::Disposed.is_cancellation());
        assert!(!EngineError::module_failure("ReadFiles", "boom").is_cancellation());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
