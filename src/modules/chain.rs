//! The module chain executor.

use super::context::{ExecutionData, ModuleContext};
use super::Module;
use crate::documents::{empty_seq, DocumentSeq};
use crate::errors::EngineError;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs an ordered list of modules over an input document sequence.
///
/// Modules execute sequentially; each module's output becomes the next
/// module's input. Cancellation is observed before every module. A module
/// returning `Ok(None)` yields an empty sequence. Any module error other
/// than cancellation is logged naming the module and aborts the chain with
/// [`EngineError::ModuleFailure`]; cancellation propagates silently.
///
/// With an empty module list the input sequence is returned unchanged.
pub async fn execute_module_chain(
    data: &ExecutionData,
    parent: Option<Arc<ModuleContext>>,
    modules: &[Arc<dyn Module>],
    inputs: DocumentSeq,
) -> Result<DocumentSeq, EngineError> {
    let mut current = inputs;

    for module in modules {
        if data.cancellation.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let ctx = ModuleContext::new(
            data.clone(),
            parent.clone(),
            module.name(),
            current.clone(),
        );

        debug!(
            pipeline = %data.pipeline,
            phase = %data.phase,
            module = module.name(),
            inputs = current.len(),
            "Executing module"
        );

        match module.execute(&ctx).await {
            Ok(Some(outputs)) => current = outputs,
            Ok(None) => current = empty_seq(),
            Err(EngineError::Cancelled) => return Err(EngineError::Cancelled),
            Err(e) => {
                error!(
                    pipeline = %data.pipeline,
                    phase = %data.phase,
                    module = module.name(),
                    error = %e,
                    "Error while executing module {}", module.name()
                );
                return Err(EngineError::module_failure(module.name(), e.to_string()));
            }
        }
    }

    Ok(current)
}
