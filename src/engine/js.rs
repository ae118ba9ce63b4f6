//! Process-global JavaScript engine pool.
//!
//! Script-evaluating modules obtain engines through a process-wide registry
//! of named factories. The registry is embedder configuration: the engine's
//! execute path never touches it, but [`reset_js_engines`] is exposed so an
//! embedder can reconfigure from a clean slate.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A JavaScript engine instance.
pub trait JsEngine: Send {
    /// Evaluates a script, returning its result as JSON.
    fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, crate::errors::EngineError>;
}

/// Factory producing JavaScript engine instances.
pub trait JsEngineFactory: Send + Sync + Debug {
    /// Creates a fresh engine.
    fn create(&self) -> Box<dyn JsEngine>;
}

#[derive(Debug, Default)]
struct JsEnginePool {
    factories: HashMap<String, Arc<dyn JsEngineFactory>>,
    default_name: Option<String>,
}

static JS_ENGINE_POOL: RwLock<Option<JsEnginePool>> = RwLock::new(None);

/// Registers an engine factory under a name.
pub fn register_js_engine(name: impl Into<String>, factory: Arc<dyn JsEngineFactory>) {
    let mut pool = JS_ENGINE_POOL.write();
    pool.get_or_insert_with(JsEnginePool::default)
        .factories
        .insert(name.into(), factory);
}

/// Sets the default engine name.
pub fn set_default_js_engine(name: impl Into<String>) {
    let mut pool = JS_ENGINE_POOL.write();
    pool.get_or_insert_with(JsEnginePool::default).default_name = Some(name.into());
}

/// Returns the default engine name, if set.
#[must_use]
pub fn default_js_engine_name() -> Option<String> {
    JS_ENGINE_POOL
        .read()
        .as_ref()
        .and_then(|p| p.default_name.clone())
}

/// Looks up a registered engine factory by name.
#[must_use]
pub fn js_engine_factory(name: &str) -> Option<Arc<dyn JsEngineFactory>> {
    JS_ENGINE_POOL
        .read()
        .as_ref()
        .and_then(|p| p.factories.get(name).cloned())
}

/// Clears all registered engine factories and the default name.
///
/// Idempotent.
pub fn reset_js_engines() {
    *JS_ENGINE_POOL.write() = None;
}
