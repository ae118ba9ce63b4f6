//! Event sink system for observability.
//!
//! Phase nodes and the engine orchestrator emit lifecycle events
//! (`phase.started`, `phase.completed`, `engine.finished`, ...) through a
//! process-global [`EventSink`]. The default sink discards events; embedders
//! install a sink at engine construction.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL_EVENT_SINK: RwLock<Option<Arc<dyn EventSink>>> = RwLock::new(None);

/// Sets the current global event sink.
pub fn set_event_sink(sink: Arc<dyn EventSink>) {
    *GLOBAL_EVENT_SINK.write() = Some(sink);
}

/// Clears the current global event sink.
pub fn clear_event_sink() {
    *GLOBAL_EVENT_SINK.write() = None;
}

/// Gets the current global event sink.
///
/// Returns a [`NoOpEventSink`] if no sink is set.
#[must_use]
pub fn get_event_sink() -> Arc<dyn EventSink> {
    GLOBAL_EVENT_SINK
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpEventSink))
}

/// Serializes tests that swap the global sink.
#[cfg(test)]
pub(crate) static GLOBAL_SINK_TEST_LOCK: RwLock<()> = RwLock::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_sink_roundtrip() {
        let _guard = GLOBAL_SINK_TEST_LOCK.write();

        clear_event_sink();
        get_event_sink().try_emit("test", None);

        let sink = Arc::new(CollectingEventSink::new());
        set_event_sink(sink.clone());
        get_event_sink().try_emit("test.event", Some(serde_json::json!({"key": "value"})));
        assert_eq!(sink.count_of("test.event"), 1);

        clear_event_sink();
        get_event_sink().try_emit("test.after", None);
        assert_eq!(sink.count_of("test.after"), 0);
    }
}
