//! Routing table from logger identity to its file sink

use super::log_record::LoggerId;
use crate::sinks::RotatingFileSink;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Loggers register their sink on creation and remove it on teardown.
///
/// Lookups hand out a clone of the `Arc`, so a worker can keep writing to a
/// sink that was unregistered after the lookup; the registry lock is never
/// held during file I/O.
#[derive(Debug, Default)]
pub struct SinkRegistry {
    sinks: RwLock<HashMap<LoggerId, Arc<RotatingFileSink>>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` for `id`, returning the sink it replaces, if any.
    pub fn register(
        &self,
        id: LoggerId,
        sink: Arc<RotatingFileSink>,
    ) -> Option<Arc<RotatingFileSink>> {
        self.sinks.write().insert(id, sink)
    }

    pub fn unregister(&self, id: LoggerId) -> Option<Arc<RotatingFileSink>> {
        self.sinks.write().remove(&id)
    }

    pub fn lookup(&self, id: LoggerId) -> Option<Arc<RotatingFileSink>> {
        self.sinks.read().get(&id).cloned()
    }

    /// Give the sink of `id` a new filename stem. Returns whether `id` is known.
    pub fn retag(&self, id: LoggerId, tag: &str) -> bool {
        match self.lookup(id) {
            Some(sink) => {
                sink.set_tag(tag);
                true
            }
            None => false,
        }
    }

    /// Every registered sink, collected so the caller can do I/O unlocked.
    pub fn snapshot(&self) -> Vec<Arc<RotatingFileSink>> {
        self.sinks.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_lookup_unregister() {
        let registry = SinkRegistry::new();
        let id = LoggerId::next();
        let sink = Arc::new(RotatingFileSink::new());

        assert!(registry.register(id, Arc::clone(&sink)).is_none());
        let found = registry.lookup(id).expect("registered");
        assert!(Arc::ptr_eq(&found, &sink));

        assert!(registry.unregister(id).is_some());
        assert!(registry.lookup(id).is_none());
        assert!(registry.unregister(id).is_none());
    }

    #[test]
    fn test_lookup_of_unknown_id() {
        let registry = SinkRegistry::new();
        assert!(registry.lookup(LoggerId::next()).is_none());
        assert!(!registry.retag(LoggerId::next(), "ghost"));
    }

    #[test]
    fn test_sink_outlives_unregister() {
        let registry = SinkRegistry::new();
        let id = LoggerId::next();
        registry.register(id, Arc::new(RotatingFileSink::new()));

        let held = registry.lookup(id).unwrap();
        registry.unregister(id);
        // The worker's handle is still usable.
        assert!(!held.write(b"late").is_written());
    }

    #[test]
    fn test_retag_and_snapshot() {
        let registry = SinkRegistry::new();
        let a = LoggerId::next();
        let b = LoggerId::next();
        registry.register(a, Arc::new(RotatingFileSink::new()));
        registry.register(b, Arc::new(RotatingFileSink::new()));

        assert!(registry.retag(a, "renamed"));
        assert_eq!(registry.lookup(a).unwrap().tag(), "renamed");
        assert_eq!(registry.snapshot().len(), 2);
        assert_eq!(registry.len(), 2);
    }
}
