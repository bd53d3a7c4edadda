use compass_core::{EventEntry, Phase, ProgressEntry};
use compass_store::{event_stream, progress_stream, TelemetryStore};
use std::sync::Arc;
use tracing::warn;

/// Best-effort writer for an agent's progress and event streams.
///
/// Writes are fire-and-forget: a failed write is logged and dropped, and
/// correctness never depends on a progress or event write succeeding.
/// Each reporter writes only to streams partitioned by its agent's name.
pub struct TelemetryReporter {
    store: Arc<dyn TelemetryStore>,
    agent: String,
}

impl TelemetryReporter {
    /// Create a reporter for the given agent name.
    pub fn new(store: Arc<dyn TelemetryStore>, agent: impl Into<String>) -> Self {
        Self {
            store,
            agent: agent.into(),
        }
    }

    /// Append a progress entry. Never fails the caller.
    pub async fn report_progress(&self, phase: Phase, percent: u8, note: &str) {
        let entry = ProgressEntry::new(&self.agent, phase, percent, note);
        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                warn!(agent = %self.agent, error = %e, "Failed to serialize progress entry");
                return;
            }
        };
        if let Err(e) = self.store.append(&progress_stream(&self.agent), value).await {
            warn!(agent = %self.agent, error = %e, "Failed to write progress entry");
        }
    }

    /// Append an event entry. Never fails the caller.
    pub async fn emit_event(&self, kind: &str, payload: &serde_json::Value) {
        let entry = EventEntry::new(&self.agent, kind, payload);
        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                warn!(agent = %self.agent, error = %e, "Failed to serialize event entry");
                return;
            }
        };
        if let Err(e) = self.store.append(&event_stream(&self.agent), value).await {
            warn!(agent = %self.agent, error = %e, "Failed to write event entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use compass_core::{CompassError, CompassResult};
    use compass_store::MemoryStore;

    #[tokio::test]
    async fn test_progress_written_to_partitioned_stream() {
        let store = Arc::new(MemoryStore::new());
        let reporter = TelemetryReporter::new(store.clone(), "journaling");

        reporter.report_progress(Phase::Foundation, 0, "starting").await;
        reporter.report_progress(Phase::Foundation, 100, "done").await;

        let tail = store.tail("progress:journaling", 10).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0]["percent"], "100");
        assert_eq!(tail[0]["agent"], "journaling");
    }

    #[tokio::test]
    async fn test_event_payload_is_serialized() {
        let store = Arc::new(MemoryStore::new());
        let reporter = TelemetryReporter::new(store.clone(), "journaling");

        reporter
            .emit_event("prompt_generated", &serde_json::json!({"count": 3}))
            .await;

        let tail = store.tail("events:journaling", 1).await.unwrap();
        assert_eq!(tail[0]["kind"], "prompt_generated");
        assert_eq!(tail[0]["payload"], r#"{"count":3}"#);
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl TelemetryStore for BrokenStore {
        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<chrono::Duration>,
        ) -> CompassResult<()> {
            Err(CompassError::Store("write refused".into()))
        }

        async fn get(&self, _key: &str) -> CompassResult<Option<String>> {
            Err(CompassError::Store("read refused".into()))
        }

        async fn append(&self, _stream: &str, _entry: serde_json::Value) -> CompassResult<()> {
            Err(CompassError::Store("append refused".into()))
        }

        async fn tail(&self, _stream: &str, _limit: usize) -> CompassResult<Vec<serde_json::Value>> {
            Err(CompassError::Store("tail refused".into()))
        }

        async fn ping(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_write_failures_never_propagate() {
        let reporter = TelemetryReporter::new(Arc::new(BrokenStore), "journaling");
        // Both calls must return normally despite the store refusing writes.
        reporter.report_progress(Phase::Momentum, 50, "halfway").await;
        reporter
            .emit_event("checkpoint", &serde_json::json!({"ok": false}))
            .await;
    }
}
