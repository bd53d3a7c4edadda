//! Key-value + append-log store backing telemetry and readiness flags.
//!
//! Every agent writes only to keys and streams partitioned by its own
//! name, so concurrent writers never conflict. Reads are best-effort
//! snapshots: a reader in another task may not immediately observe a
//! write (eventual consistency is part of the contract, not a bug).
//!
//! # Main types
//!
//! - [`TelemetryStore`] — The store trait the core depends on.
//! - [`MemoryStore`] — In-process implementation with lazy TTL expiry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use compass_core::CompassResult;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Default time-to-live for readiness flags: one hour.
pub const READY_TTL: Duration = Duration::seconds(3_600);

/// Key under which an agent's readiness flag is stored.
pub fn readiness_key(agent: &str) -> String {
    format!("agent:ready:{agent}")
}

/// Stream name for an agent's progress entries.
pub fn progress_stream(agent: &str) -> String {
    format!("progress:{agent}")
}

/// Stream name for an agent's event entries.
pub fn event_stream(agent: &str) -> String {
    format!("events:{agent}")
}

/// Trait for the key-value + append-log store collaborators must provide.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Set a key, optionally with a time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CompassResult<()>;

    /// Get a key. A TTL-expired key reads back as `None`, exactly like a
    /// key that was never set.
    async fn get(&self, key: &str) -> CompassResult<Option<String>>;

    /// Append an entry to a named stream.
    async fn append(&self, stream: &str, entry: serde_json::Value) -> CompassResult<()>;

    /// The most recent `limit` entries of a stream, most recent first.
    async fn tail(&self, stream: &str, limit: usize) -> CompassResult<Vec<serde_json::Value>>;

    /// Connectivity check used by healthchecks.
    async fn ping(&self) -> bool;
}

struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-process [`TelemetryStore`] over `tokio` RwLocks.
///
/// TTLs are enforced lazily: an expired entry is treated as absent on
/// read and overwritten on the next set.
pub struct MemoryStore {
    keys: RwLock<HashMap<String, Entry>>,
    streams: RwLock<HashMap<String, Vec<serde_json::Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            streams: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CompassResult<()> {
        let mut keys = self.keys.write().await;
        keys.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|t| Utc::now() + t),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> CompassResult<Option<String>> {
        let keys = self.keys.read().await;
        let Some(entry) = keys.get(key) else {
            return Ok(None);
        };
        if let Some(expires_at) = entry.expires_at {
            if expires_at <= Utc::now() {
                return Ok(None);
            }
        }
        Ok(Some(entry.value.clone()))
    }

    async fn append(&self, stream: &str, entry: serde_json::Value) -> CompassResult<()> {
        let mut streams = self.streams.write().await;
        streams.entry(stream.to_string()).or_default().push(entry);
        Ok(())
    }

    async fn tail(&self, stream: &str, limit: usize) -> CompassResult<Vec<serde_json::Value>> {
        let streams = self.streams.read().await;
        let Some(entries) = streams.get(stream) else {
            return Ok(Vec::new());
        };
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn ping(&self) -> bool {
        true
    }
}
