use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Coaching lifecycle tier an agent dispatch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Establishing baseline habits and inputs.
    Foundation,
    /// Building on an established baseline.
    Momentum,
    /// Long-horizon optimization work.
    Mastery,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Foundation => write!(f, "foundation"),
            Phase::Momentum => write!(f, "momentum"),
            Phase::Mastery => write!(f, "mastery"),
        }
    }
}

/// Immutable configuration for a single agent dispatch.
///
/// Created at job-dispatch time and handed to the agent factory unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent name; also the partition key for telemetry and readiness.
    pub name: String,
    /// Lifecycle tier of this dispatch.
    pub phase: Phase,
    /// Preferred dequeue priority (higher first, not guaranteed).
    pub priority: i32,
}

impl AgentConfig {
    /// Create a config for the given agent name, phase, and priority.
    pub fn new(name: impl Into<String>, phase: Phase, priority: i32) -> Self {
        Self {
            name: name.into(),
            phase,
            priority,
        }
    }
}

/// The sole contract between an agent execution and its caller.
///
/// Every execution produces exactly one result, and `success`, `outputs`,
/// and `artifacts` are populated on every path — a thrown error degrades
/// to `success: false` with the message captured in `errors`, never to a
/// malformed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Whether the agent's own logic considers the run successful.
    pub success: bool,
    /// Named outputs produced by the run.
    pub outputs: HashMap<String, serde_json::Value>,
    /// Identifiers of artifacts produced by the run.
    pub artifacts: Vec<String>,
    /// Error messages captured on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl AgentResult {
    /// A successful result with empty outputs and artifacts.
    pub fn ok() -> Self {
        Self {
            success: true,
            outputs: HashMap::new(),
            artifacts: Vec::new(),
            errors: None,
        }
    }

    /// A failed result carrying a single error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            outputs: HashMap::new(),
            artifacts: Vec::new(),
            errors: Some(vec![message.into()]),
        }
    }

    /// Attach a named output.
    pub fn with_output(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }

    /// Attach an artifact identifier.
    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifacts.push(artifact.into());
        self
    }
}

mod percent_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One append-only progress entry, partitioned by agent name.
///
/// Monotonically non-decreasing within one execution; reset to 0 at setup
/// and forced to 100 when the envelope closes, regardless of outcome.
/// All fields are strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Agent name (partition key).
    pub agent: String,
    /// Lifecycle tier of the dispatch being reported.
    pub phase: String,
    /// Completion percentage, 0–100.
    #[serde(with = "percent_string")]
    pub percent: u8,
    /// Human-readable note for this progress point.
    pub note: String,
    /// UTC timestamp of the write.
    pub timestamp: DateTime<Utc>,
}

impl ProgressEntry {
    /// Create a progress entry stamped with the current time.
    pub fn new(agent: impl Into<String>, phase: Phase, percent: u8, note: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            phase: phase.to_string(),
            percent: percent.min(100),
            note: note.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One append-only event entry, partitioned by agent name.
///
/// No ordering guarantee beyond insertion order within a single writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    /// Agent name (partition key).
    pub agent: String,
    /// Event kind discriminator.
    pub kind: String,
    /// Serialized event payload.
    pub payload: String,
    /// UTC timestamp of the write.
    pub timestamp: DateTime<Utc>,
}

impl EventEntry {
    /// Create an event entry, serializing the payload object.
    pub fn new(agent: impl Into<String>, kind: impl Into<String>, payload: &serde_json::Value) -> Self {
        Self {
            agent: agent.into(),
            kind: kind.into(),
            payload: payload.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Overall health classification for an agent or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// All checks passed.
    Healthy,
    /// Some checks passed.
    Degraded,
    /// One or more required checks failed.
    Unhealthy,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Degraded => write!(f, "degraded"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health of a single catalog agent, computed on demand and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHealth {
    /// The agent's primary catalog key.
    pub agent_id: String,
    /// Overall classification derived from `checks`.
    pub status: HealthState,
    /// Named individual check outcomes.
    pub checks: BTreeMap<String, bool>,
}

impl AgentHealth {
    /// Classify from a set of named checks: healthy iff all pass.
    pub fn from_checks(agent_id: impl Into<String>, checks: BTreeMap<String, bool>) -> Self {
        let status = if checks.values().all(|&ok| ok) {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };
        Self {
            agent_id: agent_id.into(),
            status,
            checks,
        }
    }
}
