//! Core types and error definitions for the Compass orchestration core.
//!
//! This crate provides the foundational types shared across all Compass
//! crates: the unified error enum, the agent dispatch config and result
//! contract, telemetry entry shapes, and the queue-owned job model.
//!
//! # Main types
//!
//! - [`CompassError`] — Unified error enum for all Compass subsystems.
//! - [`CompassResult`] — Convenience alias for `Result<T, CompassError>`.
//! - [`AgentConfig`] — Immutable per-dispatch agent configuration.
//! - [`AgentResult`] — The sole contract between an agent and its caller.
//! - [`Job`] — One queued, retryable unit of dispatch for a single agent.

/// Job model, status transitions, and retry policy.
pub mod job;
/// Shared agent-facing types (config, result, telemetry, health).
pub mod types;

pub use job::{Job, JobStatus, QueueDepth, RetryPolicy};
pub use types::{
    AgentConfig, AgentHealth, AgentResult, EventEntry, HealthState, Phase, ProgressEntry,
};

/// Top-level error type for the Compass orchestration core.
///
/// Each variant corresponds to a failure class with its own containment
/// boundary: setup/run errors are caught at the lifecycle envelope,
/// enqueue errors at the per-entry launch loop, unknown-agent errors at
/// the job boundary.
#[derive(Debug, thiserror::Error)]
pub enum CompassError {
    /// An error raised inside an agent's `setup` phase.
    #[error("Setup error: {0}")]
    Setup(String),

    /// An error raised inside an agent's `run` phase.
    #[error("Run error: {0}")]
    Run(String),

    /// A failed write to the telemetry/readiness store.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// All attempts of a retried operation failed.
    #[error("Retry exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The message of the last failure.
        last: String,
    },

    /// A job could not be submitted to the queue.
    #[error("Enqueue error: {0}")]
    Enqueue(String),

    /// A job referenced an agent key absent from the registry.
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// A malformed or duplicate catalog entry.
    #[error("Registry error: {0}")]
    Registry(String),

    /// An error from the key-value/append-log store.
    #[error("Store error: {0}")]
    Store(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`CompassError`].
pub type CompassResult<T> = Result<T, CompassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_agent_message() {
        let err = CompassError::UnknownAgent("unknown-agent".to_string());
        assert_eq!(err.to_string(), "Unknown agent: unknown-agent");
    }

    #[test]
    fn test_retry_exhausted_names_last_failure() {
        let err = CompassError::RetryExhausted {
            attempts: 5,
            last: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("5 attempts"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("not json");
        let err: CompassError = parse.unwrap_err().into();
        assert!(matches!(err, CompassError::Json(_)));
    }
}
