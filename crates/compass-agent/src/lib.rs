//! The agent lifecycle contract and its execution envelope.
//!
//! Every executable unit of work in Compass implements the four-phase
//! [`Agent`] contract (`setup → run → validate → teardown`); the
//! [`LifecycleRunner`] drives those phases in order and guarantees that a
//! well-formed [`compass_core::AgentResult`] comes out of every execution,
//! success or failure.
//!
//! # Main types
//!
//! - [`Agent`] — The four-phase contract concrete agents implement.
//! - [`LifecycleRunner`] — Drives the full lifecycle around any agent.
//! - [`retry`] — Exponential-backoff-with-jitter helper for flaky calls.
//! - [`TelemetryReporter`] — Best-effort progress/event writer.

/// The four-phase agent contract.
pub mod contract;
/// Lifecycle orchestration around a single agent execution.
pub mod lifecycle;
/// Retry helper for flaky external calls.
pub mod retry;
/// Best-effort telemetry writes.
pub mod telemetry;

pub use contract::Agent;
pub use lifecycle::LifecycleRunner;
pub use retry::{retry, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_MS};
pub use telemetry::TelemetryReporter;
