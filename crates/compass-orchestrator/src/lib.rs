//! Job queue and orchestration facade.
//!
//! The orchestrator owns the catalog of launchable agents and their
//! dispatch policy: one job per catalog entry, priority-tagged, retried
//! with exponential backoff, with bounded retained history. It also
//! exposes the aggregate operational surface (health, recent telemetry,
//! readiness) that a request/response API layer passes through.
//!
//! # Main types
//!
//! - [`JobQueue`] — Priority-preferred queue with retry/backoff handling.
//! - [`Orchestrator`] — Launch-all dispatch plus health/monitor/readiness.
//! - [`QueueSettings`] — Dispatch policy defaults.

/// Orchestrator facade.
pub mod orchestrator;
/// Priority job queue with retry/backoff.
pub mod queue;

pub use orchestrator::{MonitorData, Orchestrator, OrchestratorHealth, ReadinessStatus};
pub use queue::{JobQueue, QueueSettings, DEFAULT_RETAINED_JOBS};
