//! Bounded worker pool consuming jobs from the queue.
//!
//! Workers claim jobs, resolve the agent implementation through the
//! registry, and run the full lifecycle contract. Concurrency is bounded
//! by a semaphore and throughput by a token bucket so a burst of jobs
//! cannot flood external APIs. The worker never re-implements retry
//! logic — failures are handed back to the queue's own policy.
//!
//! # Main types
//!
//! - [`WorkerPool`] — The consume/execute/acknowledge loop.
//! - [`JobThrottle`] — Jobs-per-minute token bucket.
//! - [`WorkerSettings`] — Concurrency and throughput limits.

/// Jobs-per-minute token bucket.
pub mod throttle;
/// The worker pool itself.
pub mod pool;

pub use pool::{WorkerPool, WorkerSettings};
pub use throttle::JobThrottle;
