use crate::types::AgentConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a job in the dispatch queue.
///
/// Transitions: `Enqueued → Active → (Completed | Retrying → … | Failed)`.
/// `Failed` is the attempts-exhausted terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for a worker slot.
    Enqueued,
    /// Claimed by a worker and executing.
    Active,
    /// Failed with attempts remaining; waiting out its backoff delay.
    Retrying,
    /// Finished successfully.
    Completed,
    /// All attempts exhausted.
    Failed {
        /// Reason from the last failed attempt.
        reason: String,
    },
}

impl JobStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed { .. })
    }
}

/// Exponential backoff policy applied by the queue between job attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts before a job is marked failed.
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base_ms: 2_000,
            backoff_max_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, after `attempt` (1-based) has failed.
    ///
    /// Doubles per attempt from the base, capped at `backoff_max_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let exp = attempt.saturating_sub(1);
        let delay = self
            .backoff_base_ms
            .saturating_mul(2u64.saturating_pow(exp));
        delay.min(self.backoff_max_ms)
    }
}

/// One queued, retryable unit of dispatch for a single agent launch.
///
/// Queue-owned: status, attempts, and eligibility are mutated only through
/// the queue's own methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// Catalog key of the agent this job dispatches.
    pub agent_name: String,
    /// Dispatch configuration handed to the agent factory.
    pub config: AgentConfig,
    /// Preferred dequeue priority (higher first).
    pub priority: i32,
    /// Number of attempts started so far.
    pub attempts: u32,
    /// Current queue status.
    pub status: JobStatus,
    /// Backoff policy governing retries of this job.
    pub policy: RetryPolicy,
    /// Earliest time this job may be dequeued again (set on retry).
    pub next_eligible_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time the job reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new enqueued job for the given agent and config.
    pub fn new(agent_name: impl Into<String>, config: AgentConfig, policy: RetryPolicy) -> Self {
        let priority = config.priority;
        Self {
            id: Uuid::new_v4(),
            agent_name: agent_name.into(),
            config,
            priority,
            attempts: 0,
            status: JobStatus::Enqueued,
            policy,
            next_eligible_at: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Whether this job may be handed to a worker at `now`.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            JobStatus::Enqueued => true,
            JobStatus::Retrying => self.next_eligible_at.map_or(true, |at| at <= now),
            _ => false,
        }
    }
}

/// Queue depth counters exposed through health reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueDepth {
    /// Jobs enqueued or waiting out a retry delay.
    pub waiting: usize,
    /// Jobs currently claimed by workers.
    pub active: usize,
    /// Jobs completed successfully.
    pub completed: usize,
    /// Jobs that exhausted their attempts.
    pub failed: usize,
}
