use chrono::Utc;
use compass_core::{AgentConfig, CompassError, CompassResult, Job, JobStatus, QueueDepth, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default cap on retained terminal (completed/failed) jobs.
pub const DEFAULT_RETAINED_JOBS: usize = 100;

/// Dispatch policy defaults applied to every enqueued job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Maximum terminal jobs kept in history; older ones are pruned.
    pub max_retained_jobs: usize,
    /// Retry policy stamped onto each job at enqueue time.
    pub retry: RetryPolicy,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_retained_jobs: DEFAULT_RETAINED_JOBS,
            retry: RetryPolicy::default(),
        }
    }
}

/// In-process priority job queue.
///
/// Queue state is mutated only through these methods; worker and
/// orchestrator code never touch job internals directly. Priority
/// influences *preferred* dequeue order within one call — it is not a
/// strict ordering guarantee once multiple jobs are concurrently
/// available across worker slots.
pub struct JobQueue {
    jobs: HashMap<Uuid, Job>,
    settings: QueueSettings,
}

impl JobQueue {
    /// Create an empty queue with the given settings.
    pub fn new(settings: QueueSettings) -> Self {
        Self {
            jobs: HashMap::new(),
            settings,
        }
    }

    /// Submit one job for the given agent and dispatch config.
    ///
    /// The job is tagged with `config.priority` and the queue's retry
    /// policy. Fails on a blank agent name.
    pub fn enqueue(&mut self, agent_name: &str, config: AgentConfig) -> CompassResult<Uuid> {
        if agent_name.trim().is_empty() {
            return Err(CompassError::Enqueue("blank agent name".to_string()));
        }
        let job = Job::new(agent_name, config, self.settings.retry.clone());
        let id = job.id;
        debug!(job_id = %id, agent = agent_name, priority = job.priority, "Job enqueued");
        self.jobs.insert(id, job);
        self.prune_history();
        Ok(id)
    }

    /// Claim the next eligible job, preferring higher priority.
    ///
    /// Eligible means `Enqueued`, or `Retrying` with its backoff delay
    /// elapsed. Ties break on creation time. The claimed job is marked
    /// `Active` and its attempt counter incremented.
    pub fn dequeue(&mut self) -> Option<Job> {
        let now = Utc::now();
        let id = self
            .jobs
            .values()
            .filter(|j| j.is_eligible(now))
            .max_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            })
            .map(|j| j.id)?;

        let job = self.jobs.get_mut(&id)?;
        job.status = JobStatus::Active;
        job.attempts += 1;
        job.next_eligible_at = None;
        Some(job.clone())
    }

    /// Acknowledge successful completion of an active job.
    pub fn complete(&mut self, id: Uuid) -> bool {
        let Some(job) = self.jobs.get_mut(&id) else {
            return false;
        };
        job.status = JobStatus::Completed;
        job.finished_at = Some(Utc::now());
        info!(job_id = %id, agent = %job.agent_name, attempts = job.attempts, "Job completed");
        self.prune_history();
        true
    }

    /// Report failure of an active job.
    ///
    /// With attempts remaining the job re-enters the queue as `Retrying`
    /// after its exponential backoff delay; otherwise it is terminal
    /// `Failed`.
    pub fn fail(&mut self, id: Uuid, reason: &str) -> bool {
        let Some(job) = self.jobs.get_mut(&id) else {
            return false;
        };
        if job.attempts < job.policy.max_attempts {
            let delay_ms = job.policy.delay_for_attempt(job.attempts);
            job.status = JobStatus::Retrying;
            job.next_eligible_at = Some(Utc::now() + chrono::Duration::milliseconds(delay_ms as i64));
            warn!(
                job_id = %id,
                agent = %job.agent_name,
                attempt = job.attempts,
                delay_ms,
                reason,
                "Job failed, retry scheduled"
            );
        } else {
            job.status = JobStatus::Failed {
                reason: reason.to_string(),
            };
            job.finished_at = Some(Utc::now());
            warn!(
                job_id = %id,
                agent = %job.agent_name,
                attempts = job.attempts,
                reason,
                "Job failed, attempts exhausted"
            );
            self.prune_history();
        }
        true
    }

    /// Get a job by ID.
    pub fn get(&self, id: Uuid) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// Waiting/active/completed/failed counters.
    pub fn depth(&self) -> QueueDepth {
        let mut depth = QueueDepth::default();
        for job in self.jobs.values() {
            match job.status {
                JobStatus::Enqueued | JobStatus::Retrying => depth.waiting += 1,
                JobStatus::Active => depth.active += 1,
                JobStatus::Completed => depth.completed += 1,
                JobStatus::Failed { .. } => depth.failed += 1,
            }
        }
        depth
    }

    /// Whether any job is still waiting or active.
    pub fn has_pending(&self) -> bool {
        self.jobs.values().any(|j| !j.status.is_terminal())
    }

    /// Drop the oldest terminal jobs beyond the retention cap.
    fn prune_history(&mut self) {
        let mut terminal: Vec<(Uuid, chrono::DateTime<Utc>)> = self
            .jobs
            .values()
            .filter(|j| j.status.is_terminal())
            .map(|j| (j.id, j.finished_at.unwrap_or(j.created_at)))
            .collect();
        if terminal.len() <= self.settings.max_retained_jobs {
            return;
        }
        terminal.sort_by_key(|(_, finished)| *finished);
        let excess = terminal.len() - self.settings.max_retained_jobs;
        for (id, _) in terminal.into_iter().take(excess) {
            self.jobs.remove(&id);
        }
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(QueueSettings::default())
    }
}
