use crate::throttle::JobThrottle;
use compass_agent::LifecycleRunner;
use compass_core::{AgentResult, CompassError, CompassResult, Job};
use compass_orchestrator::JobQueue;
use compass_registry::AgentRegistry;
use compass_store::TelemetryStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Concurrency and throughput limits for a worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Maximum simultaneously executing jobs.
    pub max_concurrent: usize,
    /// Maximum job starts per minute.
    pub jobs_per_minute: f64,
    /// Poll interval while the queue has nothing eligible, in ms.
    pub idle_poll_ms: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            jobs_per_minute: 10.0,
            idle_poll_ms: 250,
        }
    }
}

/// Consumes jobs under a fixed concurrency budget and throughput cap.
///
/// Per job: resolve the agent key via the registry, instantiate with the
/// job's config, and run the full lifecycle. Any error escaping execution
/// (unknown key, instantiation failure) is handed back to the queue as a
/// job failure — retry and backoff belong to the queue, not the worker.
pub struct WorkerPool {
    registry: Arc<AgentRegistry>,
    queue: Arc<RwLock<JobQueue>>,
    store: Arc<dyn TelemetryStore>,
    settings: WorkerSettings,
    semaphore: Arc<Semaphore>,
    throttle: Arc<JobThrottle>,
}

impl WorkerPool {
    /// Create a pool over the given collaborators.
    pub fn new(
        registry: Arc<AgentRegistry>,
        queue: Arc<RwLock<JobQueue>>,
        store: Arc<dyn TelemetryStore>,
        settings: WorkerSettings,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
        let throttle = Arc::new(JobThrottle::new(settings.jobs_per_minute));
        Self {
            registry,
            queue,
            store,
            settings,
            semaphore,
            throttle,
        }
    }

    /// Consume jobs until the shutdown signal flips, then drain.
    ///
    /// On shutdown the pool stops claiming new jobs and waits for every
    /// in-flight job to finish — a graceful drain, never a hard cancel.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            max_concurrent = self.settings.max_concurrent,
            jobs_per_minute = self.settings.jobs_per_minute,
            "Worker pool started"
        );
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

        loop {
            if *shutdown.borrow() {
                break;
            }

            let claimed = { self.queue.write().await.dequeue() };
            let Some(job) = claimed else {
                tokio::select! {
                    _ = shutdown.changed() => {}
                    _ = tokio::time::sleep(Duration::from_millis(self.settings.idle_poll_ms)) => {}
                }
                continue;
            };

            self.throttle.acquire().await;
            let Ok(permit) = self.semaphore.clone().acquire_owned().await else {
                break;
            };

            let registry = self.registry.clone();
            let queue = self.queue.clone();
            let store = self.store.clone();
            in_flight.push(tokio::spawn(async move {
                let _permit = permit;
                Self::process(job, registry, queue, store).await;
            }));
            in_flight.retain(|handle| !handle.is_finished());
        }

        info!(in_flight = in_flight.len(), "Worker pool draining");
        for handle in in_flight {
            let _ = handle.await;
        }
        info!("Worker pool stopped");
    }

    /// Execute one claimed job and acknowledge the outcome to the queue.
    async fn process(
        job: Job,
        registry: Arc<AgentRegistry>,
        queue: Arc<RwLock<JobQueue>>,
        store: Arc<dyn TelemetryStore>,
    ) {
        let job_id = job.id;
        let agent_name = job.agent_name.clone();

        match Self::execute_job(job, registry, store).await {
            Ok(result) if result.success => {
                queue.write().await.complete(job_id);
                info!(job_id = %job_id, agent = %agent_name, "completed");
            }
            Ok(result) => {
                // The lifecycle contained the failure and produced a
                // well-formed result: the job itself is done. Agent-level
                // failure surfaces through readiness and monitor data.
                queue.write().await.complete(job_id);
                let reason = result
                    .errors
                    .as_deref()
                    .map(|errors| errors.join("; "))
                    .unwrap_or_default();
                warn!(job_id = %job_id, agent = %agent_name, reason, "failed");
            }
            Err(e) => {
                queue.write().await.fail(job_id, &e.to_string());
                error!(job_id = %job_id, agent = %agent_name, error = %e, "error");
            }
        }
    }

    /// Resolve, instantiate, and run the lifecycle for one job.
    async fn execute_job(
        job: Job,
        registry: Arc<AgentRegistry>,
        store: Arc<dyn TelemetryStore>,
    ) -> CompassResult<AgentResult> {
        let entry = registry
            .resolve(&job.agent_name)
            .ok_or_else(|| CompassError::UnknownAgent(job.agent_name.clone()))?;
        let mut agent = (entry.factory)(job.config.clone());
        let runner = LifecycleRunner::new(store);
        Ok(runner.execute(agent.as_mut(), &job.config).await)
    }
}
