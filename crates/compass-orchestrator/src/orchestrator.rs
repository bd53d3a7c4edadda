use crate::queue::JobQueue;
use compass_core::{EventEntry, HealthState, ProgressEntry, QueueDepth};
use compass_registry::AgentRegistry;
use compass_store::{event_stream, progress_stream, readiness_key, TelemetryStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// Orchestration facade over the catalog, queue, and store.
///
/// Constructed once at process start and passed by reference into the
/// API layer and worker entrypoint — there are no ambient singletons.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    queue: Arc<RwLock<JobQueue>>,
    store: Arc<dyn TelemetryStore>,
}

impl Orchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        registry: Arc<AgentRegistry>,
        queue: Arc<RwLock<JobQueue>>,
        store: Arc<dyn TelemetryStore>,
    ) -> Self {
        Self {
            registry,
            queue,
            store,
        }
    }

    /// Shared handle to the job queue.
    pub fn queue(&self) -> &Arc<RwLock<JobQueue>> {
        &self.queue
    }

    /// Enqueue exactly one job per catalog agent.
    ///
    /// Aliases are not separate agents and are never launched twice. An
    /// enqueue failure for one entry is logged and excluded from the
    /// returned IDs; the loop continues for the remaining entries, so a
    /// malformed entry cannot block all others.
    pub async fn launch_all_agents(&self) -> Vec<Uuid> {
        let mut job_ids = Vec::with_capacity(self.registry.agent_count());
        let mut queue = self.queue.write().await;

        for entry in self.registry.primary_entries() {
            let config = entry.default_config();
            match queue.enqueue(&entry.meta.key, config) {
                Ok(id) => job_ids.push(id),
                Err(e) => {
                    error!(agent = %entry.meta.key, error = %e, "Failed to enqueue agent launch");
                }
            }
        }

        info!(launched = job_ids.len(), catalog = self.registry.agent_count(), "Launch-all complete");
        job_ids
    }

    /// Transport connectivity plus queue depth counters.
    pub async fn get_health(&self) -> OrchestratorHealth {
        let store_connected = self.store.ping().await;
        let queue = self.queue.read().await.depth();
        let status = if store_connected {
            HealthState::Healthy
        } else {
            HealthState::Degraded
        };
        OrchestratorHealth {
            status,
            store_connected,
            queue,
        }
    }

    /// The most recent `limit` progress and event entries across all
    /// catalog agents, most recent first.
    ///
    /// A best-effort, eventually-consistent snapshot: a write from
    /// another process may not be visible yet, and entries that fail to
    /// deserialize are skipped rather than failing the read.
    pub async fn get_monitor_data(&self, limit: usize) -> MonitorData {
        let mut progress: Vec<ProgressEntry> = Vec::new();
        let mut events: Vec<EventEntry> = Vec::new();

        for entry in self.registry.primary_entries() {
            let agent = &entry.meta.key;
            if let Ok(tail) = self.store.tail(&progress_stream(agent), limit).await {
                progress.extend(
                    tail.into_iter()
                        .filter_map(|v| serde_json::from_value(v).ok()),
                );
            }
            if let Ok(tail) = self.store.tail(&event_stream(agent), limit).await {
                events.extend(
                    tail.into_iter()
                        .filter_map(|v| serde_json::from_value(v).ok()),
                );
            }
        }

        progress.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        progress.truncate(limit);
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);

        MonitorData { progress, events }
    }

    /// Read each catalog agent's readiness flag.
    ///
    /// `all_ready` is true iff every flag reads `"true"`; a missing,
    /// expired, or `"false"` flag all count as not ready.
    pub async fn get_readiness_status(&self) -> ReadinessStatus {
        let mut agents = BTreeMap::new();
        for entry in self.registry.primary_entries() {
            let key = readiness_key(&entry.meta.key);
            let ready = matches!(
                self.store.get(&key).await,
                Ok(Some(value)) if value == "true"
            );
            agents.insert(entry.meta.key.clone(), ready);
        }
        let all_ready = !agents.is_empty() && agents.values().all(|&ready| ready);
        ReadinessStatus { agents, all_ready }
    }
}

/// Aggregate orchestrator health snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorHealth {
    /// Healthy when the store is reachable, degraded otherwise.
    pub status: HealthState,
    /// Whether the telemetry/readiness store answered a ping.
    pub store_connected: bool,
    /// Queue depth counters.
    pub queue: QueueDepth,
}

/// Recent-telemetry snapshot returned by [`Orchestrator::get_monitor_data`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorData {
    /// Most recent progress entries, most recent first.
    pub progress: Vec<ProgressEntry>,
    /// Most recent event entries, most recent first.
    pub events: Vec<EventEntry>,
}

/// Per-agent readiness flags plus the aggregate conjunction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    /// Flag value per catalog agent (`false` for missing/expired flags).
    pub agents: BTreeMap<String, bool>,
    /// True iff every agent's flag reads `"true"`.
    pub all_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueSettings;
    use async_trait::async_trait;
    use compass_agent::Agent;
    use compass_core::{AgentConfig, AgentResult, CompassResult, Phase};
    use compass_registry::{AgentKind, AgentMeta, RegistryEntry};
    use compass_store::{MemoryStore, READY_TTL};

    struct NoopAgent;

    #[async_trait]
    impl Agent for NoopAgent {
        async fn run(&mut self) -> CompassResult<AgentResult> {
            Ok(AgentResult::ok())
        }
    }

    fn noop_factory(_config: AgentConfig) -> Box<dyn Agent> {
        Box::new(NoopAgent)
    }

    fn entry(key: &str, kind: AgentKind, priority: i32) -> RegistryEntry {
        RegistryEntry {
            meta: AgentMeta {
                key: key.to_string(),
                kind,
                description: format!("{key} agent"),
                phase: Phase::Foundation,
                priority,
            },
            aliases: vec![format!("compass.{key}")],
            factory: noop_factory,
        }
    }

    fn five_agent_registry() -> Arc<AgentRegistry> {
        let mut registry = AgentRegistry::new();
        registry.register(entry("journaling", AgentKind::Journaling, 3));
        registry.register(entry("niche-discovery", AgentKind::NicheDiscovery, 2));
        registry.register(entry("calendar-optimizer", AgentKind::CalendarOptimizer, 5));
        registry.register(entry("financial-allocator", AgentKind::FinancialAllocator, 4));
        registry.register(entry("content-drafter", AgentKind::ContentDrafter, 1));
        Arc::new(registry)
    }

    fn orchestrator_with(store: Arc<MemoryStore>) -> Orchestrator {
        Orchestrator::new(
            five_agent_registry(),
            Arc::new(RwLock::new(JobQueue::new(QueueSettings::default()))),
            store,
        )
    }

    #[tokio::test]
    async fn test_launch_all_returns_one_job_per_agent() {
        let orchestrator = orchestrator_with(Arc::new(MemoryStore::new()));

        let job_ids = orchestrator.launch_all_agents().await;
        assert_eq!(job_ids.len(), 5);

        // Each job traces to a distinct agent name.
        let queue = orchestrator.queue().read().await;
        let mut names: Vec<String> = job_ids
            .iter()
            .map(|&id| queue.get(id).unwrap().agent_name.clone())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[tokio::test]
    async fn test_malformed_entry_excluded_without_blocking_others() {
        let mut registry = AgentRegistry::new();
        registry.register(entry("journaling", AgentKind::Journaling, 3));
        // Blank key: the queue rejects the enqueue for this entry only.
        registry.register(entry("", AgentKind::NicheDiscovery, 2));
        registry.register(entry("content-drafter", AgentKind::ContentDrafter, 1));

        let orchestrator = Orchestrator::new(
            Arc::new(registry),
            Arc::new(RwLock::new(JobQueue::new(QueueSettings::default()))),
            Arc::new(MemoryStore::new()),
        );

        let job_ids = orchestrator.launch_all_agents().await;
        assert_eq!(job_ids.len(), 2);

        let queue = orchestrator.queue().read().await;
        let names: Vec<String> = job_ids
            .iter()
            .map(|&id| queue.get(id).unwrap().agent_name.clone())
            .collect();
        assert!(names.contains(&"journaling".to_string()));
        assert!(names.contains(&"content-drafter".to_string()));
    }

    #[tokio::test]
    async fn test_launch_priority_comes_from_config() {
        let orchestrator = orchestrator_with(Arc::new(MemoryStore::new()));
        let job_ids = orchestrator.launch_all_agents().await;

        let queue = orchestrator.queue().read().await;
        let calendar = job_ids
            .iter()
            .map(|&id| queue.get(id).unwrap())
            .find(|j| j.agent_name == "calendar-optimizer")
            .unwrap();
        assert_eq!(calendar.priority, 5);
        assert_eq!(calendar.config.priority, 5);
    }

    #[tokio::test]
    async fn test_health_reports_depth_and_connectivity() {
        let orchestrator = orchestrator_with(Arc::new(MemoryStore::new()));
        orchestrator.launch_all_agents().await;

        let health = orchestrator.get_health().await;
        assert_eq!(health.status, HealthState::Healthy);
        assert!(health.store_connected);
        assert_eq!(health.queue.waiting, 5);
        assert_eq!(health.queue.active, 0);
    }

    #[tokio::test]
    async fn test_monitor_data_returns_most_recent_first() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator_with(store.clone());

        for percent in [0u8, 25, 50, 75, 100] {
            let entry = ProgressEntry::new("journaling", Phase::Foundation, percent, "step");
            store
                .append(
                    &progress_stream("journaling"),
                    serde_json::to_value(&entry).unwrap(),
                )
                .await
                .unwrap();
        }

        let monitor = orchestrator.get_monitor_data(2).await;
        assert_eq!(monitor.progress.len(), 2);
        assert_eq!(monitor.progress[0].percent, 100);
        assert_eq!(monitor.progress[1].percent, 75);
    }

    #[tokio::test]
    async fn test_monitor_data_merges_across_agents() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator_with(store.clone());

        for agent in ["journaling", "content-drafter"] {
            let entry = EventEntry::new(agent, "execution_finished", &serde_json::json!({}));
            store
                .append(&event_stream(agent), serde_json::to_value(&entry).unwrap())
                .await
                .unwrap();
        }

        let monitor = orchestrator.get_monitor_data(10).await;
        assert_eq!(monitor.events.len(), 2);
    }

    #[tokio::test]
    async fn test_readiness_all_ready_requires_every_flag() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator_with(store.clone());

        let agents = [
            "journaling",
            "niche-discovery",
            "calendar-optimizer",
            "financial-allocator",
            "content-drafter",
        ];
        for agent in &agents[..4] {
            store
                .set(&readiness_key(agent), "true", Some(READY_TTL))
                .await
                .unwrap();
        }

        // One flag missing: not all ready.
        let status = orchestrator.get_readiness_status().await;
        assert!(!status.all_ready);
        assert_eq!(status.agents["journaling"], true);
        assert_eq!(status.agents["content-drafter"], false);

        store
            .set(&readiness_key("content-drafter"), "true", Some(READY_TTL))
            .await
            .unwrap();
        let status = orchestrator.get_readiness_status().await;
        assert!(status.all_ready);
    }

    #[tokio::test]
    async fn test_readiness_false_flag_blocks_all_ready() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator_with(store.clone());

        for agent in [
            "journaling",
            "niche-discovery",
            "calendar-optimizer",
            "financial-allocator",
        ] {
            store
                .set(&readiness_key(agent), "true", Some(READY_TTL))
                .await
                .unwrap();
        }
        store
            .set(&readiness_key("content-drafter"), "false", Some(READY_TTL))
            .await
            .unwrap();

        let status = orchestrator.get_readiness_status().await;
        assert!(!status.all_ready);
    }

    #[tokio::test]
    async fn test_readiness_expired_flag_counts_as_not_ready() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator_with(store.clone());

        for agent in [
            "journaling",
            "niche-discovery",
            "calendar-optimizer",
            "financial-allocator",
        ] {
            store
                .set(&readiness_key(agent), "true", Some(READY_TTL))
                .await
                .unwrap();
        }
        // Already expired: reads back as absent.
        store
            .set(
                &readiness_key("content-drafter"),
                "true",
                Some(chrono::Duration::milliseconds(-1)),
            )
            .await
            .unwrap();

        let status = orchestrator.get_readiness_status().await;
        assert!(!status.all_ready);
        assert_eq!(status.agents["content-drafter"], false);
    }
}
