//! Static agent catalog: the single source of truth mapping an agent key
//! to its metadata, healthcheck, and factory.
//!
//! The catalog is a closed set — [`AgentKind`] enumerates every known
//! agent and factories are plain function pointers, so resolution is
//! exhaustive at compile time rather than stringly-typed module loading.
//! A catalog entry may expose a namespaced alias next to its short key;
//! both resolve to the same entry and are never distinct agents.

use compass_agent::Agent;
use compass_core::{AgentConfig, AgentHealth, CompassError, CompassResult, HealthState, Phase};
use compass_store::TelemetryStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Closed sum type over the known catalog agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    /// Daily journaling prompt generation.
    Journaling,
    /// Market niche discovery.
    NicheDiscovery,
    /// Calendar load optimization.
    CalendarOptimizer,
    /// Income/savings allocation planning.
    FinancialAllocator,
    /// Content draft generation.
    ContentDrafter,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Journaling => write!(f, "journaling"),
            AgentKind::NicheDiscovery => write!(f, "niche-discovery"),
            AgentKind::CalendarOptimizer => write!(f, "calendar-optimizer"),
            AgentKind::FinancialAllocator => write!(f, "financial-allocator"),
            AgentKind::ContentDrafter => write!(f, "content-drafter"),
        }
    }
}

/// Catalog metadata for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMeta {
    /// Primary catalog key.
    pub key: String,
    /// Which known agent this entry is.
    pub kind: AgentKind,
    /// Human-readable description.
    pub description: String,
    /// Default lifecycle tier for dispatches of this agent.
    pub phase: Phase,
    /// Default dispatch priority.
    pub priority: i32,
}

/// Builds a contract-conforming instance from a dispatch config.
pub type AgentFactory = fn(AgentConfig) -> Box<dyn Agent>;

/// One catalog entry: metadata, aliases, and the instance factory.
pub struct RegistryEntry {
    /// Catalog metadata.
    pub meta: AgentMeta,
    /// Alternate keys resolving to this same entry.
    pub aliases: Vec<String>,
    /// Instance factory.
    pub factory: AgentFactory,
}

impl RegistryEntry {
    /// The default dispatch config for this entry.
    pub fn default_config(&self) -> AgentConfig {
        AgentConfig::new(self.meta.key.clone(), self.meta.phase, self.meta.priority)
    }
}

/// The static agent catalog.
pub struct AgentRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register an entry under its primary key and all aliases.
    pub fn register(&mut self, entry: RegistryEntry) {
        let slot = self.entries.len();
        info!(agent = %entry.meta.key, aliases = entry.aliases.len(), "Registered agent");
        self.index.insert(entry.meta.key.clone(), slot);
        for alias in &entry.aliases {
            self.index.insert(alias.clone(), slot);
        }
        self.entries.push(entry);
    }

    /// Resolve a primary key or alias to its entry.
    pub fn resolve(&self, key: &str) -> Option<&RegistryEntry> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    /// Every underlying agent exactly once, in registration order.
    pub fn primary_entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    /// Number of distinct agents (aliases not counted).
    pub fn agent_count(&self) -> usize {
        self.entries.len()
    }

    /// Static shape guard, run once at process start.
    ///
    /// Fails fast on missing metadata fields or duplicate keys/aliases.
    /// This validates the catalog's shape only; it is not a runtime
    /// health check.
    pub fn validate(&self) -> CompassResult<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for entry in &self.entries {
            if entry.meta.key.trim().is_empty() {
                return Err(CompassError::Registry(
                    "catalog entry with empty key".to_string(),
                ));
            }
            if entry.meta.description.trim().is_empty() {
                return Err(CompassError::Registry(format!(
                    "agent '{}' is missing a description",
                    entry.meta.key
                )));
            }
            for key in std::iter::once(entry.meta.key.as_str())
                .chain(entry.aliases.iter().map(String::as_str))
            {
                if let Some(owner) = seen.insert(key, &entry.meta.key) {
                    return Err(CompassError::Registry(format!(
                        "key '{key}' registered by both '{owner}' and '{}'",
                        entry.meta.key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Healthcheck one entry: required config shape plus store connectivity.
    pub async fn healthcheck(
        &self,
        entry: &RegistryEntry,
        store: &dyn TelemetryStore,
    ) -> AgentHealth {
        let mut checks = BTreeMap::new();
        checks.insert(
            "config".to_string(),
            !entry.meta.key.trim().is_empty() && !entry.meta.description.trim().is_empty(),
        );
        checks.insert("store".to_string(), store.ping().await);
        AgentHealth::from_checks(entry.meta.key.clone(), checks)
    }

    /// Healthcheck every entry; aggregate is healthy iff all entries are.
    pub async fn registry_health(&self, store: &dyn TelemetryStore) -> RegistryHealth {
        let mut agents = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            agents.push(self.healthcheck(entry, store).await);
        }
        let status = if agents.iter().all(|a| a.status == HealthState::Healthy) {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };
        RegistryHealth { status, agents }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate registry health snapshot, computed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryHealth {
    /// Healthy iff every agent's checks all passed.
    pub status: HealthState,
    /// Per-agent results.
    pub agents: Vec<AgentHealth>,
}
