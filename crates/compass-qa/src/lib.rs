//! Integration QA harness: proves every registered agent is independently
//! runnable end-to-end, and gates automated pipelines on the outcome.
//!
//! For each catalog entry the harness builds an instance through the
//! registry factory, runs the full lifecycle, and checks the result's
//! shape and success flag. Latency over the threshold is a warning, not
//! a failure — there is no per-job timeout anywhere in the core, and the
//! harness only observes.

use chrono::{DateTime, Utc};
use compass_agent::LifecycleRunner;
use compass_registry::AgentRegistry;
use compass_store::TelemetryStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Harness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaSettings {
    /// Latency above this many milliseconds is recorded as a warning.
    pub latency_warn_ms: u64,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            latency_warn_ms: 30_000,
        }
    }
}

impl QaSettings {
    /// Load settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> compass_core::CompassResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| compass_core::CompassError::Config(format!("invalid QA settings: {e}")))
    }
}

/// Outcome of exercising one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCheck {
    /// The agent's primary catalog key.
    pub agent: String,
    /// False iff the shape was invalid or the result unsuccessful.
    pub test_passed: bool,
    /// Whether the result reserialized with the required shape.
    pub response_shape_valid: bool,
    /// The result's own success flag.
    pub result_success: bool,
    /// Wall-clock execution latency.
    pub latency_ms: u64,
    /// Non-fatal observations (e.g. latency over threshold).
    pub warnings: Vec<String>,
    /// Error messages carried by the result.
    pub errors: Vec<String>,
}

/// Aggregate pass/fail over the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QaStatus {
    /// Every agent passed.
    #[serde(rename = "PASS")]
    Pass,
    /// At least one agent failed.
    #[serde(rename = "FAIL")]
    Fail,
}

/// The report the harness emits as a regression gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaReport {
    /// `PASS` iff every agent passed.
    pub overall_status: QaStatus,
    /// Per-agent outcomes in catalog order.
    pub results: Vec<AgentCheck>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total wall-clock duration of the run.
    pub total_ms: u64,
}

impl QaReport {
    /// Whether the run passed overall.
    pub fn passed(&self) -> bool {
        self.overall_status == QaStatus::Pass
    }
}

/// Non-interactive runner exercising every registered agent end-to-end.
pub struct QaHarness {
    registry: Arc<AgentRegistry>,
    store: Arc<dyn TelemetryStore>,
    settings: QaSettings,
}

impl QaHarness {
    /// Create a harness over the given catalog and store.
    pub fn new(
        registry: Arc<AgentRegistry>,
        store: Arc<dyn TelemetryStore>,
        settings: QaSettings,
    ) -> Self {
        Self {
            registry,
            store,
            settings,
        }
    }

    /// Exercise every catalog agent.
    pub async fn run(&self) -> QaReport {
        self.run_filtered(None).await
    }

    /// Exercise the catalog, optionally restricted to one agent key.
    pub async fn run_filtered(&self, only: Option<&str>) -> QaReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let runner = LifecycleRunner::new(self.store.clone());
        let mut results = Vec::new();

        for entry in self.registry.primary_entries() {
            if let Some(filter) = only {
                if entry.meta.key != filter {
                    continue;
                }
            }
            results.push(self.check_agent(&runner, entry).await);
        }

        let overall_status = if results.iter().all(|c| c.test_passed) {
            QaStatus::Pass
        } else {
            QaStatus::Fail
        };
        let report = QaReport {
            overall_status,
            results,
            started_at,
            total_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            agents = report.results.len(),
            passed = report.passed(),
            total_ms = report.total_ms,
            "QA run finished"
        );
        report
    }

    async fn check_agent(
        &self,
        runner: &LifecycleRunner,
        entry: &compass_registry::RegistryEntry,
    ) -> AgentCheck {
        let agent_key = entry.meta.key.clone();
        let config = entry.default_config();
        let mut agent = (entry.factory)(config.clone());

        let start = Instant::now();
        let result = runner.execute(agent.as_mut(), &config).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let response_shape_valid = shape_valid(&result);
        let result_success = result.success;
        let test_passed = response_shape_valid && result_success;

        let mut warnings = Vec::new();
        if latency_ms > self.settings.latency_warn_ms {
            warnings.push(format!(
                "latency {latency_ms}ms over threshold {}ms",
                self.settings.latency_warn_ms
            ));
            warn!(agent = %agent_key, latency_ms, "Agent exceeded latency threshold");
        }

        AgentCheck {
            agent: agent_key,
            test_passed,
            response_shape_valid,
            result_success,
            latency_ms,
            warnings,
            errors: result.errors.unwrap_or_default(),
        }
    }
}

/// The required result shape: `success` bool, `outputs` object,
/// `artifacts` array.
fn shape_valid(result: &compass_core::AgentResult) -> bool {
    match serde_json::to_value(result) {
        Ok(value) => {
            value.get("success").is_some_and(serde_json::Value::is_boolean)
                && value.get("outputs").is_some_and(serde_json::Value::is_object)
                && value.get("artifacts").is_some_and(serde_json::Value::is_array)
        }
        Err(_) => false,
    }
}
