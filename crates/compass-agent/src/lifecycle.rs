use crate::contract::Agent;
use crate::telemetry::TelemetryReporter;
use compass_core::{AgentConfig, AgentResult, CompassError};
use compass_store::{readiness_key, TelemetryStore, READY_TTL};
use std::sync::Arc;
use tracing::{info, warn};

/// Drives the full lifecycle envelope around any [`Agent`].
///
/// State machine per execution:
/// `Idle → Setup → Running → Validating → {Ready | NotReady} → Teardown`.
/// The envelope owns every transition; agent code only supplies the four
/// phase bodies.
pub struct LifecycleRunner {
    store: Arc<dyn TelemetryStore>,
}

impl LifecycleRunner {
    /// Create a runner writing telemetry and readiness to `store`.
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self { store }
    }

    /// Execute the full lifecycle for one agent dispatch.
    ///
    /// Always returns a well-formed [`AgentResult`]: an error thrown by
    /// `setup`, `run`, or `validate` is caught here and degraded to
    /// `success: false` with the message captured, readiness is written
    /// (`true` only when `validate` passed *and* the result is a success),
    /// progress is closed out at 100 on every path, and `teardown` runs
    /// unconditionally.
    pub async fn execute(&self, agent: &mut dyn Agent, config: &AgentConfig) -> AgentResult {
        let reporter = TelemetryReporter::new(self.store.clone(), config.name.clone());

        reporter.report_progress(config.phase, 0, "setup").await;

        let (result, ready) = match Self::run_phases(agent).await {
            Ok((result, validated)) => {
                let ready = validated && result.success;
                (result, ready)
            }
            Err(e) => {
                warn!(agent = %config.name, error = %e, "Lifecycle phase failed");
                (AgentResult::failed(phase_message(&e)), false)
            }
        };

        self.write_readiness(&config.name, ready).await;

        let note = if result.success {
            "execution completed"
        } else {
            "execution failed"
        };
        reporter.report_progress(config.phase, 100, note).await;
        reporter
            .emit_event(
                "execution_finished",
                &serde_json::json!({ "success": result.success, "ready": ready }),
            )
            .await;

        if let Err(e) = agent.teardown().await {
            warn!(agent = %config.name, error = %e, "Teardown failed");
        }

        info!(agent = %config.name, success = result.success, ready, "Lifecycle finished");
        result
    }

    /// Steps 1–3 of the envelope; any error here is caught by `execute`.
    async fn run_phases(agent: &mut dyn Agent) -> Result<(AgentResult, bool), CompassError> {
        agent.setup().await?;
        let result = agent.run().await?;
        let validated = agent.validate().await?;
        Ok((result, validated))
    }

    /// Best-effort readiness flag write with the standard TTL.
    async fn write_readiness(&self, agent: &str, ready: bool) {
        let value = if ready { "true" } else { "false" };
        if let Err(e) = self
            .store
            .set(&readiness_key(agent), value, Some(READY_TTL))
            .await
        {
            warn!(agent, error = %e, "Failed to write readiness flag");
        }
    }
}

/// The message carried by a lifecycle-phase error, without the variant prefix.
fn phase_message(e: &CompassError) -> String {
    match e {
        CompassError::Setup(m) | CompassError::Run(m) => m.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use compass_core::{CompassResult, Phase};
    use compass_store::MemoryStore;

    /// Scriptable agent that records which phases ran.
    #[derive(Default)]
    struct ScriptedAgent {
        fail_setup: bool,
        fail_run: bool,
        run_success: bool,
        validate_ok: bool,
        fail_validate: bool,
        teardown_calls: u32,
    }

    impl ScriptedAgent {
        fn passing() -> Self {
            Self {
                run_success: true,
                validate_ok: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        async fn setup(&mut self) -> CompassResult<()> {
            if self.fail_setup {
                return Err(CompassError::Setup("no credentials".into()));
            }
            Ok(())
        }

        async fn run(&mut self) -> CompassResult<AgentResult> {
            if self.fail_run {
                return Err(CompassError::Run("boom".into()));
            }
            let result = if self.run_success {
                AgentResult::ok().with_output("summary", serde_json::json!("done"))
            } else {
                AgentResult::failed("business rule rejected")
            };
            Ok(result)
        }

        async fn validate(&self) -> CompassResult<bool> {
            if self.fail_validate {
                return Err(CompassError::Run("validator crashed".into()));
            }
            Ok(self.validate_ok)
        }

        async fn teardown(&mut self) -> CompassResult<()> {
            self.teardown_calls += 1;
            Ok(())
        }
    }

    fn config() -> AgentConfig {
        AgentConfig::new("journaling", Phase::Foundation, 3)
    }

    async fn readiness(store: &MemoryStore) -> Option<String> {
        store.get("agent:ready:journaling").await.unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_sets_ready_true() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent::passing();

        let result = runner.execute(&mut agent, &config()).await;

        assert!(result.success);
        assert_eq!(readiness(&store).await.as_deref(), Some("true"));
        assert_eq!(agent.teardown_calls, 1);
    }

    #[tokio::test]
    async fn test_run_error_degrades_to_failed_result() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent {
            fail_run: true,
            ..ScriptedAgent::passing()
        };

        let result = runner.execute(&mut agent, &config()).await;

        assert!(!result.success);
        assert_eq!(result.errors, Some(vec!["boom".to_string()]));
        assert!(result.outputs.is_empty());
        assert!(result.artifacts.is_empty());
        assert_eq!(readiness(&store).await.as_deref(), Some("false"));
        // Teardown still ran on the failure path.
        assert_eq!(agent.teardown_calls, 1);
    }

    #[tokio::test]
    async fn test_setup_error_is_contained() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent {
            fail_setup: true,
            ..ScriptedAgent::passing()
        };

        let result = runner.execute(&mut agent, &config()).await;

        assert!(!result.success);
        assert_eq!(result.errors, Some(vec!["no credentials".to_string()]));
        assert_eq!(readiness(&store).await.as_deref(), Some("false"));
        assert_eq!(agent.teardown_calls, 1);
    }

    #[tokio::test]
    async fn test_failed_validation_downgrades_readiness_only() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent {
            validate_ok: false,
            ..ScriptedAgent::passing()
        };

        let result = runner.execute(&mut agent, &config()).await;

        // The already-produced result keeps its success flag.
        assert!(result.success);
        assert_eq!(readiness(&store).await.as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_unsuccessful_result_is_not_ready() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent {
            run_success: false,
            validate_ok: true,
            ..ScriptedAgent::default()
        };

        let result = runner.execute(&mut agent, &config()).await;

        assert!(!result.success);
        assert_eq!(readiness(&store).await.as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_validate_error_caught_at_boundary() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent {
            fail_validate: true,
            ..ScriptedAgent::passing()
        };

        let result = runner.execute(&mut agent, &config()).await;

        assert!(!result.success);
        assert_eq!(readiness(&store).await.as_deref(), Some("false"));
        assert_eq!(agent.teardown_calls, 1);
    }

    #[tokio::test]
    async fn test_progress_closed_at_100_on_both_paths() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());

        let mut passing = ScriptedAgent::passing();
        runner.execute(&mut passing, &config()).await;
        let mut failing = ScriptedAgent {
            fail_run: true,
            ..ScriptedAgent::passing()
        };
        runner.execute(&mut failing, &config()).await;

        let tail = store.tail("progress:journaling", 10).await.unwrap();
        assert_eq!(tail.len(), 4);
        // Most recent first: failed execution closed at 100.
        assert_eq!(tail[0]["percent"], "100");
        assert_eq!(tail[0]["note"], "execution failed");
        assert_eq!(tail[1]["percent"], "0");
        assert_eq!(tail[2]["percent"], "100");
        assert_eq!(tail[2]["note"], "execution completed");
    }

    #[tokio::test]
    async fn test_execution_event_emitted() {
        let store = Arc::new(MemoryStore::new());
        let runner = LifecycleRunner::new(store.clone());
        let mut agent = ScriptedAgent::passing();

        runner.execute(&mut agent, &config()).await;

        let tail = store.tail("events:journaling", 1).await.unwrap();
        assert_eq!(tail[0]["kind"], "execution_finished");
    }
}
