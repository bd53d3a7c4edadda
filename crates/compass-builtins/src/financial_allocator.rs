use async_trait::async_trait;
use compass_agent::Agent;
use compass_core::{AgentConfig, AgentResult, CompassResult, Phase};

/// Splits monthly income across allocation buckets.
pub struct FinancialAllocatorAgent {
    config: AgentConfig,
}

/// Factory registered in the catalog.
pub fn factory(config: AgentConfig) -> Box<dyn Agent> {
    Box::new(FinancialAllocatorAgent { config })
}

impl FinancialAllocatorAgent {
    /// Percentage split per lifecycle tier: (essentials, growth, reserves).
    fn split(phase: Phase) -> (u32, u32, u32) {
        match phase {
            Phase::Foundation => (70, 10, 20),
            Phase::Momentum => (60, 20, 20),
            Phase::Mastery => (50, 30, 20),
        }
    }
}

#[async_trait]
impl Agent for FinancialAllocatorAgent {
    async fn run(&mut self) -> CompassResult<AgentResult> {
        let (essentials, growth, reserves) = Self::split(self.config.phase);
        let result = AgentResult::ok()
            .with_output(
                "allocation",
                serde_json::json!({
                    "essentials_pct": essentials,
                    "growth_pct": growth,
                    "reserves_pct": reserves,
                }),
            )
            .with_output("phase", serde_json::json!(self.config.phase.to_string()))
            .with_artifact("finance/allocation-plan.csv");
        Ok(result)
    }

    async fn validate(&self) -> CompassResult<bool> {
        let (essentials, growth, reserves) = Self::split(self.config.phase);
        Ok(essentials + growth + reserves == 100)
    }
}
