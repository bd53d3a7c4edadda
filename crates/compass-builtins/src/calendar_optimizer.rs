use async_trait::async_trait;
use compass_agent::Agent;
use compass_core::{AgentConfig, AgentResult, CompassError, CompassResult, Phase};

/// One scheduled block in the weekly template.
#[derive(Debug, Clone)]
struct Block {
    day: &'static str,
    start_hour: u32,
    hours: u32,
    label: &'static str,
}

/// Rebalances the weekly calendar around protected deep-work blocks.
pub struct CalendarOptimizerAgent {
    config: AgentConfig,
    blocks: Vec<Block>,
}

/// Factory registered in the catalog.
pub fn factory(config: AgentConfig) -> Box<dyn Agent> {
    Box::new(CalendarOptimizerAgent {
        config,
        blocks: Vec::new(),
    })
}

#[async_trait]
impl Agent for CalendarOptimizerAgent {
    async fn setup(&mut self) -> CompassResult<()> {
        // Deep-work allotment grows with the lifecycle tier.
        let deep_hours = match self.config.phase {
            Phase::Foundation => 1,
            Phase::Momentum => 2,
            Phase::Mastery => 3,
        };
        self.blocks = vec![
            Block {
                day: "monday",
                start_hour: 9,
                hours: deep_hours,
                label: "deep-work",
            },
            Block {
                day: "wednesday",
                start_hour: 9,
                hours: deep_hours,
                label: "deep-work",
            },
            Block {
                day: "friday",
                start_hour: 14,
                hours: 1,
                label: "weekly-review",
            },
        ];
        Ok(())
    }

    async fn run(&mut self) -> CompassResult<AgentResult> {
        if self.blocks.is_empty() {
            return Err(CompassError::Run("no calendar template prepared".into()));
        }
        let total_hours: u32 = self.blocks.iter().map(|b| b.hours).sum();
        let schedule: Vec<serde_json::Value> = self
            .blocks
            .iter()
            .map(|b| {
                serde_json::json!({
                    "day": b.day,
                    "start": format!("{:02}:00", b.start_hour),
                    "hours": b.hours,
                    "label": b.label,
                })
            })
            .collect();

        let result = AgentResult::ok()
            .with_output("schedule", serde_json::json!(schedule))
            .with_output("protected_hours", serde_json::json!(total_hours))
            .with_artifact("calendar/week-template.ics");
        Ok(result)
    }

    async fn validate(&self) -> CompassResult<bool> {
        // No two blocks may collide on the same day and hour.
        let mut seen = std::collections::HashSet::new();
        Ok(self.blocks.iter().all(|b| seen.insert((b.day, b.start_hour))))
    }

    async fn teardown(&mut self) -> CompassResult<()> {
        self.blocks.clear();
        Ok(())
    }
}
