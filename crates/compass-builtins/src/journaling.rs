use async_trait::async_trait;
use compass_agent::Agent;
use compass_core::{AgentConfig, AgentResult, CompassError, CompassResult, Phase};

/// Generates the day's reflection prompts and a journal scaffold.
pub struct JournalingAgent {
    config: AgentConfig,
    prompts: Vec<String>,
}

/// Factory registered in the catalog.
pub fn factory(config: AgentConfig) -> Box<dyn Agent> {
    Box::new(JournalingAgent {
        config,
        prompts: Vec::new(),
    })
}

impl JournalingAgent {
    fn prompt_bank(phase: Phase) -> &'static [&'static str] {
        match phase {
            Phase::Foundation => &[
                "What is one habit you kept today, and what made it possible?",
                "Where did your energy go that you did not plan for?",
                "Name one thing you will do before 10am tomorrow.",
            ],
            Phase::Momentum => &[
                "Which commitment moved forward today, and by how much?",
                "What did you say no to this week?",
                "What would make next week 10% lighter?",
            ],
            Phase::Mastery => &[
                "What did you teach someone else today?",
                "Which system ran without you this week?",
                "What are you still doing that someone else should own?",
            ],
        }
    }
}

#[async_trait]
impl Agent for JournalingAgent {
    async fn setup(&mut self) -> CompassResult<()> {
        if self.config.name.trim().is_empty() {
            return Err(CompassError::Setup("journaling config has no name".into()));
        }
        self.prompts = Self::prompt_bank(self.config.phase)
            .iter()
            .map(|p| (*p).to_string())
            .collect();
        Ok(())
    }

    async fn run(&mut self) -> CompassResult<AgentResult> {
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let result = AgentResult::ok()
            .with_output("date", serde_json::json!(date))
            .with_output("phase", serde_json::json!(self.config.phase.to_string()))
            .with_output("prompts", serde_json::json!(self.prompts))
            .with_artifact(format!("journal/{date}.md"));
        Ok(result)
    }

    async fn validate(&self) -> CompassResult<bool> {
        Ok(self.prompts.len() == 3)
    }

    async fn teardown(&mut self) -> CompassResult<()> {
        self.prompts.clear();
        Ok(())
    }
}
