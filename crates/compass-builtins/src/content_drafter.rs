use async_trait::async_trait;
use compass_agent::Agent;
use compass_core::{AgentConfig, AgentResult, CompassResult};

const SLOTS: &[&str] = &["newsletter", "long-form", "short-form"];

/// Drafts outline-first content for the week's publishing slots.
pub struct ContentDrafterAgent {
    config: AgentConfig,
    drafted: Vec<String>,
}

/// Factory registered in the catalog.
pub fn factory(config: AgentConfig) -> Box<dyn Agent> {
    Box::new(ContentDrafterAgent {
        config,
        drafted: Vec::new(),
    })
}

#[async_trait]
impl Agent for ContentDrafterAgent {
    async fn run(&mut self) -> CompassResult<AgentResult> {
        let mut result = AgentResult::ok();
        for slot in SLOTS {
            let outline = format!(
                "# {slot} outline\n- hook\n- 3 supporting points\n- call to action ({})",
                self.config.phase
            );
            self.drafted.push((*slot).to_string());
            result = result
                .with_output(format!("outline:{slot}"), serde_json::json!(outline))
                .with_artifact(format!("drafts/{slot}.md"));
        }
        Ok(result.with_output("slot_count", serde_json::json!(SLOTS.len())))
    }

    async fn validate(&self) -> CompassResult<bool> {
        Ok(self.drafted.len() == SLOTS.len())
    }

    async fn teardown(&mut self) -> CompassResult<()> {
        self.drafted.clear();
        Ok(())
    }
}
