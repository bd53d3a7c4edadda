use async_trait::async_trait;
use compass_agent::Agent;
use compass_core::{AgentConfig, AgentResult, CompassResult};

const CANDIDATES: &[(&str, u32)] = &[
    ("executive-coaching", 82),
    ("founder-productivity", 76),
    ("career-transitions", 71),
    ("creator-monetization", 64),
    ("team-rituals", 58),
];

/// Scores candidate niches and shortlists the strongest ones.
pub struct NicheDiscoveryAgent {
    config: AgentConfig,
}

/// Factory registered in the catalog.
pub fn factory(config: AgentConfig) -> Box<dyn Agent> {
    Box::new(NicheDiscoveryAgent { config })
}

#[async_trait]
impl Agent for NicheDiscoveryAgent {
    async fn run(&mut self) -> CompassResult<AgentResult> {
        // Higher-priority dispatches get a tighter shortlist.
        let cutoff = if self.config.priority >= 5 { 70 } else { 60 };
        let shortlist: Vec<serde_json::Value> = CANDIDATES
            .iter()
            .filter(|(_, score)| *score >= cutoff)
            .map(|(niche, score)| serde_json::json!({ "niche": niche, "score": score }))
            .collect();

        let result = AgentResult::ok()
            .with_output("cutoff", serde_json::json!(cutoff))
            .with_output("shortlist", serde_json::json!(shortlist))
            .with_artifact("niche/shortlist.json");
        Ok(result)
    }

    async fn validate(&self) -> CompassResult<bool> {
        // The candidate bank always yields at least one niche per cutoff.
        Ok(!CANDIDATES.is_empty())
    }
}
