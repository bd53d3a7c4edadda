//! The concrete catalog agents shipped with Compass.
//!
//! Each agent is a thin deterministic generator — the interesting
//! engineering lives in the lifecycle, queue, and worker crates, and
//! these implementations exist to exercise that machinery end-to-end.
//! [`default_registry`] is the single catalog consumed by the
//! orchestrator, the worker pool, and the QA harness.

/// Calendar load optimization.
pub mod calendar_optimizer;
/// Content draft generation.
pub mod content_drafter;
/// Income/savings allocation planning.
pub mod financial_allocator;
/// Daily journaling prompts.
pub mod journaling;
/// Market niche discovery.
pub mod niche_discovery;

use compass_agent::Agent;
use compass_core::{AgentConfig, Phase};
use compass_registry::{AgentKind, AgentMeta, AgentRegistry, RegistryEntry};

fn entry(
    key: &str,
    kind: AgentKind,
    description: &str,
    phase: Phase,
    priority: i32,
    factory: fn(AgentConfig) -> Box<dyn Agent>,
) -> RegistryEntry {
    RegistryEntry {
        meta: AgentMeta {
            key: key.to_string(),
            kind,
            description: description.to_string(),
            phase,
            priority,
        },
        aliases: vec![format!("compass.{key}")],
        factory,
    }
}

/// Register every builtin agent into the given registry.
///
/// Each agent is exposed under its short key and a `compass.`-namespaced
/// alias; the alias resolves to the same entry and is never a distinct
/// agent.
pub fn register_builtins(registry: &mut AgentRegistry) {
    registry.register(entry(
        "journaling",
        AgentKind::Journaling,
        "Generates daily reflection prompts and journal scaffolding",
        Phase::Foundation,
        3,
        journaling::factory,
    ));
    registry.register(entry(
        "niche-discovery",
        AgentKind::NicheDiscovery,
        "Scores candidate market niches against client strengths",
        Phase::Foundation,
        2,
        niche_discovery::factory,
    ));
    registry.register(entry(
        "calendar-optimizer",
        AgentKind::CalendarOptimizer,
        "Rebalances the weekly calendar around deep-work blocks",
        Phase::Momentum,
        5,
        calendar_optimizer::factory,
    ));
    registry.register(entry(
        "financial-allocator",
        AgentKind::FinancialAllocator,
        "Splits monthly income across allocation buckets",
        Phase::Momentum,
        4,
        financial_allocator::factory,
    ));
    registry.register(entry(
        "content-drafter",
        AgentKind::ContentDrafter,
        "Drafts outline-first content for the week's publishing slots",
        Phase::Mastery,
        1,
        content_drafter::factory,
    ));
}

/// Build the full default catalog.
pub fn default_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    register_builtins(&mut registry);
    registry
}
