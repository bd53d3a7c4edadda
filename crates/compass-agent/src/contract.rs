use async_trait::async_trait;
use compass_core::{AgentResult, CompassResult};

/// The four-phase contract every executable unit of work implements.
///
/// Phases run strictly in order within one execution; there is no internal
/// parallelism inside a single agent's lifecycle. Any internal failure must
/// surface as an `Err` or a `success: false` result, never a silent no-op.
///
/// `setup`, `validate`, and `teardown` have no-op defaults so trivial
/// agents only implement `run`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Acquire resources needed by `run`.
    async fn setup(&mut self) -> CompassResult<()> {
        Ok(())
    }

    /// Produce this execution's [`AgentResult`].
    async fn run(&mut self) -> CompassResult<AgentResult>;

    /// Sanity check independent of the result's own `success` flag.
    async fn validate(&self) -> CompassResult<bool> {
        Ok(true)
    }

    /// Release resources on every exit path, success or failure.
    async fn teardown(&mut self) -> CompassResult<()> {
        Ok(())
    }
}
