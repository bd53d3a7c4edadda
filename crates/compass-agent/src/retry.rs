use compass_core::{CompassError, CompassResult};
use rand::Rng;
use std::future::Future;
use tracing::warn;

/// Default maximum attempts for [`retry`].
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
/// Default base backoff delay for [`retry`], in milliseconds.
pub const DEFAULT_RETRY_BASE_MS: u64 = 1_000;

/// Maximum random jitter added to each backoff delay, in milliseconds.
const MAX_JITTER_MS: u64 = 1_000;

/// Call `op` up to `max_attempts` times with exponential backoff.
///
/// After a failed attempt `n` (1-based) the caller sleeps
/// `base_delay_ms * 2^(n-1)` plus up to [`MAX_JITTER_MS`] of random jitter
/// before trying again. Once attempts are exhausted the last failure is
/// folded into [`CompassError::RetryExhausted`].
///
/// Available to any agent that wraps a flaky external call; the lifecycle
/// envelope never applies it to `run` automatically.
pub async fn retry<T, F, Fut>(mut op: F, max_attempts: u32, base_delay_ms: u64) -> CompassResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CompassResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last: Option<CompassError> = None;

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < max_attempts {
                    let jitter = rand::thread_rng().gen_range(0..=MAX_JITTER_MS);
                    let delay = base_delay_ms
                        .saturating_mul(2u64.saturating_pow(attempt - 1))
                        .saturating_add(jitter);
                    warn!(attempt, delay_ms = delay, error = %e, "Attempt failed, backing off");
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                }
                last = Some(e);
            }
        }
    }

    Err(CompassError::RetryExhausted {
        attempts: max_attempts,
        last: last.map(|e| e.to_string()).unwrap_or_default(),
    })
}
