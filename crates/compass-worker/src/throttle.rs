use tokio::sync::Mutex;
use tokio::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket capping how many jobs start per minute.
///
/// The bucket starts full (one minute's quota of burst) and refills
/// continuously. Uses the tokio clock so tests can pause and advance
/// time.
pub struct JobThrottle {
    max_tokens: f64,
    refill_rate: f64, // tokens per second
    bucket: Mutex<Bucket>,
}

impl JobThrottle {
    /// Create a throttle allowing `jobs_per_minute` job starts per minute.
    pub fn new(jobs_per_minute: f64) -> Self {
        let max_tokens = jobs_per_minute.max(1.0);
        Self {
            max_tokens,
            refill_rate: jobs_per_minute.max(0.001) / 60.0,
            bucket: Mutex::new(Bucket {
                tokens: max_tokens,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Try to consume one token. Returns `false` when rate limited.
    pub async fn try_acquire(&self) -> bool {
        self.refill_and_take(false).await.is_none()
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            match self.refill_and_take(true).await {
                None => return,
                Some(wait_secs) => {
                    tokio::time::sleep(std::time::Duration::from_secs_f64(wait_secs)).await;
                }
            }
        }
    }

    /// Refill, then take a token. Returns `None` on success, or the
    /// seconds until the next token when `want_hint` is set.
    async fn refill_and_take(&self, want_hint: bool) -> Option<f64> {
        let mut bucket = self.bucket.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill);
        bucket.tokens =
            (bucket.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return None;
        }
        if want_hint {
            Some((1.0 - bucket.tokens) / self.refill_rate)
        } else {
            Some(0.0)
        }
    }
}
