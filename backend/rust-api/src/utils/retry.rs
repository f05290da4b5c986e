use std::future::Future;
use std::time::Duration;

/// Exponential backoff for startup plumbing such as waiting for the database.
/// Peer calls are never retried.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub attempts: u32,
    pub initial: Duration,
    pub ceiling: Duration,
    pub jitter: Duration,
}

impl Backoff {
    /// Roughly half a minute of patience for a database that is still booting.
    pub fn startup() -> Self {
        Self {
            attempts: 8,
            initial: Duration::from_millis(250),
            ceiling: Duration::from_secs(8),
            jitter: Duration::from_millis(200),
        }
    }

    /// Pause before retry number `retry` (0-based), jitter excluded.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial.saturating_mul(factor).min(self.ceiling)
    }

    fn jitter(&self) -> Duration {
        let max = self.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::random_range(0..=max))
    }
}

/// Runs `op` until it succeeds or the attempts run out, returning the last
/// error. At least one attempt is always made.
pub async fn retry<F, Fut, T, E>(backoff: Backoff, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = backoff.attempts.max(1);
    let mut failures = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if failures + 1 >= attempts => return Err(err),
            Err(_) => {
                tokio::time::sleep(backoff.delay(failures) + backoff.jitter()).await;
                failures += 1;
            }
        }
    }
}
