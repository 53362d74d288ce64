use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Token-bucket pacing for outbound Telegram/API calls.
///
/// A burst of fresh offers after a quiet night must not trip the Bot API
/// flood limits, so every send first takes a token from a per-minute bucket.
/// A limit of 0 disables pacing.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    requests_per_min: u64,
    // bucket is modeled by the time of last refill and the current tokens
    tokens: Mutex<(f64, Instant)>,
}

impl RateLimiter {
    pub fn new(requests_per_min: u64) -> Self {
        let capacity = requests_per_min as f64;
        Self {
            inner: Arc::new(Inner {
                requests_per_min,
                tokens: Mutex::new((capacity, Instant::now())),
            }),
        }
    }

    /// Acquire permission for one outbound call. Awaits as needed.
    pub async fn acquire(&self) {
        if self.inner.requests_per_min == 0 {
            return;
        }
        let capacity = self.inner.requests_per_min as f64;
        let refill_rate = capacity / 60.0; // tokens per second
        loop {
            let mut guard = self.inner.tokens.lock().await;
            let (ref mut tokens, ref mut last) = *guard;
            let now = Instant::now();
            let elapsed = now.duration_since(*last).as_secs_f64();
            *tokens = (*tokens + elapsed * refill_rate).min(capacity);
            *last = now;
            if *tokens >= 1.0 {
                *tokens -= 1.0;
                return;
            }
            // compute needed time to get enough tokens
            let need = 1.0 - *tokens;
            let secs = need / refill_rate;
            drop(guard);
            tokio::time::sleep(Duration::from_secs_f64(secs.max(0.001))).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_burst_up_to_capacity() {
        let limiter = RateLimiter::new(5);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn sixth_call_waits_for_refill() {
        let limiter = RateLimiter::new(60); // one token per second
        for _ in 0..60 {
            limiter.acquire().await;
        }
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(900));
    }
}
