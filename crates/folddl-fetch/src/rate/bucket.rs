use std::num::NonZeroU64;

use tokio::time::{Duration, Instant};

/// Token bucket algorithm implementation for bandwidth limiting.
///
/// Capacity and refill rate are both the configured bytes per second, so the
/// bucket never holds more than one second of budget. It starts full.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    rate: u64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(bytes_per_second: NonZeroU64) -> Self {
        Self::new_at(bytes_per_second, Instant::now())
    }

    pub fn new_at(bytes_per_second: NonZeroU64, now: Instant) -> Self {
        let rate = bytes_per_second.get();
        Self {
            capacity: rate,
            rate,
            tokens: rate as f64,
            last_refill: now,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Whole tokens available at `now`.
    pub fn available(&mut self, now: Instant) -> u64 {
        self.refill(now);
        self.tokens as u64
    }

    /// Debit `n` tokens, or return how long until `n` tokens will be available.
    ///
    /// Requests above capacity are clamped to it; callers must not read more
    /// than [`capacity`](Self::capacity) bytes against a single grant.
    pub fn try_take(&mut self, n: u64, now: Instant) -> Result<(), Duration> {
        let n = n.min(self.capacity) as f64;
        self.refill(now);

        if self.tokens >= n {
            self.tokens -= n;
            Ok(())
        } else {
            let missing = n - self.tokens;
            Err(Duration::from_secs_f64(missing / self.rate as f64))
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate as f64).min(self.capacity as f64);
        self.last_refill = now;
    }
}
