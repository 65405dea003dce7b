//! Rate limiting behind a trait seam.
//!
//! The limiter is injected wherever throttling applies, keyed by caller
//! identity (user id or client IP). [`TokenBucketLimiter`] is the default
//! in-process implementation; a deployment spanning several instances can
//! provide the same trait over a shared cache without touching call sites.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CoreError;

/// Admission control keyed by caller identity.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Consume one unit of quota for `key`, or fail with
    /// [`CoreError::RateLimited`] when the quota is exhausted.
    async fn check(&self, key: &str) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Classic token bucket: `capacity` tokens, refilled continuously at
/// `refill_per_sec`.
pub struct TokenBucketLimiter {
    capacity: f64,
    refill_per_sec: f64,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl TokenBucketLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_sec,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Admission check against an explicit clock. Factored out so tests can
    /// drive time instead of sleeping.
    async fn check_at(&self, key: &str, now: Instant) -> Result<(), CoreError> {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens =
            (bucket.tokens + elapsed.as_secs_f64() * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(CoreError::RateLimited(format!(
                "Too many requests for '{key}', try again later"
            )))
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn check(&self, key: &str) -> Result<(), CoreError> {
        self.check_at(key, Instant::now()).await
    }
}

/// A limiter that admits everything. Used where throttling is disabled
/// (tests, internal callers).
pub struct NoopLimiter;

#[async_trait]
impl RateLimiter for NoopLimiter {
    async fn check(&self, _key: &str) -> Result<(), CoreError> {
        Ok(())
    }
}
