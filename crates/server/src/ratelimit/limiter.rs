use dashmap::DashMap;
use tokio::time::Instant;

use super::config::{RateLimitConfig, RateLimitTier, RouteClass};

/// Bucket identifier used when the client address is unknown.
pub const ANONYMOUS_BUCKET: &str = "_anonymous";

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// The configured limit for this tier.
    pub limit: u64,
    /// Approximate remaining requests in the current window.
    pub remaining: u64,
    /// Seconds until the current window resets.
    pub reset_after: u64,
}

/// Error returned when a rate limit is exceeded.
#[derive(Debug)]
pub struct RateLimitExceeded {
    /// Seconds until the caller can retry.
    pub retry_after: u64,
    /// The configured limit.
    pub limit: u64,
}

/// Rolling counters for one (client, route-class) bucket.
#[derive(Debug)]
struct Window {
    start_secs: u64,
    current: u64,
    previous: u64,
}

/// Process-wide rate limiter using the sliding window approximation
/// algorithm (weighted carry-over from the previous window, ~2% error
/// margin).
///
/// Counters live in a [`DashMap`] keyed by `(route class, client identity)`
/// and are rolled lazily on access, so there is no background sweep. Time is
/// measured against [`tokio::time::Instant`], which makes window expiry
/// deterministic under `tokio::test(start_paused = true)`.
#[derive(Debug)]
pub struct RateLimiter {
    counters: DashMap<String, Window>,
    config: RateLimitConfig,
    epoch: Instant,
}

impl RateLimiter {
    /// Create a new limiter with the given per-route tiers.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            counters: DashMap::new(),
            config,
            epoch: Instant::now(),
        }
    }

    /// Check and record a request from `client` against the tier for
    /// `class`.
    ///
    /// Returns `Ok` if allowed, `Err(RateLimitExceeded)` if blocked. The
    /// check-and-increment runs under the counter's shard lock, so
    /// concurrent requests for one bucket cannot both sneak under the limit.
    pub fn check(&self, class: RouteClass, client: &str) -> Result<RateLimitResult, RateLimitExceeded> {
        let tier = self.config.tier_for(class);
        let bucket = format!("{}:{client}", class.as_str());
        self.check_bucket(&bucket, tier)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn check_bucket(
        &self,
        bucket: &str,
        tier: &RateLimitTier,
    ) -> Result<RateLimitResult, RateLimitExceeded> {
        let now = self.epoch.elapsed().as_secs();
        let window = tier.window_seconds.max(1);
        let limit = tier.requests_per_window;

        let current_start = (now / window) * window;
        let elapsed = now - current_start;

        let mut entry = self.counters.entry(bucket.to_owned()).or_insert(Window {
            start_secs: current_start,
            current: 0,
            previous: 0,
        });

        // Lazy roll-over: shift counts when the window boundary has passed.
        if entry.start_secs != current_start {
            entry.previous = if current_start - entry.start_secs == window {
                entry.current
            } else {
                // More than one full window idle: nothing carries over.
                0
            };
            entry.current = 0;
            entry.start_secs = current_start;
        }

        let weight = (window - elapsed) as f64 / window as f64;
        let effective = (entry.previous as f64 * weight) as u64 + entry.current;

        if effective >= limit {
            let reset_after = window - elapsed;
            return Err(RateLimitExceeded {
                retry_after: reset_after.max(1),
                limit,
            });
        }

        entry.current += 1;
        Ok(RateLimitResult {
            limit,
            remaining: limit.saturating_sub(effective + 1),
            reset_after: window - elapsed,
        })
    }
}
