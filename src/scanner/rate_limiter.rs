//! Rate limiting for DNS queries.
//!
//! Provides token bucket rate limiting so a large scan does not flood the
//! resolver or the RBL operators' name servers.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// A shared queries-per-second limiter.
///
/// Clones share one bucket, so every lookup in a scan draws from the same
/// budget.
pub struct RateLimiter {
    limiter: Arc<GovLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` queries per second.
    ///
    /// Returns `None` for a rate of 0, meaning unlimited.
    pub fn new(rate: u32) -> Option<Self> {
        let rate = NonZeroU32::new(rate)?;
        let limiter = GovLimiter::direct(Quota::per_second(rate));

        Some(Self {
            limiter: Arc::new(limiter),
        })
    }

    /// Wait until a token is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

/// Wait on an optional limiter.
pub(crate) async fn throttle(limiter: Option<&RateLimiter>) {
    if let Some(limiter) = limiter {
        limiter.wait().await;
    }
}
