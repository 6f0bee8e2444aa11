//! Request spacing for paginated contract queries.
//!
//! The LCD endpoints behind the overseer are public infrastructure, so every
//! paginated sweep waits between consecutive requests. The spacing policy sits
//! behind the [`RateLimiter`] trait so aggregation code never depends on how the
//! wait is computed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Policy consulted before each follow-up request of a paginated sweep
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait before issuing the next request.
    ///
    /// `completed` is the number of requests already answered in the current
    /// sweep and is always at least 1.
    async fn wait(&self, completed: usize);
}

/// Fixed-delay spacing: one delay after the first page, another between
/// every following page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedDelay {
    /// Delay between the first and second request
    pub initial: Duration,
    /// Delay between every later pair of requests
    pub between: Duration,
}

impl FixedDelay {
    /// Create a policy with distinct initial and between-page delays
    pub fn new(initial: Duration, between: Duration) -> Self {
        Self { initial, between }
    }

    /// Create a policy using the same delay everywhere
    pub fn uniform(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    /// Policy without any spacing
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// Delay applied after `completed` answered requests
    pub fn delay_for(&self, completed: usize) -> Duration {
        if completed <= 1 {
            self.initial
        } else {
            self.between
        }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(500))
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn wait(&self, completed: usize) {
        let delay = self.delay_for(completed);
        if delay.is_zero() {
            return;
        }
        debug!("Throttling next page request by {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
