//! Exhaustive retrieval of paginated contract lists.
//!
//! Contract list queries accept a `limit` and a `start_after` cursor and never
//! report a total count. A page shorter than the limit is the only signal that
//! the list is exhausted; a full page always costs one more request, even when
//! it happens to be the last one.

use crate::error::{OverseerError, Result};
use crate::rate_limit::{FixedDelay, RateLimiter};
use std::future::Future;
use tracing::debug;

/// Page size and request spacing of one paginated sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination<L = FixedDelay> {
    /// Items requested per page
    pub page_size: u32,
    /// Spacing between consecutive requests
    pub limiter: L,
}

impl<L: RateLimiter> Pagination<L> {
    /// Create a pagination policy
    pub fn new(page_size: u32, limiter: L) -> Self {
        Self { page_size, limiter }
    }

    /// Fetch pages until a short page and return all items in order.
    ///
    /// `fetch` receives the page size and the cursor of the last item of the
    /// previous page (`None` for the first request). `cursor_of` extracts
    /// that cursor from an item. The first error aborts the sweep.
    pub async fn collect<T, F, Fut, C>(&self, mut fetch: F, cursor_of: C) -> Result<Vec<T>>
    where
        F: FnMut(u32, Option<String>) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
        C: Fn(&T) -> &str,
    {
        if self.page_size == 0 {
            return Err(OverseerError::ConfigError(
                "Page size must be greater than 0".to_string(),
            ));
        }

        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut completed = 0usize;

        loop {
            if completed > 0 {
                self.limiter.wait(completed).await;
            }

            let page = fetch(self.page_size, cursor.take()).await?;
            completed += 1;

            let full = page.len() >= self.page_size as usize;
            if full {
                cursor = page.last().map(|item| cursor_of(item).to_string());
            }
            debug!(
                "Page {} returned {} items (limit {}), next cursor: {:?}",
                completed,
                page.len(),
                self.page_size,
                cursor
            );
            items.extend(page);

            if !full {
                break;
            }
        }

        debug!("Collected {} items in {} requests", items.len(), completed);
        Ok(items)
    }
}
