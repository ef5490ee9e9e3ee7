//! Rate-limited FIFO work queue.
//!
//! Items are processed strictly one at a time, with a fixed pause between
//! the end of one request and the start of the next. Used for the
//! per-contract price lookups, which hit a public API without a key.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

#[derive(Debug)]
pub struct RateLimitedQueue<T> {
    items: VecDeque<T>,
    delay: Duration,
}

impl<T: Clone> RateLimitedQueue<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            delay,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run `task` over every queued item in insertion order.
    ///
    /// Never more than one task is in flight. Returns each item paired with
    /// its result.
    pub async fn drain<R, F, Fut>(mut self, mut task: F) -> Vec<(T, R)>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = self.items.len();
        let mut results = Vec::with_capacity(total);
        let mut first = true;

        while let Some(item) = self.items.pop_front() {
            if !first {
                tokio::time::sleep(self.delay).await;
            }
            first = false;
            debug!("throttled request {}/{total}", results.len() + 1);
            let out = task(item.clone()).await;
            results.push((item, out));
        }

        results
    }
}

impl<T: Clone> Extend<T> for RateLimitedQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
