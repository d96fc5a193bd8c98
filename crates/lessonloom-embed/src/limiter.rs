//! Sliding-window rate limiting keyed by caller identity.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::warn;

use lessonloom_core::{Error, Result};

/// Per-caller sliding-window request counter.
///
/// Construct one limiter at startup and share it by reference across request
/// paths; the mutex serializes checks for the same caller so counts stay
/// exact under concurrency. Timestamps outside the window are pruned on
/// every check, which bounds memory per caller at `limit` entries; callers
/// whose whole window has elapsed are dropped from the map entirely.
pub struct RateLimiter {
    inner: Mutex<HashMap<String, Vec<Instant>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            limit,
            window,
        }
    }

    /// Record one request for `caller_id`, or reject it if the caller has
    /// already used its quota within the current window.
    pub fn check(&self, caller_id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        // Timestamps are pushed in order, so the last one is the newest;
        // callers with no activity inside the window are dead entries.
        inner.retain(|_, stamps| {
            stamps
                .last()
                .is_some_and(|t| t.elapsed() < self.window)
        });
        let stamps = inner.entry(caller_id.to_string()).or_default();
        stamps.retain(|t| t.elapsed() < self.window);

        if stamps.len() >= self.limit {
            warn!(caller_id, limit = self.limit, "rate limit exceeded");
            return Err(Error::RateLimited {
                caller_id: caller_id.to_string(),
                limit: self.limit,
                window_ms: self.window.as_millis() as u64,
            });
        }

        stamps.push(Instant::now());
        Ok(())
    }

    /// Requests currently counted against `caller_id`.
    pub fn current_count(&self, caller_id: &str) -> usize {
        let mut inner = self.inner.lock();
        let count = match inner.get_mut(caller_id) {
            Some(stamps) => {
                stamps.retain(|t| t.elapsed() < self.window);
                stamps.len()
            }
            None => return 0,
        };
        if count == 0 {
            inner.remove(caller_id);
        }
        count
    }

    /// Number of caller ids currently tracked.
    pub fn tracked_callers(&self) -> usize {
        self.inner.lock().len()
    }
}
