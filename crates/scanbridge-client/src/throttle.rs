//! Request pacing for detail fetches
//!
//! The platform rate-limits the per-vulnerability detail endpoint far more
//! aggressively than the rest of the API. `Throttle` paces callers with a
//! sliding window on top of an in-flight cap. It is owned and injected by
//! whoever drives the run; nothing in this crate holds a global limiter.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Requests allowed per window on the detail endpoint
pub const DETAIL_REQUESTS_PER_WINDOW: usize = 3;

/// Sliding window length for the detail endpoint
pub const DETAIL_WINDOW: Duration = Duration::from_secs(2);

/// In-flight cap for the detail endpoint
pub const DETAIL_MAX_IN_FLIGHT: usize = 1;

/// Sliding-window rate limiter with an in-flight cap
pub struct Throttle {
    permits: Arc<Semaphore>,
    window: Mutex<VecDeque<Instant>>,
    max_per_window: usize,
    window_len: Duration,
}

/// Permission to run one request; releases the in-flight slot on drop
pub struct ThrottlePermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl Throttle {
    /// Limiter allowing `max_per_window` starts per `window_len`, with at
    /// most `max_in_flight` permits held at any moment
    pub fn new(max_per_window: usize, window_len: Duration, max_in_flight: usize) -> Self {
        Throttle {
            permits: Arc::new(Semaphore::new(max_in_flight)),
            window: Mutex::new(VecDeque::with_capacity(max_per_window)),
            max_per_window,
            window_len,
        }
    }

    /// Limiter tuned for the platform's detail endpoint
    pub fn for_detail_fetches() -> Self {
        Throttle::new(
            DETAIL_REQUESTS_PER_WINDOW,
            DETAIL_WINDOW,
            DETAIL_MAX_IN_FLIGHT,
        )
    }

    /// Wait until a request may start
    ///
    /// The returned permit must be held for the duration of the request so
    /// the in-flight cap is honored.
    pub async fn acquire(&self) -> ThrottlePermit {
        let permit = Arc::clone(&self.permits).acquire_owned().await.ok();

        loop {
            let now = Instant::now();
            let mut window = self.window.lock().await;

            while window
                .front()
                .map(|start| now.duration_since(*start) >= self.window_len)
                .unwrap_or(false)
            {
                window.pop_front();
            }

            if window.len() < self.max_per_window {
                window.push_back(now);
                return ThrottlePermit { _permit: permit };
            }

            // Window is full: sleep until the oldest entry ages out, then
            // re-check under the lock.
            let oldest = match window.front() {
                Some(start) => *start,
                None => now,
            };
            drop(window);
            tokio::time::sleep_until(oldest + self.window_len).await;
        }
    }
}
