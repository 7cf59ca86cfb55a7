use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Windows to retain before sweeping expired entries out of the map.
const SWEEP_THRESHOLD: usize = 1024;

struct WindowState {
    started_at: Instant,
    count: u32,
}

/// Fixed-window request limiter keyed by client address.
///
/// Protects the external directory quota behind the quality cache: a client
/// hammering the ranking endpoint gets 429s instead of burning search calls.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, WindowState>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request against `client`'s current window. Returns `false`
    /// when the window's budget is spent.
    pub async fn try_acquire(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let state = windows
            .entry(client.to_string())
            .or_insert(WindowState {
                started_at: now,
                count: 0,
            });
        if now.duration_since(state.started_at) >= self.window {
            state.started_at = now;
            state.count = 0;
        }
        if state.count >= self.max_requests {
            return false;
        }
        state.count += 1;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, state| now.duration_since(state.started_at) < self.window);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_up_to_max_then_rejects() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);

        for _ in 0..3 {
            assert!(limiter.try_acquire("10.0.0.1").await);
        }
        assert!(!limiter.try_acquire("10.0.0.1").await);
    }

    #[tokio::test]
    async fn test_clients_have_independent_windows() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);

        assert!(limiter.try_acquire("10.0.0.1").await);
        assert!(!limiter.try_acquire("10.0.0.1").await);
        assert!(limiter.try_acquire("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::new(Duration::from_millis(50), 1);

        assert!(limiter.try_acquire("10.0.0.1").await);
        assert!(!limiter.try_acquire("10.0.0.1").await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.try_acquire("10.0.0.1").await);
    }
}
