use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use tracing::warn;

use crate::error::AppError;

// Stale windows are pruned once the map grows past this.
const PRUNE_THRESHOLD: usize = 1024;

const GLOBAL_KEY: &str = "*";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

struct Windows {
    by_key: HashMap<String, Window>,
    last_pruned: Instant,
}

/// Fixed-window limiter: `limit` permits per `window`, no queueing.
/// Partitioned by caller key when `per_key` is set, otherwise one window
/// for the whole process.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    per_key: bool,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration, per_key: bool) -> Self {
        Self {
            limit,
            window,
            per_key,
            windows: Mutex::new(Windows {
                by_key: HashMap::new(),
                last_pruned: Instant::now(),
            }),
        }
    }

    pub fn per_minute(limit: u32, per_key: bool) -> Self {
        Self::new(limit, Duration::from_secs(60), per_key)
    }

    /// Take one permit for `key`. On rejection returns the wait until the
    /// window resets; rejected calls consume nothing.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let key = if self.per_key { key } else { GLOBAL_KEY };

        let mut windows = self.windows.lock();
        // at most one sweep per window length
        if windows.by_key.len() > PRUNE_THRESHOLD
            && now.duration_since(windows.last_pruned) >= self.window
        {
            let span = self.window;
            windows
                .by_key
                .retain(|_, w| now.duration_since(w.started) < span);
            windows.last_pruned = now;
        }

        let window = windows.by_key.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.limit {
            return Err(self
                .window
                .saturating_sub(now.duration_since(window.started)));
        }

        window.count += 1;
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.windows.lock().by_key.len()
    }
}

/// Whole seconds until the window resets, rounded up so a client that
/// waits exactly this long is let through.
pub fn retry_after_secs(wait: Duration) -> u64 {
    (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1)
}

/// Rejects with 429 once the caller's window is spent.
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            warn!("Rate limit hit for {}", key);
            AppError::RateLimited {
                retry_after_secs: retry_after_secs(wait),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_once_the_window_is_spent() {
        let limiter = RateLimiter::per_minute(3, false);
        for _ in 0..3 {
            assert!(limiter.check("a").is_ok());
        }
        let wait = limiter.check("a").unwrap_err();
        assert!(wait <= Duration::from_secs(60));
        assert!(wait > Duration::from_secs(50));
    }

    #[test]
    fn without_partitioning_all_callers_share_one_window() {
        let limiter = RateLimiter::per_minute(2, false);
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.2").is_ok());
        assert!(limiter.check("10.0.0.3").is_err());
    }

    #[test]
    fn partitioning_isolates_callers() {
        let limiter = RateLimiter::per_minute(2, true);
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn rejections_do_not_extend_the_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(40), false);
        assert!(limiter.check("a").is_ok());
        std::thread::sleep(Duration::from_millis(25));
        assert!(limiter.check("a").is_err());
        std::thread::sleep(Duration::from_millis(25));
        assert!(limiter.check("a").is_ok());
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20), true);
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_err());
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("a").is_ok());
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(59_999)), 60);
        assert_eq!(retry_after_secs(Duration::from_secs(60)), 60);
        assert_eq!(retry_after_secs(Duration::from_millis(1)), 1);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn fresh_window_reports_a_full_minute() {
        let limiter = RateLimiter::per_minute(1, true);
        assert!(limiter.check("a").is_ok());
        let wait = limiter.check("a").unwrap_err();
        assert_eq!(retry_after_secs(wait), 60);
    }

    #[test]
    fn stale_windows_are_swept_once_per_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50), true);
        for i in 0..(PRUNE_THRESHOLD + 10) {
            assert!(limiter.check(&format!("10.0.{}.{}", i / 256, i % 256)).is_ok());
        }
        // over the threshold but the last sweep is too recent
        assert!(limiter.check("late").is_ok());
        assert_eq!(limiter.tracked(), PRUNE_THRESHOLD + 11);

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.check("after").is_ok());
        assert_eq!(limiter.tracked(), 1);
    }
}
