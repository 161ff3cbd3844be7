//! Best-effort request throttling.
//!
//! Fixed-window counters held in process memory: single-process,
//! ephemeral, and deliberately not a guaranteed defense. Each sensitive
//! route group gets its own injected limiter instance, so limits and
//! windows are explicit at wiring time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::app::errors::ApiError;

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<String, Window>>,
}

struct Window {
    count: u32,
    started_at: Instant,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `key`; `false` once the window's budget is spent.
    pub fn check(&self, key: &str) -> bool {
        let Ok(mut hits) = self.hits.lock() else {
            // Best-effort: a poisoned lock fails open.
            return true;
        };

        let now = Instant::now();
        let window = hits.entry(key.to_string()).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if now.duration_since(window.started_at) >= self.window {
            window.count = 0;
            window.started_at = now;
        }

        window.count += 1;
        window.count <= self.max_requests
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !limiter.check(&client_key(&req)) {
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(req).await)
}

/// Clients are keyed by the first `X-Forwarded-For` hop when present;
/// everything else shares one bucket (fine for the single-process,
/// best-effort scope of this limiter).
fn client_key(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_enforced_per_key() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        // A different client has its own budget.
        assert!(limiter.check("b"));
    }

    #[test]
    fn window_expiry_resets_the_budget() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));

        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.check("a"));
    }
}
