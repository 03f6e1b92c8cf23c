//! Per-client request throttling
//!
//! A token bucket per client address. Buckets refill continuously at the
//! configured rate and hold up to twice that many tokens for bursts.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::ApiError;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    refreshed_at: Instant,
}

impl Bucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            refreshed_at: now,
        }
    }

    fn take(&mut self, refill_per_sec: f64, capacity: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.refreshed_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity);
        self.refreshed_at = now;

        if self.tokens < 1.0 {
            return false;
        }
        self.tokens -= 1.0;
        true
    }
}

/// Shared throttle state, cheap to clone into the middleware closure
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
    refill_per_sec: f64,
    capacity: f64,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let rps = f64::from(requests_per_second.max(1));
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            refill_per_sec: rps,
            capacity: rps * 2.0,
        }
    }

    /// Take one token for `client`; false when the client is over its rate.
    pub async fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(client.to_string())
            .or_insert_with(|| Bucket::full(self.capacity, now))
            .take(self.refill_per_sec, self.capacity, now)
    }

    /// Drop buckets idle for longer than `max_idle`.
    pub async fn prune(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, b| now.saturating_duration_since(b.refreshed_at) < max_idle);
        before - buckets.len()
    }

    /// Periodically prune idle buckets for the life of the process.
    pub fn spawn_pruner(&self, every: Duration) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = limiter.prune(every).await;
                if removed > 0 {
                    tracing::debug!(removed, "Pruned idle rate limit buckets");
                }
            }
        });
    }
}

/// Build the `from_fn` middleware closure around a limiter
pub fn rate_limit_layer(
    limiter: RateLimiter,
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone + Send
{
    move |request: Request<Body>, next: Next| {
        let limiter = limiter.clone();
        Box::pin(async move {
            let client = client_ip(request.headers()).unwrap_or_else(|| "unknown".to_string());

            if !limiter.check(&client).await {
                tracing::warn!(client = %client, "Rate limit exceeded");
                let mut response = ApiError::TooManyRequests.into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
                return response;
            }

            next.run(request).await
        })
    }
}

/// Client address from proxy headers, first hop of `X-Forwarded-For` wins
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_then_reject() {
        let limiter = RateLimiter::new(3);

        for _ in 0..6 {
            assert!(limiter.check("10.0.0.1").await);
        }
        assert!(!limiter.check("10.0.0.1").await);
        // Other clients are unaffected
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_prune_drops_idle_buckets() {
        let limiter = RateLimiter::new(1);
        limiter.check("a").await;
        assert_eq!(limiter.prune(Duration::ZERO).await, 1);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("192.168.1.9"));

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));

        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
