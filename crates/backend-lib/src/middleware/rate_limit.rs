use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ::metrics::counter;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::error::AppError;
use crate::metrics::RATE_LIMITED;
use crate::storage::Storage;
use crate::AppState;

/// Rate limit entry for a client
#[derive(Debug)]
struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}

/// Fixed-window request limiter keyed by client address
#[derive(Debug, Clone)]
pub struct RateLimiter {
    entries: Arc<DashMap<String, RateLimitEntry>>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            window,
            max_requests,
        }
    }

    /// Count one request for `client`; `false` once the window is used up.
    pub fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(client.to_string())
            .or_insert_with(|| RateLimitEntry {
                requests: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= self.window {
            entry.requests = 0;
            entry.window_start = now;
        }

        if entry.requests >= self.max_requests {
            return false;
        }
        entry.requests += 1;
        true
    }

    /// Drop entries whose window has passed
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < self.window);
    }
}

/// Limiter key for a request. Forwarding headers are client-controlled, so
/// they count only when `trust_proxy_headers` is set.
fn client_key(request: &Request, trust_proxy_headers: bool) -> String {
    let headers = request.headers();
    let forwarded = trust_proxy_headers
        .then(|| headers.get("x-real-ip").or_else(|| headers.get("x-forwarded-for")))
        .flatten()
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiter middleware
pub async fn rate_limit<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, state.settings.rate_limit.trust_proxy_headers);
    if !state.rate_limiter.check(&client) {
        counter!(RATE_LIMITED).increment(1);
        tracing::warn!(target: "security", %client, "rate limit exceeded");
        return Err(AppError::RateLimitExceeded);
    }
    Ok(next.run(request).await)
}
