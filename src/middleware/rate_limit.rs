use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::{net::SocketAddr, sync::Arc};
use tracing::warn;

use crate::api::dtos::ErrorResponse;

/// Paths never counted against a client's budget.
const EXEMPT_PATHS: &[&str] = &["/healthz"];
/// Shared key for requests without a peer address (in-process callers).
const UNKNOWN_CLIENT: &str = "unknown";
/// Tracked clients above which expired windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Fixed-window request budget per client address.
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
}

#[derive(Debug, Clone)]
struct Window {
    count: u32,
    started_at: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            max_requests,
            window: Duration::seconds(window_seconds),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, 60)
    }

    /// Count one request for `client` at `now`; `false` once over budget.
    fn admit(&self, client: &str, now: DateTime<Utc>) -> bool {
        if self.store.len() > SWEEP_THRESHOLD {
            let window = self.window;
            self.store
                .retain(|_, w| now.signed_duration_since(w.started_at) < window);
        }

        let mut entry = self
            .store
            .entry(client.to_string())
            .or_insert_with(|| Window {
                count: 0,
                started_at: now,
            });
        let current = entry.value_mut();

        if now.signed_duration_since(current.started_at) >= self.window {
            current.count = 0;
            current.started_at = now;
        }

        current.count = current.count.saturating_add(1);
        current.count <= self.max_requests
    }
}

pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    req: Request,
    next: Next,
) -> Response {
    if EXEMPT_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    if !rate_limit.admit(&client, Utc::now()) {
        warn!(client = %client, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
            }),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_budget_per_client() {
        let limit = RateLimit::new(2, 60);
        let now = Utc::now();
        assert!(limit.admit("10.0.0.1", now));
        assert!(limit.admit("10.0.0.1", now));
        assert!(!limit.admit("10.0.0.1", now));
        assert!(limit.admit("10.0.0.2", now));
    }

    #[test]
    fn test_window_resets() {
        let limit = RateLimit::new(1, 60);
        let now = Utc::now();
        assert!(limit.admit("10.0.0.1", now));
        assert!(!limit.admit("10.0.0.1", now + Duration::seconds(30)));
        assert!(limit.admit("10.0.0.1", now + Duration::seconds(61)));
    }

    fn app(limit: RateLimit) -> Router {
        Router::new()
            .route("/news", get(|| async { "ok" }))
            .route("/healthz", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                limit,
                rate_limit_middleware,
            ))
    }

    async fn status(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_middleware_rejects_over_budget() {
        let app = app(RateLimit::per_minute(1));
        assert_eq!(status(&app, "/news").await, StatusCode::OK);
        assert_eq!(status(&app, "/news").await, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_health_is_exempt() {
        let app = app(RateLimit::per_minute(1));
        for _ in 0..5 {
            assert_eq!(status(&app, "/healthz").await, StatusCode::OK);
        }
    }
}
