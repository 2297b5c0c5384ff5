//! HTTP surface: routes, OpenAPI document and the middleware stack.

pub mod csv;
pub mod dtos;
pub mod handlers;

use axum::{
    Json, Router,
    http::{HeaderValue, header},
    middleware::from_fn_with_state,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    app_state::AppState,
    entities::{Article, Category, ThreatLevel, ThreatScore},
    health::{self, HealthResponse},
    middleware::rate_limit::{RateLimit, rate_limit_middleware},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_news,
        handlers::today_threat,
        handlers::export_csv,
        health::health_check
    ),
    components(schemas(
        Article,
        Category,
        ThreatLevel,
        ThreatScore,
        HealthResponse,
        dtos::ErrorResponse
    )),
    tags(
        (name = "news", description = "Ranked articles and threat score"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router with tracing, request ids, security headers
/// and per-client rate limiting.
pub fn router(state: AppState, rate_limit: RateLimit) -> Router {
    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    Router::new()
        .route("/news", get(handlers::list_news))
        .route("/news.csv", get(handlers::export_csv))
        .route("/today-threat", get(handlers::today_threat))
        .route("/healthz", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(from_fn_with_state(rate_limit, rate_limit_middleware))
        .layer(security_headers)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
