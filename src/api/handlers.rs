use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt, channel::mpsc};
use tracing::{Instrument, debug, info_span, warn};

use crate::{
    api::{
        csv,
        dtos::{ApiError, ErrorResponse, NewsParams, ThreatParams},
    },
    app_state::AppState,
    entities::{Article, ThreatScore},
    repositories::{ArticleQuery, ArticleRepository, StoreError},
};

const EXPORT_BUFFER: usize = 64;

/// Filtered, sorted article listing.
#[utoipa::path(
    get,
    path = "/news",
    tag = "news",
    params(NewsParams),
    responses(
        (status = 200, description = "Matching articles", body = [Article]),
        (status = 400, description = "Malformed query parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let query = ArticleQuery::try_from(params)?;
    let articles = state.store.query(&query).await?;
    debug!(count = articles.len(), "Listed articles");
    Ok(Json(articles))
}

/// Threat score over the trailing window (24h unless `hours` is given).
#[utoipa::path(
    get,
    path = "/today-threat",
    tag = "news",
    params(ThreatParams),
    responses(
        (status = 200, description = "Current threat score", body = ThreatScore),
        (status = 400, description = "Malformed window", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn today_threat(
    State(state): State<AppState>,
    Query(params): Query<ThreatParams>,
) -> Result<Json<ThreatScore>, ApiError> {
    let policy = match params.window()? {
        Some(window) => state.threat_policy.clone().with_window(window),
        None => state.threat_policy.clone(),
    };
    Ok(Json(state.store.threat_score(&policy).await?))
}

/// Every stored article as CSV, oldest first, streamed as rows are read.
#[utoipa::path(
    get,
    path = "/news.csv",
    tag = "news",
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String)
    )
)]
pub async fn export_csv(State(state): State<AppState>) -> Response {
    let (mut tx, rx) = mpsc::channel::<Result<String, StoreError>>(EXPORT_BUFFER);
    let repository = ArticleRepository::new(state.db_pool.clone());

    tokio::spawn(
        async move {
            if tx.send(Ok(csv::HEADER.to_string())).await.is_err() {
                return;
            }

            let mut rows = repository.export_all();
            let mut written = 0usize;
            while let Some(row) = rows.next().await {
                let line = match row {
                    Ok(article) => Ok(csv::record(&article)),
                    Err(e) => {
                        warn!("Export aborted after {} rows: {}", written, e);
                        Err(e)
                    }
                };
                let failed = line.is_err();
                // receiver gone means the client disconnected
                if tx.send(line).await.is_err() || failed {
                    return;
                }
                written += 1;
            }
            debug!(rows = written, "CSV export finished");
        }
        .instrument(info_span!("csv_export")),
    );

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"news.csv\""),
        ],
        Body::from_stream(rx),
    )
        .into_response()
}
