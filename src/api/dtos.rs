use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::{
    entities::Category,
    repositories::{ArticleQuery, DEFAULT_LIMIT, SortBy, StoreError},
};

pub const MAX_LIMIT: u32 = 500;
const MAX_WINDOW_HOURS: u32 = 24 * 30;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query-string filters for `GET /news`. `all` (or an empty value) for
/// `source` and `category` means no filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NewsParams {
    /// Exact feed URL.
    pub source: Option<String>,
    /// `Cybersecurity`, `Tech` or `General`.
    pub category: Option<String>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// Maximum number of articles, default 20.
    pub limit: Option<String>,
    /// First day included, `YYYY-MM-DD`.
    pub start: Option<String>,
    /// Last day included, `YYYY-MM-DD`.
    pub end: Option<String>,
    /// `date` (default) or `rank`.
    pub sort_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ThreatParams {
    /// Trailing window in hours, default 24.
    pub hours: Option<String>,
}

/// Rejected query parameters. Always a client error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid {field} date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid limit {0:?}")]
    InvalidLimit(String),

    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("invalid sortBy {0:?}, expected date or rank")]
    InvalidSort(String),

    #[error("invalid hours {0:?}, expected 1 to 720")]
    InvalidWindow(String),
}

impl TryFrom<NewsParams> for ArticleQuery {
    type Error = QueryError;

    fn try_from(params: NewsParams) -> Result<Self, Self::Error> {
        let category = match present(params.category) {
            Some(raw) => Some(
                raw.parse::<Category>()
                    .map_err(|_| QueryError::UnknownCategory(raw))?,
            ),
            None => None,
        };

        let limit = match present(params.limit) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) => DEFAULT_LIMIT,
                Ok(n) => n.min(MAX_LIMIT),
                Err(_) => return Err(QueryError::InvalidLimit(raw)),
            },
            None => DEFAULT_LIMIT,
        };

        let sort_by = match present(params.sort_by) {
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "date" => SortBy::Date,
                "rank" => SortBy::Rank,
                _ => return Err(QueryError::InvalidSort(raw)),
            },
            None => SortBy::Date,
        };

        let start_date = parse_date("start", params.start)?;
        let end_date = parse_date("end", params.end)?;
        if let (Some(start), Some(end)) = (start_date, end_date)
            && start > end
        {
            return Err(QueryError::InvertedRange { start, end });
        }

        Ok(ArticleQuery {
            source: present(params.source),
            category,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            start_date,
            end_date,
            limit,
            sort_by,
        })
    }
}

impl ThreatParams {
    pub fn window(&self) -> Result<Option<chrono::Duration>, QueryError> {
        let Some(raw) = self.hours.as_deref().map(str::trim).filter(|h| !h.is_empty()) else {
            return Ok(None);
        };
        match raw.parse::<u32>() {
            Ok(hours) if (1..=MAX_WINDOW_HOURS).contains(&hours) => {
                Ok(Some(chrono::Duration::hours(i64::from(hours))))
            }
            _ => Err(QueryError::InvalidWindow(raw.to_string())),
        }
    }
}

/// Trimmed value, with `all` and empty treated as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn parse_date(field: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, QueryError> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| QueryError::InvalidDate { field, value: raw }),
        None => Ok(None),
    }
}

/// Handler error mapped onto an HTTP status with a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Query(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Store(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
