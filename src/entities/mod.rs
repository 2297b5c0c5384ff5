use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

// --- Closed sets ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Category {
    Cybersecurity,
    Tech,
    General,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Cybersecurity, Category::Tech, Category::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cybersecurity => "Cybersecurity",
            Category::Tech => "Tech",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ThreatLevel {
    InsufficientData,
    NoWorries,
    Attention,
    CodeRed,
}

/// Result of a deduplicating insert. A repeated `url` is reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

// --- Tables ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    /// Canonical link; unique across the store.
    pub url: String,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub rank: u32,
    pub category: Category,
}

impl<'r> FromRow<'r, SqliteRow> for Article {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let rank: i64 = row.try_get("rank")?;
        let category: String = row.try_get("category")?;

        Ok(Self {
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            summary: row.try_get("summary")?,
            image_url: row.try_get("imageUrl")?,
            url: row.try_get("url")?,
            source_url: row.try_get("sourceUrl")?,
            published_at: row.try_get("publishedAt")?,
            rank: u32::try_from(rank).unwrap_or(0),
            // rows written outside the pipeline may carry free-form categories
            category: category.parse().unwrap_or(Category::General),
        })
    }
}

// --- Derived, never persisted ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreatScore {
    pub score: f64,
    pub phrase: String,
    pub level: ThreatLevel,
    pub article_count: u64,
}
