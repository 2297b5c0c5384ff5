use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::{
    entities::{Article, Category, InsertOutcome, ThreatScore},
    repositories::StoreError,
    scoring::ThreatPolicy,
};

pub const DEFAULT_LIMIT: u32 = 20;

const ARTICLE_COLUMNS: &str =
    "title, description, summary, imageUrl, url, sourceUrl, publishedAt, rank, category";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest first.
    #[default]
    Date,
    /// Highest rank first, newest first among equal ranks.
    Rank,
}

/// Conjunctive article filters. Every `None` filter matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub source: Option<String>,
    pub category: Option<Category>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// Inclusive, from the start of this day (UTC).
    pub start_date: Option<NaiveDate>,
    /// Inclusive, through the end of this day (UTC).
    pub end_date: Option<NaiveDate>,
    pub limit: u32,
    pub sort_by: SortBy,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            source: None,
            category: None,
            search: None,
            start_date: None,
            end_date: None,
            limit: DEFAULT_LIMIT,
            sort_by: SortBy::Date,
        }
    }
}

/// Read/write surface of the article store used by ingestion and the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert unless an article with the same `url` exists.
    async fn insert(&self, article: &Article) -> Result<InsertOutcome, StoreError>;

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>, StoreError>;

    /// Aggregate over articles published within the policy window ending now.
    async fn threat_score(&self, policy: &ThreatPolicy) -> Result<ThreatScore, StoreError>;
}

/// SQLite-backed article store. The `url` unique constraint is the only
/// guard against duplicate writes from concurrent sources or rounds.
#[derive(Clone)]
pub struct ArticleRepository {
    pool: SqlitePool,
}

impl ArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ?"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    /// Every article, oldest first, streamed row by row.
    pub fn export_all(&self) -> BoxStream<'_, Result<Article, StoreError>> {
        sqlx::query_as::<_, Article>(
            "SELECT title, description, summary, imageUrl, url, sourceUrl, publishedAt, rank, category \
             FROM articles ORDER BY publishedAt ASC, id ASC",
        )
        .fetch(&self.pool)
        .map(|row| row.map_err(StoreError::from))
        .boxed()
    }

    /// Mean-rank aggregate over articles published at or after `since`.
    pub async fn threat_score_since(
        &self,
        policy: &ThreatPolicy,
        since: DateTime<Utc>,
    ) -> Result<ThreatScore, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS article_count, COALESCE(SUM(rank), 0) AS rank_sum \
             FROM articles WHERE publishedAt >= ?",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let article_count: i64 = row.try_get("article_count")?;
        let rank_sum: i64 = row.try_get("rank_sum")?;

        Ok(policy.evaluate(article_count.max(0) as u64, rank_sum.max(0) as u64))
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn insert(&self, article: &Article) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
                  (title, description, summary, imageUrl, url, sourceUrl, publishedAt, rank, category, searchText)
            VALUES (?,     ?,           ?,       ?,        ?,   ?,         ?,           ?,    ?,        ?)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(&article.description)
        .bind(article.summary.as_deref())
        .bind(article.image_url.as_deref())
        .bind(&article.url)
        .bind(&article.source_url)
        .bind(article.published_at)
        .bind(i64::from(article.rank))
        .bind(article.category.as_str())
        .bind(search_text(&article.title, &article.description))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(url = %article.url, "Duplicate article ignored");
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>, StoreError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles"));
        let mut separator = " WHERE ";

        if let Some(source) = &query.source {
            builder.push(separator).push("sourceUrl = ").push_bind(source.clone());
            separator = " AND ";
        }

        if let Some(category) = query.category {
            builder.push(separator).push("category = ").push_bind(category.as_str());
            separator = " AND ";
        }

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            // searchText is already lower-cased, so LIKE only sees folded text
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            builder
                .push(separator)
                .push("searchText LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
            separator = " AND ";
        }

        if let Some(start) = query.start_date {
            builder.push(separator).push("publishedAt >= ").push_bind(start_of_day(start));
            separator = " AND ";
        }

        // end-of-day inclusive: strictly before the next midnight
        if let Some(next) = query
            .end_date
            .and_then(|end| end.checked_add_days(Days::new(1)))
        {
            builder.push(separator).push("publishedAt < ").push_bind(start_of_day(next));
        }

        match query.sort_by {
            SortBy::Rank => builder.push(" ORDER BY rank DESC, publishedAt DESC"),
            SortBy::Date => builder.push(" ORDER BY publishedAt DESC"),
        };

        builder.push(" LIMIT ").push_bind(i64::from(query.limit.max(1)));

        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }

    async fn threat_score(&self, policy: &ThreatPolicy) -> Result<ThreatScore, StoreError> {
        self.threat_score_since(policy, Utc::now() - policy.window)
            .await
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Case-folded text matched by free-text search.
fn search_text(title: &str, description: &str) -> String {
    format!("{}\n{}", title, description).to_lowercase()
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
