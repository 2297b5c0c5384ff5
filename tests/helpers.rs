#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use newsrank::{
    api,
    app_state::AppState,
    entities::{Article, Category},
    extractor::LanguageFilter,
    fetcher::{FeedClient, client::DEFAULT_TIMEOUT},
    ingest::Pipeline,
    middleware::rate_limit::RateLimit,
    repositories::{self, ArticleRepository},
    scoring::{CategoryClassifier, KeywordTable},
};

pub async fn test_pool() -> SqlitePool {
    repositories::connect_in_memory()
        .await
        .expect("Failed to open in-memory store")
}

pub fn test_app(pool: SqlitePool) -> Router {
    api::router(AppState::new(pool), RateLimit::per_minute(1_000))
}

/// Pipeline over `repository` with English-only admission, no summarizer,
/// and every test source classified as cybersecurity.
pub fn test_pipeline(repository: ArticleRepository, sources: &[String]) -> Pipeline {
    Pipeline::new(
        FeedClient::new(DEFAULT_TIMEOUT).unwrap(),
        LanguageFilter::english(),
        CategoryClassifier::new(
            vec![(Category::Cybersecurity, sources.to_vec())],
            Category::General,
        ),
        KeywordTable::default(),
        None,
        Arc::new(repository),
    )
}

pub fn article(slug: &str, rank: u32, published_at: DateTime<Utc>) -> Article {
    Article {
        title: format!("Article {}", slug),
        description: format!("Description of {}", slug),
        summary: None,
        image_url: None,
        url: format!("https://news.example.com/{}", slug),
        source_url: "https://news.example.com/feed".to_string(),
        published_at,
        rank,
        category: Category::Cybersecurity,
    }
}
