use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    entities::{Article, InsertOutcome},
    extractor::{LanguageFilter, Summarizer, sanitize, summarize_or_truncate},
    fetcher::{FeedClient, FeedItem, FetchError},
    repositories::ArticleStore,
    scoring::{CategoryClassifier, KeywordTable, rank_score},
};

/// What happened to a single feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Stored,
    Duplicate,
    /// Detected language is outside the admitted set.
    SkippedLanguage,
    /// No link to use as the article identity.
    SkippedNoLink,
    /// The store rejected the write for a reason other than a duplicate.
    Failed,
}

/// Per-source tally for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub items: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SourceReport {
    fn record(&mut self, outcome: ItemOutcome) {
        self.items += 1;
        match outcome {
            ItemOutcome::Stored => self.stored += 1,
            ItemOutcome::Duplicate => self.duplicates += 1,
            ItemOutcome::SkippedLanguage | ItemOutcome::SkippedNoLink => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }
}

/// Service context for ingestion. Owns every collaborator explicitly;
/// nothing here is process-global.
pub struct Pipeline {
    client: FeedClient,
    language: LanguageFilter,
    classifier: CategoryClassifier,
    keywords: KeywordTable,
    summarizer: Option<Arc<dyn Summarizer>>,
    store: Arc<dyn ArticleStore>,
}

impl Pipeline {
    pub fn new(
        client: FeedClient,
        language: LanguageFilter,
        classifier: CategoryClassifier,
        keywords: KeywordTable,
        summarizer: Option<Arc<dyn Summarizer>>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            client,
            language,
            classifier,
            keywords,
            summarizer,
            store,
        }
    }

    /// Fetch one source and process its items in feed order.
    pub async fn process_source(&self, source_url: &str) -> Result<SourceReport, FetchError> {
        let feed = self.client.fetch(source_url).await?;
        let mut report = SourceReport::default();

        for item in feed.items {
            let outcome = self
                .process_item(source_url, feed.published_at, item)
                .await;
            report.record(outcome);
        }

        info!(
            items = report.items,
            stored = report.stored,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "Processed source"
        );
        Ok(report)
    }

    pub async fn process_item(
        &self,
        source_url: &str,
        feed_published_at: Option<DateTime<Utc>>,
        item: FeedItem,
    ) -> ItemOutcome {
        if item.link.is_none() {
            debug!(title = %item.title, "Skipping item without link");
            return ItemOutcome::SkippedNoLink;
        }

        let Some(article) = self.build_article(source_url, feed_published_at, item).await else {
            return ItemOutcome::SkippedLanguage;
        };

        match self.store.insert(&article).await {
            Ok(InsertOutcome::Inserted) => ItemOutcome::Stored,
            Ok(InsertOutcome::Duplicate) => ItemOutcome::Duplicate,
            Err(e) => {
                warn!(url = %article.url, "Error inserting article: {}", e);
                ItemOutcome::Failed
            }
        }
    }

    /// Normalize, filter, classify, summarize and score a feed item.
    /// Returns `None` when the item has no link or is not admitted.
    pub async fn build_article(
        &self,
        source_url: &str,
        feed_published_at: Option<DateTime<Utc>>,
        item: FeedItem,
    ) -> Option<Article> {
        let url = item.link?;
        let title = sanitize(&item.title);
        let description = sanitize(&item.description);

        if !self.language.admits(&format!("{} {}", title, description)) {
            info!(source = %source_url, "Skipping article in non-admitted language: {}", title);
            return None;
        }

        let category = self.classifier.classify(source_url);
        let summary = summarize_or_truncate(self.summarizer.as_deref(), &description).await;
        let rank = rank_score(&title, &description, category, &self.keywords);

        Some(Article {
            title,
            description,
            summary,
            image_url: item.image_url,
            url,
            source_url: source_url.to_string(),
            published_at: item
                .published_at
                .or(feed_published_at)
                .unwrap_or_else(Utc::now),
            rank,
            category,
        })
    }
}
