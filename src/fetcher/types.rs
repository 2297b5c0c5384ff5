use chrono::{DateTime, Utc};

/// One entry of a syndicated feed, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFeed {
    pub source_url: String,
    /// Feed-level publication date, used when an item carries none.
    pub published_at: Option<DateTime<Utc>>,
    pub items: Vec<FeedItem>,
}
