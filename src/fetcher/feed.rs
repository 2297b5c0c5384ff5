use feed_rs::model::{Entry, Link};

use crate::fetcher::{
    errors::FetchError,
    types::{FeedItem, FetchedFeed},
};

/// Parse an RSS/Atom/JSON feed body into items, preserving feed order.
pub fn parse_feed(source_url: &str, body: &[u8]) -> Result<FetchedFeed, FetchError> {
    let feed = feed_rs::parser::parse(body)?;

    Ok(FetchedFeed {
        source_url: source_url.to_string(),
        published_at: feed.published.or(feed.updated),
        items: feed.entries.into_iter().map(entry_to_item).collect(),
    })
}

fn entry_to_item(entry: Entry) -> FeedItem {
    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let description = entry
        .summary
        .map(|s| s.content)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    let link = select_link(&entry.links);

    let image_url = entry.media.iter().find_map(|media| {
        media
            .thumbnails
            .first()
            .map(|t| t.image.uri.clone())
            .or_else(|| {
                media
                    .content
                    .iter()
                    .filter(|c| {
                        c.content_type
                            .as_ref()
                            .is_some_and(|m| m.as_str().starts_with("image/"))
                    })
                    .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
            })
    });

    FeedItem {
        title,
        description,
        link,
        image_url,
        published_at: entry.published.or(entry.updated),
    }
}

/// The article link: an `alternate` (or untyped) link, else the first one.
fn select_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}
