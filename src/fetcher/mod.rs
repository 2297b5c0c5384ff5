pub mod client;
pub mod errors;
pub mod feed;
pub mod types;

pub use client::{FeedClient, USER_AGENT};
pub use errors::FetchError;
pub use types::{FeedItem, FetchedFeed};
