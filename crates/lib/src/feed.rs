//! # Feed Source Contract
//!
//! A feed source fetches the XML document at a URL and turns each `<item>`
//! into a validated `FeedItem`. Concrete implementations live in plugin
//! crates (see `feedsync-rss`); the importer only sees this trait.

use crate::errors::{FeedError, ItemParseError};
use async_trait::async_trait;
use chrono::DateTime;

/// One fully validated feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub guid: String,
    pub link: String,
    /// Publish time in epoch seconds.
    pub published: i64,
    pub description: String,
    /// The `content:encoded` HTML body.
    pub encoded: String,
    /// The `url` attribute of the item's `media:content` element.
    pub image_url: String,
}

/// An `<item>` that failed validation.
///
/// `title` is set whenever the item carried a non-empty title, even though
/// another field was invalid. The item still belongs to the feed's title set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidItem {
    pub title: Option<String>,
    pub error: ItemParseError,
}

impl From<ItemParseError> for InvalidItem {
    fn from(error: ItemParseError) -> Self {
        Self { title: None, error }
    }
}

/// The parsed feed document. Items keep document order; an item that failed
/// validation is kept in place as an `InvalidItem` so the caller can apply
/// its own policy.
#[derive(Debug, Default)]
pub struct FetchedFeed {
    pub items: Vec<Result<FeedItem, InvalidItem>>,
}

impl FetchedFeed {
    /// The number of `<item>` elements in the document, valid or not.
    pub fn total_items(&self) -> usize {
        self.items.len()
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches and parses the feed at `url`.
    ///
    /// An unreachable URL, a non-success status or a malformed document is a
    /// `FeedError`. Per-item problems are reported inside `FetchedFeed`.
    async fn fetch(&self, url: &str) -> Result<FetchedFeed, FeedError>;
}

/// Parses a feed publish date into epoch seconds.
///
/// Tries RFC 2822 first, then RFC 3339.
pub fn parse_pub_date(position: usize, value: &str) -> Result<i64, ItemParseError> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .map(|dt| dt.timestamp())
        .map_err(|_| ItemParseError::InvalidDate {
            position,
            value: value.to_string(),
        })
}
