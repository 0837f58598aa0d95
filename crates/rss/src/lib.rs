//! # `feedsync-rss`: RSS Feed Source
//!
//! This crate provides the `FeedSource` implementation for RSS 2.0 feeds that
//! carry Media RSS (`media:content`) and `content:encoded` extensions. It
//! fetches the document with `reqwest`, parses it with the `rss` crate and
//! validates every item into a typed `FeedItem`.

use async_trait::async_trait;
use feedsync::errors::{FeedError, ItemParseError};
use feedsync::feed::{parse_pub_date, FeedItem, FeedSource, FetchedFeed, InvalidItem};
use feedsync::files::HttpSettings;
use rss::{Channel, Item};
use thiserror::Error;
use tracing::{debug, info};

/// Custom error types for the RSS feed source.
#[derive(Error, Debug)]
pub enum RssFeedError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to fetch RSS feed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("RSS feed request returned status {0}")]
    Status(u16),
    #[error("Failed to parse RSS feed: {0}")]
    Parse(#[from] rss::Error),
}

/// A helper to convert the specific `RssFeedError` into the generic `feedsync::FeedError`.
impl From<RssFeedError> for FeedError {
    fn from(err: RssFeedError) -> Self {
        match err {
            RssFeedError::Parse(e) => FeedError::Parse(e.to_string()),
            other => FeedError::Fetch(other.to_string()),
        }
    }
}

/// The `FeedSource` implementation for RSS feeds.
pub struct RssFeedSource {
    client: reqwest::Client,
}

impl RssFeedSource {
    /// Creates a new `RssFeedSource` whose requests honour `settings`.
    pub fn new(settings: &HttpSettings) -> Result<Self, RssFeedError> {
        let client = settings.build_client().map_err(RssFeedError::ClientBuild)?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, RssFeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RssFeedError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed, FeedError> {
        info!("Fetching RSS feed from: {url}");
        let content = self.download(url).await?;
        let feed = parse_feed(&content)?;
        info!("Parsed {} items from RSS feed.", feed.total_items());
        Ok(feed)
    }
}

/// Parses an RSS document. Items that fail validation are kept in place as
/// an `InvalidItem` carrying the item's title when it had one.
pub fn parse_feed(content: &[u8]) -> Result<FetchedFeed, RssFeedError> {
    let channel = Channel::read_from(content)?;
    let items = channel
        .items()
        .iter()
        .enumerate()
        .map(|(position, item)| {
            item_from_rss(position, item).map_err(|error| InvalidItem {
                title: item
                    .title()
                    .filter(|t| !t.trim().is_empty())
                    .map(str::to_string),
                error,
            })
        })
        .collect();
    Ok(FetchedFeed { items })
}

fn required<'a>(
    position: usize,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ItemParseError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ItemParseError::MissingField { position, field }),
    }
}

fn present<'a>(
    position: usize,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ItemParseError> {
    value.ok_or(ItemParseError::MissingField { position, field })
}

/// The `url` attribute of the first `media:content` element.
fn media_content_url(item: &Item) -> Option<&str> {
    item.extensions()
        .get("media")
        .and_then(|media| media.get("content"))
        .and_then(|contents| contents.iter().find_map(|c| c.attrs().get("url")))
        .map(String::as_str)
}

/// Validates one `<item>` into a `FeedItem`.
///
/// `title`, `guid`, `link`, `pubDate` and the media url must be non-empty;
/// `description` and `content:encoded` must be present but may be empty.
pub fn item_from_rss(position: usize, item: &Item) -> Result<FeedItem, ItemParseError> {
    let title = required(position, "title", item.title())?;
    let guid = required(position, "guid", item.guid().map(|g| g.value()))?;
    let link = required(position, "link", item.link())?;
    let pub_date = required(position, "pubDate", item.pub_date())?;
    let published = parse_pub_date(position, pub_date)?;
    let description = present(position, "description", item.description())?;
    let encoded = present(position, "content:encoded", item.content())?;
    let image_url = required(position, "media:content@url", media_content_url(item))?;

    debug!("Parsed item #{position}: '{title}'");
    Ok(FeedItem {
        title: title.to_string(),
        guid: guid.to_string(),
        link: link.to_string(),
        published,
        description: description.to_string(),
        encoded: encoded.to_string(),
        image_url: image_url.to_string(),
    })
}
