//! # Tag Name Derivation
//!
//! The two terms attached to every imported article come from the feed URL
//! itself: the first path segment names the source, the last names the
//! category.

use crate::errors::ImportError;
use url::Url;

/// The (source, category) pair derived from a feed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNames {
    pub source: String,
    pub category: String,
}

impl TagNames {
    /// Derives the tag names from `feed_url`.
    ///
    /// Scheme, host, query and fragment are discarded, as are empty segments
    /// (so a trailing slash does not produce an empty category). With a single
    /// segment, source and category are the same segment.
    pub fn from_feed_url(feed_url: &str) -> Result<Self, ImportError> {
        let url = Url::parse(feed_url).map_err(|e| ImportError::FeedUrl {
            url: feed_url.to_string(),
            reason: e.to_string(),
        })?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => Ok(Self {
                source: (*first).to_string(),
                category: (*last).to_string(),
            }),
            _ => Err(ImportError::FeedUrl {
                url: feed_url.to_string(),
                reason: "the URL has no path segment to derive tags from".to_string(),
            }),
        }
    }
}
