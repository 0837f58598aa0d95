//! # feedsync
//!
//! Imports the items of an RSS/media feed as article records, tags each one
//! with two terms derived from the feed URL, attaches the item's image as a
//! managed file, and removes articles that are no longer in the feed.
//!
//! The importer talks to its collaborators through traits: a [`FeedSource`]
//! for the XML document, a [`FileRetriever`] for images and a
//! [`ContentStore`] for persistence. The SQLite implementation of the store
//! lives in [`providers::db::sqlite`]; the RSS feed source is provided by the
//! `feedsync-rss` crate.

pub mod constants;
pub mod content;
pub mod errors;
pub mod feed;
pub mod files;
pub mod importer;
pub mod migration;
pub mod providers;
pub mod reconcile;
pub mod report;
pub mod tags;
pub mod taxonomy;
pub mod types;

pub use content::ContentLocator;
pub use errors::{DownloadError, FeedError, ImportError, ItemParseError, StorageError};
pub use feed::{FeedItem, FeedSource, FetchedFeed, InvalidItem};
pub use files::{FileRetriever, HttpFileRetriever, HttpSettings};
pub use importer::{FeedImporter, ImportOptions, ImportSummary};
pub use migration::migrate;
pub use providers::db::sqlite::SqliteProvider;
pub use providers::db::storage::ContentStore;
pub use reconcile::Reconciler;
pub use report::MigrationReport;
pub use tags::TagNames;
pub use taxonomy::TermResolver;
pub use types::{ImportMode, ItemErrorPolicy};
