#![allow(dead_code)]
//! # Common Test Utilities
//!
//! In-memory stores and mock collaborators so importer tests run without
//! the network or the file system.

use async_trait::async_trait;
use dotenvy::dotenv;
use feedsync::errors::{DownloadError, FeedError};
use feedsync::feed::{FeedItem, FeedSource, FetchedFeed, InvalidItem};
use feedsync::files::{file_name_from_url, FileRetriever};
use feedsync::types::{FileId, NewManagedFile};
use feedsync::{ContentStore, SqliteProvider};
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A fresh, isolated in-memory store with the schema in place.
pub async fn new_store() -> SqliteProvider {
    let store = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    store
        .initialize_schema()
        .await
        .expect("Failed to initialize schema");
    store
}

/// Builds a valid feed item whose other fields are derived from `title`.
pub fn item(title: &str) -> FeedItem {
    let slug = title.to_lowercase().replace(' ', "-");
    FeedItem {
        title: title.to_string(),
        guid: format!("guid-{slug}"),
        link: format!("https://example.com/articles/{slug}"),
        published: 1_704_067_200,
        description: format!("Summary of {title}"),
        encoded: format!("<p>{title}</p>"),
        image_url: format!("https://cdn.example.com/images/{slug}.jpg"),
    }
}

// --- Mock Feed Source ---

/// A feed source that returns whatever items the test programmed.
#[derive(Clone, Default)]
pub struct MockFeedSource {
    items: Arc<RwLock<Vec<Result<FeedItem, InvalidItem>>>>,
    fail_with: Arc<RwLock<Option<String>>>,
    pub fetched_urls: Arc<RwLock<Vec<String>>>,
}

impl MockFeedSource {
    pub fn with_items(items: Vec<FeedItem>) -> Self {
        let source = Self::default();
        source.set_items(items);
        source
    }

    pub fn set_items(&self, items: Vec<FeedItem>) {
        *self.items.write().unwrap() = items.into_iter().map(Ok).collect();
    }

    pub fn set_results(&self, items: Vec<Result<FeedItem, InvalidItem>>) {
        *self.items.write().unwrap() = items;
    }

    pub fn fail_fetch(&self, message: &str) {
        *self.fail_with.write().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed, FeedError> {
        self.fetched_urls.write().unwrap().push(url.to_string());
        if let Some(message) = self.fail_with.read().unwrap().clone() {
            return Err(FeedError::Fetch(message));
        }
        Ok(FetchedFeed {
            items: self.items.read().unwrap().clone(),
        })
    }
}

// --- Stub File Retriever ---

/// Registers files with the store without downloading anything.
pub struct StubFileRetriever {
    store: Box<dyn ContentStore>,
    pub requested: RwLock<Vec<String>>,
    fail: bool,
}

impl StubFileRetriever {
    pub fn new(store: &SqliteProvider) -> Self {
        Self {
            store: Box::new(store.clone()),
            requested: RwLock::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(store: &SqliteProvider) -> Self {
        Self {
            fail: true,
            ..Self::new(store)
        }
    }
}

#[async_trait]
impl FileRetriever for StubFileRetriever {
    async fn retrieve(&self, url: &str) -> Result<FileId, DownloadError> {
        self.requested.write().unwrap().push(url.to_string());
        if self.fail {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: 404,
            });
        }
        let filename = file_name_from_url(url)?;
        let file = NewManagedFile {
            uri: format!("articles/{filename}"),
            source_url: url.to_string(),
            filename,
            size: 0,
        };
        Ok(self.store.register_file(&file).await?)
    }
}

// --- Query Helpers ---

/// Titles of all stored articles, sorted.
pub async fn article_titles(store: &SqliteProvider) -> Vec<String> {
    let conn = store.db.connect().unwrap();
    let mut rows = conn
        .query(
            "SELECT title FROM content WHERE content_type = 'article' ORDER BY title ASC",
            (),
        )
        .await
        .unwrap();
    let mut titles = Vec::new();
    while let Some(row) = rows.next().await.unwrap() {
        titles.push(row.get::<String>(0).unwrap());
    }
    titles
}

/// Scalar count for a `SELECT COUNT(*) ...` query.
pub async fn count(store: &SqliteProvider, sql: &str) -> i64 {
    let conn = store.db.connect().unwrap();
    conn.query(sql, ())
        .await
        .unwrap()
        .next()
        .await
        .unwrap()
        .unwrap()
        .get(0)
        .unwrap()
}
