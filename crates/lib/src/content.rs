//! # Content Locator

use crate::constants::ARTICLE_CONTENT_TYPE;
use crate::errors::StorageError;
use crate::providers::db::storage::ContentStore;
use crate::types::ContentRecord;

/// Finds existing article records by exact title. Read-only.
pub struct ContentLocator<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> ContentLocator<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// The first article titled exactly `title`, if any.
    pub async fn find_by_title(&self, title: &str) -> Result<Option<ContentRecord>, StorageError> {
        self.store
            .find_content_by_title(ARTICLE_CONTENT_TYPE, title)
            .await
    }
}
