//! # Reconciler
//!
//! Removes articles whose titles no longer appear in the feed.

use crate::constants::ARTICLE_CONTENT_TYPE;
use crate::errors::StorageError;
use crate::providers::db::storage::ContentStore;
use std::collections::HashSet;
use tracing::{info, warn};

pub struct Reconciler<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Hard-deletes every article whose title is not in `current_titles` and
    /// returns how many were deleted.
    ///
    /// An empty title set deletes nothing: an empty or failed fetch must not
    /// wipe the store. Deletions are not wrapped in a single transaction, so a
    /// failure part-way leaves the earlier deletions in place.
    pub async fn prune_missing(
        &self,
        current_titles: HashSet<String>,
    ) -> Result<usize, StorageError> {
        if current_titles.is_empty() {
            warn!("No titles collected from the feed, skipping reconciliation.");
            return Ok(0);
        }

        let mut titles: Vec<String> = current_titles.into_iter().collect();
        titles.sort();

        let stale = self
            .store
            .content_ids_excluding_titles(ARTICLE_CONTENT_TYPE, &titles)
            .await?;

        for id in &stale {
            self.store.delete_content(*id).await?;
            info!("Deleted content no longer in the feed (ID: {id}).");
        }

        Ok(stale.len())
    }
}
