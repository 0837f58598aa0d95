//! # Term Resolver
//!
//! Looks a taxonomy term up by (name, vocabulary) and creates it on a miss.
//! The lookup and the insert are separate statements, so two runs racing on
//! the same database could both miss; migrations are run one at a time.

use crate::errors::StorageError;
use crate::providers::db::storage::ContentStore;
use crate::types::TermId;
use tracing::debug;

pub struct TermResolver<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> TermResolver<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Returns the id of the term `name` in `vocabulary`, creating it if needed.
    pub async fn resolve(&self, name: &str, vocabulary: &str) -> Result<TermId, StorageError> {
        if let Some(id) = self.store.find_term(name, vocabulary).await? {
            debug!("Found existing term '{name}' in '{vocabulary}' (ID: {id}).");
            return Ok(id);
        }
        self.store.create_term(name, vocabulary).await
    }
}
