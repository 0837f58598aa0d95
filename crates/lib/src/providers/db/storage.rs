use crate::errors::StorageError;
use crate::types::{ContentId, ContentRecord, FileId, NewContentRecord, NewManagedFile, TermId};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for the entity store the importer writes into.
///
/// It covers the three entity kinds a migration touches (taxonomy terms,
/// content records and managed files) with create / load-by-properties /
/// delete operations, plus the "titles not in" query the reconciler needs.
#[async_trait]
pub trait ContentStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Finds a term by exact (name, vocabulary) match.
    async fn find_term(&self, name: &str, vocabulary: &str)
        -> Result<Option<TermId>, StorageError>;

    /// Persists a new term and returns its id.
    async fn create_term(&self, name: &str, vocabulary: &str) -> Result<TermId, StorageError>;

    /// Finds the first content record of `content_type` with exactly `title`.
    async fn find_content_by_title(
        &self,
        content_type: &str,
        title: &str,
    ) -> Result<Option<ContentRecord>, StorageError>;

    /// Loads a content record by id.
    async fn load_content(&self, id: ContentId) -> Result<Option<ContentRecord>, StorageError>;

    /// Persists a new content record together with its tag references.
    async fn create_content(&self, record: &NewContentRecord) -> Result<ContentId, StorageError>;

    /// Ids of content of `content_type` whose title is not in `titles`, in id
    /// order. There is no upper bound on the number of titles.
    async fn content_ids_excluding_titles(
        &self,
        content_type: &str,
        titles: &[String],
    ) -> Result<Vec<ContentId>, StorageError>;

    /// Hard-deletes a content record and its tag references.
    async fn delete_content(&self, id: ContentId) -> Result<(), StorageError>;

    /// Registers a downloaded file. A file already registered under the same
    /// uri is updated in place and keeps its id.
    async fn register_file(&self, file: &NewManagedFile) -> Result<FileId, StorageError>;
}

dyn_clone::clone_trait_object!(ContentStore);
