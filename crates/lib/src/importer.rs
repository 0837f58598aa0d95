//! # Feed Importer
//!
//! Walks the items of one feed in document order and creates an article for
//! every title not yet in the store. Each article gets the item's image as a
//! managed file and two terms derived from the feed URL.

use crate::constants::{ARTICLE_CONTENT_TYPE, BODY_FORMAT, IMPORT_OWNER_ID, TAGS_VOCABULARY};
use crate::content::ContentLocator;
use crate::errors::ImportError;
use crate::feed::{FeedItem, FeedSource};
use crate::files::FileRetriever;
use crate::providers::db::storage::ContentStore;
use crate::tags::TagNames;
use crate::taxonomy::TermResolver;
use crate::types::{Body, FileId, ImportMode, ItemErrorPolicy, NewContentRecord, TermId};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Options controlling a single import run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub on_item_error: ItemErrorPolicy,
}

/// The outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Content records created by this run.
    pub created: usize,
    /// `<item>` elements in the feed, including any that were skipped.
    pub total_items: usize,
    /// Titles of every item in the feed, including skipped items that had one.
    pub titles: HashSet<String>,
}

pub struct FeedImporter<'a> {
    store: &'a dyn ContentStore,
    feeds: &'a dyn FeedSource,
    files: &'a dyn FileRetriever,
    options: ImportOptions,
}

impl<'a> FeedImporter<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        feeds: &'a dyn FeedSource,
        files: &'a dyn FileRetriever,
        options: ImportOptions,
    ) -> Self {
        Self {
            store,
            feeds,
            files,
            options,
        }
    }

    /// Imports every item of the feed at `feed_url`.
    ///
    /// The run stops at the first fatal error. Records created before that
    /// point stay in the store.
    pub async fn run(&self, feed_url: &str) -> Result<ImportSummary, ImportError> {
        let tags = TagNames::from_feed_url(feed_url)?;
        info!(
            "Importing feed '{feed_url}' (source: '{}', category: '{}', mode: {}).",
            tags.source, tags.category, self.options.mode
        );

        let feed = self.feeds.fetch(feed_url).await.map_err(|e| {
            error!("Failed to load feed '{feed_url}': {e}");
            ImportError::from(e)
        })?;

        let mut summary = ImportSummary {
            total_items: feed.total_items(),
            ..Default::default()
        };

        for parsed in feed.items {
            let item = match parsed {
                Ok(item) => item,
                Err(invalid) => match self.options.on_item_error {
                    ItemErrorPolicy::Abort => {
                        error!(
                            position = invalid.error.position(),
                            "Aborting import: {}", invalid.error
                        );
                        return Err(invalid.error.into());
                    }
                    ItemErrorPolicy::Skip => {
                        warn!(
                            position = invalid.error.position(),
                            "Skipping item: {}", invalid.error
                        );
                        // A still-listed title must not be pruned.
                        if let Some(title) = invalid.title {
                            summary.titles.insert(title);
                        }
                        continue;
                    }
                },
            };

            if self.import_item(&item, &tags).await? {
                summary.created += 1;
            }
            summary.titles.insert(item.title);
        }

        info!(
            "Imported feed '{feed_url}': {} created out of {} items.",
            summary.created, summary.total_items
        );
        Ok(summary)
    }

    /// Imports one item. Returns whether a record was created.
    async fn import_item(&self, item: &FeedItem, tags: &TagNames) -> Result<bool, ImportError> {
        let image = self.files.retrieve(&item.image_url).await.map_err(|e| {
            error!("Failed to retrieve image for '{}': {e}", item.title);
            ImportError::from(e)
        })?;

        let terms = TermResolver::new(self.store);
        let source = terms.resolve(&tags.source, TAGS_VOCABULARY).await?;
        let category = terms.resolve(&tags.category, TAGS_VOCABULARY).await?;

        if self.options.mode == ImportMode::SkipExisting {
            let existing = ContentLocator::new(self.store)
                .find_by_title(&item.title)
                .await?;
            if let Some(existing) = existing {
                debug!(
                    "Content '{}' already exists (ID: {}), leaving it untouched.",
                    item.title, existing.id
                );
                return Ok(false);
            }
        }

        let record = build_record(item, image, vec![source, category]);
        let id = self.store.create_content(&record).await.map_err(|e| {
            error!("Failed to save content '{}': {e}", item.title);
            ImportError::from(e)
        })?;
        debug!("Created content '{}' (ID: {id}).", item.title);
        Ok(true)
    }
}

/// Maps a feed item onto a new article record.
pub fn build_record(item: &FeedItem, image: FileId, tags: Vec<TermId>) -> NewContentRecord {
    NewContentRecord {
        content_type: ARTICLE_CONTENT_TYPE.to_string(),
        published: true,
        owner_id: IMPORT_OWNER_ID,
        title: item.title.clone(),
        guid: item.guid.clone(),
        link: item.link.clone(),
        created: item.published,
        changed: item.published,
        body: Body {
            summary: item.description.clone(),
            value: item.encoded.clone(),
            format: BODY_FORMAT.to_string(),
        },
        image: Some(image),
        tags,
    }
}
