//! # Core Types
//!
//! Identifiers and records shared by the importer, the reconciler and the
//! storage providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// The persisted id of a taxonomy term.
    TermId
);
id_type!(
    /// The persisted id of a content record.
    ContentId
);
id_type!(
    /// An opaque handle to a managed file.
    FileId
);

/// The body field of a content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub summary: String,
    pub value: String,
    pub format: String,
}

/// A content record as built by the importer, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContentRecord {
    pub content_type: String,
    pub published: bool,
    pub owner_id: i64,
    pub title: String,
    pub guid: String,
    pub link: String,
    pub created: i64,
    pub changed: i64,
    pub body: Body,
    pub image: Option<FileId>,
    /// Tag references in attachment order.
    pub tags: Vec<TermId>,
}

/// A persisted content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: ContentId,
    pub content_type: String,
    pub published: bool,
    pub owner_id: i64,
    pub title: String,
    pub guid: String,
    pub link: String,
    pub created: i64,
    pub changed: i64,
    pub body: Body,
    pub image: Option<FileId>,
    pub tags: Vec<TermId>,
}

/// A downloaded file to be registered with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManagedFile {
    /// Destination relative to the files directory, e.g. `articles/photo.jpg`.
    pub uri: String,
    pub source_url: String,
    pub filename: String,
    pub size: u64,
}

/// What the importer does when a content record with the item's title
/// already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Leave the existing record untouched.
    #[default]
    SkipExisting,
    /// Create a new record regardless. Repeated runs produce duplicates.
    AlwaysCreate,
}

/// What the importer does when a feed item fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemErrorPolicy {
    /// Abort the whole run on the first bad item.
    #[default]
    Abort,
    /// Log the bad item and continue with the next one.
    Skip,
}

/// Error returned when parsing an option value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub value: String,
    pub expected: &'static [&'static str],
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown value '{}', expected one of: {}",
            self.value,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for ImportMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip-existing" => Ok(ImportMode::SkipExisting),
            "always-create" => Ok(ImportMode::AlwaysCreate),
            _ => Err(UnknownVariant {
                value: s.to_string(),
                expected: &["skip-existing", "always-create"],
            }),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::SkipExisting => f.write_str("skip-existing"),
            ImportMode::AlwaysCreate => f.write_str("always-create"),
        }
    }
}

impl FromStr for ItemErrorPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ItemErrorPolicy::Abort),
            "skip" => Ok(ItemErrorPolicy::Skip),
            _ => Err(UnknownVariant {
                value: s.to_string(),
                expected: &["abort", "skip"],
            }),
        }
    }
}

impl fmt::Display for ItemErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemErrorPolicy::Abort => f.write_str("abort"),
            ItemErrorPolicy::Skip => f.write_str("skip"),
        }
    }
}
