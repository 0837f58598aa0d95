//! # Shared Constants
//!
//! Fixed values used when mapping feed items onto content records, plus the
//! defaults for the local database and files directory.

/// The content type every imported record is stored as.
pub const ARTICLE_CONTENT_TYPE: &str = "article";

/// The vocabulary both derived terms (source and category) are placed in.
pub const TAGS_VOCABULARY: &str = "tags";

/// The owner assigned to imported content.
pub const IMPORT_OWNER_ID: i64 = 1;

/// The text format marker stored alongside the body HTML.
pub const BODY_FORMAT: &str = "full_html";

/// Subdirectory of the files directory that downloaded images land in.
pub const ARTICLE_FILES_SUBDIR: &str = "articles";

/// The default path for the application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/feedsync.db";

/// The default root for managed files.
pub const DEFAULT_FILES_DIR: &str = "files";

/// Default HTTP connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
