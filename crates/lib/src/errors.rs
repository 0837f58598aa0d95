use thiserror::Error;

/// Failures raised by a `ContentStore` implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to connect to storage: {0}")]
    Connection(String),
    #[error("Database operation failed: {0}")]
    Database(#[from] turso::Error),
    #[error("Unexpected value in column '{column}': {detail}")]
    UnexpectedValue { column: &'static str, detail: String },
}

/// Failures while fetching or parsing the feed document as a whole.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed: {0}")]
    Fetch(String),
    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

/// A single `<item>` could not be turned into a `FeedItem`.
///
/// `position` is the zero-based index of the item in document order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemParseError {
    #[error("Item #{position} is missing required field '{field}'")]
    MissingField {
        position: usize,
        field: &'static str,
    },
    #[error("Item #{position} has an unparseable publish date '{value}'")]
    InvalidDate { position: usize, value: String },
}

impl ItemParseError {
    pub fn position(&self) -> usize {
        match self {
            ItemParseError::MissingField { position, .. } => *position,
            ItemParseError::InvalidDate { position, .. } => *position,
        }
    }
}

/// Failures while retrieving an image into the managed files directory.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Request for '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request for '{url}' returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Cannot derive a file name from '{0}'")]
    InvalidUrl(String),
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to register managed file: {0}")]
    Storage(#[from] StorageError),
}

/// The error type returned by a migration run. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid feed URL '{url}': {reason}")]
    FeedUrl { url: String, reason: String },
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    ItemParse(#[from] ItemParseError),
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),
    #[error("Image download failed: {0}")]
    Download(#[from] DownloadError),
}
