//! # Managed File Retrieval
//!
//! Downloads article images into `<files_dir>/articles/` and registers each
//! one with the content store. A download to a destination that already
//! exists replaces the file on disk and reuses the existing registration.

use crate::constants::{
    ARTICLE_FILES_SUBDIR, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::DownloadError;
use crate::providers::db::storage::ContentStore;
use crate::types::{FileId, NewManagedFile};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

/// Timeouts applied to every outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl HttpSettings {
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
    }
}

#[async_trait]
pub trait FileRetriever: Send + Sync {
    /// Retrieves the file at `url` and returns its managed file handle.
    async fn retrieve(&self, url: &str) -> Result<FileId, DownloadError>;
}

/// Derives the on-disk file name from the last non-empty path segment of
/// `url`.
pub fn file_name_from_url(url: &str) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::InvalidUrl(url.to_string()))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|name| *name != "." && *name != "..")
        .map(str::to_string)
        .ok_or_else(|| DownloadError::InvalidUrl(url.to_string()))
}

/// Writes `bytes` to `dir/filename` through a temporary file, replacing any
/// existing file at that path.
pub fn write_replacing(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
    fs::create_dir_all(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|e| DownloadError::Io(e.error))?;
    Ok(target)
}

/// A `FileRetriever` that downloads over HTTP.
pub struct HttpFileRetriever {
    client: reqwest::Client,
    files_dir: PathBuf,
    store: Box<dyn ContentStore>,
}

impl HttpFileRetriever {
    /// Creates a retriever writing under `files_dir` and registering files
    /// with `store`.
    pub fn new(
        files_dir: impl Into<PathBuf>,
        store: Box<dyn ContentStore>,
        settings: &HttpSettings,
    ) -> Result<Self, DownloadError> {
        let client = settings.build_client().map_err(DownloadError::ClientBuild)?;
        Ok(Self {
            client,
            files_dir: files_dir.into(),
            store,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FileRetriever for HttpFileRetriever {
    async fn retrieve(&self, url: &str) -> Result<FileId, DownloadError> {
        let filename = file_name_from_url(url)?;
        debug!("Downloading image from: {url}");
        let bytes = self.download(url).await?;

        let dir = self.files_dir.join(ARTICLE_FILES_SUBDIR);
        let path = write_replacing(&dir, &filename, &bytes)?;
        info!("Saved {} bytes to '{}'.", bytes.len(), path.display());

        let file = NewManagedFile {
            uri: format!("{ARTICLE_FILES_SUBDIR}/{filename}"),
            source_url: url.to_string(),
            filename,
            size: bytes.len() as u64,
        };
        Ok(self.store.register_file(&file).await?)
    }
}
