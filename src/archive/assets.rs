//! Document attachment downloads
//!
//! Attachments are fetched through the [`AssetFetcher`] seam so the crawl
//! loop can be driven without a network. [`download_asset`] never returns an
//! error: every failure is folded into a [`DownloadOutcome`] so one broken
//! attachment cannot affect its siblings.

use super::sanitize::safe_file_name;
use crate::config::{AssetConfig, BrowserConfig};
use crate::url::{file_basename, has_document_extension};
use crate::{ArchiveError, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Fetches the raw body of an attachment
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Builds the HTTP client used for attachments
///
/// Sends the same user agent and Accept-Language as the browser. The request
/// timeout matches the page navigation timeout.
pub fn build_http_client(config: &BrowserConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Ok(value) = reqwest::header::HeaderValue::from_str(&config.accept_language) {
        headers.insert(reqwest::header::ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_millis(config.navigation_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`AssetFetcher`] over a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Download {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Which links are attachments, and which attachments are never fetched
#[derive(Debug, Clone)]
pub struct AssetPolicy {
    extensions: Vec<String>,
    excluded_filenames: Vec<String>,
}

impl AssetPolicy {
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excluded_filenames: config.excluded_filenames.clone(),
        }
    }

    /// True if the link's path ends in a document extension, ignoring case
    pub fn is_asset(&self, url: &Url) -> bool {
        has_document_extension(url, &self.extensions)
    }

    /// True if the raw file name is excluded
    pub fn is_excluded(&self, filename: &str) -> bool {
        self.excluded_filenames.iter().any(|name| name == filename)
    }
}

/// One attachment and the directory it is written into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: Url,
    pub dir: PathBuf,
}

impl DownloadTask {
    pub fn new(url: Url, dir: impl Into<PathBuf>) -> Self {
        Self {
            url,
            dir: dir.into(),
        }
    }
}

/// Result of a single attachment download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Written to the given path
    Saved(PathBuf),
    /// Excluded by policy; carries the file name
    Skipped(String),
    /// Fetch or write failed; carries the reason
    Failed(String),
}

/// Downloads one attachment into its task directory
///
/// The destination file name is the percent-decoded last URL path segment
/// with reserved characters replaced. Excluded names are skipped before any
/// request.
pub async fn download_asset(
    fetcher: &dyn AssetFetcher,
    policy: &AssetPolicy,
    task: &DownloadTask,
) -> DownloadOutcome {
    let Some(raw_name) = file_basename(&task.url) else {
        return DownloadOutcome::Failed("URL has no file name".to_string());
    };
    let filename = percent_decode_str(&raw_name).decode_utf8_lossy().into_owned();

    if policy.is_excluded(&filename) {
        return DownloadOutcome::Skipped(filename);
    }

    let body = match fetcher.fetch(&task.url).await {
        Ok(body) => body,
        Err(e) => return DownloadOutcome::Failed(e.to_string()),
    };

    let path = task.dir.join(safe_file_name(&filename));
    match tokio::fs::write(&path, &body).await {
        Ok(()) => DownloadOutcome::Saved(path),
        Err(e) => DownloadOutcome::Failed(format!("failed to write {}: {}", path.display(), e)),
    }
}
