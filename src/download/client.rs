//! HTTP client wrapper for listing pages and file downloads.
//!
//! This module provides the `HttpClient` struct which fetches the listing page
//! as text and streams individual files to disk with timeout configuration
//! and error handling.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client for listing fetches and streaming downloads.
///
/// This client is designed to be created once and shared by every worker,
/// taking advantage of connection pooling. Cloning is cheap.
///
/// # Example
///
/// ```no_run
/// use dirget_core::download::HttpClient;
/// use std::path::Path;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let url = Url::parse("https://example.com/pub/paper.pdf")?;
/// let bytes = client.download_to_file(&url, Path::new("./download"), "paper.pdf").await?;
/// println!("Downloaded {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Request timeout: 5 minutes (for large files)
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the TLS backend or system
    /// configuration prevents building a client.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(DownloadError::client)?;
        Ok(Self { client })
    }

    /// Fetches the page at `url` and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request fails, the server answers with a
    /// non-success status, or the body cannot be read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &Url) -> Result<String, DownloadError> {
        let response = self.send_get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(url, e))?;
        debug!(bytes = body.len(), "fetched page");
        Ok(body)
    }

    /// Downloads `url` into `target_dir/filename`, returning bytes written.
    ///
    /// The file is created (or truncated) only after the server answered with
    /// a success status, so a 404 never touches the target directory. If the
    /// transfer fails midway the partial file is removed.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    #[must_use = "download result contains the number of bytes written"]
    #[instrument(skip(self, target_dir), fields(url = %url))]
    pub async fn download_to_file(
        &self,
        url: &Url,
        target_dir: &Path,
        filename: &str,
    ) -> Result<u64, DownloadError> {
        let response = self.send_get(url).await?;

        let file_path = target_dir.join(filename);
        let mut file = File::create(&file_path)
            .await
            .map_err(|e| DownloadError::io(file_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, response, url, &file_path).await;
        drop(file);

        if stream_result.is_err() {
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&file_path).await;
        }

        let bytes_written = stream_result?;
        debug!(path = %file_path.display(), bytes = bytes_written, "file written");
        Ok(bytes_written)
    }

    async fn send_get(&self, url: &Url) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }
        Ok(response)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn map_transport_error(url: &Url, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url.as_str())
    } else {
        DownloadError::network(url.as_str(), error)
    }
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &Url,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| map_transport_error(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_default_builds() {
        let client = HttpClient::default();
        let _ = client.inner();
    }

    #[test]
    fn test_http_client_with_custom_timeouts() {
        let client = HttpClient::with_timeouts(1, 2);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_text_connection_refused_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = HttpClient::with_timeouts(2, 2).unwrap();
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let result = client.fetch_text(&url).await;
        assert!(matches!(
            result,
            Err(DownloadError::Network { .. } | DownloadError::Timeout { .. })
        ));
    }
}
