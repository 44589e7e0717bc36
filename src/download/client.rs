//! HTTP client for downloading record images.
//!
//! This module provides the [`AssetDownloader`] struct which streams an image
//! to `{images_dir}/{id}{ext}` with its own (longer) timeout, and the
//! [`AssetSink`] trait the pipeline uses to talk to it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, DOWNLOAD_TIMEOUT_SECS};
use super::error::DownloadError;
use super::filename::{choose_extension, display_image_url, image_filename};
use crate::catalog::RecordId;
use crate::user_agent;

/// A destination for record images.
///
/// The pipeline depends on this trait rather than on [`AssetDownloader`] so
/// runs can be exercised without a network.
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Downloads the image at `url` for record `id` and returns the local
    /// file name it was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on any transport, status, or filesystem failure.
    async fn download(&self, url: &str, id: RecordId) -> Result<String, DownloadError>;
}

/// Streaming image downloader.
///
/// This client is designed to be created once and reused for every record,
/// taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use harvester_core::download::{AssetDownloader, AssetSink};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = AssetDownloader::new("./images");
/// let name = downloader
///     .download("https://images.example.org/CRDImages/ep/original/DT1567.jpg", 436_535)
///     .await?;
/// println!("Saved as: {name}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: Client,
    images_dir: PathBuf,
}

impl AssetDownloader {
    /// Creates a downloader writing into `images_dir` with the default timeout.
    #[must_use]
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self::with_timeout(images_dir, Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
    }

    /// Creates a downloader with an explicit total request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeout(images_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            images_dir: images_dir.into(),
        }
    }

    /// Returns the directory images are written to.
    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}

#[async_trait]
impl AssetSink for AssetDownloader {
    #[instrument(skip(self), fields(images_dir = %self.images_dir.display()))]
    async fn download(&self, url: &str, id: RecordId) -> Result<String, DownloadError> {
        let url = display_image_url(url);
        Url::parse(&url).map_err(|_| DownloadError::invalid_url(id, &url))?;

        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| DownloadError::io(id, &self.images_dir, e))?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DownloadError::from_transport(id, &url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(id, &url, status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let extension = choose_extension(content_type.as_deref(), &url);
        let filename = image_filename(id, extension);
        let file_path = self.images_dir.join(&filename);
        debug!(content_type = ?content_type, path = %file_path.display(), "resolved image path");

        let mut file = File::create(&file_path)
            .await
            .map_err(|e| DownloadError::io(id, &file_path, e))?;

        // Stream response body to file, with cleanup on error
        let stream_result = stream_to_file(&mut file, response, id, &url, &file_path).await;
        if stream_result.is_err() {
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(&file_path).await;
        }
        let bytes = stream_result?;

        info!(id, path = %file_path.display(), bytes, "downloaded image");
        Ok(filename)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    id: RecordId,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_transport(id, url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(id, file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(id, file_path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_requests_display_rendition() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/CRDImages/ep/web-large/DT1567.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/jpeg")
                    .set_body_bytes(b"jpeg bytes".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let downloader = AssetDownloader::new(temp_dir.path());
        let url = format!("{}/CRDImages/ep/original/DT1567.jpg", server.uri());
        let name = downloader.download(&url, 436_535).await.unwrap();

        assert_eq!(name, "436535.jpg");
        assert_eq!(
            std::fs::read(temp_dir.path().join("436535.jpg")).unwrap(),
            b"jpeg bytes"
        );
    }

    #[tokio::test]
    async fn test_download_uses_content_type_extension() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/img/7.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/png")
                    .set_body_bytes(b"png bytes".to_vec()),
            )
            .mount(&server)
            .await;

        let downloader = AssetDownloader::new(temp_dir.path());
        let name = downloader
            .download(&format!("{}/img/7.jpg", server.uri()), 7)
            .await
            .unwrap();
        assert_eq!(name, "7.png");
    }

    #[tokio::test]
    async fn test_download_creates_missing_images_dir() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        let images_dir = temp_dir.path().join("nested").join("images");

        Mock::given(method("GET"))
            .and(path("/img/1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
            .mount(&server)
            .await;

        let downloader = AssetDownloader::new(&images_dir);
        let name = downloader
            .download(&format!("{}/img/1", server.uri()), 1)
            .await
            .unwrap();

        assert_eq!(name, "1.jpg");
        assert!(images_dir.join("1.jpg").exists());
    }

    #[tokio::test]
    async fn test_download_404_returns_http_status_and_writes_nothing() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/img/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let downloader = AssetDownloader::new(temp_dir.path());
        let result = downloader
            .download(&format!("{}/img/missing.jpg", server.uri()), 2)
            .await;

        match result {
            Err(DownloadError::HttpStatus { id: 2, status: 404, .. }) => {}
            other => panic!("Expected HttpStatus 404, got: {other:?}"),
        }
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_invalid_url() {
        let temp_dir = TempDir::new().unwrap();
        let downloader = AssetDownloader::new(temp_dir.path());
        let result = downloader.download("not-a-valid-url", 4).await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { id: 4, .. })));
    }

    #[tokio::test]
    async fn test_download_timeout() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/img/slow.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"slow".to_vec())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let downloader = AssetDownloader::with_timeout(temp_dir.path(), Duration::from_millis(200));
        let result = downloader
            .download(&format!("{}/img/slow.jpg", server.uri()), 5)
            .await;
        assert!(matches!(result, Err(DownloadError::Timeout { id: 5, .. })));
    }
}
