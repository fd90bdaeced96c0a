//! Archive transport and the local archive cache.

mod cache;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::path::Path;

use crate::error::LipError;
use crate::http::HttpClient;
use crate::runtime::Runtime;

pub use cache::{CacheInfo, ToothCache};

/// Fetches archive bytes into a local file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Write the content at `url` to `dest`. Fails with `DownloadFailed`.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`Downloader`] over HTTP, writing through the runtime.
pub struct HttpDownloader<'a, R: Runtime> {
    runtime: &'a R,
    http_client: HttpClient,
}

impl<'a, R: Runtime> HttpDownloader<'a, R> {
    pub fn new(runtime: &'a R, http_client: HttpClient) -> Self {
        Self {
            runtime,
            http_client,
        }
    }
}

#[async_trait]
impl<R: Runtime> Downloader for HttpDownloader<'_, R> {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        download_file(self.runtime, url, dest, &self.http_client)
            .await
            .map_err(|e| {
                LipError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("{:#}", e),
                }
                .into()
            })
    }
}

/// Downloads a file from a URL to a temporary path with retry support.
#[tracing::instrument(skip(runtime, temp_path, http_client))]
pub async fn download_file<R: Runtime>(
    runtime: &R,
    url: &str,
    temp_path: &Path,
    http_client: &HttpClient,
) -> Result<()> {
    info!("Downloading {}...", url);

    let temp_path = temp_path.to_path_buf();
    http_client
        .download_file(url, || {
            runtime
                .create_file(&temp_path)
                .with_context(|| format!("Failed to create temporary file at {:?}", temp_path))
        })
        .await?;

    Ok(())
}
