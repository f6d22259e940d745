//! HTTP fetcher with retries, concurrency and archive unpacking

use super::archive::{self, with_part_suffix};
use super::progress::download_progress;
use super::{FetchConfig, Fetcher};
use crate::settings::DownloadObjective;
use async_trait::async_trait;
use futures::{stream, FutureExt, StreamExt, TryStreamExt};
use indicatif::HumanBytes;
use ott_common::{OttError, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Default [`Fetcher`] downloading over HTTP(S)
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with configuration
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| OttError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Make one objective available on disk, unpacking it if it is an archive
    #[instrument(skip_all, fields(url = %objective.url, path = %objective.path.display()))]
    async fn fetch_one(&self, objective: &DownloadObjective) -> Result<()> {
        if objective.path.is_file() {
            debug!("Already downloaded, skipping");
        } else {
            if let Some(parent) = objective.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let bytes = self.download_with_retry(&objective.url, &objective.path).await?;
            info!(size = %HumanBytes(bytes), "Downloaded");
        }

        if self.config.extract_archives && archive::is_archive(&objective.path) {
            archive::unpack_if_missing(&objective.path).await?;
        }

        Ok(())
    }

    /// Download `url` to `destination`, retrying with exponential backoff
    async fn download_with_retry(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            match self.download_file(url, destination).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    warn!("Download attempt {}/{} failed: {}", attempt, self.config.max_retries, e);
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        let backoff = self.config.backoff(attempt);
                        info!("Retrying in {:?}...", backoff);
                        tokio::time::sleep(backoff).await;
                    }
                },
            }
        }

        Err(last_error.unwrap_or_else(|| {
            OttError::network(format!("Download of {url} was never attempted"))
        }))
    }

    /// Stream `url` into `<destination>.part`, then rename into place
    async fn download_file(&self, url: &str, destination: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| OttError::network(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(OttError::network(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let file_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let pb = download_progress(
            response.content_length().unwrap_or(0),
            &format!("Downloading {file_name}"),
            self.config.verbose,
        );

        let partial = with_part_suffix(destination);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut downloaded = 0u64;
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk =
                chunk.map_err(|e| OttError::network(format!("Reading {url} failed: {e}")))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, destination).await?;

        pb.finish_with_message(format!("Downloaded {file_name}"));
        Ok(downloaded)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn download(&self, objectives: &[DownloadObjective]) -> Result<()> {
        info!(
            objectives = objectives.len(),
            workers = self.config.workers,
            "Fetching release files"
        );

        // Collected eagerly: a lazy map does not satisfy the async-trait future's bounds
        let fetches: Vec<_> = objectives
            .iter()
            .map(|objective| self.fetch_one(objective).boxed())
            .collect();

        stream::iter(fetches)
            .buffer_unordered(self.config.workers)
            .try_collect::<Vec<()>>()
            .await?;

        Ok(())
    }
}
