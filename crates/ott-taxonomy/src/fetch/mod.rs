//! Fetching release archives
//!
//! The loader only needs the files to be on disk; how they get there is behind
//! the [`Fetcher`] trait. [`HttpFetcher`] is the default implementation:
//!
//! - skips objectives whose destination already exists
//! - streams to a `.part` file and renames on completion
//! - retries failed downloads with exponential backoff
//! - runs up to `workers` downloads concurrently
//! - unpacks `.tgz` archives into a sibling directory named after the archive
//!
//! # Example
//! ```no_run
//! use ott_taxonomy::fetch::{FetchConfig, Fetcher, HttpFetcher};
//! use ott_taxonomy::DatasetSettings;
//!
//! # async fn example() -> ott_common::Result<()> {
//! let settings = DatasetSettings::new("ott3.6")?;
//! let fetcher = HttpFetcher::new(FetchConfig::from_env()?)?;
//! fetcher.download(&settings.download_objectives()).await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod http;
pub mod progress;

pub use config::FetchConfig;
pub use http::HttpFetcher;

use crate::settings::DownloadObjective;
use async_trait::async_trait;
use ott_common::Result;

/// Retrieves download objectives onto local disk
///
/// Implementations must be idempotent: objectives already present on disk are
/// left untouched. Unrecoverable failures are returned, never swallowed.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn download(&self, objectives: &[DownloadObjective]) -> Result<()>;
}
