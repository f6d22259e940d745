//! Settings for fetching and loading one OTT release
//!
//! [`DatasetSettings`] is an immutable value. Every `with_*` method consumes the
//! settings and returns a new value, so a settings instance can be shared and
//! specialised without callers observing each other's changes.

use crate::registry::{self, VersionMetadata, TAXONOMY_ASSET};
use ott_common::{OttError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default local directory for downloaded archives
pub const DEFAULT_DOWNLOADS_DIRECTORY: &str = "downloads";

/// A file to fetch: where it goes and where it comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadObjective {
    pub path: PathBuf,
    pub url: String,
}

impl DownloadObjective {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

/// Snapshot of the settings a dataset was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub version: String,
    pub version_metadata: VersionMetadata,
    pub verbose: bool,
    pub to_include: Vec<String>,
    pub downloads_directory: PathBuf,
}

/// Settings for constructing one version of the OTT taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSettings {
    version: String,
    version_metadata: VersionMetadata,
    verbose: bool,
    to_include: Vec<String>,
    downloads_directory: PathBuf,
    workers: Option<usize>,
}

impl DatasetSettings {
    /// Resolve `version` against the packaged registry
    pub fn new(version: &str) -> Result<Self> {
        let version_metadata = registry::lookup(version)?;

        Ok(Self {
            version: version.to_string(),
            version_metadata,
            verbose: false,
            to_include: vec![TAXONOMY_ASSET.to_string()],
            downloads_directory: PathBuf::from(DEFAULT_DOWNLOADS_DIRECTORY),
            workers: None,
        })
    }

    /// Names of every packaged version
    pub fn available_versions() -> Vec<String> {
        registry::available_versions()
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the directory downloads are written to
    pub fn with_downloads_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.downloads_directory = directory.into();
        self
    }

    /// Set the number of concurrent downloads
    ///
    /// Unset, the fetcher's own configuration decides. Zero is rejected as a
    /// configuration error when the fetcher is built.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Add an asset of the version to the download objectives
    pub fn including(mut self, entry: &str) -> Result<Self> {
        if self.version_metadata.asset(entry).is_none() {
            return Err(OttError::UnavailableEntry {
                entry: entry.to_string(),
                available: self.version_metadata.asset_names(),
            });
        }

        if !self.to_include.iter().any(|included| included == entry) {
            self.to_include.push(entry.to_string());
        }
        Ok(self)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn version_metadata(&self) -> &VersionMetadata {
        &self.version_metadata
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn downloads_directory(&self) -> &Path {
        &self.downloads_directory
    }

    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    /// Plan the downloads: one objective per included asset
    ///
    /// The local file name is the last path segment of the asset URL.
    pub fn download_objectives(&self) -> Vec<DownloadObjective> {
        self.to_include
            .iter()
            .filter_map(|entry| self.version_metadata.asset(entry))
            .map(|url| {
                let file_name = url.rsplit('/').next().unwrap_or(url);
                DownloadObjective::new(self.downloads_directory.join(file_name), url)
            })
            .collect()
    }

    /// Consume the settings into their metadata record
    pub fn into_metadata(self) -> DatasetMetadata {
        DatasetMetadata {
            version: self.version,
            version_metadata: self.version_metadata,
            verbose: self.verbose,
            to_include: self.to_include,
            downloads_directory: self.downloads_directory,
        }
    }

    /// Snapshot of these settings
    pub fn metadata(&self) -> DatasetMetadata {
        DatasetMetadata {
            version: self.version.clone(),
            version_metadata: self.version_metadata.clone(),
            verbose: self.verbose,
            to_include: self.to_include.clone(),
            downloads_directory: self.downloads_directory.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_available_version_builds_settings() {
        for version in DatasetSettings::available_versions() {
            let settings = DatasetSettings::new(&version).unwrap();
            assert_eq!(settings.version(), version);
        }
    }

    #[test]
    fn test_unknown_version() {
        let err = DatasetSettings::new("ott-latest").unwrap_err();
        assert_eq!(err.alternatives().unwrap(), DatasetSettings::available_versions());
    }

    #[test]
    fn test_defaults() {
        let settings = DatasetSettings::new("ott3.6").unwrap();
        assert!(!settings.verbose());
        assert_eq!(settings.downloads_directory(), Path::new("downloads"));
        assert_eq!(settings.workers(), None);
    }

    #[test]
    fn test_download_objectives() {
        let settings = DatasetSettings::new("ott3.6")
            .unwrap()
            .with_downloads_directory("/data/ott");

        let objectives = settings.download_objectives();
        assert_eq!(
            objectives,
            vec![DownloadObjective::new(
                "/data/ott/ott3.6.tgz",
                "https://files.opentreeoflife.org/ott/ott3.6/ott3.6.tgz"
            )]
        );
    }

    #[test]
    fn test_builder_returns_new_value() {
        let base = DatasetSettings::new("ott3.5").unwrap();
        let verbose = base.clone().with_verbose(true).with_workers(4);

        assert!(!base.verbose());
        assert_eq!(base.workers(), None);
        assert!(verbose.verbose());
        assert_eq!(verbose.workers(), Some(4));
    }

    #[test]
    fn test_including_unknown_entry() {
        let err = DatasetSettings::new("ott3.6")
            .unwrap()
            .including("checksum_url")
            .unwrap_err();

        match err {
            OttError::UnavailableEntry { entry, available } => {
                assert_eq!(entry, "checksum_url");
                assert_eq!(available, vec!["url".to_string()]);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_including_is_idempotent() {
        let settings = DatasetSettings::new("ott3.6").unwrap().including("url").unwrap();
        assert_eq!(settings.download_objectives().len(), 1);
    }

    #[test]
    fn test_metadata_snapshot() {
        let metadata = DatasetSettings::new("ott2.8")
            .unwrap()
            .with_verbose(true)
            .metadata();

        assert_eq!(metadata.version, "ott2.8");
        assert!(metadata.verbose);
        assert_eq!(metadata.to_include, vec!["url".to_string()]);
    }

    #[test]
    fn test_into_metadata_matches_snapshot() {
        let settings = DatasetSettings::new("ott3.1")
            .unwrap()
            .with_downloads_directory("/data");
        let snapshot = settings.metadata();
        assert_eq!(settings.into_metadata(), snapshot);
    }
}
