//! Packaged registry of OTT releases
//!
//! Each supported release is described by a JSON document under `versions/`,
//! embedded at compile time. A document names the remote archive (`url`) and
//! the directory layout the archive unpacks to (`layout`).
//!
//! ```json
//! { "url": "https://files.opentreeoflife.org/ott/ott3.6/ott3.6.tgz", "layout": "versioned" }
//! ```

use ott_common::{OttError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Asset key holding the taxonomy archive URL
pub const TAXONOMY_ASSET: &str = "url";

/// Embedded version documents, in release order
const VERSION_FILES: &[(&str, &str)] = &[
    ("ott2.8", include_str!("../versions/ott2.8.json")),
    ("ott2.9", include_str!("../versions/ott2.9.json")),
    ("ott2.10", include_str!("../versions/ott2.10.json")),
    ("ott3.0", include_str!("../versions/ott3.0.json")),
    ("ott3.1", include_str!("../versions/ott3.1.json")),
    ("ott3.2", include_str!("../versions/ott3.2.json")),
    ("ott3.3", include_str!("../versions/ott3.3.json")),
    ("ott3.4", include_str!("../versions/ott3.4.json")),
    ("ott3.5", include_str!("../versions/ott3.5.json")),
    ("ott3.6", include_str!("../versions/ott3.6.json")),
    ("ott3.7", include_str!("../versions/ott3.7.json")),
];

/// Top-level directory an OTT archive unpacks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveLayout {
    /// `<version>/taxonomy.tsv`
    #[default]
    Versioned,
    /// `ott/taxonomy.tsv`, used by early releases
    Ott,
}

impl ArchiveLayout {
    /// Name of the directory holding the TSV files for `version`
    pub fn directory_name<'a>(&self, version: &'a str) -> &'a str {
        match self {
            ArchiveLayout::Versioned => version,
            ArchiveLayout::Ott => "ott",
        }
    }
}

/// Metadata of one OTT release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Archive layout descriptor
    #[serde(default)]
    pub layout: ArchiveLayout,

    /// Downloadable assets keyed by entry name; always contains [`TAXONOMY_ASSET`]
    #[serde(flatten)]
    pub assets: BTreeMap<String, String>,
}

impl VersionMetadata {
    /// Parse a version document
    pub fn from_json(version: &str, json: &str) -> Result<Self> {
        let metadata: Self = serde_json::from_str(json)?;
        if !metadata.assets.contains_key(TAXONOMY_ASSET) {
            return Err(OttError::parse(format!(
                "Version {version} has no '{TAXONOMY_ASSET}' entry"
            )));
        }
        Ok(metadata)
    }

    /// URL of the taxonomy archive
    pub fn url(&self) -> &str {
        self.assets
            .get(TAXONOMY_ASSET)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// URL of a named asset
    pub fn asset(&self, entry: &str) -> Option<&str> {
        self.assets.get(entry).map(String::as_str)
    }

    /// Names of every downloadable asset
    pub fn asset_names(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }
}

/// Names of every packaged version, in release order
pub fn available_versions() -> Vec<String> {
    VERSION_FILES
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect()
}

/// Look up the metadata of a packaged version
pub fn lookup(version: &str) -> Result<VersionMetadata> {
    let (_, json) = VERSION_FILES
        .iter()
        .find(|(name, _)| *name == version)
        .ok_or_else(|| OttError::VersionNotFound {
            version: version.to_string(),
            available: available_versions(),
        })?;

    VersionMetadata::from_json(version, json)
}
