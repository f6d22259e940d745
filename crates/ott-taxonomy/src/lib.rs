//! OTT Taxonomy
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Download, cache and parse releases of the Open Tree of Life taxonomy.
//!
//! # Overview
//!
//! - **Registry**: packaged metadata of every supported release ([`registry`])
//! - **Settings**: resolve a release into download objectives ([`DatasetSettings`])
//! - **Fetch**: retrieve and unpack release archives ([`fetch`])
//! - **Loading**: read `taxonomy.tsv` and `synonyms.tsv` into tables ([`loader`])
//! - **Graph**: parent-to-child graph and subgraph extraction ([`TaxonomyGraph`])
//!
//! # Example
//!
//! ```no_run
//! use ott_taxonomy::Dataset;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dataset = Dataset::load("ott3.6", "downloads", false).await?;
//!
//!     // Homo, without subspecies
//!     let homo = dataset.subgraph(770309, false)?;
//!     println!("{} taxa under Homo", homo.node_count());
//!     Ok(())
//! }
//! ```

pub mod dataset;
pub mod fetch;
pub mod graph;
pub mod loader;
pub mod registry;
pub mod settings;
pub mod table;
pub mod taxonomy;

// Re-export commonly used types
pub use dataset::Dataset;
pub use graph::TaxonomyGraph;
pub use registry::available_versions;
pub use settings::{DatasetMetadata, DatasetSettings, DownloadObjective};
pub use table::Table;
pub use taxonomy::{Taxon, TaxonId, TaxonomyTable};
