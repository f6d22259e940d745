//! The OTT taxonomy dataset
//!
//! A [`Dataset`] owns the taxonomy and synonym tables of one release plus a
//! snapshot of the settings it was built from. It is either *download-only*
//! (files fetched, tables empty) or *loaded*.

use crate::fetch::{FetchConfig, Fetcher, HttpFetcher};
use crate::graph::TaxonomyGraph;
use crate::loader;
use crate::settings::{DatasetMetadata, DatasetSettings};
use crate::table::Table;
use crate::taxonomy::{TaxonId, TaxonomyTable};
use ott_common::Result;
use std::path::PathBuf;
use tracing::{info, instrument};

/// One release of the OTT taxonomy
#[derive(Debug, Clone)]
pub struct Dataset {
    taxonomy: TaxonomyTable,
    synonyms: Table,
    metadata: DatasetMetadata,
}

impl Dataset {
    /// Assemble a dataset from tables already in memory
    pub fn from_tables(
        metadata: DatasetMetadata,
        taxonomy: TaxonomyTable,
        synonyms: Table,
    ) -> Self {
        Self {
            taxonomy,
            synonyms,
            metadata,
        }
    }

    /// Fetch the release files with the default HTTP fetcher, without loading them
    pub async fn download(settings: DatasetSettings) -> Result<Self> {
        let fetcher = default_fetcher(&settings)?;
        Self::download_with(settings, &fetcher).await
    }

    /// Fetch the release files with `fetcher`, without loading them
    #[instrument(skip_all, fields(version = %settings.version()))]
    pub async fn download_with<F: Fetcher + ?Sized>(
        settings: DatasetSettings,
        fetcher: &F,
    ) -> Result<Self> {
        fetcher.download(&settings.download_objectives()).await?;
        info!("Release files available");

        Ok(Self::from_tables(
            settings.into_metadata(),
            TaxonomyTable::empty(),
            Table::default(),
        ))
    }

    /// Fetch with the default HTTP fetcher, then load both tables
    pub async fn build(settings: DatasetSettings) -> Result<Self> {
        let fetcher = default_fetcher(&settings)?;
        Self::build_with(settings, &fetcher).await
    }

    /// Fetch with `fetcher`, then load both tables
    pub async fn build_with<F: Fetcher + ?Sized>(
        settings: DatasetSettings,
        fetcher: &F,
    ) -> Result<Self> {
        fetcher.download(&settings.download_objectives()).await?;
        Self::from_disk(&settings)
    }

    /// Resolve `version`, fetch it into `downloads_directory` and load it
    ///
    /// # Example
    /// ```no_run
    /// use ott_taxonomy::Dataset;
    ///
    /// # async fn example() -> ott_common::Result<()> {
    /// let dataset = Dataset::load("ott3.6", "downloads", true).await?;
    /// let graph = dataset.to_graph()?;
    /// println!("{} taxa, {} edges", graph.node_count(), graph.edge_count());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(
        version: &str,
        downloads_directory: impl Into<PathBuf>,
        verbose: bool,
    ) -> Result<Self> {
        let settings = DatasetSettings::new(version)?
            .with_downloads_directory(downloads_directory)
            .with_verbose(verbose);
        Self::build(settings).await
    }

    /// Load a release that is already on disk
    pub fn from_disk(settings: &DatasetSettings) -> Result<Self> {
        let tables = loader::load_release(settings)?;
        Ok(Self::from_tables(
            settings.metadata(),
            tables.taxonomy,
            tables.synonyms,
        ))
    }

    pub fn get_taxonomy(&self) -> &TaxonomyTable {
        &self.taxonomy
    }

    pub fn get_synonyms(&self) -> &Table {
        &self.synonyms
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    /// Whether the taxonomy table holds any rows
    pub fn is_loaded(&self) -> bool {
        !self.taxonomy.is_empty()
    }

    /// Build the full parent-to-child graph
    pub fn to_graph(&self) -> Result<TaxonomyGraph> {
        TaxonomyGraph::from_taxonomy(&self.taxonomy)
    }

    /// Subgraph rooted at `node`
    ///
    /// With `keep_subordinate_rank` unset, descendants of every species in the
    /// taxonomy are removed from the graph before the descendants of `node`
    /// are collected. A `node` that is itself removed this way is reported as
    /// [`ott_common::OttError::TaxonNotFound`].
    pub fn subgraph(&self, node: TaxonId, keep_subordinate_rank: bool) -> Result<TaxonomyGraph> {
        let mut graph = self.to_graph()?;

        if !keep_subordinate_rank {
            graph.prune_subordinate_ranks(self.taxonomy.species());
        }

        graph.descendant_subgraph(node)
    }
}

fn default_fetcher(settings: &DatasetSettings) -> Result<HttpFetcher> {
    let mut config = FetchConfig::from_env()?.with_verbose(settings.verbose());
    if let Some(workers) = settings.workers() {
        config = config.with_workers(workers);
    }
    HttpFetcher::new(config)
}
