//! Locating and reading the TSV files of an unpacked release
//!
//! Files live at `<downloads>/<version>/<layout dir>/{taxonomy,synonyms}.tsv`,
//! where the layout directory comes from the version's registry entry.

use crate::registry::ArchiveLayout;
use crate::settings::DatasetSettings;
use crate::table::Table;
use crate::taxonomy::TaxonomyTable;
use ott_common::{OttError, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

pub const TAXONOMY_FILE: &str = "taxonomy.tsv";
pub const SYNONYMS_FILE: &str = "synonyms.tsv";

/// On-disk locations of one release's tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePaths {
    pub taxonomy: PathBuf,
    pub synonyms: PathBuf,
}

impl ReleasePaths {
    pub fn new(downloads_directory: &Path, version: &str, layout: ArchiveLayout) -> Self {
        let directory = downloads_directory
            .join(version)
            .join(layout.directory_name(version));

        Self {
            taxonomy: directory.join(TAXONOMY_FILE),
            synonyms: directory.join(SYNONYMS_FILE),
        }
    }

    pub fn for_settings(settings: &DatasetSettings) -> Self {
        Self::new(
            settings.downloads_directory(),
            settings.version(),
            settings.version_metadata().layout,
        )
    }
}

/// The two tables of a release
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub taxonomy: TaxonomyTable,
    pub synonyms: Table,
}

/// Read and type `taxonomy.tsv`
pub fn load_taxonomy(path: &Path) -> Result<TaxonomyTable> {
    let table = read_table(path)?;
    TaxonomyTable::from_table(table).map_err(|e| match e {
        OttError::Parse(msg) => OttError::parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Read `synonyms.tsv`
pub fn load_synonyms(path: &Path) -> Result<Table> {
    read_table(path)
}

fn read_table(path: &Path) -> Result<Table> {
    Table::from_tsv_path(path)
        .map(Table::drop_junk_columns)
        .inspect_err(|e| {
            if e.is_not_found() {
                error!(
                    path = %path.display(),
                    "Expected file is missing; was the release fetched?"
                );
            }
        })
}

/// Load both tables of the release described by `settings`
///
/// Either both tables load or the call fails.
#[instrument(skip_all, fields(version = %settings.version()))]
pub fn load_release(settings: &DatasetSettings) -> Result<LoadedTables> {
    let paths = ReleasePaths::for_settings(settings);

    let taxonomy = load_taxonomy(&paths.taxonomy)?;
    let synonyms = load_synonyms(&paths.synonyms)?;

    info!(
        taxa = taxonomy.len(),
        synonyms = synonyms.len(),
        "Loaded release tables"
    );

    Ok(LoadedTables { taxonomy, synonyms })
}
