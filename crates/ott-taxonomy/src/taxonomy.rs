//! Typed view over the OTT taxonomy table

use crate::table::Table;
use ott_common::{OttError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rank whose descendants are "subordinate" (subspecies, varieties, forms, ...)
pub const SPECIES_RANK: &str = "species";

/// Identifier of a taxon
pub type TaxonId = i64;

/// One row of the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    /// OTT identifier (e.g., 770315 for Homo sapiens)
    pub uid: TaxonId,
    /// Parent identifier; `None` for the root
    pub parent_uid: Option<TaxonId>,
    /// Scientific name, when the table carries one
    pub name: Option<String>,
    /// Taxonomic rank (e.g., "species", "genus", "no rank")
    pub rank: String,
}

impl Taxon {
    pub fn new(uid: TaxonId, parent_uid: Option<TaxonId>, rank: impl Into<String>) -> Self {
        Self {
            uid,
            parent_uid,
            name: None,
            rank: rank.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_species(&self) -> bool {
        self.rank == SPECIES_RANK
    }
}

/// The taxonomy table: raw columns plus typed rows
///
/// The first row is the root of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyTable {
    table: Table,
    taxa: Vec<Taxon>,
}

impl TaxonomyTable {
    /// An empty table, as held by a download-only dataset
    pub fn empty() -> Self {
        Self::default()
    }

    /// Type the rows of a parsed taxonomy table
    ///
    /// Requires `uid`, `parent_uid` and `rank` columns. An empty `parent_uid`
    /// cell means "no parent".
    pub fn from_table(table: Table) -> Result<Self> {
        let column = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| OttError::parse(format!("Taxonomy table has no '{name}' column")))
        };
        let uid_col = column("uid")?;
        let parent_col = column("parent_uid")?;
        let rank_col = column("rank")?;
        let name_col = table.column_index("name");

        let taxa = table
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| -> Result<Taxon> {
                // +2: one for the header, one for 1-based lines
                let line = index + 2;
                let uid = parse_id(&row[uid_col], "uid", line)?
                    .ok_or_else(|| OttError::parse(format!("Line {line}: empty uid")))?;
                let parent_uid = parse_id(&row[parent_col], "parent_uid", line)?;

                Ok(Taxon {
                    uid,
                    parent_uid,
                    name: name_col.map(|i| row[i].clone()).filter(|n| !n.is_empty()),
                    rank: row[rank_col].trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { table, taxa })
    }

    /// Build a table from taxa, e.g. for synthetic taxonomies
    pub fn from_taxa(taxa: Vec<Taxon>) -> Self {
        let columns = ["uid", "parent_uid", "name", "rank"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = taxa
            .iter()
            .map(|taxon| {
                vec![
                    taxon.uid.to_string(),
                    taxon.parent_uid.map(|p| p.to_string()).unwrap_or_default(),
                    taxon.name.clone().unwrap_or_default(),
                    taxon.rank.clone(),
                ]
            })
            .collect();

        Self {
            table: Table::new(columns, rows),
            taxa,
        }
    }

    /// The underlying string table
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn taxa(&self) -> &[Taxon] {
        &self.taxa
    }

    pub fn root(&self) -> Option<&Taxon> {
        self.taxa.first()
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    pub fn get(&self, uid: TaxonId) -> Option<&Taxon> {
        self.taxa.iter().find(|t| t.uid == uid)
    }

    /// Number of distinct `uid` values
    pub fn unique_uid_count(&self) -> usize {
        self.taxa.iter().map(|t| t.uid).collect::<HashSet<_>>().len()
    }

    /// Identifiers of every species-rank taxon
    pub fn species(&self) -> impl Iterator<Item = TaxonId> + '_ {
        self.taxa.iter().filter(|t| t.is_species()).map(|t| t.uid)
    }

    /// Check the tree invariants: unique uids, a parentless first row, and a
    /// known parent for every other row
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.taxa.len());
        for taxon in &self.taxa {
            if !seen.insert(taxon.uid) {
                return Err(OttError::parse(format!("Duplicate uid {}", taxon.uid)));
            }
        }

        let Some((root, rest)) = self.taxa.split_first() else {
            return Ok(());
        };

        if root.parent_uid.is_some_and(|p| p != root.uid) {
            return Err(OttError::parse(format!(
                "First row {} is not a root: parent {:?}",
                root.uid, root.parent_uid
            )));
        }

        for taxon in rest {
            match taxon.parent_uid {
                None => {
                    return Err(OttError::parse(format!(
                        "Taxon {} has no parent but is not the root",
                        taxon.uid
                    )))
                },
                Some(parent) if !seen.contains(&parent) => {
                    return Err(OttError::parse(format!(
                        "Taxon {} references unknown parent {}",
                        taxon.uid, parent
                    )))
                },
                Some(_) => {},
            }
        }

        Ok(())
    }
}

fn parse_id(cell: &str, column: &str, line: usize) -> Result<Option<TaxonId>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }

    cell.parse()
        .map(Some)
        .map_err(|_| OttError::parse(format!("Line {line}: invalid {column} '{cell}'")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn raw_table(rows: &[[&str; 4]]) -> Table {
        Table::new(
            vec!["uid".into(), "parent_uid".into(), "name".into(), "rank".into()],
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_from_table() {
        let taxonomy = TaxonomyTable::from_table(raw_table(&[
            ["805080", "", "life", "no rank"],
            ["770315", "805080", "Homo sapiens", "species"],
        ]))
        .unwrap();

        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.root().unwrap().parent_uid, None);

        let human = taxonomy.get(770315).unwrap();
        assert_eq!(human.parent_uid, Some(805080));
        assert_eq!(human.name.as_deref(), Some("Homo sapiens"));
        assert!(human.is_species());
    }

    #[test]
    fn test_from_table_requires_columns() {
        let table = Table::new(vec!["uid".into(), "rank".into()], vec![]);
        let err = TaxonomyTable::from_table(table).unwrap_err();
        assert!(err.to_string().contains("parent_uid"));
    }

    #[test]
    fn test_from_table_rejects_non_integer_uid() {
        let err = TaxonomyTable::from_table(raw_table(&[["abc", "", "x", "no rank"]])).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_ids_wider_than_32_bits() {
        let taxonomy =
            TaxonomyTable::from_table(raw_table(&[["5000000000", "", "x", "no rank"]])).unwrap();
        assert_eq!(taxonomy.taxa()[0].uid, 5_000_000_000);
    }

    #[test]
    fn test_from_taxa_round_trips_through_table() {
        let taxonomy = TaxonomyTable::from_taxa(vec![
            Taxon::new(1, Some(1), "domain").with_name("Root"),
            Taxon::new(2, Some(1), "species"),
        ]);

        assert_eq!(taxonomy.table().value(0, "name"), Some("Root"));
        assert_eq!(taxonomy.table().value(1, "parent_uid"), Some("1"));
        assert_eq!(taxonomy.species().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_unique_uid_count() {
        let taxonomy = TaxonomyTable::from_taxa(vec![
            Taxon::new(1, None, "domain"),
            Taxon::new(2, Some(1), "kingdom"),
            Taxon::new(2, Some(1), "kingdom"),
        ]);
        assert_eq!(taxonomy.unique_uid_count(), 2);
        assert!(taxonomy.validate().is_err());
    }

    #[test]
    fn test_validate() {
        let valid = TaxonomyTable::from_taxa(vec![
            Taxon::new(1, Some(1), "domain"),
            Taxon::new(2, Some(1), "kingdom"),
        ]);
        assert!(valid.validate().is_ok());
        assert!(TaxonomyTable::empty().validate().is_ok());

        let orphan = TaxonomyTable::from_taxa(vec![
            Taxon::new(1, None, "domain"),
            Taxon::new(2, Some(9), "kingdom"),
        ]);
        assert!(orphan.validate().is_err());

        let second_root = TaxonomyTable::from_taxa(vec![
            Taxon::new(1, None, "domain"),
            Taxon::new(2, None, "domain"),
        ]);
        assert!(second_root.validate().is_err());
    }
}
