//! In-memory string tables read from OTT TSV files
//!
//! # File Format
//! OTT tables are tab-delimited with a literal `|` column between every pair of
//! real columns, and a trailing `\t|\t` on each line:
//!
//! ```text
//! uid	|	parent_uid	|	name	|	rank	|	sourceinfo	|	uniqname	|	flags	|
//! 805080	|		|	life	|	no rank	|		|		|		|
//! ```
//!
//! Those separator columns and the unnamed trailing column carry no data and
//! are dropped by [`Table::drop_junk_columns`].

use ott_common::{OttError, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Whether a header names a separator or padding column
///
/// Recognises the raw `|` and empty headers as well as the de-duplicated
/// spellings other TSV readers produce (`|.1`, `Unnamed: 14`).
pub fn is_junk_column(name: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || name == "|"
        || name
            .strip_prefix("|.")
            .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
        || name.starts_with("Unnamed: ")
}

/// Column names plus rows of string cells
///
/// Every row holds exactly `columns().len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding short rows with empty cells and truncating long ones
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Parse tab-separated text with a header row
    ///
    /// Quotes are not special: OTT names may contain `"` characters.
    pub fn from_tsv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut tsv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let columns: Vec<String> = tsv
            .headers()
            .map_err(|e| OttError::parse(format!("Invalid TSV header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in tsv.records() {
            let record = record.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                OttError::parse(format!("Invalid TSV record at line {line}: {e}"))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(columns, rows))
    }

    /// Parse a TSV file
    ///
    /// A missing file surfaces as [`OttError::Io`] with kind `NotFound`.
    pub fn from_tsv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_tsv_reader(std::io::BufReader::new(file))
            .map_err(|e| match e {
                OttError::Parse(msg) => OttError::parse(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;

        debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            "Read TSV"
        );
        Ok(table)
    }

    /// Remove every column for which `predicate` returns true
    pub fn drop_columns<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let keep: Vec<bool> = self.columns.iter().map(|c| !predicate(c)).collect();
        if keep.iter().all(|k| *k) {
            return self;
        }

        let retain = |cells: Vec<String>| -> Vec<String> {
            cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(cell, keep)| keep.then_some(cell))
                .collect()
        };

        self.columns = retain(self.columns);
        self.rows = self.rows.into_iter().map(retain).collect();
        self
    }

    /// Remove separator and padding columns
    pub fn drop_junk_columns(self) -> Self {
        self.drop_columns(is_junk_column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of a named column, in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// A single cell
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TAXONOMY: &str = "uid\t|\tparent_uid\t|\tname\t|\trank\t|\tsourceinfo\t|\tuniqname\t|\tflags\t|\t\n\
805080\t|\t\t|\tlife\t|\tno rank\t|\t\t|\t\t|\t\t|\t\n\
93302\t|\t805080\t|\tcellular organisms\t|\tno rank\t|\tncbi:131567\t|\t\t|\t\t|\t\n";

    #[test]
    fn test_is_junk_column() {
        assert!(is_junk_column("|"));
        assert!(is_junk_column("|.6"));
        assert!(is_junk_column(""));
        assert!(is_junk_column("Unnamed: 14"));
        assert!(!is_junk_column("uid"));
        assert!(!is_junk_column("|.x"));
    }

    #[test]
    fn test_parse_ott_taxonomy() {
        let table = Table::from_tsv_reader(TAXONOMY.as_bytes()).unwrap();

        assert_eq!(table.columns().len(), 15);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "name"), Some("cellular organisms"));
    }

    #[test]
    fn test_drop_junk_columns() {
        let table = Table::from_tsv_reader(TAXONOMY.as_bytes())
            .unwrap()
            .drop_junk_columns();

        assert_eq!(
            table.columns(),
            &["uid", "parent_uid", "name", "rank", "sourceinfo", "uniqname", "flags"]
        );
        assert_eq!(table.rows()[0], vec!["805080", "", "life", "no rank", "", "", ""]);
        assert_eq!(table.value(1, "sourceinfo"), Some("ncbi:131567"));
    }

    #[test]
    fn test_quotes_are_literal() {
        let table = Table::from_tsv_reader("uid\tname\n1\t\"Candidatus\" x\n".as_bytes()).unwrap();
        assert_eq!(table.value(0, "name"), Some("\"Candidatus\" x"));
    }

    #[test]
    fn test_ragged_rows_are_normalised() {
        let table = Table::from_tsv_reader("a\tb\tc\n1\n1\t2\t3\t4\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
        assert_eq!(table.rows()[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_column_and_head() {
        let table = Table::from_tsv_reader(TAXONOMY.as_bytes())
            .unwrap()
            .drop_junk_columns();

        let uids: Vec<&str> = table.column("uid").unwrap().collect();
        assert_eq!(uids, vec!["805080", "93302"]);
        assert!(table.column("missing").is_none());

        let head = table.head(1);
        assert_eq!(head.len(), 1);
        assert_eq!(head.columns(), table.columns());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Table::from_tsv_path(Path::new("/nonexistent/taxonomy.tsv")).unwrap_err();
        assert!(err.is_not_found());
    }
}
