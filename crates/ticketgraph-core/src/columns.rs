//! Header-row resolution.
//!
//! Exports don't agree on column order, and optional columns come and go, so
//! every source is located by name. Relation columns may repeat (one column
//! per link in tracker exports); every occurrence is kept.

use serde::{Deserialize, Serialize};

use crate::error::ColumnError;

/// Header names recognised in a source. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderNames {
    #[serde(default = "default_identifier")]
    pub identifier: String,
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_status")]
    pub status: String,
    /// Inward link column: the cell names a ticket that blocks this row.
    #[serde(default = "default_blocked_by")]
    pub blocked_by: String,
    /// Outward link column: the cell names a ticket this row blocks.
    #[serde(default = "default_blocks")]
    pub blocks: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            summary: default_summary(),
            status: default_status(),
            blocked_by: default_blocked_by(),
            blocks: default_blocks(),
        }
    }
}

/// Positions of the recognised columns in one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub identifier: usize,
    pub summary: Option<usize>,
    pub status: Option<usize>,
    pub blocked_by: Vec<usize>,
    pub blocks: Vec<usize>,
}

impl ColumnMap {
    /// Map header cells to column positions.
    ///
    /// Unrecognised cells are ignored. A leading byte-order mark on the first
    /// cell is dropped before matching.
    ///
    /// # Errors
    ///
    /// [`ColumnError::MissingIdentifier`] when no cell matches
    /// `names.identifier`.
    pub fn resolve<S: AsRef<str>>(header: &[S], names: &HeaderNames) -> Result<Self, ColumnError> {
        let mut identifier = None;
        let mut summary = None;
        let mut status = None;
        let mut blocked_by = Vec::new();
        let mut blocks = Vec::new();

        for (idx, cell) in header.iter().enumerate() {
            let mut cell = cell.as_ref();
            if idx == 0 {
                cell = cell.trim_start_matches('\u{feff}');
            }

            if cell == names.identifier {
                identifier = Some(idx);
            } else if cell == names.summary {
                summary = Some(idx);
            } else if cell == names.status {
                status = Some(idx);
            } else if cell == names.blocked_by {
                blocked_by.push(idx);
            } else if cell == names.blocks {
                blocks.push(idx);
            }
        }

        let identifier = identifier.ok_or_else(|| ColumnError::MissingIdentifier {
            column: names.identifier.clone(),
        })?;

        Ok(Self {
            identifier,
            summary,
            status,
            blocked_by,
            blocks,
        })
    }
}

/// The trimmed value at `idx`, or `None` if the row is too short or the cell
/// is blank.
#[must_use]
pub fn cell<S: AsRef<str>>(row: &[S], idx: usize) -> Option<&str> {
    row.get(idx)
        .map(|value| value.as_ref().trim())
        .filter(|value| !value.is_empty())
}

fn default_identifier() -> String {
    "Issue key".to_string()
}

fn default_summary() -> String {
    "Summary".to_string()
}

fn default_status() -> String {
    "Status".to_string()
}

fn default_blocked_by() -> String {
    "Inward issue link (Blocks)".to_string()
}

fn default_blocks() -> String {
    "Outward issue link (Blocks)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<&str> {
        line.split(',').collect()
    }

    #[test]
    fn resolves_columns_in_any_order() {
        let header = split(
            "Summary,Outward issue link (Blocks),Issue key,Status,Inward issue link (Blocks)",
        );
        let map = ColumnMap::resolve(&header, &HeaderNames::default()).expect("resolve");
        assert_eq!(map.identifier, 2);
        assert_eq!(map.summary, Some(0));
        assert_eq!(map.status, Some(3));
        assert_eq!(map.blocked_by, vec![4]);
        assert_eq!(map.blocks, vec![1]);
    }

    #[test]
    fn keeps_every_repeated_relation_column() {
        let header = split(
            "Issue key,Inward issue link (Blocks),Outward issue link (Blocks),Inward issue link (Blocks),Outward issue link (Blocks),Outward issue link (Blocks)",
        );
        let map = ColumnMap::resolve(&header, &HeaderNames::default()).expect("resolve");
        assert_eq!(map.blocked_by, vec![1, 3]);
        assert_eq!(map.blocks, vec![2, 4, 5]);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let header = split("Priority,Issue key,Assignee");
        let map = ColumnMap::resolve(&header, &HeaderNames::default()).expect("resolve");
        assert_eq!(map.identifier, 1);
        assert_eq!(map.summary, None);
        assert_eq!(map.status, None);
        assert!(map.blocked_by.is_empty());
        assert!(map.blocks.is_empty());
    }

    #[test]
    fn missing_identifier_is_an_error() {
        let header = split("Summary,Status");
        let err = ColumnMap::resolve(&header, &HeaderNames::default()).expect_err("should fail");
        assert_eq!(
            err,
            ColumnError::MissingIdentifier {
                column: "Issue key".to_string()
            }
        );
    }

    #[test]
    fn header_matching_is_case_sensitive() {
        let header = split("issue key,Status");
        assert!(ColumnMap::resolve(&header, &HeaderNames::default()).is_err());
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let header = split("\u{feff}Issue key,Status");
        let map = ColumnMap::resolve(&header, &HeaderNames::default()).expect("resolve");
        assert_eq!(map.identifier, 0);
    }

    #[test]
    fn custom_names_are_honoured() {
        let names = HeaderNames {
            identifier: "Key".to_string(),
            blocks: "Blocks".to_string(),
            ..HeaderNames::default()
        };
        let header = split("Key,Blocks,Blocks");
        let map = ColumnMap::resolve(&header, &names).expect("resolve");
        assert_eq!(map.identifier, 0);
        assert_eq!(map.blocks, vec![1, 2]);
    }

    #[test]
    fn cell_tolerates_short_rows_and_blanks() {
        let row = split("TKT-1, ,  Open ");
        assert_eq!(cell(&row, 0), Some("TKT-1"));
        assert_eq!(cell(&row, 1), None);
        assert_eq!(cell(&row, 2), Some("Open"));
        assert_eq!(cell(&row, 7), None);
    }
}
