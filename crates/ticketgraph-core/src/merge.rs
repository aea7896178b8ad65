//! Merging CSV rows into the ticket map.
//!
//! # Overview
//!
//! Every row names one ticket and, through its relation columns, the tickets
//! that block it (inward links) and the tickets it blocks (outward links).
//! [`TicketMerger`] folds rows from any number of sources into one
//! [`TicketMap`]:
//!
//! - A row creates its ticket's record, or promotes the existing record in
//!   place. Summary and status are overwritten by the latest row; relation
//!   lists only ever grow.
//! - A referenced ticket with no record yet gets a stub. While it is a stub,
//!   every reference adds a back-link to its opposite list. When the stub's
//!   own row turns up later it is promoted, keeping those back-links. Records
//!   that came from a row are never back-linked; their own row lists links.
//! - Relation lists are unions in first-seen order: a reference already
//!   present is not appended twice, so a link listed on both tickets' rows,
//!   or in both sources, yields one arrow.
//! - Rows with a blank identifier, hidden rows, and hidden relation values are
//!   skipped without touching the map.
//!
//! # Source Order
//!
//! Sources are merged in the order given, last write wins for row fields.
//! [`merge_sources`] merges the supplemental source first so the primary
//! source has the final say.

use crate::columns::{ColumnMap, cell};
use crate::model::{RecordOrigin, TicketMap, TicketRecord};
use crate::options::KeyRules;
use crate::source::CsvSource;

/// Counters for one merged source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub rows: usize,
    pub blank_identifier: usize,
    pub hidden: usize,
    pub stubs_created: usize,
    pub stubs_promoted: usize,
}

/// What happened to a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Merged { stubs_created: usize, promoted: bool },
    BlankIdentifier,
    Hidden,
}

/// Which of the row ticket's lists a relation column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    /// The cell names a ticket that blocks the row's ticket.
    BlockedBy,
    /// The cell names a ticket the row's ticket blocks.
    Blocks,
}

/// Accumulates tickets across sources.
#[derive(Debug)]
pub struct TicketMerger<'a> {
    keys: &'a KeyRules,
    tickets: TicketMap,
}

impl<'a> TicketMerger<'a> {
    #[must_use]
    pub fn new(keys: &'a KeyRules) -> Self {
        Self {
            keys,
            tickets: TicketMap::new(),
        }
    }

    /// Merge every data row of `source`.
    pub fn merge_source(&mut self, source: &CsvSource) -> MergeStats {
        let mut stats = MergeStats::default();

        for record in source.rows() {
            let row: Vec<&str> = record.iter().collect();
            stats.rows += 1;

            match self.merge_row(source.columns(), &row) {
                RowOutcome::Merged {
                    stubs_created,
                    promoted,
                } => {
                    stats.stubs_created += stubs_created;
                    if promoted {
                        stats.stubs_promoted += 1;
                    }
                }
                RowOutcome::BlankIdentifier => stats.blank_identifier += 1,
                RowOutcome::Hidden => {
                    tracing::debug!(
                        source = source.label(),
                        line = record.position().map(csv::Position::line),
                        "skipping hidden row"
                    );
                    stats.hidden += 1;
                }
            }
        }

        tracing::info!(
            source = source.label(),
            rows = stats.rows,
            blank = stats.blank_identifier,
            hidden = stats.hidden,
            stubs_created = stats.stubs_created,
            stubs_promoted = stats.stubs_promoted,
            "merged source"
        );

        stats
    }

    /// Merge one already-split row.
    pub fn merge_row<S: AsRef<str>>(&mut self, columns: &ColumnMap, row: &[S]) -> RowOutcome {
        let Some(key) = cell(row, columns.identifier) else {
            return RowOutcome::BlankIdentifier;
        };
        if self.keys.is_hidden(key) {
            return RowOutcome::Hidden;
        }

        let mut stubs_created = 0;
        for &idx in &columns.blocked_by {
            if self.link(key, cell(row, idx), Link::BlockedBy) {
                stubs_created += 1;
            }
        }
        for &idx in &columns.blocks {
            if self.link(key, cell(row, idx), Link::Blocks) {
                stubs_created += 1;
            }
        }

        let record = self
            .tickets
            .entry(key.to_string())
            .or_insert_with(|| TicketRecord::from_row(key));
        let promoted = record.is_stub();
        record.origin = RecordOrigin::Row;

        if let Some(idx) = columns.summary.filter(|&idx| idx < row.len()) {
            record.summary = cell(row, idx).map(str::to_string);
        }
        if let Some(idx) = columns.status.filter(|&idx| idx < row.len()) {
            record.status = cell(row, idx).map(str::to_string);
        }

        RowOutcome::Merged {
            stubs_created,
            promoted,
        }
    }

    /// Record one relation cell against `key`. Returns true if a stub was
    /// created for the referenced ticket.
    fn link(&mut self, key: &str, other: Option<&str>, link: Link) -> bool {
        let Some(other) = other else {
            return false;
        };
        if self.keys.is_hidden(other) {
            return false;
        }

        // A row naming itself is the row's own record, never a stub.
        let self_reference = other == key;
        let created = !self_reference && !self.tickets.contains_key(other);
        let target = self.tickets.entry(other.to_string()).or_insert_with(|| {
            if self_reference {
                TicketRecord::from_row(other)
            } else {
                TicketRecord::stub(other)
            }
        });
        if target.is_stub() {
            match link {
                Link::BlockedBy => push_unique(&mut target.blocks, key),
                Link::Blocks => push_unique(&mut target.blocked_by, key),
            }
        }

        let record = self
            .tickets
            .entry(key.to_string())
            .or_insert_with(|| TicketRecord::from_row(key));
        match link {
            Link::BlockedBy => push_unique(&mut record.blocked_by, other),
            Link::Blocks => push_unique(&mut record.blocks, other),
        }

        created
    }

    #[must_use]
    pub const fn tickets(&self) -> &TicketMap {
        &self.tickets
    }

    #[must_use]
    pub fn into_tickets(self) -> TicketMap {
        self.tickets
    }
}

fn push_unique(list: &mut Vec<String>, key: &str) {
    if !list.iter().any(|existing| existing == key) {
        list.push(key.to_string());
    }
}

/// Merge an optional supplemental source and then the primary source.
#[must_use]
pub fn merge_sources(
    supplemental: Option<&CsvSource>,
    primary: &CsvSource,
    keys: &KeyRules,
) -> TicketMap {
    let mut merger = TicketMerger::new(keys);
    if let Some(source) = supplemental {
        merger.merge_source(source);
    }
    merger.merge_source(primary);
    merger.into_tickets()
}
