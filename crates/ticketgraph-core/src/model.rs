//! Ticket records and the merged identifier map.
//!
//! # Edge Direction
//!
//! A ticket's `blocks` list names the tickets it must finish before; its
//! `blocked_by` list names the tickets that must finish before it. Lists hold
//! identifiers (map keys), never references, so the map has no ownership
//! cycles no matter how tangled the blocking graph is.

use std::collections::BTreeMap;

/// Separator stripped from identifiers when they become object names.
pub const KEY_SEPARATOR: char = '-';

/// Status shown for tickets whose status is unknown.
pub const DEFAULT_STATUS: &str = "unknown";

/// Merged tickets keyed by raw identifier.
///
/// A `BTreeMap` so that rendering walks identifiers in lexicographic order.
pub type TicketMap = BTreeMap<String, TicketRecord>;

/// How a record came to exist in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Parsed from the ticket's own row.
    Row,
    /// Created because another row referenced it.
    Stub,
}

/// One ticket, either parsed from its row or stubbed from a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub key: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    /// Tickets this one blocks.
    pub blocks: Vec<String>,
    /// Tickets that block this one.
    pub blocked_by: Vec<String>,
    pub origin: RecordOrigin,
}

impl TicketRecord {
    /// An empty record for a ticket that has its own row.
    #[must_use]
    pub fn from_row(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: None,
            status: None,
            blocks: Vec::new(),
            blocked_by: Vec::new(),
            origin: RecordOrigin::Row,
        }
    }

    /// A placeholder for a ticket known only through a reference.
    #[must_use]
    pub fn stub(key: impl Into<String>) -> Self {
        Self {
            origin: RecordOrigin::Stub,
            ..Self::from_row(key)
        }
    }

    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.origin == RecordOrigin::Stub
    }

    /// True when the ticket neither blocks nor is blocked by anything.
    #[must_use]
    pub const fn is_orphan(&self) -> bool {
        self.blocks.is_empty() && self.blocked_by.is_empty()
    }

    /// Status to display, falling back to [`DEFAULT_STATUS`].
    #[must_use]
    pub fn effective_status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }
}

/// Strip [`KEY_SEPARATOR`] so the identifier is a valid PlantUML object name.
///
/// Only applied at render time; map keys keep the raw identifier.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.replace(KEY_SEPARATOR, "")
}
