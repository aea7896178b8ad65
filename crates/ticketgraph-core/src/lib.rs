//! ticketgraph-core library.
//!
//! Turns issue-tracker CSV exports into a PlantUML object diagram of
//! "blocks" relationships:
//!
//! - [`columns`] — locate the recognised columns in a header row.
//! - [`source`] — load one CSV input with its resolved columns.
//! - [`merge`] — fold sources into one [`model::TicketMap`], stubbing
//!   referenced tickets.
//! - [`render`] — write the map as objects and relationship lines.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`]; the binary wraps them
//!   with `anyhow` context.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod columns;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod options;
pub mod render;
pub mod source;

pub use columns::{ColumnMap, HeaderNames};
pub use error::{ColumnError, ConfigError, RenderError, SourceError};
pub use merge::{MergeStats, TicketMerger, merge_sources};
pub use model::{TicketMap, TicketRecord};
pub use options::{KeyRules, KeySet, Options};
pub use render::{RenderStats, render, write_diagram};
pub use source::CsvSource;
