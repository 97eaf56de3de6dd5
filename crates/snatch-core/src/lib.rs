//! snatch-core: search layer for the snatch record console.
//!
//! Everything between a keystroke and a rendered page of records lives here;
//! the crate does no terminal or network I/O of its own.
//!
//! # Architecture
//!
//! ```text
//! free text ──► query ──┐
//!                       ├──► context ──► orchestrator ──► RecordStore
//! filter edits ─► filters┘                   │
//!                                            ▼
//!                              pagination + risk ──► view
//! ```
//!
//! Store replies travel back over a `tokio` channel tagged with the
//! generation they were issued under; the UI thread never blocks on them.

pub mod config;
pub mod context;
pub mod filters;
pub mod orchestrator;
pub mod pagination;
pub mod query;
pub mod risk;
pub mod store;
pub mod types;

pub use context::SearchContext;
pub use filters::{FilterError, FilterKey, Filters};
pub use store::{RecordStore, SearchRequest, StoreError};
pub use types::{Breakdown, Credential, EntityType, ResultSet, SearchResult, Statistics, SystemRecord, Tally};
