//! snatch: terminal console for harvested credential and system records.
//!
//! The binary is a thin shell; the work lives in the workspace crates, which
//! are re-exported here so integration tests can import them from one place.
//!
//! # Architecture
//!
//! ```text
//!  keys ──► snatch-tui ──► SearchOrchestrator ──► RecordStore (HTTP | memory)
//!              ▲                  │  ▲                     │
//!              └── SearchView ◄───┘  └──── completions ◄───┘
//! ```
//!
//! The orchestrator lives in `snatch-core` and owns no I/O of its own: store
//! calls are spawned onto a tokio runtime and come back over a channel tagged
//! with the generation that issued them.

pub mod headless;

pub use snatch_core;
pub use snatch_store;
pub use snatch_tui;
