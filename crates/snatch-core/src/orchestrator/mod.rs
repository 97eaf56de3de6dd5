//! Search orchestration: debounce, dispatch, stale-response discard.
//!
//! [`machine`] is the synchronous core and can be driven with any clock.
//! [`driver`] wraps it with a store and a tokio completion channel.

pub mod driver;
pub mod machine;
pub mod view;

pub use driver::{Completion, SearchOrchestrator, Update};
pub use machine::{Acceptance, MachineSettings, SearchMachine, SearchResponse, SearchStatus};
pub use view::SearchView;
