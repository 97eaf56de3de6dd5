//! snatch-store: record store adapters for snatch.
//!
//! Both adapters implement [`snatch_core::store::RecordStore`]; the
//! orchestrator never knows which one it is talking to.

pub mod demo;
pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use snatch_core::config::StoreConfig;
use snatch_core::store::{RecordStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Open the store the command line asked for: the bundled demo dataset when
/// `demo` carries a latency, otherwise the HTTP record service in `cfg`.
pub fn open(cfg: &StoreConfig, demo: Option<Duration>) -> Result<Arc<dyn RecordStore>, StoreError> {
    match demo {
        Some(latency) => {
            tracing::info!(?latency, "using demo dataset");
            Ok(Arc::new(demo::store(latency)))
        }
        None => {
            let store = HttpStore::from_config(cfg)?;
            tracing::info!(base_url = store.base_url(), "using record service");
            Ok(Arc::new(store))
        }
    }
}
