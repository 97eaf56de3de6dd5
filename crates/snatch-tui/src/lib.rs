//! snatch TUI: ratatui application shell.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState};

use snatch_core::config::Config;
use snatch_core::orchestrator::{MachineSettings, SearchOrchestrator};
use snatch_core::types::EntityType;
use std::time::Duration;

/// Start the console against the store chosen by `demo` (see
/// [`snatch_store::open`]).
///
/// Store requests run on a small multi-threaded runtime owned by this
/// function; the terminal loop stays on the calling thread.
pub fn run(config: Config, demo: Option<Duration>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("snatch-io")
        .enable_all()
        .build()?;

    let store = snatch_store::open(&config.store, demo)?;
    let orchestrator = SearchOrchestrator::new(
        store,
        runtime.handle().clone(),
        EntityType::default(),
        MachineSettings::from(&config.search),
        config.risk.clone(),
    );
    orchestrator.request_statistics();

    let theme = theme::Theme::by_name(&config.ui.theme);
    let result = App::new(AppState::new(orchestrator, config, theme)).run();

    // In-flight requests are abandoned on quit.
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}
