//! Async driver around [`SearchMachine`].
//!
//! The driver owns the store and a completion channel. Each issued request is
//! spawned onto the runtime; its reply comes back through the channel tagged
//! with its generation and is handed to the machine, which decides whether it
//! is still wanted. Nothing here blocks the caller: the UI calls [`tick`]
//! once per frame, headless callers `await` [`settle`].
//!
//! [`tick`]: SearchOrchestrator::tick
//! [`settle`]: SearchOrchestrator::settle

use super::machine::{Acceptance, MachineSettings, SearchMachine, SearchResponse, SearchStatus};
use super::view::SearchView;
use crate::filters::{FilterError, FilterKey};
use crate::risk::RiskRules;
use crate::store::{RecordStore, SearchRequest, StoreError};
use crate::types::{Breakdown, EntityType, Statistics, Tally};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::time::Instant;

/// A finished store call.
#[derive(Debug)]
pub enum Completion {
    Search(SearchResponse),
    Statistics(Result<Statistics, StoreError>),
    Breakdown(Breakdown, Result<Vec<Tally>, StoreError>),
}

/// What applying one completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Search(Acceptance),
    Statistics,
    Breakdown(Breakdown),
}

pub struct SearchOrchestrator {
    machine: SearchMachine,
    store: Arc<dyn RecordStore>,
    rules: RiskRules,
    handle: Handle,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    statistics: Option<Result<Statistics, StoreError>>,
    breakdowns: BTreeMap<Breakdown, Result<Vec<Tally>, StoreError>>,
}

impl SearchOrchestrator {
    /// Requests are spawned onto `handle`.
    pub fn new(
        store: Arc<dyn RecordStore>,
        handle: Handle,
        entity: EntityType,
        settings: MachineSettings,
        rules: RiskRules,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            machine: SearchMachine::new(entity, settings),
            store,
            rules,
            handle,
            tx,
            rx,
            statistics: None,
            breakdowns: BTreeMap::new(),
        }
    }

    pub fn machine(&self) -> &SearchMachine {
        &self.machine
    }

    pub fn status(&self) -> &SearchStatus {
        self.machine.status()
    }

    pub fn rules(&self) -> &RiskRules {
        &self.rules
    }

    pub fn statistics(&self) -> Option<&Result<Statistics, StoreError>> {
        self.statistics.as_ref()
    }

    /// Last reply for one breakdown, if any has arrived.
    pub fn breakdown(&self, breakdown: Breakdown) -> Option<&Result<Vec<Tally>, StoreError>> {
        self.breakdowns.get(&breakdown)
    }

    /// Render snapshot of the current state.
    pub fn view(&self) -> SearchView<'_> {
        SearchView::new(&self.machine, &self.rules)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn set_free_text(&mut self, text: &str) {
        self.machine.set_free_text(text, Instant::now());
    }

    pub fn set_filter(&mut self, key: FilterKey, value: &str) -> Result<(), FilterError> {
        let req = self.machine.set_filter(key, value)?;
        self.dispatch_opt(req);
        Ok(())
    }

    pub fn clear_filter(&mut self, key: FilterKey) -> Result<(), FilterError> {
        let req = self.machine.clear_filter(key)?;
        self.dispatch_opt(req);
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        let req = self.machine.clear_filters();
        self.dispatch_opt(req);
    }

    /// Clear text and filters together. Never sends a request.
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    pub fn set_entity(&mut self, entity: EntityType) {
        let req = self.machine.set_entity(entity);
        self.dispatch_opt(req);
    }

    pub fn toggle_entity(&mut self) {
        let next = self.machine.context().entity().toggled();
        self.set_entity(next);
    }

    pub fn set_page(&mut self, page: u64) {
        let req = self.machine.set_page(page);
        self.dispatch_opt(req);
    }

    pub fn next_page(&mut self) {
        let req = self.machine.next_page();
        self.dispatch_opt(req);
    }

    pub fn prev_page(&mut self) {
        let req = self.machine.prev_page();
        self.dispatch_opt(req);
    }

    pub fn first_page(&mut self) {
        let req = self.machine.first_page();
        self.dispatch_opt(req);
    }

    pub fn last_page(&mut self) {
        let req = self.machine.last_page();
        self.dispatch_opt(req);
    }

    pub fn retry(&mut self) {
        let req = self.machine.retry();
        self.dispatch_opt(req);
    }

    /// Skip the rest of the debounce window.
    pub fn flush(&mut self) {
        let req = self.machine.flush();
        self.dispatch_opt(req);
    }

    pub fn request_statistics(&self) {
        let store = Arc::clone(&self.store);
        self.spawn_call("statistics", async move { store.statistics().await }, Completion::Statistics);
    }

    /// Fetch every [`Breakdown`], `limit` rows each. Replies arrive one per
    /// breakdown on the same channel as searches.
    pub fn request_breakdowns(&self, limit: u64) {
        for breakdown in Breakdown::ALL {
            let store = Arc::clone(&self.store);
            self.spawn_call(
                "breakdown",
                async move { store.top(breakdown, limit).await },
                move |outcome| Completion::Breakdown(breakdown, outcome),
            );
        }
    }

    // -----------------------------------------------------------------------
    // Pumping
    // -----------------------------------------------------------------------

    /// Fire an expired debounce and apply every completion that has arrived.
    /// Returns true if anything visible may have changed.
    pub fn tick(&mut self) -> bool {
        let mut dirty = false;
        if let Some(req) = self.machine.poll(Instant::now()) {
            self.dispatch(req);
            dirty = true;
        }
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            dirty = true;
        }
        dirty
    }

    /// Wait for the next completion and apply it. A pending debounce fires
    /// first if its deadline passes while waiting.
    pub async fn recv(&mut self) -> Option<Update> {
        loop {
            match self.machine.deadline() {
                Some(deadline) => {
                    tokio::select! {
                        completion = self.rx.recv() => return completion.map(|c| self.apply(c)),
                        _ = tokio::time::sleep_until(deadline) => {
                            if let Some(req) = self.machine.poll(Instant::now()) {
                                self.dispatch(req);
                            }
                        }
                    }
                }
                None => return self.rx.recv().await.map(|c| self.apply(c)),
            }
        }
    }

    /// Flush any pending debounce and wait until no search is in flight.
    pub async fn settle(&mut self) {
        self.flush();
        while self.machine.status() == &SearchStatus::Loading {
            if self.recv().await.is_none() {
                break;
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Update {
        match completion {
            Completion::Search(response) => Update::Search(self.machine.accept(response)),
            Completion::Statistics(outcome) => {
                if let Err(err) = &outcome {
                    tracing::warn!(error = %err, "statistics request failed");
                }
                self.statistics = Some(outcome);
                Update::Statistics
            }
            Completion::Breakdown(breakdown, outcome) => {
                if let Err(err) = &outcome {
                    tracing::warn!(%breakdown, error = %err, "breakdown request failed");
                }
                self.breakdowns.insert(breakdown, outcome);
                Update::Breakdown(breakdown)
            }
        }
    }

    fn dispatch_opt(&self, request: Option<SearchRequest>) {
        if let Some(req) = request {
            self.dispatch(req);
        }
    }

    fn dispatch(&self, request: SearchRequest) {
        let store = Arc::clone(&self.store);
        let generation = request.generation;
        self.spawn_call(
            "search",
            async move { store.search(&request).await },
            move |outcome| Completion::Search(SearchResponse { generation, outcome }),
        );
    }

    /// Run `call` in its own task and send its reply, built by `reply`. A
    /// panicking or cancelled call still replies, with a transport error.
    fn spawn_call<T, F, R>(&self, what: &'static str, call: F, reply: R)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
        R: FnOnce(Result<T, StoreError>) -> Completion + Send + 'static,
    {
        let tx = self.tx.clone();
        let call = self.handle.spawn(call);
        self.handle.spawn(async move {
            let outcome = call.await.unwrap_or_else(|err| Err(lost_call(what, err)));
            // Receiver gone means the orchestrator was dropped; nothing to do.
            let _ = tx.send(reply(outcome));
        });
    }
}

fn lost_call(what: &str, err: JoinError) -> StoreError {
    let reason = if err.is_panic() { "panicked" } else { "was cancelled" };
    tracing::error!(error = %err, "{what} task {reason}");
    StoreError::Transport(format!("{what} task {reason}"))
}
