//! Pure search state machine. No I/O, no clocks of its own: callers pass the
//! current [`Instant`] in and get back the [`SearchRequest`] to issue, if any.
//!
//! ```text
//!            text edit                 deadline passes, query ready
//!   Idle ───────────────► Debouncing ──────────────────────────────► Loading
//!    ▲                        │  deadline passes, query too short      │
//!    └────────────────────────┘                                        │
//!                                   filter / page / entity change      │
//!   Success | Empty | Error ◄──────────────────────────────────────────┘
//! ```
//!
//! # Generations
//!
//! `generation` advances on every context change and on every issued
//! request. A request carries the value it was issued under, and its response
//! is applied only if that value is still current when the response arrives.
//! Anything older is stale and dropped without a state change.

use crate::context::SearchContext;
use crate::filters::{FilterError, FilterKey};
use crate::pagination::{self, PageLayout};
use crate::query::QueryParse;
use crate::store::{SearchRequest, StoreError};
use crate::types::{EntityType, ResultSet};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// No query (or below the minimum length); instructions are shown.
    Idle,
    /// Free text changed; waiting for typing to settle.
    Debouncing,
    /// A request is in flight.
    Loading,
    /// Last accepted response had records.
    Success,
    /// Last accepted response had zero records.
    Empty,
    /// Last request failed; the message is user-facing.
    Error(String),
}

impl SearchStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, SearchStatus::Debouncing | SearchStatus::Loading)
    }
}

/// What happened to a response handed to [`SearchMachine::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Applied,
    Stale,
}

/// A store reply, tagged with the generation of the request it answers.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub generation: u64,
    pub outcome: Result<ResultSet, StoreError>,
}

/// Tunables for the machine, normally taken from `[search]` config.
#[derive(Debug, Clone)]
pub struct MachineSettings {
    pub page_size: u64,
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            page_size: crate::context::DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(500),
            min_query_len: crate::query::MIN_QUERY_LEN,
        }
    }
}

impl From<&crate::config::SearchConfig> for MachineSettings {
    fn from(cfg: &crate::config::SearchConfig) -> Self {
        Self {
            page_size: cfg.page_size,
            debounce: cfg.debounce(),
            min_query_len: cfg.min_query_len,
        }
    }
}

#[derive(Debug)]
pub struct SearchMachine {
    context: SearchContext,
    status: SearchStatus,
    generation: u64,
    deadline: Option<Instant>,
    /// Last accepted records; kept on screen while the next request loads.
    results: Option<ResultSet>,
    /// Context the displayed `results` belong to.
    settled: Option<SearchContext>,
    settings: MachineSettings,
}

impl SearchMachine {
    pub fn new(entity: EntityType, settings: MachineSettings) -> Self {
        Self {
            context: SearchContext::new(entity, settings.page_size),
            status: SearchStatus::Idle,
            generation: 0,
            deadline: None,
            results: None,
            settled: None,
            settings,
        }
    }

    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    /// Page layout for the current page over the last known total. `None`
    /// until a response has been accepted.
    pub fn layout(&self) -> Option<PageLayout> {
        let results = self.results.as_ref()?;
        Some(pagination::compute_window(
            self.context.page(),
            results.total(),
            self.context.page_size(),
        ))
    }

    // -----------------------------------------------------------------------
    // Input events
    // -----------------------------------------------------------------------

    /// A keystroke changed the free text. Always debounced.
    pub fn set_free_text(&mut self, text: &str, now: Instant) {
        if !self.context.set_free_text(text) {
            return;
        }
        self.invalidate();
        self.deadline = Some(now + self.settings.debounce);
        self.status = SearchStatus::Debouncing;
        tracing::debug!(text, generation = self.generation, "search: debouncing");
    }

    /// Fire the debounce if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.settle_text(),
            _ => None,
        }
    }

    /// Fire a pending debounce immediately.
    pub fn flush(&mut self) -> Option<SearchRequest> {
        self.deadline.is_some().then(|| self.settle_text()).flatten()
    }

    pub fn set_filter(&mut self, key: FilterKey, value: &str) -> Result<Option<SearchRequest>, FilterError> {
        let changed = self.context.set_filter(key, value)?;
        Ok(self.after_structural_change(changed))
    }

    pub fn clear_filter(&mut self, key: FilterKey) -> Result<Option<SearchRequest>, FilterError> {
        let changed = self.context.clear_filter(key)?;
        Ok(self.after_structural_change(changed))
    }

    pub fn clear_filters(&mut self) -> Option<SearchRequest> {
        let changed = self.context.clear_filters();
        self.after_structural_change(changed)
    }

    /// Drop the free text and every filter at once. Goes straight to idle
    /// without a request, since an empty query is never searchable.
    pub fn reset(&mut self) {
        let text = self.context.set_free_text("");
        let filters = self.context.clear_filters();
        if text || filters {
            self.invalidate();
        }
        self.deadline = None;
        self.go_idle();
    }

    /// Switch record kind. Filters reset, page goes to 1, and the previous
    /// kind's records are dropped rather than kept on screen.
    pub fn set_entity(&mut self, entity: EntityType) -> Option<SearchRequest> {
        if !self.context.set_entity(entity) {
            return None;
        }
        self.results = None;
        self.settled = None;
        self.after_structural_change(true)
    }

    /// Explicit page navigation. Ignored while there is nothing to page.
    pub fn set_page(&mut self, page: u64) -> Option<SearchRequest> {
        if !self.context.is_searchable(self.settings.min_query_len) {
            return None;
        }
        let page = match self.layout() {
            Some(layout) if layout.total_pages > 0 => page.clamp(1, layout.total_pages),
            _ => page.max(1),
        };
        let changed = self.context.set_page(page);
        self.after_structural_change(changed)
    }

    pub fn next_page(&mut self) -> Option<SearchRequest> {
        let next = self.layout()?.next_page()?;
        self.set_page(next)
    }

    pub fn prev_page(&mut self) -> Option<SearchRequest> {
        let prev = self.layout()?.prev_page()?;
        self.set_page(prev)
    }

    pub fn first_page(&mut self) -> Option<SearchRequest> {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> Option<SearchRequest> {
        let last = self.layout()?.total_pages;
        self.set_page(last)
    }

    /// Re-issue the current context, e.g. after an error.
    pub fn retry(&mut self) -> Option<SearchRequest> {
        self.deadline = None;
        match self.context.parse(self.settings.min_query_len) {
            QueryParse::Ready(_) => self.issue(),
            QueryParse::BelowMinimum => None,
        }
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Apply a response if it answers the current generation.
    pub fn accept(&mut self, response: SearchResponse) -> Acceptance {
        if response.generation != self.generation || self.status != SearchStatus::Loading {
            tracing::debug!(
                response = response.generation,
                current = self.generation,
                "search: discarding stale response"
            );
            return Acceptance::Stale;
        }

        match response.outcome {
            Ok(set) if set.entity() != self.context.entity() => {
                let msg = format!(
                    "record service returned {} for a {} search",
                    set.entity(),
                    self.context.entity()
                );
                tracing::warn!(%msg, "search: mismatched response");
                self.status = SearchStatus::Error(msg);
            }
            Ok(set) => {
                self.status = if set.is_empty() { SearchStatus::Empty } else { SearchStatus::Success };
                tracing::debug!(
                    generation = self.generation,
                    total = set.total(),
                    shown = set.len(),
                    "search: response applied"
                );
                self.results = Some(set);
                self.settled = Some(self.context.clone());
            }
            Err(err) => {
                tracing::warn!(generation = self.generation, error = %err, "search: request failed");
                self.status = SearchStatus::Error(err.to_string());
            }
        }
        Acceptance::Applied
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Any in-flight request now answers an outdated context.
    fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn after_structural_change(&mut self, changed: bool) -> Option<SearchRequest> {
        if !changed {
            return None;
        }
        self.invalidate();
        self.deadline = None;
        match self.context.parse(self.settings.min_query_len) {
            QueryParse::Ready(_) => self.issue(),
            QueryParse::BelowMinimum => {
                self.go_idle();
                None
            }
        }
    }

    fn settle_text(&mut self) -> Option<SearchRequest> {
        self.deadline = None;
        if !self.context.is_searchable(self.settings.min_query_len) {
            self.go_idle();
            return None;
        }
        if self.results.is_some() && self.settled.as_ref() == Some(&self.context) {
            // Typed back to what is already on screen.
            self.status = self.settled_status();
            tracing::debug!("search: context unchanged since last response, not refetching");
            return None;
        }
        self.issue()
    }

    fn settled_status(&self) -> SearchStatus {
        match &self.results {
            Some(set) if !set.is_empty() => SearchStatus::Success,
            _ => SearchStatus::Empty,
        }
    }

    fn go_idle(&mut self) {
        if self.status != SearchStatus::Idle {
            tracing::debug!("search: idle");
        }
        self.status = SearchStatus::Idle;
        self.results = None;
        self.settled = None;
    }

    fn issue(&mut self) -> Option<SearchRequest> {
        let query = self.context.parse(self.settings.min_query_len).ready()?;
        self.generation += 1;
        if let Err(err) = query.check_scope(self.context.entity()) {
            // Input error: nothing is sent.
            tracing::debug!(error = %err, "search: query rejected");
            self.status = SearchStatus::Error(err.to_string());
            return None;
        }
        self.status = SearchStatus::Loading;
        let request = SearchRequest::new(
            self.generation,
            query,
            self.context.filters().clone(),
            self.context.page(),
            self.context.page_size(),
        );
        tracing::debug!(
            generation = request.generation,
            entity = %request.entity,
            page = request.page,
            text = %request.text,
            "search: issuing request"
        );
        Some(request)
    }
}
