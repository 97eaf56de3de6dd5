//! Record store contract.
//!
//! The store is an opaque request/response service: the orchestrator hands it
//! a [`SearchRequest`] and eventually gets back a [`ResultSet`] or a
//! [`StoreError`]. Adapters live in the `snatch-store` crate.

use crate::filters::Filters;
use crate::query::{Field, ParsedQuery};
use crate::types::{Breakdown, EntityType, ResultSet, Statistics, Tally};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A fully-normalised search, tagged with the generation it was issued under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub generation: u64,
    pub entity: EntityType,
    /// Residual full-text term after field predicates were extracted.
    pub text: String,
    pub predicates: BTreeMap<Field, String>,
    pub filters: Filters,
    pub page: u64,
    pub page_size: u64,
}

impl SearchRequest {
    pub fn new(
        generation: u64,
        query: ParsedQuery,
        filters: Filters,
        page: u64,
        page_size: u64,
    ) -> Self {
        Self {
            generation,
            entity: filters.entity(),
            text: query.residual,
            predicates: query.predicates,
            filters,
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based record offset of the first record on `page`.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    /// True when a DSL predicate belongs to the other record kind. Such a
    /// predicate matches no record, so stores answer with an empty page.
    pub fn matches_nothing(&self) -> bool {
        self.predicates.keys().any(|field| field.entity() != self.entity)
    }

    /// Wire parameters, excluding `q`, `limit` and `offset`.
    ///
    /// DSL predicates are applied first; an explicit filter for the same
    /// parameter replaces the predicate value.
    pub fn field_params(&self) -> BTreeMap<&'static str, &str> {
        let mut params: BTreeMap<&'static str, &str> = self
            .predicates
            .iter()
            .map(|(field, value)| (field.wire_name(), value.as_str()))
            .collect();
        for (key, value) in self.filters.iter() {
            params.insert(key.wire_name(), value);
        }
        params
    }
}

/// Why a store call failed. Every variant leaves no partial result behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("cannot reach record service: {0}")]
    Transport(String),
    #[error("record service did not answer within {0} ms")]
    Timeout(u64),
    #[error("record service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable response from record service: {0}")]
    Decode(String),
    #[error("invalid record service URL: {0}")]
    InvalidUrl(String),
}

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Run one page of a search. `total` in the result must be exact.
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, StoreError>;

    /// Collection-wide counters.
    async fn statistics(&self) -> Result<Statistics, StoreError>;

    /// The `limit` most frequent values of one column, most frequent first.
    async fn top(&self, breakdown: Breakdown, limit: u64) -> Result<Vec<Tally>, StoreError>;

    async fn top_domains(&self, limit: u64) -> Result<Vec<Tally>, StoreError> {
        self.top(Breakdown::Domains, limit).await
    }

    async fn top_countries(&self, limit: u64) -> Result<Vec<Tally>, StoreError> {
        self.top(Breakdown::Countries, limit).await
    }

    async fn top_stealers(&self, limit: u64) -> Result<Vec<Tally>, StoreError> {
        self.top(Breakdown::Stealers, limit).await
    }
}

#[async_trait::async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, StoreError> {
        (**self).search(request).await
    }

    async fn statistics(&self) -> Result<Statistics, StoreError> {
        (**self).statistics().await
    }

    async fn top(&self, breakdown: Breakdown, limit: u64) -> Result<Vec<Tally>, StoreError> {
        (**self).top(breakdown, limit).await
    }
}
