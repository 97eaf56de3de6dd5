//! The search context: every parameter that defines the current search.
//!
//! A [`SearchContext`] is owned by the orchestrator and mutated only through
//! the methods here, which keep two invariants:
//!
//! - `filters` only ever holds keys from the active entity type's vocabulary;
//! - `page` goes back to 1 whenever the text, filters or entity type change.

use crate::filters::{FilterError, FilterKey, Filters};
use crate::query::{self, QueryParse};
use crate::types::EntityType;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchContext {
    entity: EntityType,
    free_text: String,
    filters: Filters,
    page: u64,
    page_size: u64,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(EntityType::Credential, DEFAULT_PAGE_SIZE)
    }
}

impl SearchContext {
    /// A fresh context. `page_size` of 0 is bumped to 1.
    pub fn new(entity: EntityType, page_size: u64) -> Self {
        Self {
            entity,
            free_text: String::new(),
            filters: Filters::new(entity),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Parse the free text with `min_len`.
    pub fn parse(&self, min_len: usize) -> QueryParse {
        query::parse_with_minimum(&self.free_text, min_len)
    }

    /// Whether the free text is long enough to search for.
    pub fn is_searchable(&self, min_len: usize) -> bool {
        query::meets_minimum(&self.free_text, min_len)
    }

    /// Replace the free text. Returns false (and changes nothing) when the
    /// text is identical.
    pub fn set_free_text(&mut self, text: &str) -> bool {
        if self.free_text == text {
            return false;
        }
        self.free_text = text.to_string();
        self.page = 1;
        true
    }

    /// Replace the filters. Returns false when the mapping is unchanged.
    pub fn set_filters(&mut self, filters: Filters) -> bool {
        debug_assert_eq!(filters.entity(), self.entity, "filters built for the wrong entity type");
        if self.filters == filters {
            return false;
        }
        self.filters = filters;
        self.page = 1;
        true
    }

    /// Set one filter through the composer.
    pub fn set_filter(&mut self, key: FilterKey, value: &str) -> Result<bool, FilterError> {
        let next = self.filters.set(key, value)?;
        Ok(self.set_filters(next))
    }

    pub fn clear_filter(&mut self, key: FilterKey) -> Result<bool, FilterError> {
        let next = self.filters.clear(key)?;
        Ok(self.set_filters(next))
    }

    pub fn clear_filters(&mut self) -> bool {
        let next = self.filters.cleared();
        self.set_filters(next)
    }

    /// Switch entity type, emptying the filters and resetting the page.
    /// Switching to the current type is a no-op.
    pub fn set_entity(&mut self, entity: EntityType) -> bool {
        if self.entity == entity {
            return false;
        }
        self.entity = entity;
        self.filters = Filters::new(entity);
        self.page = 1;
        true
    }

    /// Explicit page navigation; the only way to change `page` without a reset.
    pub fn set_page(&mut self, page: u64) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }
}
