//! Query DSL: splits free text into field-scoped predicates and a residual
//! full-text term.
//!
//! # Grammar
//!
//! Input is split on whitespace. A token of the form `field:value` where
//! `field` is one of `domain`, `user`, `password`, `ip`, `country` or
//! `stealer` (case-insensitive) and `value` is non-empty becomes a
//! [`Field`] predicate. Every other token, including `unknown:prefix` tokens
//! and a bare `domain:`, is plain text and is rejoined in original order into
//! the residual term. All parts combine with an implicit AND.
//!
//! `domain`, `user`, `password` and `stealer` scope credential searches;
//! `ip` and `country` scope system searches. A predicate for the other record
//! kind cannot narrow anything, so [`ParsedQuery::check_scope`] rejects it.
//!
//! When the same field appears more than once, the last occurrence wins.
//!
//! Input shorter than [`MIN_QUERY_LEN`] characters after trimming parses to
//! [`QueryParse::BelowMinimum`]; callers treat that as "do not search".

use crate::types::EntityType;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Minimum trimmed query length, in characters, that triggers a search.
pub const MIN_QUERY_LEN: usize = 3;

fn token_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^(?i:(domain|user|password|ip|country|stealer)):(.+)$")
            .expect("token grammar must compile")
    })
}

/// A field that can be scoped with a `field:value` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Domain,
    User,
    Password,
    Ip,
    Country,
    Stealer,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Domain,
        Field::User,
        Field::Password,
        Field::Ip,
        Field::Country,
        Field::Stealer,
    ];

    /// The prefix as typed (`domain`, `user`, …).
    pub fn prefix(self) -> &'static str {
        match self {
            Field::Domain => "domain",
            Field::User => "user",
            Field::Password => "password",
            Field::Ip => "ip",
            Field::Country => "country",
            Field::Stealer => "stealer",
        }
    }

    /// Query parameter understood by the record service.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Domain => "domain",
            Field::User => "username",
            Field::Password => "password",
            Field::Ip => "ip_address",
            Field::Country => "country",
            Field::Stealer => "stealer_name",
        }
    }

    /// The record kind this field belongs to.
    pub fn entity(self) -> EntityType {
        match self {
            Field::Domain | Field::User | Field::Password | Field::Stealer => EntityType::Credential,
            Field::Ip | Field::Country => EntityType::System,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Field::ALL
            .into_iter()
            .find(|f| f.prefix().eq_ignore_ascii_case(prefix))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed query: field predicates plus whatever text was left over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedQuery {
    pub predicates: BTreeMap<Field, String>,
    pub residual: String,
}

impl ParsedQuery {
    pub fn has_residual(&self) -> bool {
        !self.residual.is_empty()
    }

    /// Predicates that belong to the other record kind.
    pub fn foreign_fields(&self, entity: EntityType) -> impl Iterator<Item = Field> + '_ {
        self.predicates.keys().copied().filter(move |f| f.entity() != entity)
    }

    /// Reject predicates that cannot apply to an `entity` search.
    pub fn check_scope(&self, entity: EntityType) -> Result<(), QueryError> {
        match self.foreign_fields(entity).next() {
            Some(field) => Err(QueryError::ForeignField { field, entity }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{field}: only applies to {} searches, not {entity}", .field.entity())]
    ForeignField { field: Field, entity: EntityType },
}

/// Outcome of [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParse {
    /// Fewer than [`MIN_QUERY_LEN`] characters after trimming.
    BelowMinimum,
    Ready(ParsedQuery),
}

impl QueryParse {
    pub fn ready(self) -> Option<ParsedQuery> {
        match self {
            QueryParse::Ready(q) => Some(q),
            QueryParse::BelowMinimum => None,
        }
    }
}

/// True when `text` is long enough to be searched for with `min_len`.
pub fn meets_minimum(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() >= min_len
}

/// Parse `text` with the default [`MIN_QUERY_LEN`].
pub fn parse(text: &str) -> QueryParse {
    parse_with_minimum(text, MIN_QUERY_LEN)
}

/// Parse `text`, treating anything shorter than `min_len` as no query.
pub fn parse_with_minimum(text: &str, min_len: usize) -> QueryParse {
    if !meets_minimum(text, min_len) {
        return QueryParse::BelowMinimum;
    }

    let mut parsed = ParsedQuery::default();
    let mut residual: Vec<&str> = Vec::new();

    for token in text.split_whitespace() {
        let predicate = token_grammar()
            .captures(token)
            .and_then(|caps| Some((Field::from_prefix(&caps[1])?, caps[2].to_string())));
        match predicate {
            // Last occurrence wins.
            Some((field, value)) => {
                parsed.predicates.insert(field, value);
            }
            None => residual.push(token),
        }
    }

    parsed.residual = residual.join(" ");
    QueryParse::Ready(parsed)
}
