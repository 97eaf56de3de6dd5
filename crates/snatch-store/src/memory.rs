//! In-memory record store.
//!
//! Mirrors the record service's matching rules so the TUI behaves the same
//! against the demo dataset as against a live backend: every term is a
//! case-insensitive substring match, terms are ANDed, and pages are ordered
//! newest first. A DSL predicate for the other record kind matches nothing;
//! other parameters an endpoint does not understand are ignored.

use snatch_core::store::{RecordStore, SearchRequest, StoreError};
use snatch_core::types::{
    tally, Breakdown, Credential, EntityType, ResultSet, SearchResult, Statistics, SystemRecord, Tally,
};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    credentials: Vec<Credential>,
    systems: Vec<SystemRecord>,
    latency: Duration,
}

impl MemoryStore {
    pub fn new(mut credentials: Vec<Credential>, mut systems: Vec<SystemRecord>) -> Self {
        credentials.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        systems.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Self { credentials, systems, latency: Duration::ZERO }
    }

    /// Delay every reply by `latency`, so loading states are visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn systems(&self) -> &[SystemRecord] {
        &self.systems
    }

    fn search_credentials(&self, request: &SearchRequest) -> SearchResult<Credential> {
        let params = request.field_params();
        let matched: Vec<&Credential> = self
            .credentials
            .iter()
            .filter(|c| credential_matches(c, &request.text, &params))
            .collect();
        paginate(matched, request)
    }

    fn search_systems(&self, request: &SearchRequest) -> SearchResult<SystemRecord> {
        let params = request.field_params();
        let matched: Vec<&SystemRecord> = self
            .systems
            .iter()
            .filter(|s| system_matches(s, &request.text, &params))
            .collect();
        paginate(matched, request)
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, StoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let set = match request.entity {
            _ if request.matches_nothing() => ResultSet::empty(request.entity, request.page, request.page_size),
            EntityType::Credential => ResultSet::Credentials(self.search_credentials(request)),
            EntityType::System => ResultSet::Systems(self.search_systems(request)),
        };
        tracing::debug!(
            generation = request.generation,
            total = set.total(),
            shown = set.len(),
            "memory store: search"
        );
        Ok(set)
    }

    async fn statistics(&self) -> Result<Statistics, StoreError> {
        fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> u64 {
            values
                .flatten()
                .filter(|v| !v.is_empty())
                .collect::<HashSet<_>>()
                .len() as u64
        }

        let uploads: HashSet<&str> = self
            .credentials
            .iter()
            .map(|c| c.upload_id.as_str())
            .chain(self.systems.iter().map(|s| s.upload_id.as_str()))
            .collect();

        Ok(Statistics {
            total_credentials: self.credentials.len() as u64,
            total_systems: self.systems.len() as u64,
            total_uploads: uploads.len() as u64,
            unique_domains: distinct(self.credentials.iter().map(|c| c.domain.as_deref())),
            unique_countries: distinct(self.systems.iter().map(|s| s.country.as_deref())),
            unique_stealers: distinct(self.credentials.iter().map(|c| c.stealer_name.as_deref())),
        })
    }

    async fn top(&self, breakdown: Breakdown, limit: u64) -> Result<Vec<Tally>, StoreError> {
        let rows = match breakdown {
            Breakdown::Domains => tally(self.credentials.iter().map(|c| c.domain.as_deref()), limit),
            Breakdown::Countries => tally(self.systems.iter().map(|s| s.country.as_deref()), limit),
            Breakdown::Stealers => tally(self.credentials.iter().map(|c| c.stealer_name.as_deref()), limit),
        };
        Ok(rows)
    }
}

fn paginate<T: Clone>(matched: Vec<&T>, request: &SearchRequest) -> SearchResult<T> {
    let total = matched.len() as u64;
    let records = matched
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.page_size as usize)
        .cloned()
        .collect();
    SearchResult { records, total, page: request.page, page_size: request.page_size }
}

/// SQL `ILIKE '%needle%'` on an optional column.
fn ilike(column: Option<&str>, needle: &str) -> bool {
    column.is_some_and(|c| c.to_lowercase().contains(&needle.to_lowercase()))
}

fn any_ilike(columns: &[Option<&str>], needle: &str) -> bool {
    columns.iter().any(|c| ilike(*c, needle))
}

fn credential_matches(c: &Credential, text: &str, params: &BTreeMap<&str, &str>) -> bool {
    if !text.is_empty()
        && !any_ilike(
            &[
                c.username.as_deref(),
                c.domain.as_deref(),
                c.host.as_deref(),
                c.software.as_deref(),
                c.email_domain.as_deref(),
            ],
            text,
        )
    {
        return false;
    }

    params.iter().all(|(name, value)| match *name {
        "domain" => any_ilike(&[c.domain.as_deref(), c.email_domain.as_deref()], value),
        "username" => any_ilike(&[c.username.as_deref(), c.local_part.as_deref()], value),
        "software" => ilike(c.software.as_deref(), value),
        "stealer_name" => ilike(c.stealer_name.as_deref(), value),
        "password" => ilike(c.password.as_deref(), value),
        _ => true,
    })
}

fn system_matches(s: &SystemRecord, text: &str, params: &BTreeMap<&str, &str>) -> bool {
    if !text.is_empty()
        && !any_ilike(
            &[
                s.computer_name.as_deref(),
                s.machine_user.as_deref(),
                s.ip_address.as_deref(),
                s.country.as_deref(),
                s.machine_id.as_deref(),
            ],
            text,
        )
    {
        return false;
    }

    params.iter().all(|(name, value)| match *name {
        "country" => ilike(s.country.as_deref(), value),
        "ip_address" => ilike(s.ip_address.as_deref(), value),
        "computer_name" => ilike(s.computer_name.as_deref(), value),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use snatch_core::filters::{FilterKey, Filters};
    use snatch_core::query;

    fn cred(id: i64, username: &str, domain: &str, stealer: &str) -> Credential {
        Credential {
            id,
            software: Some("Chrome".into()),
            host: Some(format!("https://{domain}/login")),
            username: Some(username.into()),
            password: Some(format!("{username}123")),
            domain: Some(domain.into()),
            local_part: None,
            email_domain: None,
            filepath: None,
            stealer_name: Some(stealer.into()),
            upload_id: format!("upload-{}", id % 2),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + ChronoDuration::hours(id),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                cred(1, "alice", "paypal.com", "RedLine"),
                cred(2, "bob", "amazon.com", "Raccoon"),
                cred(3, "carol", "paypal.com", "Vidar"),
                cred(4, "dave", "example.org", "RedLine"),
            ],
            Vec::new(),
        )
    }

    fn request(text: &str, filters: Filters, page: u64, size: u64) -> SearchRequest {
        SearchRequest::new(1, query::parse(text).ready().unwrap(), filters, page, size)
    }

    fn ids(set: &ResultSet) -> Vec<i64> {
        match set {
            ResultSet::Credentials(p) => p.records.iter().map(|c| c.id).collect(),
            ResultSet::Systems(p) => p.records.iter().map(|s| s.id).collect(),
        }
    }

    #[tokio::test]
    async fn free_text_matches_case_insensitively_newest_first() {
        let set = store().search(&request("PAYPAL", Filters::new(EntityType::Credential), 1, 50)).await.unwrap();
        assert_eq!(ids(&set), vec![3, 1]);
        assert_eq!(set.total(), 2);
    }

    #[tokio::test]
    async fn predicates_and_filters_combine() {
        let filters = Filters::new(EntityType::Credential).set(FilterKey::StealerName, "redline").unwrap();
        let set = store().search(&request("domain:paypal", filters, 1, 50)).await.unwrap();
        assert_eq!(ids(&set), vec![1]);
    }

    #[tokio::test]
    async fn total_is_independent_of_page() {
        let set = store().search(&request("user:a", Filters::new(EntityType::Credential), 2, 2)).await.unwrap();
        // alice, carol, dave all contain "a"
        assert_eq!(set.total(), 3);
        assert_eq!(ids(&set), vec![1]);
        assert_eq!(set.page(), 2);
    }

    #[tokio::test]
    async fn page_past_end_is_empty_with_total() {
        let set = store().search(&request("paypal", Filters::new(EntityType::Credential), 5, 50)).await.unwrap();
        assert!(set.is_empty());
        assert_eq!(set.total(), 2);
    }

    #[tokio::test]
    async fn system_predicate_on_credentials_matches_nothing() {
        let set = store().search(&request("country:RU", Filters::new(EntityType::Credential), 1, 50)).await.unwrap();
        assert_eq!(set.entity(), EntityType::Credential);
        assert_eq!(set.total(), 0);
        assert!(set.is_empty());

        let set = store().search(&request("paypal ip:10.0.", Filters::new(EntityType::Credential), 1, 50)).await.unwrap();
        assert_eq!(set.total(), 0);
    }

    #[tokio::test]
    async fn statistics_count_distinct_values() {
        let stats = store().statistics().await.unwrap();
        assert_eq!(stats.total_credentials, 4);
        assert_eq!(stats.unique_domains, 3);
        assert_eq!(stats.unique_stealers, 3);
        assert_eq!(stats.total_uploads, 2);
    }

    #[tokio::test]
    async fn top_groups_by_column() {
        let store = store();
        assert_eq!(
            store.top_domains(10).await.unwrap(),
            vec![Tally::new("paypal.com", 2), Tally::new("amazon.com", 1), Tally::new("example.org", 1)]
        );
        assert_eq!(store.top_stealers(1).await.unwrap(), vec![Tally::new("RedLine", 2)]);
        assert!(store.top_countries(10).await.unwrap().is_empty());
    }
}
