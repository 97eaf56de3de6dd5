//! Core record types for snatch-core.
//!
//! This module defines the two record kinds served by the record store
//! ([`Credential`] and [`SystemRecord`]), the [`EntityType`] discriminant that
//! selects between them, the paged [`SearchResult`] container and the
//! [`Statistics`] summary.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Which record kind a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    #[default]
    Credential,
    System,
}

impl EntityType {
    /// Path segment used by the record service (`/search/{segment}`).
    pub fn path_segment(self) -> &'static str {
        match self {
            EntityType::Credential => "credentials",
            EntityType::System => "systems",
        }
    }

    /// The other entity type.
    pub fn toggled(self) -> Self {
        match self {
            EntityType::Credential => EntityType::System,
            EntityType::System => EntityType::Credential,
        }
    }

    /// Parse the loose spellings accepted by the CLI and the command bar.
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cred" | "creds" | "credential" | "credentials" => Some(EntityType::Credential),
            "s" | "sys" | "system" | "systems" | "device" | "devices" => Some(EntityType::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Credential => write!(f, "Credentials"),
            EntityType::System => write!(f, "Systems"),
        }
    }
}

/// A harvested credential record.
///
/// Every attribute except `id`, `upload_id` and `created_at` is optional; the
/// ingestion pipeline fills in whatever it could extract from the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    #[serde(default)]
    pub software: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub local_part: Option<String>,
    #[serde(default)]
    pub email_domain: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub stealer_name: Option<String>,
    pub upload_id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Domain if present, otherwise host. Blank values count as missing.
    pub fn domain_or_host(&self) -> Option<&str> {
        non_blank(self.domain.as_deref()).or_else(|| non_blank(self.host.as_deref()))
    }
}

/// A harvested system/device record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id: i64,
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub computer_name: Option<String>,
    #[serde(default)]
    pub hardware_id: Option<String>,
    #[serde(default)]
    pub machine_user: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub log_date: Option<String>,
    pub upload_id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One page of records plus the exact total across all pages.
///
/// `records.len() <= page_size`; `total` is independent of `records.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> SearchResult<T> {
    pub fn empty(page: u64, page_size: u64) -> Self {
        Self { records: Vec::new(), total: 0, page, page_size }
    }
}

/// A page of either record kind, as returned by a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum ResultSet {
    Credentials(SearchResult<Credential>),
    Systems(SearchResult<SystemRecord>),
}

impl ResultSet {
    /// A page with no records and a zero total.
    pub fn empty(entity: EntityType, page: u64, page_size: u64) -> Self {
        match entity {
            EntityType::Credential => ResultSet::Credentials(SearchResult::empty(page, page_size)),
            EntityType::System => ResultSet::Systems(SearchResult::empty(page, page_size)),
        }
    }

    pub fn entity(&self) -> EntityType {
        match self {
            ResultSet::Credentials(_) => EntityType::Credential,
            ResultSet::Systems(_) => EntityType::System,
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            ResultSet::Credentials(r) => r.total,
            ResultSet::Systems(r) => r.total,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultSet::Credentials(r) => r.records.len(),
            ResultSet::Systems(r) => r.records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page(&self) -> u64 {
        match self {
            ResultSet::Credentials(r) => r.page,
            ResultSet::Systems(r) => r.page,
        }
    }
}

/// Collection-wide counters reported by the record service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_credentials: u64,
    pub total_systems: u64,
    pub total_uploads: u64,
    pub unique_domains: u64,
    pub unique_countries: u64,
    pub unique_stealers: u64,
}

impl Statistics {
    pub fn total_records(&self) -> u64 {
        self.total_credentials + self.total_systems
    }
}

/// A per-value breakdown the record service can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakdown {
    /// Credentials grouped by `domain`.
    Domains,
    /// Systems grouped by `country`.
    Countries,
    /// Credentials grouped by `stealer_name`.
    Stealers,
}

impl Breakdown {
    pub const ALL: [Breakdown; 3] = [Breakdown::Domains, Breakdown::Countries, Breakdown::Stealers];

    /// Path segment used by the record service (`/stats/{segment}`).
    pub fn path_segment(self) -> &'static str {
        match self {
            Breakdown::Domains => "domains",
            Breakdown::Countries => "countries",
            Breakdown::Stealers => "stealers",
        }
    }

    /// Record column the breakdown groups by.
    pub fn column(self) -> &'static str {
        match self {
            Breakdown::Domains => "domain",
            Breakdown::Countries => "country",
            Breakdown::Stealers => "stealer_name",
        }
    }
}

impl std::fmt::Display for Breakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Breakdown::Domains => write!(f, "Top domains"),
            Breakdown::Countries => write!(f, "Top countries"),
            Breakdown::Stealers => write!(f, "Top stealers"),
        }
    }
}

/// One breakdown row: a column value and how many records carry it.
///
/// The service names the value after its column (`{"domain": .., "count": ..}`),
/// so every column name is accepted on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    #[serde(alias = "domain", alias = "country", alias = "stealer_name")]
    pub value: String,
    pub count: u64,
}

impl Tally {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self { value: value.into(), count }
    }
}

/// Group non-blank `values`, most frequent first, ties in value order, at
/// most `limit` rows.
pub fn tally<'a>(values: impl Iterator<Item = Option<&'a str>>, limit: u64) -> Vec<Tally> {
    let mut counts: std::collections::BTreeMap<&str, u64> = std::collections::BTreeMap::new();
    for value in values.filter_map(non_blank) {
        *counts.entry(value).or_default() += 1;
    }
    let mut rows: Vec<Tally> = counts.into_iter().map(|(value, count)| Tally::new(value, count)).collect();
    // Stable sort keeps the BTreeMap's value order within equal counts.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(limit as usize);
    rows
}

/// Treat `Some("")` and whitespace-only values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accept RFC 3339 timestamps and naive ISO-8601 ones (assumed UTC). The
/// record service emits the latter.
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
