//! Test builders: ergonomic constructors for records, stores and
//! orchestrators.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use snatch_core::orchestrator::{MachineSettings, SearchOrchestrator};
use snatch_core::risk::RiskRules;
use snatch_core::store::{RecordStore, SearchRequest, StoreError};
use snatch_core::{Breakdown, Credential, EntityType, ResultSet, Statistics, SystemRecord, Tally};
use snatch_store::MemoryStore;
use std::sync::{Arc, Mutex};

/// Fixed reference instant so record order never depends on the wall clock.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// CredentialBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Credential`] fixtures.
///
/// # Example
///
/// ```rust
/// let cred = CredentialBuilder::new(1)
///     .domain("www.paypal.com")
///     .username("john@example.com")
///     .stealer("RedLine")
///     .build();
/// ```
pub struct CredentialBuilder {
    inner: Credential,
}

impl CredentialBuilder {
    /// Record `id`, created `id` minutes after [`epoch`] so higher ids are newer.
    pub fn new(id: i64) -> Self {
        Self {
            inner: Credential {
                id,
                software: None,
                host: None,
                username: None,
                password: None,
                domain: None,
                local_part: None,
                email_domain: None,
                filepath: None,
                stealer_name: None,
                upload_id: "upl-test".to_string(),
                created_at: epoch() + Duration::minutes(id),
            },
        }
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.inner.domain = Some(domain.to_string());
        self.inner.host = Some(format!("https://{domain}/login"));
        self
    }

    /// Sets `username`, plus `local_part`/`email_domain` when it looks like an address.
    pub fn username(mut self, username: &str) -> Self {
        self.inner.username = Some(username.to_string());
        if let Some((local, mail)) = username.split_once('@') {
            self.inner.local_part = Some(local.to_string());
            self.inner.email_domain = Some(mail.to_string());
        }
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.inner.password = Some(password.to_string());
        self
    }

    pub fn software(mut self, software: &str) -> Self {
        self.inner.software = Some(software.to_string());
        self
    }

    pub fn stealer(mut self, stealer: &str) -> Self {
        self.inner.stealer_name = Some(stealer.to_string());
        self
    }

    pub fn build(self) -> Credential {
        self.inner
    }
}

// ---------------------------------------------------------------------------
// SystemBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`SystemRecord`] fixtures.
pub struct SystemBuilder {
    inner: SystemRecord,
}

impl SystemBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            inner: SystemRecord {
                id,
                machine_id: None,
                computer_name: None,
                hardware_id: None,
                machine_user: None,
                ip_address: None,
                country: None,
                log_date: None,
                upload_id: "upl-test".to_string(),
                created_at: epoch() + Duration::minutes(id),
            },
        }
    }

    pub fn computer(mut self, name: &str) -> Self {
        self.inner.computer_name = Some(name.to_string());
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.inner.machine_user = Some(user.to_string());
        self
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.inner.ip_address = Some(ip.to_string());
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.inner.country = Some(country.to_string());
        self
    }

    pub fn hwid(mut self, hwid: &str) -> Self {
        self.inner.hardware_id = Some(hwid.to_string());
        self
    }

    pub fn machine_id(mut self, id: &str) -> Self {
        self.inner.machine_id = Some(id.to_string());
        self
    }

    pub fn build(self) -> SystemRecord {
        self.inner
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Memory store over the fixture corpora.
pub fn fixture_store() -> MemoryStore {
    MemoryStore::new(super::fixtures::credentials(), super::fixtures::systems())
}

/// Wraps a store and records every request it receives.
pub struct RecordingStore<S> {
    inner: S,
    requests: Mutex<Vec<SearchRequest>>,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for RecordingStore<S> {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, StoreError> {
        self.requests.lock().unwrap().push(request.clone());
        self.inner.search(request).await
    }

    async fn statistics(&self) -> Result<Statistics, StoreError> {
        self.inner.statistics().await
    }

    async fn top(&self, breakdown: Breakdown, limit: u64) -> Result<Vec<Tally>, StoreError> {
        self.inner.top(breakdown, limit).await
    }
}

/// An orchestrator over `store` on the current runtime with default settings.
pub fn orchestrator(store: Arc<dyn RecordStore>) -> SearchOrchestrator {
    orchestrator_for(store, EntityType::Credential)
}

pub fn orchestrator_for(store: Arc<dyn RecordStore>, entity: EntityType) -> SearchOrchestrator {
    SearchOrchestrator::new(
        store,
        tokio::runtime::Handle::current(),
        entity,
        MachineSettings::default(),
        RiskRules::default(),
    )
}
