//! HTTP adapter for the record service.
//!
//! ```text
//! GET {base}/search/credentials?q=..&domain=..&limit=50&offset=100
//! GET {base}/search/systems?q=..&country=..&limit=50&offset=0
//! GET {base}/stats
//! GET {base}/stats/{domains,countries,stealers}?limit=20
//! ```
//!
//! Search replies are `{"results": [...], "total": N, "limit": L, "offset": O}`.

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, USER_AGENT};
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use snatch_core::config::StoreConfig;
use snatch_core::store::{RecordStore, SearchRequest, StoreError};
use snatch_core::types::{Breakdown, Credential, EntityType, ResultSet, SearchResult, Statistics, SystemRecord, Tally};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    results: Vec<T>,
    total: u64,
}

#[derive(Clone)]
pub struct HttpStore {
    base_url: String,
    timeout: Duration,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpStore {
    /// Fails only if `base_url` is not an absolute `http://` URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let uri: Uri = base_url
            .parse()
            .map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(StoreError::InvalidUrl(format!("{base_url}: unsupported scheme {other}")))
            }
            None => return Err(StoreError::InvalidUrl(format!("{base_url}: missing scheme"))),
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { base_url, timeout, client })
    }

    pub fn from_config(cfg: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(&cfg.base_url, cfg.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for one search request.
    pub fn search_url(&self, request: &SearchRequest) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if !request.text.is_empty() {
            params.push(("q", request.text.clone()));
        }
        for (name, value) in request.field_params() {
            params.push((name, value.to_string()));
        }
        params.push(("limit", request.page_size.to_string()));
        params.push(("offset", request.offset().to_string()));

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/search/{}?{query}", self.base_url, request.entity.path_segment())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        let uri: Uri = url
            .parse()
            .map_err(|e| StoreError::InvalidUrl(format!("{url}: {e}")))?;
        let req = Request::get(uri)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("snatch/", env!("CARGO_PKG_VERSION")))
            .body(Empty::<Bytes>::new())
            .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| StoreError::Transport(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| StoreError::Transport(e.to_string()))?
                .to_bytes();
            Ok::<_, StoreError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout.as_millis() as u64))??;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: truncate(text.trim(), 200),
            });
        }

        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl RecordStore for HttpStore {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, StoreError> {
        if request.matches_nothing() {
            // The service ignores parameters it does not know.
            tracing::debug!(generation = request.generation, "http store: foreign predicate, not sending");
            return Ok(ResultSet::empty(request.entity, request.page, request.page_size));
        }
        let url = self.search_url(request);
        tracing::debug!(%url, generation = request.generation, "http store: search");

        let set = match request.entity {
            EntityType::Credential => {
                let env: Envelope<Credential> = self.get_json(&url).await?;
                ResultSet::Credentials(into_page(env, request))
            }
            EntityType::System => {
                let env: Envelope<SystemRecord> = self.get_json(&url).await?;
                ResultSet::Systems(into_page(env, request))
            }
        };
        tracing::debug!(total = set.total(), shown = set.len(), "http store: search done");
        Ok(set)
    }

    async fn statistics(&self) -> Result<Statistics, StoreError> {
        let url = format!("{}/stats", self.base_url);
        tracing::debug!(%url, "http store: statistics");
        self.get_json(&url).await
    }

    async fn top(&self, breakdown: Breakdown, limit: u64) -> Result<Vec<Tally>, StoreError> {
        let url = format!("{}/stats/{}?limit={limit}", self.base_url, breakdown.path_segment());
        tracing::debug!(%url, "http store: breakdown");
        self.get_json(&url).await
    }
}

fn into_page<T>(env: Envelope<T>, request: &SearchRequest) -> SearchResult<T> {
    SearchResult {
        records: env.results,
        total: env.total,
        page: request.page,
        page_size: request.page_size,
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
