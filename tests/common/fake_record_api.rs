//! Fake record service for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /search/credentials`: filtered, paged credentials
//! - `GET /search/systems`: filtered, paged systems
//! - `GET /stats`: collection counters
//! - `GET /stats/{domains,countries,stealers}?limit=N`: top values per column
//!
//! Search replies use the service envelope
//! `{"results": [...], "total": N, "limit": L, "offset": O}`. Every request's
//! query string is recorded so tests can assert on the exact parameters the
//! HTTP store sent. Failure modes (status, delay, garbage body) apply to all
//! routes until reset.
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeRecordApi::start(credentials(), systems()).await.unwrap();
//! let store = HttpStore::new(&api.base_url(), Duration::from_secs(2)).unwrap();
//! ```

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use snatch_core::{Credential, Statistics, SystemRecord};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request the fake received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
}

/// How the fake misbehaves.
#[derive(Debug, Clone, Default)]
enum Mode {
    #[default]
    Normal,
    Status(u16, String),
    Malformed,
}

struct ApiState {
    credentials: Vec<Value>,
    systems: Vec<Value>,
    stats: Statistics,
    requests: Vec<RecordedRequest>,
    mode: Mode,
    delay: Duration,
}

type Shared = Arc<Mutex<ApiState>>;

/// Handle to the running fake record service.
pub struct FakeRecordApi {
    addr: SocketAddr,
    state: Shared,
}

impl FakeRecordApi {
    /// Start the server over the given corpora, served newest first.
    pub async fn start(credentials: Vec<Credential>, systems: Vec<SystemRecord>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = Statistics {
            total_credentials: credentials.len() as u64,
            total_systems: systems.len() as u64,
            total_uploads: 1,
            ..Default::default()
        };
        let mut credentials: Vec<Value> =
            credentials.iter().map(|c| serde_json::to_value(c).unwrap()).collect();
        let mut systems: Vec<Value> = systems.iter().map(|s| serde_json::to_value(s).unwrap()).collect();
        newest_first(&mut credentials);
        newest_first(&mut systems);

        let state = Arc::new(Mutex::new(ApiState {
            credentials,
            systems,
            stats,
            requests: Vec::new(),
            mode: Mode::Normal,
            delay: Duration::ZERO,
        }));

        let app = Router::new()
            .route("/search/credentials", get(search_credentials))
            .route("/search/systems", get(search_systems))
            .route("/stats", get(stats_handler))
            .route("/stats/domains", get(domain_stats))
            .route("/stats/countries", get(country_stats))
            .route("/stats/stealers", get(stealer_stats))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn last_request(&self) -> RecordedRequest {
        self.requests().await.pop().expect("no request recorded")
    }

    /// Answer every route with `status` and a plain-text `body`.
    pub async fn fail_with(&self, status: u16, body: &str) {
        self.state.lock().await.mode = Mode::Status(status, body.to_string());
    }

    /// Answer every route with 200 and a body that is not JSON.
    pub async fn send_garbage(&self) {
        self.state.lock().await.mode = Mode::Malformed;
    }

    /// Sleep before answering.
    pub async fn delay(&self, delay: Duration) {
        self.state.lock().await.delay = delay;
    }

    /// Back to normal answers with no delay.
    pub async fn heal(&self) {
        let mut state = self.state.lock().await;
        state.mode = Mode::Normal;
        state.delay = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

// Columns the free-text term and each named parameter match against.
const CREDENTIAL_TEXT: &[&str] = &["username", "domain", "host", "software", "email_domain"];
const CREDENTIAL_PARAMS: &[(&str, &[&str])] = &[
    ("domain", &["domain", "email_domain"]),
    ("username", &["username", "local_part"]),
    ("software", &["software"]),
    ("stealer_name", &["stealer_name"]),
    ("password", &["password"]),
];
const SYSTEM_TEXT: &[&str] = &["computer_name", "machine_user", "ip_address", "country", "machine_id"];
const SYSTEM_PARAMS: &[(&str, &[&str])] = &[
    ("country", &["country"]),
    ("ip_address", &["ip_address"]),
    ("computer_name", &["computer_name"]),
];

async fn search_credentials(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    search(state, "/search/credentials", params, credential_corpus, CREDENTIAL_TEXT, CREDENTIAL_PARAMS).await
}

async fn search_systems(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    search(state, "/search/systems", params, system_corpus, SYSTEM_TEXT, SYSTEM_PARAMS).await
}

async fn stats_handler(State(state): State<Shared>) -> Response {
    if let Some(early) = record(&state, "/stats", HashMap::new()).await {
        return early;
    }
    let stats = state.lock().await.stats.clone();
    axum::Json(stats).into_response()
}

async fn domain_stats(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    breakdown(state, "/stats/domains", params, credential_corpus, "domain").await
}

async fn country_stats(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    breakdown(state, "/stats/countries", params, system_corpus, "country").await
}

async fn stealer_stats(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    breakdown(state, "/stats/stealers", params, credential_corpus, "stealer_name").await
}

/// `GROUP BY column ORDER BY count DESC LIMIT n`, rows named after the column.
async fn breakdown(
    state: Shared,
    path: &str,
    params: HashMap<String, String>,
    corpus: fn(&ApiState) -> &Vec<Value>,
    column: &str,
) -> Response {
    if let Some(early) = record(&state, path, params.clone()).await {
        return early;
    }

    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let state = state.lock().await;
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in corpus(&*state).iter().filter_map(|r| r.get(column).and_then(Value::as_str)) {
        if !value.trim().is_empty() {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }
    let mut rows: Vec<(String, u64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(limit);

    let body: Vec<Value> = rows
        .into_iter()
        .map(|(value, count)| {
            let mut row = serde_json::Map::new();
            row.insert(column.to_string(), json!(value));
            row.insert("count".to_string(), json!(count));
            Value::Object(row)
        })
        .collect();
    axum::Json(body).into_response()
}

async fn search(
    state: Shared,
    path: &str,
    params: HashMap<String, String>,
    corpus: fn(&ApiState) -> &Vec<Value>,
    text_columns: &[&str],
    param_columns: &[(&str, &[&str])],
) -> Response {
    if let Some(early) = record(&state, path, params.clone()).await {
        return early;
    }

    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(50);
    let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);

    let state = state.lock().await;
    let matched: Vec<&Value> = corpus(&*state)
        .iter()
        .filter(|record| {
            let text_ok = params
                .get("q")
                .is_none_or(|q| text_columns.iter().any(|col| ilike(record, col, q)));
            let params_ok = param_columns.iter().all(|(name, cols)| {
                params.get(*name).is_none_or(|v| cols.iter().any(|col| ilike(record, col, v)))
            });
            text_ok && params_ok
        })
        .collect();

    let page: Vec<Value> = matched.iter().skip(offset).take(limit).map(|v| (*v).clone()).collect();
    axum::Json(json!({
        "results": page,
        "total": matched.len(),
        "limit": limit,
        "offset": offset,
    }))
    .into_response()
}

/// Log the request, apply the configured delay, and return the canned
/// failure if one is set.
async fn record(state: &Shared, path: &str, params: HashMap<String, String>) -> Option<Response> {
    let (mode, delay) = {
        let mut state = state.lock().await;
        state.requests.push(RecordedRequest { path: path.to_string(), params });
        (state.mode.clone(), state.delay)
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match mode {
        Mode::Normal => None,
        Mode::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Some((status, body).into_response())
        }
        Mode::Malformed => Some((StatusCode::OK, "<html>not json</html>").into_response()),
    }
}

fn credential_corpus(state: &ApiState) -> &Vec<Value> {
    &state.credentials
}

fn system_corpus(state: &ApiState) -> &Vec<Value> {
    &state.systems
}

fn ilike(record: &Value, column: &str, needle: &str) -> bool {
    record
        .get(column)
        .and_then(Value::as_str)
        .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
}

fn newest_first(records: &mut [Value]) {
    records.sort_by(|a, b| {
        let key = |v: &Value| (v["created_at"].as_str().unwrap_or("").to_string(), v["id"].as_i64().unwrap_or(0));
        key(b).cmp(&key(a))
    });
}
