//! Headless one-shot search: `snatch search <QUERY>`.
//!
//! Runs a single search through the same [`SearchOrchestrator`] the console
//! uses (debounce flushed), then prints the page as an aligned table or as
//! JSON. Below-minimum queries and store failures are errors, so the process
//! exits non-zero.

use anyhow::{bail, Context};
use clap::ValueEnum;
use serde_json::{json, Value};
use snatch_core::config::Config;
use snatch_core::orchestrator::{MachineSettings, SearchOrchestrator, SearchStatus};
use snatch_core::pagination::PageLayout;
use snatch_core::risk::RecordAnnotation;
use snatch_core::store::RecordStore;
use snatch_core::{EntityType, FilterKey, ResultSet};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::runtime::Handle;

const MASK: &str = "••••••••";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One headless search.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub query: String,
    pub entity: EntityType,
    pub page: u64,
    pub filters: Vec<(FilterKey, String)>,
}

/// A finished search, ready to print.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub query: String,
    pub results: ResultSet,
    pub layout: PageLayout,
    pub annotations: Vec<RecordAnnotation>,
}

/// Run `job` against `store` and wait for its page.
///
/// Must be called from within a tokio runtime; requests are spawned onto it.
pub async fn run(store: Arc<dyn RecordStore>, config: &Config, job: &SearchJob) -> anyhow::Result<SearchReport> {
    let settings = MachineSettings::from(&config.search);
    let min_len = settings.min_query_len;
    let mut orchestrator =
        SearchOrchestrator::new(store, Handle::current(), job.entity, settings, config.risk.clone());

    for (key, value) in &job.filters {
        orchestrator
            .set_filter(*key, value)
            .with_context(|| format!("--filter {key}={value}"))?;
    }
    orchestrator.set_free_text(&job.query);
    if !orchestrator.machine().context().is_searchable(min_len) {
        bail!("query must be at least {min_len} characters");
    }

    orchestrator.settle().await;
    if job.page > 1 {
        // Pages are clamped against the first reply's total.
        orchestrator.set_page(job.page);
        orchestrator.settle().await;
    }

    let view = orchestrator.view();
    if let SearchStatus::Error(msg) = view.status {
        bail!("search failed: {msg}");
    }
    let (Some(results), Some(layout)) = (view.results, view.layout.clone()) else {
        bail!("search did not complete");
    };
    tracing::debug!(total = results.total(), page = layout.current, "headless search done");

    Ok(SearchReport {
        query: job.query.clone(),
        results: results.clone(),
        layout,
        annotations: view.annotations.clone(),
    })
}

impl SearchReport {
    pub fn write(&self, out: &mut impl Write, format: OutputFormat, show_passwords: bool) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &self.to_json(show_passwords)?)?;
                writeln!(out)?;
            }
            OutputFormat::Table => self.write_table(out, show_passwords)?,
        }
        Ok(())
    }

    pub fn to_json(&self, show_passwords: bool) -> serde_json::Result<Value> {
        let records = match &self.results {
            ResultSet::Credentials(page) => page.records.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?,
            ResultSet::Systems(page) => page.records.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?,
        };

        let records: Vec<Value> = records
            .into_iter()
            .zip(&self.annotations)
            .map(|(mut record, ann)| {
                if let Some(obj) = record.as_object_mut() {
                    if !show_passwords && obj.get("password").is_some_and(|p| !p.is_null()) {
                        obj.insert("password".into(), json!(MASK));
                    }
                    obj.insert("risk_level".into(), json!(ann.risk_level));
                    obj.insert("severity".into(), json!(ann.severity));
                }
                record
            })
            .collect();

        Ok(json!({
            "entity": self.results.entity(),
            "query": self.query,
            "total": self.layout.total_results,
            "page": self.layout.current,
            "total_pages": self.layout.total_pages,
            "range": [self.layout.range_start, self.layout.range_end],
            "window": self.layout.window.to_string(),
            "records": records,
        }))
    }

    pub fn write_table(&self, out: &mut impl Write, show_passwords: bool) -> io::Result<()> {
        let badge = |ann: &RecordAnnotation| {
            (
                ann.risk_level.map(|r| r.to_string().to_uppercase()).unwrap_or_default(),
                ann.severity.map(|s| s.to_string()).unwrap_or_default(),
            )
        };
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

        match &self.results {
            ResultSet::Credentials(page) => {
                writeln!(
                    out,
                    "{:<6} {:<8} {:<28} {:<32} {:<16} {:<16} {:<8} {}",
                    "RISK", "SEVERITY", "DOMAIN", "USERNAME", "PASSWORD", "SOFTWARE", "STEALER", "SEEN"
                )?;
                for (c, ann) in page.records.iter().zip(&self.annotations) {
                    let (risk, severity) = badge(ann);
                    let password = match (&c.password, show_passwords) {
                        (None, _) => "-".to_string(),
                        (Some(_), false) => MASK.to_string(),
                        (Some(p), true) => p.clone(),
                    };
                    writeln!(
                        out,
                        "{:<6} {:<8} {:<28} {:<32} {:<16} {:<16} {:<8} {}",
                        risk,
                        severity,
                        fit(c.domain_or_host().unwrap_or("-"), 28),
                        fit(&text(&c.username), 32),
                        fit(&password, 16),
                        fit(&text(&c.software), 16),
                        fit(&text(&c.stealer_name), 8),
                        c.created_at.format("%Y-%m-%d"),
                    )?;
                }
            }
            ResultSet::Systems(page) => {
                writeln!(
                    out,
                    "{:<6} {:<20} {:<16} {:<16} {:<7} {:<24} {}",
                    "RISK", "COMPUTER", "USER", "IP", "COUNTRY", "HWID", "SEEN"
                )?;
                for (s, ann) in page.records.iter().zip(&self.annotations) {
                    let (risk, _) = badge(ann);
                    writeln!(
                        out,
                        "{:<6} {:<20} {:<16} {:<16} {:<7} {:<24} {}",
                        risk,
                        fit(&text(&s.computer_name), 20),
                        fit(&text(&s.machine_user), 16),
                        fit(&text(&s.ip_address), 16),
                        fit(&text(&s.country), 7),
                        fit(&text(&s.hardware_id), 24),
                        s.created_at.format("%Y-%m-%d"),
                    )?;
                }
            }
        }

        writeln!(out)?;
        if self.layout.total_results == 0 {
            writeln!(out, "No results found")?;
        } else {
            writeln!(out, "{}", self.layout.range_label())?;
        }
        if self.layout.has_controls() {
            writeln!(out, "Pages: {}", self.layout.window)?;
        }
        Ok(())
    }
}

/// Truncate to `width` characters, marking the cut with `…`.
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
