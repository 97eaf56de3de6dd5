use clap::{Parser, Subcommand};
use snatch::headless::{self, OutputFormat, SearchJob};
use snatch_core::config::Config;
use snatch_core::{EntityType, FilterKey};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "snatch", about = "Snatch: search harvested credentials and system records")]
struct Cli {
    /// Write debug logs to /tmp/snatch-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Use the bundled demo dataset instead of the record service.
    #[arg(long, global = true)]
    demo: bool,

    /// Simulated store latency for --demo, in milliseconds.
    #[arg(long, global = true, default_value_t = 150)]
    demo_latency_ms: u64,

    /// Record service base URL (overrides `store.base_url`).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Records per page (overrides `search.page_size`).
    #[arg(long, global = true)]
    page_size: Option<u64>,

    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run one search, print the page and exit.
    Search {
        /// Query text; accepts field:value tokens.
        query: String,

        /// Record kind: credentials or systems.
        #[arg(long = "type", short = 't', default_value = "credentials", value_parser = parse_entity)]
        entity: EntityType,

        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Structured filter, repeatable: --filter domain=paypal.com
        #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
        filters: Vec<(FilterKey, String)>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Print passwords instead of masking them.
        #[arg(long)]
        show_passwords: bool,
    },
}

fn parse_entity(s: &str) -> Result<EntityType, String> {
    EntityType::parse_loose(s).ok_or_else(|| format!("unknown record type `{s}` (credentials, systems)"))
}

fn parse_filter(s: &str) -> Result<(FilterKey, String), String> {
    let (key, value) = s.split_once('=').ok_or("expected key=value")?;
    let key: FilterKey = key.parse().map_err(|e: snatch_core::FilterError| e.to_string())?;
    Ok((key, value.trim().to_string()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        init_logging(cli.command.is_some())?;
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "config unreadable, using defaults");
            Config::defaults()
        }),
    };
    if let Some(url) = cli.url {
        config.store.base_url = url;
    }
    if let Some(page_size) = cli.page_size {
        config.search.page_size = page_size;
    }
    config.validate()?;

    let demo = cli.demo.then(|| Duration::from_millis(cli.demo_latency_ms));

    match cli.command {
        None => snatch_tui::run(config, demo),
        Some(Cmd::Search { query, entity, page, filters, format, show_passwords }) => {
            let job = SearchJob { query, entity, page, filters };
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            let report = runtime.block_on(async {
                let store = snatch_store::open(&config.store, demo)?;
                headless::run(store, &config, &job).await
            })?;
            let show = show_passwords || config.ui.show_passwords;
            report.write(&mut std::io::stdout().lock(), format, show)
        }
    }
}

/// The console owns stdout, so interactive runs log to a file. Headless runs
/// log to stderr.
fn init_logging(headless: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

    if headless {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
        return Ok(());
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/snatch-debug.log")?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    tracing::info!("snatch debug log started: tail -f /tmp/snatch-debug.log");
    Ok(())
}
