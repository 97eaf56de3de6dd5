// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use crate::{app::AppState, theme::Theme, widgets::stats::TOP_ROWS};
use snatch_core::filters::FilterKey;
use snatch_core::types::EntityType;

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Theme(String),
    // Switch record kind
    Type(EntityType),
    Page(u64),
    Filter(FilterKey, String),
    // None clears every filter
    Unfilter(Option<FilterKey>),
    // Clear query text and filters
    Clear,
    Passwords,
    Stats,
    Retry,
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// Returns `Ok(cmd)` on success, `Err(message)` on failure. An empty
    /// string returns `Err("")` as a sentinel meaning "close without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" | "q!" | "quit!" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "clear" => Ok(Command::Clear),
            "pw" | "passwords" => Ok(Command::Passwords),
            "stats" => Ok(Command::Stats),
            "retry" | "r" => Ok(Command::Retry),
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <default|gruvbox>".to_string())
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            "type" => EntityType::parse_loose(rest)
                .map(Command::Type)
                .ok_or_else(|| "usage: type <creds|systems>".to_string()),
            "page" => match rest.parse::<u64>() {
                Ok(n) if n >= 1 => Ok(Command::Page(n)),
                Ok(_) => Err("pages start at 1".to_string()),
                Err(_) => Err("usage: page <n>".to_string()),
            },
            "filter" => {
                // Both `filter domain x.com` and `filter domain=x.com`.
                let (key, value) = rest
                    .split_once('=')
                    .or_else(|| rest.split_once(char::is_whitespace))
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .unwrap_or((rest, ""));
                if key.is_empty() || value.is_empty() {
                    return Err("usage: filter <key> <value>".to_string());
                }
                let key = key.parse::<FilterKey>().map_err(|e| e.to_string())?;
                Ok(Command::Filter(key, value.to_string()))
            }
            "unfilter" => {
                if rest.is_empty() {
                    Ok(Command::Unfilter(None))
                } else {
                    rest.parse::<FilterKey>()
                        .map(|k| Command::Unfilter(Some(k)))
                        .map_err(|e| e.to_string())
                }
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Execute a parsed [`Command`] against the application state.
///
/// Returns a message for the command bar when the command cannot apply in
/// the current state.
pub fn execute_command(s: &mut AppState, cmd: Command) -> Result<(), String> {
    match cmd {
        Command::Quit => {
            s.quit = true;
        }
        Command::Help => {
            s.show_help = !s.show_help;
        }
        Command::Theme(name) => {
            s.theme = Theme::by_name(&name);
        }
        Command::Type(entity) => {
            s.set_entity(entity);
        }
        Command::Page(n) => {
            let pages = s.orchestrator.machine().layout().map(|l| l.total_pages).unwrap_or(0);
            if pages == 0 {
                return Err("no results to page through".to_string());
            }
            s.results.reset();
            s.orchestrator.set_page(n);
        }
        Command::Filter(key, value) => {
            s.results.reset();
            s.orchestrator.set_filter(key, &value).map_err(|e| e.to_string())?;
        }
        Command::Unfilter(Some(key)) => {
            s.results.reset();
            s.orchestrator.clear_filter(key).map_err(|e| e.to_string())?;
        }
        Command::Unfilter(None) => {
            s.results.reset();
            s.orchestrator.clear_filters();
        }
        Command::Clear => {
            s.results.reset();
            s.query.input.clear();
            s.orchestrator.reset();
        }
        Command::Passwords => {
            s.results.show_passwords = !s.results.show_passwords;
        }
        Command::Stats => {
            s.show_stats = true;
            s.orchestrator.request_statistics();
            s.orchestrator.request_breakdowns(TOP_ROWS);
        }
        Command::Retry => {
            s.orchestrator.retry();
        }
    }
    Ok(())
}
