//! Results pane: the current page of records, or an explanation of why
//! there are none.
//!
//! # Navigation (when pane is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k` | Select previous record |
//! | `↓` / `j` | Select next record |
//! | `PageUp` / `Ctrl+u` | Move selection up a screenful |
//! | `PageDown` / `Ctrl+d` | Move selection down a screenful |
//!
//! Every row carries its risk badge (and severity badge for credentials).
//! Occurrences of the free-text term are highlighted in the main columns.

use std::cell::Cell as StdCell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget, Wrap},
};
use snatch_core::orchestrator::{SearchStatus, SearchView};
use snatch_core::risk::RecordAnnotation;
use snatch_core::types::{Credential, EntityType, ResultSet, SystemRecord};

const MASK: &str = "••••••••";
const MISSING: &str = "—";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ResultsState {
    /// Index of the highlighted record on the current page.
    pub selected: usize,
    pub show_passwords: bool,
    /// Cached from the last render so `handle()` can page by a screenful.
    last_height: StdCell<usize>,
}

impl Default for ResultsState {
    fn default() -> Self {
        Self { selected: 0, show_passwords: false, last_height: StdCell::new(20) }
    }
}

impl ResultsState {
    pub fn new(show_passwords: bool) -> Self {
        Self { show_passwords, ..Self::default() }
    }

    /// Back to the first row, e.g. when a new page arrives.
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    /// Handle a navigation event over a page of `len` records.
    pub fn handle(&mut self, event: &AppEvent, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let page = self.last_height.get().max(1);
        let last = len - 1;
        self.selected = match event {
            AppEvent::Nav(Direction::Up) => self.selected.saturating_sub(1),
            AppEvent::Nav(Direction::Down) => (self.selected + 1).min(last),
            AppEvent::ScrollUp => self.selected.saturating_sub(page),
            AppEvent::ScrollDown => (self.selected + page).min(last),
            _ => return,
        };
        tracing::debug!(selected = self.selected, "results: selection moved");
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct Results<'a> {
    state: &'a ResultsState,
    view: &'a SearchView<'a>,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> Results<'a> {
    pub fn new(state: &'a ResultsState, view: &'a SearchView<'a>, focused: bool, theme: &'a Theme) -> Self {
        Self { state, view, focused, theme }
    }

    fn title(&self) -> String {
        let entity = self.view.context.entity();
        match (self.view.status, self.view.results) {
            (SearchStatus::Loading, Some(_)) => format!("{entity} (refreshing…)"),
            (_, Some(set)) => format!("{entity} — page {}", set.page()),
            _ => entity.to_string(),
        }
    }

    fn message(&self, lines: Vec<Line<'static>>, area: Rect, buf: &mut Buffer) {
        Paragraph::new(lines).wrap(Wrap { trim: false }).render(area, buf);
    }

    fn instructions(&self) -> Vec<Line<'static>> {
        let hint = self.theme.hint;
        let mut lines = vec![
            Line::from(Span::styled("Type at least three characters to search.", hint)),
            Line::from(""),
            Line::from(Span::styled("Scope a term to a field with field:value, e.g.", hint)),
        ];
        let examples: &[&str] = match self.view.context.entity() {
            EntityType::Credential => &["  domain:paypal.com", "  user:john stealer:redline", "  password:qwerty gmail"],
            EntityType::System => &["  country:US", "  ip:185.220.", "  DESKTOP country:BR"],
        };
        lines.extend(examples.iter().map(|e| Line::from(Span::styled(*e, self.theme.secondary))));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "f edits filters, t switches credentials/systems, ? lists every key.",
            hint,
        )));
        lines
    }
}

impl Widget for Results<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };
        let block = Block::bordered().title(self.title()).border_style(border_style);
        let mut inner = block.inner(area);
        block.render(area, buf);

        match (self.view.status, self.view.results) {
            (SearchStatus::Idle, _) => return self.message(self.instructions(), inner, buf),
            (SearchStatus::Empty, _) => {
                return self.message(
                    vec![
                        Line::from("No results found"),
                        Line::from(Span::styled(
                            "Try a broader term, or drop filters with :unfilter",
                            self.theme.hint,
                        )),
                    ],
                    inner,
                    buf,
                )
            }
            (SearchStatus::Error(msg), previous) => {
                let banner = vec![
                    Line::from(Span::styled(format!("✗ {msg}"), self.theme.error)),
                    Line::from(Span::styled(":retry to try again", self.theme.hint)),
                ];
                let banner_height = 2.min(inner.height);
                self.message(banner, Rect { height: banner_height, ..inner }, buf);
                if previous.is_none() {
                    return;
                }
                inner.y += banner_height;
                inner.height -= banner_height;
            }
            (_, None) => {
                return self.message(vec![Line::from(Span::styled("Searching…", self.theme.loading))], inner, buf)
            }
            _ => {}
        }

        let Some(set) = self.view.results else { return };
        // Header row takes one line.
        self.state.last_height.set(inner.height.saturating_sub(1) as usize);

        let term = self.view.context.parse(0).ready().map(|q| q.residual).unwrap_or_default();
        let table = match set {
            ResultSet::Credentials(page) => credential_table(
                &page.records,
                &self.view.annotations,
                &term,
                self.state.show_passwords,
                self.theme,
            ),
            ResultSet::Systems(page) => system_table(&page.records, &self.view.annotations, &term, self.theme),
        };
        let table = if self.focused {
            table.row_highlight_style(self.theme.selected)
        } else {
            table
        };

        let mut table_state = TableState::default().with_selected(Some(self.state.selected.min(set.len().saturating_sub(1))));
        StatefulWidget::render(table, inner, buf, &mut table_state);
    }
}

// ---------------------------------------------------------------------------
// Row rendering
// ---------------------------------------------------------------------------

fn credential_table<'a>(
    records: &'a [Credential],
    annotations: &[RecordAnnotation],
    term: &str,
    show_passwords: bool,
    theme: &Theme,
) -> Table<'a> {
    let header = Row::new(["Risk", "Severity", "Domain", "Username", "Password", "Software", "Stealer", "Seen"])
        .style(theme.secondary);

    let rows = records.iter().zip(annotations).map(|(c, ann)| {
        let password = match (c.password.as_deref(), show_passwords) {
            (None, _) => MISSING.to_string(),
            (Some(_), false) => MASK.to_string(),
            (Some(p), true) => p.to_string(),
        };
        Row::new(vec![
            risk_cell(ann, theme),
            severity_cell(ann, theme),
            Cell::from(highlight(c.domain_or_host().unwrap_or(MISSING), term, Style::default(), theme.highlight)),
            Cell::from(highlight(c.username.as_deref().unwrap_or(MISSING), term, Style::default(), theme.highlight)),
            Cell::from(password),
            Cell::from(Span::styled(c.software.clone().unwrap_or_else(|| MISSING.into()), theme.secondary)),
            stealer_cell(c.stealer_name.as_deref(), theme),
            Cell::from(Span::styled(c.created_at.format("%Y-%m-%d").to_string(), theme.secondary)),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Fill(3),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
}

fn system_table<'a>(
    records: &'a [SystemRecord],
    annotations: &[RecordAnnotation],
    term: &str,
    theme: &Theme,
) -> Table<'a> {
    let header = Row::new(["Risk", "Computer", "User", "IP address", "Country", "Hardware ID", "Seen"])
        .style(theme.secondary);

    let rows = records.iter().zip(annotations).map(|(s, ann)| {
        let text = |v: &Option<String>| v.as_deref().unwrap_or(MISSING).to_string();
        Row::new(vec![
            risk_cell(ann, theme),
            Cell::from(highlight(s.computer_name.as_deref().unwrap_or(MISSING), term, Style::default(), theme.highlight)),
            Cell::from(highlight(s.machine_user.as_deref().unwrap_or(MISSING), term, Style::default(), theme.highlight)),
            Cell::from(highlight(s.ip_address.as_deref().unwrap_or(MISSING), term, Style::default(), theme.highlight)),
            Cell::from(text(&s.country)),
            Cell::from(Span::styled(text(&s.hardware_id), theme.secondary)),
            Cell::from(Span::styled(s.created_at.format("%Y-%m-%d").to_string(), theme.secondary)),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Fill(3),
            Constraint::Length(10),
        ],
    )
    .header(header)
}

fn risk_cell(ann: &RecordAnnotation, theme: &Theme) -> Cell<'static> {
    match ann.risk_level {
        Some(level) => Cell::from(Span::styled(level.to_string().to_uppercase(), theme.risk_style(level))),
        None => Cell::from(""),
    }
}

fn severity_cell(ann: &RecordAnnotation, theme: &Theme) -> Cell<'static> {
    match ann.severity {
        Some(sev) => Cell::from(Span::styled(format!(" {sev} "), theme.severity_style(sev))),
        None => Cell::from(""),
    }
}

fn stealer_cell(stealer: Option<&str>, theme: &Theme) -> Cell<'static> {
    match stealer {
        Some(name) if !name.trim().is_empty() => Cell::from(Span::styled(name.to_string(), theme.stealer_style(name))),
        _ => Cell::from(Span::styled(MISSING, theme.secondary)),
    }
}

/// Split `text` into spans, styling every ASCII-case-insensitive occurrence
/// of `term` with `hl`.
pub fn highlight(text: &str, term: &str, base: Style, hl: Style) -> Line<'static> {
    if term.is_empty() || !term.is_ascii() {
        return Line::from(Span::styled(text.to_string(), base));
    }
    let haystack = text.to_ascii_lowercase();
    let needle = term.to_ascii_lowercase();

    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(found) = haystack[pos..].find(&needle) {
        let start = pos + found;
        let end = start + needle.len();
        if start > pos {
            spans.push(Span::styled(text[pos..start].to_string(), base));
        }
        spans.push(Span::styled(text[start..end].to_string(), hl));
        pos = end;
    }
    if pos < text.len() {
        spans.push(Span::styled(text[pos..].to_string(), base));
    }
    Line::from(spans)
}
