//! Query bar widget: free-text input at the top of the screen plus a
//! one-word search status on the right.
//!
//! The text accepts `field:value` tokens (`domain:`, `user:`, `password:`,
//! `ip:`, `country:`, `stealer:`); everything else is a full-text term.

use super::input::TextInput;
use crate::event::AppEvent;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use snatch_core::orchestrator::SearchStatus;
use snatch_core::types::{EntityType, ResultSet};

const STATUS_WIDTH: u16 = 22;

#[derive(Debug, Default)]
pub struct QueryBarState {
    pub input: TextInput,
}

impl QueryBarState {
    /// Returns true if the query text changed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        let changed = self.input.handle(event);
        if changed {
            tracing::debug!(query = %self.input.text(), "query: edited");
        }
        changed
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }
}

pub struct QueryBar<'a> {
    state: &'a QueryBarState,
    entity: EntityType,
    status: &'a SearchStatus,
    results: Option<&'a ResultSet>,
    min_len: usize,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> QueryBar<'a> {
    pub fn new(
        state: &'a QueryBarState,
        entity: EntityType,
        status: &'a SearchStatus,
        results: Option<&'a ResultSet>,
        min_len: usize,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { state, entity, status, results, min_len, focused, theme }
    }

    /// Absolute terminal position of the text cursor within this widget's
    /// rendered area. Pass to `frame.set_cursor_position()` after rendering.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // The block adds 1-cell borders; text starts at (area.x+1, area.y+1).
        let text_area = Rect {
            width: area.width.saturating_sub(STATUS_WIDTH + 2),
            ..area
        };
        let x = self.state.input.cursor_col(text_area, area.x + 1);
        (x, area.y + 1)
    }

    fn placeholder(&self) -> &'static str {
        match self.entity {
            EntityType::Credential => "press / to search credentials, e.g. domain:paypal.com user:john",
            EntityType::System => "press / to search systems, e.g. country:US ip:10.0.",
        }
    }

    fn status_span(&self) -> Span<'static> {
        let typed = self.state.text().trim().chars().count();
        match self.status {
            SearchStatus::Idle if typed > 0 && typed < self.min_len => Span::styled(
                format!("{} more chars", self.min_len - typed),
                self.theme.hint,
            ),
            SearchStatus::Idle => Span::raw(""),
            SearchStatus::Debouncing => Span::styled("typing…", self.theme.hint),
            SearchStatus::Loading => Span::styled("searching…", self.theme.loading),
            SearchStatus::Success | SearchStatus::Empty => {
                let total = self.results.map(ResultSet::total).unwrap_or(0);
                Span::styled(format!("{total} results"), self.theme.secondary)
            }
            SearchStatus::Error(_) => Span::styled("request failed", self.theme.error),
        }
    }
}

impl Widget for QueryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered()
            .title(format!("Search {}", self.entity))
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(LayoutDir::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(STATUS_WIDTH)])
            .split(inner);

        let query_line = if self.state.input.is_empty() && !self.focused {
            Line::from(Span::styled(self.placeholder(), self.theme.hint))
        } else {
            Line::from(self.state.text())
        };
        Paragraph::new(query_line).render(chunks[0], buf);

        Paragraph::new(Line::from(self.status_span()).right_aligned()).render(chunks[1], buf);
    }
}
