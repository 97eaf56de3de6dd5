//! Pagination bar: one line under the results: the range label on the left,
//! `‹ Prev`, the page window and `Next ›` on the right.
//!
//! Only drawn when there is more than one page.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use snatch_core::pagination::{PageEntry, PageLayout};

pub struct PaginationBar<'a> {
    layout: &'a PageLayout,
    theme: &'a Theme,
}

impl<'a> PaginationBar<'a> {
    pub fn new(layout: &'a PageLayout, theme: &'a Theme) -> Self {
        Self { layout, theme }
    }

    fn controls(&self) -> Line<'static> {
        let t = self.theme;
        let nav = |label: &'static str, enabled: bool| {
            Span::styled(label, if enabled { t.page_other } else { t.page_disabled })
        };

        let mut spans = vec![nav("‹ Prev", self.layout.has_prev()), Span::raw("  ")];
        for entry in self.layout.window.entries() {
            let span = match entry {
                PageEntry::Page(p) if *p == self.layout.current => Span::styled(format!("[{p}]"), t.page_current),
                PageEntry::Page(p) => Span::styled(format!(" {p} "), t.page_other),
                PageEntry::Ellipsis => Span::styled(" … ", t.page_disabled),
            };
            spans.push(span);
        }
        spans.push(Span::raw("  "));
        spans.push(nav("Next ›", self.layout.has_next()));
        Line::from(spans).right_aligned()
    }
}

impl Widget for PaginationBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls = self.controls();
        let [label_area, controls_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(controls.width() as u16)]).areas(area);

        Paragraph::new(Line::from(Span::styled(format!(" {}", self.layout.range_label()), self.theme.secondary)))
            .render(label_area, buf);
        Paragraph::new(controls).render(controls_area, buf);
    }
}
