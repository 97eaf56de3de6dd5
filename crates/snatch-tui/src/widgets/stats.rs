//! Statistics popup, opened with `:stats`: record totals from the store and
//! the most frequent domains, countries and stealer families.

use super::help::centered_rect;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget, Wrap},
};
use snatch_core::store::StoreError;
use snatch_core::types::{Breakdown, Statistics, Tally};

/// Rows fetched and shown per breakdown column.
pub const TOP_ROWS: u64 = 5;

const COUNTER_ROWS: u16 = 6;

type BreakdownReply<'a> = Option<&'a Result<Vec<Tally>, StoreError>>;

pub struct StatsPopup<'a> {
    stats: Option<&'a Result<Statistics, StoreError>>,
    breakdowns: [(Breakdown, BreakdownReply<'a>); 3],
    theme: &'a Theme,
}

impl<'a> StatsPopup<'a> {
    pub fn new(stats: Option<&'a Result<Statistics, StoreError>>, theme: &'a Theme) -> Self {
        Self { stats, breakdowns: Breakdown::ALL.map(|b| (b, None)), theme }
    }

    /// Replies for each breakdown, looked up by `reply`.
    pub fn breakdowns(mut self, reply: impl Fn(Breakdown) -> BreakdownReply<'a>) -> Self {
        self.breakdowns = Breakdown::ALL.map(|b| (b, reply(b)));
        self
    }

    fn counter_lines(&self) -> Vec<Line<'static>> {
        let stats = match self.stats {
            None => return vec![Line::from(Span::styled("  loading…", self.theme.loading))],
            Some(Err(e)) => return vec![Line::from(Span::styled(format!("  {e}"), self.theme.error))],
            Some(Ok(stats)) => stats,
        };
        [
            ("Credentials", stats.total_credentials),
            ("Systems", stats.total_systems),
            ("Uploads", stats.total_uploads),
            ("Unique domains", stats.unique_domains),
            ("Unique countries", stats.unique_countries),
            ("Stealer families", stats.unique_stealers),
        ]
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("  {label:<20}"), self.theme.secondary),
                Span::styled(format!("{value:>10}"), self.value_style()),
            ])
        })
        .collect()
    }

    fn column_lines(&self, breakdown: Breakdown, reply: BreakdownReply<'_>, width: u16) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            format!(" {breakdown}"),
            self.theme.secondary.add_modifier(Modifier::BOLD),
        ))];
        match reply {
            None => lines.push(Line::from(Span::styled(" loading…", self.theme.loading))),
            Some(Err(e)) => lines.push(Line::from(Span::styled(format!(" {e}"), self.theme.error))),
            Some(Ok(rows)) if rows.is_empty() => lines.push(Line::from(Span::styled(" none", self.theme.hint))),
            Some(Ok(rows)) => {
                // " value…  count"
                let value_width = (width as usize).saturating_sub(9).max(4);
                lines.extend(rows.iter().take(TOP_ROWS as usize).map(|row| {
                    Line::from(vec![
                        Span::raw(format!(" {:<value_width$}", fit(&row.value, value_width))),
                        Span::styled(format!("{:>7}", row.count), self.value_style()),
                    ])
                }));
            }
        }
        lines
    }

    fn value_style(&self) -> ratatui::style::Style {
        self.theme.highlight.remove_modifier(Modifier::REVERSED)
    }
}

fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

impl Widget for StatsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // borders + counters + gap + header + rows
        let height = 2 + COUNTER_ROWS + 1 + 1 + TOP_ROWS as u16;
        let popup = centered_rect(84, height, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" statistics (Esc to close) ")
            .border_style(self.theme.border_focused);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let [counters, _, tops] = Layout::vertical([
            Constraint::Length(COUNTER_ROWS),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);
        Paragraph::new(self.counter_lines()).render(counters, buf);

        let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(tops);
        for ((breakdown, reply), column) in self.breakdowns.iter().zip(columns.iter()) {
            Paragraph::new(self.column_lines(*breakdown, *reply, column.width))
                .wrap(Wrap { trim: false })
                .render(*column, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(popup: StatsPopup<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        terminal.draw(|f| f.render_widget(popup, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        (0..20)
            .map(|y| (0..90).map(|x| buffer[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn shows_counters_and_breakdown_columns() {
        let theme = Theme::load_default();
        let stats = Ok(Statistics { total_credentials: 1250, total_systems: 40, ..Statistics::default() });
        let domains = Ok(vec![Tally::new("www.paypal.com", 312), Tally::new("accounts.google.com", 120)]);
        let failed = Err(StoreError::Status { status: 500, body: "boom".into() });

        let screen = render(StatsPopup::new(Some(&stats), &theme).breakdowns(|b| match b {
            Breakdown::Domains => Some(&domains),
            Breakdown::Countries => Some(&failed),
            Breakdown::Stealers => None,
        }));

        assert!(screen.contains("Credentials"), "{screen}");
        assert!(screen.contains("1250"), "{screen}");
        assert!(screen.contains("Top domains"), "{screen}");
        assert!(screen.contains("www.paypal.com"), "{screen}");
        assert!(screen.contains("312"), "{screen}");
        assert!(screen.contains("Top countries"), "{screen}");
        assert!(screen.contains("record service"), "{screen}");
        assert!(screen.contains("Top stealers"), "{screen}");
    }

    #[test]
    fn long_values_are_cut() {
        assert_eq!(fit("accounts.google.com", 8), "account…");
        assert_eq!(fit("paypal", 8), "paypal");
    }
}
