//! Help popup: centred floating overlay listing keybindings and commands.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const BINDINGS: &[(&str, &str)] = &[
    ("q  /  Ctrl+c", "Quit"),
    ("Tab", "Cycle focus: results → query → filters"),
    ("/", "Focus query bar"),
    ("f", "Focus filter panel"),
    ("Escape", "Return focus to results"),
    ("t", "Switch credentials / systems"),
    ("s", "Show or mask passwords"),
    ("↑ k  /  ↓ j", "Move selection"),
    ("PageUp / PageDown", "Move selection a screenful"),
    ("n  /  p", "Next / previous page"),
    ("g  /  G", "First / last page"),
    ("Enter (query)", "Search now, skipping the debounce"),
    ("Enter (filters)", "Edit the focused filter"),
    (":", "Open the command bar"),
    ("?", "Toggle this help popup"),
];

const COMMANDS: &[(&str, &str)] = &[
    (":type creds|systems", "Switch record kind"),
    (":filter <key> <value>", "Set a filter (domain, user, software, ...)"),
    (":unfilter [key]", "Clear one filter, or all"),
    (":page <n>", "Jump to a page"),
    (":retry", "Repeat the last failed search"),
    (":clear", "Clear query and filters"),
    (":stats", "Show record totals"),
    (":theme <name>", "default, gruvbox"),
];

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (BINDINGS.len() + COMMANDS.len() + 4) as u16;
        let popup = centered_rect(76, height, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" snatch — keybindings (? to close) ")
            .border_style(self.theme.border_focused);

        let inner = block.inner(popup);
        block.render(popup, buf);

        let row = |(key, desc): &(&str, &str)| {
            Line::from(vec![
                Span::styled(format!("  {:<24}", key), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(desc.to_string()),
            ])
        };

        let mut lines: Vec<Line> = BINDINGS.iter().map(row).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  Commands", self.theme.hint)));
        lines.extend(COMMANDS.iter().map(row));

        Paragraph::new(lines).render(inner, buf);
    }
}

pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
