//! Tab bar widget: the Credentials / Systems switch at the top of the screen.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Tabs, Widget},
};
use snatch_core::types::EntityType;

const ENTITIES: [EntityType; 2] = [EntityType::Credential, EntityType::System];

/// Renders the 1-line strip of record kinds at the top of the screen.
///
/// The active kind is highlighted; a `●` suffix marks a kind with filters
/// applied. The store size and keybinding hints are right-aligned in the
/// same row.
pub struct TabBar<'a> {
    active: EntityType,
    filtered: bool,
    indexed: Option<u64>,
    theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(active: EntityType, filtered: bool, theme: &'a Theme) -> Self {
        Self { active, filtered, indexed: None, theme }
    }

    /// Total records in the store, once statistics have arrived.
    pub fn indexed(mut self, total: Option<u64>) -> Self {
        self.indexed = total;
        self
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<Line> = ENTITIES
            .iter()
            .map(|entity| {
                let mark = if *entity == self.active && self.filtered { " ●" } else { "" };
                Line::from(format!(" {entity}{mark} "))
            })
            .collect();

        let selected = ENTITIES.iter().position(|e| *e == self.active).unwrap_or(0);
        Tabs::new(labels)
            .select(selected)
            .highlight_style(self.theme.selected.add_modifier(Modifier::BOLD))
            .divider("")
            .render(area, buf);

        let hint = match self.indexed {
            Some(n) => format!(" {n} records indexed │ t:switch  /:search  f:filters  q:quit  ?:help "),
            None => " t:switch  /:search  f:filters  q:quit  ?:help ".to_string(),
        };
        let hint_x = area.right().saturating_sub(hint.chars().count() as u16);
        buf.set_string(hint_x, area.y, &hint, Style::default().add_modifier(Modifier::DIM));
    }
}
