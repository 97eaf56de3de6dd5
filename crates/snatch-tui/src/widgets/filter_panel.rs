//! Filter panel: one row per filter key of the active record kind, in the
//! left pane.
//!
//! # Navigation
//! - `↑`/`k` and `↓`/`j` move the cursor.
//! - `Enter` opens an inline editor on the focused key, pre-filled with its
//!   current value; `Enter` again applies it, `Escape` abandons the edit.
//! - `Backspace` (outside the editor) clears the focused key.
//!
//! Applying a blank value is the same as clearing the key.

use super::input::TextInput;
use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};
use snatch_core::filters::{FilterKey, Filters};

/// What the panel wants the app to do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Set(FilterKey, String),
    Clear(FilterKey),
}

#[derive(Debug, Default)]
pub struct FilterPanelState {
    /// Index into the active vocabulary.
    pub cursor: usize,
    /// Inline editor, open while a value is being typed.
    pub editing: Option<TextInput>,
}

impl FilterPanelState {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Reset after the record kind changes.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.editing = None;
    }

    pub fn selected_key(&self, filters: &Filters) -> Option<FilterKey> {
        FilterKey::vocabulary(filters.entity()).get(self.cursor).copied()
    }

    /// Handle an [`AppEvent`] against the current `filters`.
    pub fn handle(&mut self, event: &AppEvent, filters: &Filters) -> Option<FilterAction> {
        let vocabulary = FilterKey::vocabulary(filters.entity());
        let key = *vocabulary.get(self.cursor)?;

        if let Some(editor) = self.editing.as_mut() {
            return match event {
                AppEvent::Enter => {
                    let value = editor.text().trim().to_string();
                    self.editing = None;
                    tracing::debug!(%key, %value, "filters: apply");
                    Some(if value.is_empty() {
                        FilterAction::Clear(key)
                    } else {
                        FilterAction::Set(key, value)
                    })
                }
                AppEvent::Escape => {
                    tracing::debug!(%key, "filters: edit abandoned");
                    self.editing = None;
                    None
                }
                other => {
                    editor.handle(other);
                    None
                }
            };
        }

        match event {
            AppEvent::Nav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            AppEvent::Nav(Direction::Down) => {
                if self.cursor + 1 < vocabulary.len() {
                    self.cursor += 1;
                }
                None
            }
            AppEvent::Enter => {
                tracing::debug!(%key, "filters: edit");
                self.editing = Some(TextInput::with_text(filters.get(key).unwrap_or_default()));
                None
            }
            AppEvent::Backspace if filters.get(key).is_some() => Some(FilterAction::Clear(key)),
            _ => None,
        }
    }

    /// Absolute cursor position inside the inline editor, if open.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        let editor = self.editing.as_ref()?;
        let inner = Block::bordered().inner(area);
        // Each key takes two rows: label, then the value indented by two.
        let y = inner.y + self.cursor as u16 * 2 + 1;
        Some((editor.cursor_col(inner, inner.x + 2), y.min(inner.bottom().saturating_sub(1))))
    }
}

pub struct FilterPanel<'a> {
    state: &'a FilterPanelState,
    filters: &'a Filters,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> FilterPanel<'a> {
    pub fn new(state: &'a FilterPanelState, filters: &'a Filters, focused: bool, theme: &'a Theme) -> Self {
        Self { state, filters, focused, theme }
    }
}

impl Widget for FilterPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let title = match self.filters.len() {
            0 => "Filters".to_string(),
            n => format!("Filters ({n})"),
        };
        let block = Block::bordered().title(title).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = FilterKey::vocabulary(self.filters.entity())
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let editing = if i == self.state.cursor { self.state.editing.as_ref() } else { None };
                let value_line = match (editing, self.filters.get(*key)) {
                    (Some(editor), _) => Line::from(format!("  {}", editor.text())),
                    (None, Some(value)) => Line::from(Span::styled(format!("  {value}"), self.theme.highlight)),
                    (None, None) => Line::from(Span::styled(format!("  {}", key.placeholder()), self.theme.hint)),
                };
                ListItem::new(vec![Line::from(key.label()), value_line])
            })
            .collect();

        let mut list = List::new(items);
        if self.focused && !self.state.is_editing() {
            list = list.highlight_style(self.theme.selected);
        }
        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snatch_core::types::EntityType;

    fn creds() -> Filters {
        Filters::new(EntityType::Credential)
    }

    #[test]
    fn cursor_stays_within_vocabulary() {
        let mut s = FilterPanelState::default();
        let filters = Filters::new(EntityType::System);
        for _ in 0..10 {
            s.handle(&AppEvent::Nav(Direction::Down), &filters);
        }
        assert_eq!(s.cursor, 2);
        s.handle(&AppEvent::Nav(Direction::Up), &filters);
        assert_eq!(s.selected_key(&filters), Some(FilterKey::IpAddress));
    }

    #[test]
    fn edit_and_apply() {
        let mut s = FilterPanelState::default();
        let filters = creds();
        assert_eq!(s.handle(&AppEvent::Enter, &filters), None);
        assert!(s.is_editing());
        for c in " paypal.com ".chars() {
            s.handle(&AppEvent::Char(c), &filters);
        }
        assert_eq!(
            s.handle(&AppEvent::Enter, &filters),
            Some(FilterAction::Set(FilterKey::Domain, "paypal.com".into()))
        );
        assert!(!s.is_editing());
    }

    #[test]
    fn editor_prefills_current_value() {
        let mut s = FilterPanelState::default();
        let filters = creds().set(FilterKey::Domain, "paypal.com").unwrap();
        s.handle(&AppEvent::Enter, &filters);
        assert_eq!(s.editing.as_ref().map(TextInput::text), Some("paypal.com"));
    }

    #[test]
    fn blank_apply_clears() {
        let mut s = FilterPanelState::default();
        let filters = creds().set(FilterKey::Domain, "x").unwrap();
        s.handle(&AppEvent::Enter, &filters);
        s.handle(&AppEvent::Backspace, &filters);
        assert_eq!(s.handle(&AppEvent::Enter, &filters), Some(FilterAction::Clear(FilterKey::Domain)));
    }

    #[test]
    fn escape_abandons_edit() {
        let mut s = FilterPanelState::default();
        let filters = creds();
        s.handle(&AppEvent::Enter, &filters);
        s.handle(&AppEvent::Char('x'), &filters);
        assert_eq!(s.handle(&AppEvent::Escape, &filters), None);
        assert!(!s.is_editing());
    }

    #[test]
    fn backspace_clears_only_set_keys() {
        let mut s = FilterPanelState::default();
        assert_eq!(s.handle(&AppEvent::Backspace, &creds()), None);
        let filters = creds().set(FilterKey::Domain, "x").unwrap();
        assert_eq!(s.handle(&AppEvent::Backspace, &filters), Some(FilterAction::Clear(FilterKey::Domain)));
    }
}
