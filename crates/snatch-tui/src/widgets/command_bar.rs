//! Vim-style command bar: a single-line overlay at the bottom of the screen.
//!
//! Activated by pressing `:` outside a text input. Displays a `:` prefix
//! followed by the typed command. Pressing `Enter` hands the text to
//! [`crate::commands::Command::parse`]; `Escape` cancels.

use super::input::TextInput;
use crate::event::AppEvent;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Widget},
};

/// What the bar wants after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandBarAction {
    /// Keep the bar open.
    Editing,
    /// Close without running anything.
    Cancel,
    /// Run the given command line.
    Submit(String),
}

/// Persistent state for the command bar.
#[derive(Debug, Default)]
pub struct CommandBarState {
    pub input: TextInput,
    /// Error message from the last failed command, cleared on the next key.
    pub error: Option<String>,
}

impl CommandBarState {
    /// Reset to a blank, error-free state. Call when opening the bar.
    pub fn clear(&mut self) {
        self.input.clear();
        self.error = None;
    }

    /// Handle a key event while the command bar is focused.
    pub fn handle(&mut self, event: &AppEvent) -> CommandBarAction {
        // Any keypress dismisses the error display so the user can edit again.
        self.error = None;

        match event {
            AppEvent::Escape => {
                tracing::debug!("command bar cancelled");
                self.input.clear();
                CommandBarAction::Cancel
            }
            AppEvent::Enter => {
                let line = self.input.text().trim().to_string();
                self.input.clear();
                if line.is_empty() {
                    CommandBarAction::Cancel
                } else {
                    CommandBarAction::Submit(line)
                }
            }
            other => {
                self.input.handle(other);
                CommandBarAction::Editing
            }
        }
    }

    /// Absolute terminal column of the text cursor within `area`.
    ///
    /// The `:` glyph occupies column 0, so the cursor starts at column 1.
    pub fn cursor_col(&self, area: Rect) -> u16 {
        self.input.cursor_col(area, area.x + 1)
    }
}

/// Single-row command-bar overlay.
///
/// The caller is responsible for passing a 1-row `Rect` at the bottom of the
/// terminal. `CommandBar` clears that row with [`Clear`] and renders either
/// the `:<input>` prompt or an error message.
pub struct CommandBar<'a> {
    state: &'a CommandBarState,
    theme: &'a Theme,
}

impl<'a> CommandBar<'a> {
    pub fn new(state: &'a CommandBarState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for CommandBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let line = if let Some(ref err) = self.state.error {
            Line::from(Span::styled(format!("E  {err}"), self.theme.error.add_modifier(Modifier::BOLD)))
        } else {
            Line::from(vec![
                Span::styled(":", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(self.state.input.text()),
            ])
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
