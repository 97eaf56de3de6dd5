//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Searches run on the tokio
//! runtime owned by the caller; the loop only calls
//! [`SearchOrchestrator::tick`] once per frame to pick up finished requests.

use crate::{
    commands::{execute_command, Command},
    event::{self, AppEvent},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarAction, CommandBarState},
        filter_panel::{FilterAction, FilterPanel, FilterPanelState},
        help::HelpPopup,
        pagination_bar::PaginationBar,
        query_bar::{QueryBar, QueryBarState},
        results::{Results, ResultsState},
        stats::StatsPopup,
        tab_bar::TabBar,
    },
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use snatch_core::{config::Config, orchestrator::SearchOrchestrator, types::EntityType, ResultSet, Statistics};
use std::{io, time::Duration};

const FILTER_PANE_WIDTH: u16 = 32;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Results,
    Query,
    Filters,
    /// Vim-style `:` command line is active.
    Command,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub orchestrator: SearchOrchestrator,
    pub query: QueryBarState,
    pub filters: FilterPanelState,
    pub results: ResultsState,
    pub command_bar: CommandBarState,
    pub focus: Focus,
    /// Focus state before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub show_help: bool,
    pub show_stats: bool,
    pub quit: bool,
}

impl AppState {
    pub fn new(orchestrator: SearchOrchestrator, config: Config, theme: Theme) -> Self {
        Self {
            orchestrator,
            query: QueryBarState::default(),
            filters: FilterPanelState::default(),
            results: ResultsState::new(config.ui.show_passwords),
            command_bar: CommandBarState::default(),
            focus: Focus::Query,
            prev_focus: Focus::Query,
            theme,
            config,
            show_help: false,
            show_stats: false,
            quit: false,
        }
    }

    pub fn entity(&self) -> EntityType {
        self.orchestrator.machine().context().entity()
    }

    /// Switch record kind. Filters and the selection belong to the old kind.
    pub fn set_entity(&mut self, entity: EntityType) {
        if entity == self.entity() {
            return;
        }
        tracing::debug!(%entity, "switching record kind");
        self.filters.reset();
        self.results.reset();
        self.orchestrator.set_entity(entity);
    }

    fn result_count(&self) -> usize {
        self.orchestrator.machine().results().map(ResultSet::len).unwrap_or(0)
    }

    /// Whether alphabetic keys should produce characters rather than trigger
    /// shortcuts.
    fn is_insert_mode(&self) -> bool {
        match self.focus {
            Focus::Query | Focus::Command => true,
            Focus::Filters => self.filters.is_editing(),
            Focus::Results => false,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
}

impl App {
    pub fn new(state: AppState) -> Self {
        App { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        loop {
            self.state.orchestrator.tick();

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        // Use insert-mode mapping when a text widget is focused
                        let app_event = if self.state.is_insert_mode() {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                s.show_help = false;
            }
            return;
        }

        if s.show_stats {
            if matches!(event, AppEvent::Escape | AppEvent::Enter | AppEvent::Quit) {
                s.show_stats = false;
            }
            return;
        }

        // Command mode intercepts all events.
        if s.focus == Focus::Command {
            match s.command_bar.handle(&event) {
                CommandBarAction::Editing => {}
                CommandBarAction::Cancel => s.focus = s.prev_focus,
                CommandBarAction::Submit(line) => run_command_line(s, &line),
            }
            return;
        }

        let insert = s.is_insert_mode();
        match event {
            AppEvent::Char('?') if !insert => {
                tracing::debug!("help popup opened");
                s.show_help = true;
            }

            AppEvent::Char(':') if !insert => {
                tracing::debug!(prev_focus = ?s.focus, "entering command mode");
                s.prev_focus = s.focus;
                s.command_bar.clear();
                s.focus = Focus::Command;
            }

            AppEvent::Quit => {
                tracing::debug!("quit");
                s.quit = true;
            }

            // The filter editor owns Escape while it is open.
            AppEvent::Escape if !(s.focus == Focus::Filters && s.filters.is_editing()) => {
                if s.focus != Focus::Results {
                    tracing::debug!(from = ?s.focus, "focus -> Results");
                    s.focus = Focus::Results;
                }
            }

            // Tab-cycle focus: Results → Query → Filters → Results
            AppEvent::FocusNext => {
                let next = match s.focus {
                    Focus::Results => Focus::Query,
                    Focus::Query => Focus::Filters,
                    Focus::Filters | Focus::Command => Focus::Results,
                };
                tracing::debug!(from = ?s.focus, to = ?next, "focus cycle");
                s.filters.editing = None;
                s.focus = next;
            }

            AppEvent::QueryFocus => {
                tracing::debug!("focus -> Query");
                s.focus = Focus::Query;
            }

            AppEvent::FilterFocus => {
                tracing::debug!("focus -> Filters");
                s.focus = Focus::Filters;
            }

            AppEvent::ToggleEntity => {
                let next = s.entity().toggled();
                s.set_entity(next);
            }

            AppEvent::TogglePasswords => {
                s.results.show_passwords = !s.results.show_passwords;
            }

            AppEvent::NextPage => page(s, SearchOrchestrator::next_page),
            AppEvent::PrevPage => page(s, SearchOrchestrator::prev_page),
            AppEvent::FirstPage => page(s, SearchOrchestrator::first_page),
            AppEvent::LastPage => page(s, SearchOrchestrator::last_page),

            // Terminal resize is handled automatically by ratatui
            AppEvent::Resize(_, _) => {}

            other => dispatch_to_focused(s, other),
        }
    }
}

fn page(s: &mut AppState, turn: fn(&mut SearchOrchestrator)) {
    s.results.reset();
    turn(&mut s.orchestrator);
}

fn run_command_line(s: &mut AppState, line: &str) {
    match Command::parse(line) {
        Ok(cmd) => {
            tracing::debug!(command = ?cmd, "executing command");
            s.focus = s.prev_focus;
            if let Err(msg) = execute_command(s, cmd) {
                // Reopen the bar to show why the command did nothing.
                s.prev_focus = s.focus;
                s.focus = Focus::Command;
                s.command_bar.error = Some(msg);
            }
        }
        Err(msg) if msg.is_empty() => s.focus = s.prev_focus,
        Err(msg) => {
            // Show the error; bar stays open
            s.command_bar.error = Some(msg);
        }
    }
}

/// Route an event to the widget that owns the current focus.
fn dispatch_to_focused(s: &mut AppState, event: AppEvent) {
    match s.focus {
        Focus::Results => {
            let len = s.result_count();
            s.results.handle(&event, len);
        }
        Focus::Query => {
            if event == AppEvent::Enter {
                s.orchestrator.flush();
                s.focus = Focus::Results;
            } else if s.query.handle(&event) {
                s.results.reset();
                s.orchestrator.set_free_text(s.query.text());
            }
        }
        Focus::Filters => {
            let action = s.filters.handle(&event, s.orchestrator.machine().context().filters());
            let outcome = match action {
                Some(FilterAction::Set(key, value)) => s.orchestrator.set_filter(key, &value),
                Some(FilterAction::Clear(key)) => s.orchestrator.clear_filter(key),
                None => return,
            };
            s.results.reset();
            if let Err(err) = outcome {
                tracing::warn!(error = %err, "filter rejected");
            }
        }
        Focus::Command => {} // handled before dispatch, should not reach here
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let view = state.orchestrator.view();
    let machine = state.orchestrator.machine();
    let layout = view.layout.as_ref().filter(|_| view.shows_pagination());

    // Vertical: 1-line tab bar | 3-line query bar | body | pagination line
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(if layout.is_some() { 1 } else { 0 }),
        ])
        .split(area);

    let horiz = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Length(FILTER_PANE_WIDTH), Constraint::Fill(1)])
        .split(vert[2]);

    let filters = view.context.filters();
    let query_bar = QueryBar::new(
        &state.query,
        view.context.entity(),
        view.status,
        view.results,
        machine.settings().min_query_len,
        state.focus == Focus::Query,
        &state.theme,
    );
    let query_cursor = query_bar.cursor_position(vert[1]);

    let indexed = state.orchestrator.statistics().and_then(|s| s.as_ref().ok()).map(Statistics::total_records);
    frame.render_widget(
        TabBar::new(view.context.entity(), !filters.is_empty(), &state.theme).indexed(indexed),
        vert[0],
    );
    frame.render_widget(query_bar, vert[1]);
    frame.render_widget(
        FilterPanel::new(&state.filters, filters, state.focus == Focus::Filters, &state.theme),
        horiz[0],
    );
    frame.render_widget(
        Results::new(&state.results, &view, state.focus == Focus::Results, &state.theme),
        horiz[1],
    );
    if let Some(layout) = layout {
        frame.render_widget(PaginationBar::new(layout, &state.theme), vert[3]);
    }

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }
    if state.show_stats {
        frame.render_widget(
            StatsPopup::new(state.orchestrator.statistics(), &state.theme)
                .breakdowns(|b| state.orchestrator.breakdown(b)),
            area,
        );
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
        return;
    }

    match state.focus {
        Focus::Query => frame.set_cursor_position(query_cursor),
        Focus::Filters => {
            if let Some(pos) = state.filters.cursor_position(horiz[0]) {
                frame.set_cursor_position(pos);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}
