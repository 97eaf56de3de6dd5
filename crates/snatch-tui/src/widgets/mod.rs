//! Ratatui widgets for the snatch TUI.

pub mod command_bar;
pub mod filter_panel;
pub mod help;
pub mod input;
pub mod pagination_bar;
pub mod query_bar;
pub mod results;
pub mod stats;
pub mod tab_bar;
