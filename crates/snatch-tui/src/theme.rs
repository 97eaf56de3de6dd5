//! Colour theme for the snatch TUI.
//!
//! Themes are defined as TOML files. Both built-in themes are embedded in the
//! binary via [`include_str!`] so the application works without any files on
//! disk. Call [`Theme::load_default`] at startup and pass the result through
//! the application as a shared reference.
//!
//! # Colour assignment for stealer families
//!
//! Stealer names are hashed to a stable index into the palette so the same
//! family always gets the same colour within a session, regardless of the
//! order in which records arrive.

use config::{Config, File, FileFormat};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use snatch_core::risk::{RiskLevel, Severity};

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types: mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underlined: bool,
    #[serde(default)]
    reversed: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        for (on, modifier) in [
            (self.bold, Modifier::BOLD),
            (self.dim, Modifier::DIM),
            (self.italic, Modifier::ITALIC),
            (self.underlined, Modifier::UNDERLINED),
            (self.reversed, Modifier::REVERSED),
        ] {
            if on {
                style = style.add_modifier(modifier);
            }
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawRisk {
    high: RawStyle,
    medium: RawStyle,
    low: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawSeverity {
    critical: RawStyle,
    warning: RawStyle,
    info: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    command_bar: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    hint: RawStyle,
    loading: RawStyle,
    error: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawResults {
    selected: RawStyle,
    highlight: RawStyle,
    secondary: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawPages {
    current: RawStyle,
    other: RawStyle,
    disabled: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStealers {
    palette: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    risk: RawRisk,
    severity: RawSeverity,
    borders: RawBorders,
    status: RawStatus,
    results: RawResults,
    pages: RawPages,
    stealers: RawStealers,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Application colour theme. All styles are pre-resolved ratatui [`Style`]
/// values, so nothing is allocated at render time.
#[derive(Debug, Clone)]
pub struct Theme {
    pub risk_high: Style,
    pub risk_medium: Style,
    pub risk_low: Style,

    pub severity_critical: Style,
    pub severity_warning: Style,
    pub severity_info: Style,

    /// Border style for the currently focused pane.
    pub border_focused: Style,
    /// Border style for the command bar pane
    pub border_command_bar: Style,
    /// Border style for unfocused panes.
    pub border_unfocused: Style,

    /// Instructions and placeholders.
    pub hint: Style,
    pub loading: Style,
    pub error: Style,

    /// Selected row in the results list.
    pub selected: Style,
    /// Occurrences of the free-text term inside result cells.
    pub highlight: Style,
    /// Dimmer text for secondary columns.
    pub secondary: Style,

    pub page_current: Style,
    pub page_other: Style,
    pub page_disabled: Style,

    /// Ordered colour palette used for stealer colour cycling.
    stealer_palette: Vec<Color>,
}

impl Theme {
    /// Load and parse the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Load and parse the embedded Gruvbox Dark theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_gruvbox_dark() -> Self {
        Self::from_toml_str(GRUVBOX_DARK_THEME_SRC)
            .expect("embedded gruvbox dark theme must be valid TOML")
    }

    /// Resolve a theme by name, as used by `[ui] theme` and `:theme`.
    /// Unknown names fall back to the default theme.
    pub fn by_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "gruvbox" | "gruvbox_dark" | "gruvbox-dark" => Self::load_gruvbox_dark(),
            _ => Self::load_default(),
        }
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            risk_high: raw.risk.high.into_style(),
            risk_medium: raw.risk.medium.into_style(),
            risk_low: raw.risk.low.into_style(),
            severity_critical: raw.severity.critical.into_style(),
            severity_warning: raw.severity.warning.into_style(),
            severity_info: raw.severity.info.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_command_bar: raw.borders.command_bar.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            hint: raw.status.hint.into_style(),
            loading: raw.status.loading.into_style(),
            error: raw.status.error.into_style(),
            selected: raw.results.selected.into_style(),
            highlight: raw.results.highlight.into_style(),
            secondary: raw.results.secondary.into_style(),
            page_current: raw.pages.current.into_style(),
            page_other: raw.pages.other.into_style(),
            page_disabled: raw.pages.disabled.into_style(),
            stealer_palette: raw
                .stealers
                .palette
                .iter()
                .filter_map(|s| parse_color(s))
                .collect(),
        })
    }

    pub fn risk_style(&self, level: RiskLevel) -> Style {
        match level {
            RiskLevel::High => self.risk_high,
            RiskLevel::Medium => self.risk_medium,
            RiskLevel::Low => self.risk_low,
        }
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Critical => self.severity_critical,
            Severity::Warning => self.severity_warning,
            Severity::Info => self.severity_info,
        }
    }

    /// Stable colour for a stealer family name. Case-insensitive, so
    /// "RedLine" and "redline" share a colour.
    pub fn stealer_style(&self, stealer: &str) -> Style {
        if self.stealer_palette.is_empty() {
            return Style::default();
        }
        let idx = stable_hash(&stealer.to_lowercase()) % self.stealer_palette.len();
        Style::default().fg(self.stealer_palette[idx])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// djb2-style hash, stable across Rust versions and process restarts.
fn stable_hash(s: &str) -> usize {
    s.bytes().fold(5381usize, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(b as usize)
    })
}

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}
