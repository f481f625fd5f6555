//! Persisted color theme preference

use ratatui::style::Color;

use crate::store::KeyValueStore;

/// Store key holding the theme name
pub const THEME_KEY: &str = "theme";

/// Color theme for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Terminal default colors
    #[default]
    System,
    Black,
    White,
    Glass,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Black => "black",
            Theme::White => "white",
            Theme::Glass => "glass",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "system" => Some(Theme::System),
            "black" => Some(Theme::Black),
            "white" => Some(Theme::White),
            "glass" => Some(Theme::Glass),
            _ => None,
        }
    }

    /// Next theme in the cycle order.
    pub fn cycle(self) -> Self {
        match self {
            Theme::System => Theme::Black,
            Theme::Black => Theme::White,
            Theme::White => Theme::Glass,
            Theme::Glass => Theme::System,
        }
    }

    /// Reads the saved preference, defaulting to the system theme.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        store
            .get(THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default()
    }

    /// Persists the preference.
    pub fn save(self, store: &dyn KeyValueStore) {
        store.set(THEME_KEY, self.as_str());
    }

    /// Highlight color for selections and next departures
    pub fn accent(self) -> Color {
        match self {
            Theme::System => Color::Cyan,
            Theme::Black => Color::Yellow,
            Theme::White => Color::Blue,
            Theme::Glass => Color::Magenta,
        }
    }

    /// Primary text color
    pub fn text(self) -> Color {
        match self {
            Theme::System => Color::Reset,
            Theme::Black => Color::White,
            Theme::White => Color::Black,
            Theme::Glass => Color::Gray,
        }
    }

    /// Secondary text color for hints and metadata
    pub fn dim(self) -> Color {
        match self {
            Theme::White => Color::DarkGray,
            _ => Color::Gray,
        }
    }

    /// Background override; `None` keeps the terminal background
    pub fn background(self) -> Option<Color> {
        match self {
            Theme::System | Theme::Glass => None,
            Theme::Black => Some(Color::Black),
            Theme::White => Some(Color::White),
        }
    }
}
