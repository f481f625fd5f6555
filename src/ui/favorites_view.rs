//! Favorites screen rendering
//!
//! Lists saved routes and stops, newest first, with enough context to jump
//! straight back into a schedule.

use chrono::{Local, TimeZone};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::favorites::FavoriteEntry;

/// Renders the favorites screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Favorites list
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_help(frame, app, chunks[1]);
}

/// Formats one favorite into its display label
fn entry_label(entry: &FavoriteEntry) -> String {
    match entry {
        FavoriteEntry::Route {
            route_name,
            route_long_name,
            ..
        } => {
            if route_long_name.is_empty() {
                format!("Route {}", route_name)
            } else {
                format!("Route {}  {}", route_name, route_long_name)
            }
        }
        FavoriteEntry::Stop {
            route_name,
            stop_name,
            direction,
            day_type,
            ..
        } => format!(
            "{} \u{2192} {}  ({}, {})",
            route_name,
            stop_name,
            direction.label(),
            day_type.as_str()
        ),
    }
}

/// Formats the saved-at timestamp as a short date
fn saved_at(entry: &FavoriteEntry) -> String {
    match Local.timestamp_millis_opt(entry.timestamp()).single() {
        Some(saved) => saved.format("%b %d").to_string(),
        None => String::new(),
    }
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let entries = app.favorite_entries();
    let mut lines: Vec<Line> = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let is_selected = index == app.favorite_index;
        let cursor = if is_selected { "\u{25B8} " } else { "  " };

        let style = if is_selected {
            Style::default()
                .fg(app.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text())
        };

        lines.push(Line::from(vec![
            Span::styled(cursor, style),
            Span::styled("\u{2605} ", Style::default().fg(Color::Yellow)),
            Span::styled(format!("{:<52}", entry_label(entry)), style),
            Span::styled(saved_at(entry), Style::default().fg(app.theme.dim())),
        ]));
    }

    if entries.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No favorites yet - press f on a route or stop to save it",
            Style::default().fg(app.theme.dim()),
        )));
    }

    let block = Block::default()
        .title(" Favorites ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let spans = vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Open  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Remove  "),
        Span::styled("X", Style::default().fg(Color::Yellow)),
        Span::raw(" Clear all  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Back  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(app.theme.dim()));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DayType, Direction};
    use crate::app::AppState;
    use crate::cli::StartupConfig;
    use crate::store::MemoryStore;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn create_test_app() -> App {
        let config = StartupConfig {
            api_url: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let mut app = App::with_store(config, Arc::new(MemoryStore::new()));
        app.state = AppState::FavoritesView;
        app
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_empty_favorites_show_hint() {
        let app = create_test_app();

        let content = render_to_string(&app);

        assert!(content.contains("No favorites yet"));
    }

    #[test]
    fn test_route_and_stop_entries_render() {
        let app = create_test_app();
        app.favorites.add_route("12", "Station A - Station B");
        app.favorites
            .add_stop("12", "", "Main St", Direction::Inbound, DayType::Weekend);

        let content = render_to_string(&app);

        assert!(content.contains("Route 12"));
        assert!(content.contains("Main St"));
        assert!(content.contains("return"));
        assert!(content.contains("weekend"));
    }

    #[test]
    fn test_entry_label_for_route_without_long_name() {
        let entry = FavoriteEntry::Route {
            route_name: "12".to_string(),
            route_long_name: String::new(),
            timestamp: 0,
            id: String::new(),
        };

        assert_eq!(entry_label(&entry), "Route 12");
    }
}
