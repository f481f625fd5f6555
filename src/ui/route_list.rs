//! Route list screen rendering
//!
//! Renders the startup view: a header with the current time and backend
//! status, the full list of routes with favorite markers, and a help footer
//! with data freshness.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Renders the initial loading screen shown while routes are fetched
pub fn render_loading(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "MARSHRUT",
            Style::default()
                .fg(app.theme.accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Loading routes... the backend may take a moment to wake up",
            Style::default().fg(app.theme.dim()),
        )),
    ];
    let paragraph = Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Renders the route list screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Route list
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_help(frame, app, chunks[2]);
}

/// Renders the header with app name, clock and backend status
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let now = Local::now();
    let time_str = now.format("%a %b %d, %H:%M").to_string();

    let status = match app.backend_awake {
        Some(true) => Span::styled("\u{25CF} online", Style::default().fg(Color::Green)),
        Some(false) => Span::styled("\u{25CF} waking up", Style::default().fg(Color::Yellow)),
        None => Span::styled("\u{25CB}", Style::default().fg(app.theme.dim())),
    };

    let width = area.width as usize;
    let separator = "\u{2500}".repeat(width.saturating_sub(2));

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "MARSHRUT",
                Style::default()
                    .fg(app.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(time_str, Style::default().fg(app.theme.text())),
            Span::raw("  "),
            status,
        ]),
        Line::from(Span::styled(separator, Style::default().fg(app.theme.dim()))),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the scrollable route list
fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::with_capacity(app.routes.len());

    // Keep the selection on screen
    let visible = area.height.saturating_sub(2) as usize;
    let first = if visible == 0 {
        0
    } else {
        app.route_index.saturating_sub(visible.saturating_sub(1))
    };

    for (index, route) in app.routes.iter().enumerate().skip(first) {
        let is_selected = index == app.route_index;
        let cursor = if is_selected { "\u{25B8} " } else { "  " };

        let name_style = if is_selected {
            Style::default()
                .fg(app.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text())
        };

        let star = if app.favorites.is_favorite_route(&route.route_short_name) {
            Span::styled("\u{2605} ", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("  ")
        };

        lines.push(Line::from(vec![
            Span::styled(cursor, name_style),
            star,
            Span::styled(format!("{:<8}", route.route_short_name), name_style),
            Span::styled(
                route.route_long_name.clone(),
                Style::default().fg(app.theme.dim()),
            ),
        ]));
    }

    if app.routes.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No routes loaded - press r to retry",
            Style::default().fg(app.theme.dim()),
        )));
    }

    let block = Block::default()
        .title(" Routes ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the help footer with data freshness
fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("\u{2191}/\u{2193}", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Stops  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorite  "),
        Span::styled("x", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorites  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    if let Some(last_refresh) = app.last_refresh {
        let elapsed = Local::now() - last_refresh;
        let mins_ago = elapsed.num_minutes();
        let freshness = if mins_ago < 1 {
            " \u{2502} Data: just now".to_string()
        } else if mins_ago < 60 {
            format!(" \u{2502} Data: {}m ago", mins_ago)
        } else {
            format!(" \u{2502} Data: {}h ago", elapsed.num_hours())
        };
        spans.push(Span::styled(freshness, Style::default().fg(app.theme.dim())));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(app.theme.dim()));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Route;
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
        app.state = AppState::RouteList;
        app.routes = vec![
            Route {
                route_id: "1".to_string(),
                route_short_name: "12".to_string(),
                route_long_name: "Station A - Station B".to_string(),
            },
            Route {
                route_id: "2".to_string(),
                route_short_name: "\u{442}25".to_string(),
                route_long_name: "Terminal - Depot".to_string(),
            },
        ];
        app
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
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
    fn test_routes_are_rendered() {
        let app = create_test_app();

        let content = render_to_string(&app);

        assert!(content.contains("12"));
        assert!(content.contains("Station A - Station B"));
        assert!(content.contains("\u{442}25"));
    }

    #[test]
    fn test_selected_route_has_cursor() {
        let app = create_test_app();

        let content = render_to_string(&app);

        assert!(content.contains("\u{25B8}"), "Cursor indicator expected");
    }

    #[test]
    fn test_favorite_route_shows_star() {
        let app = create_test_app();
        app.favorites.add_route("12", "Station A - Station B");

        let content = render_to_string(&app);

        assert!(content.contains("\u{2605}"));
    }

    #[test]
    fn test_empty_route_list_shows_hint() {
        let mut app = create_test_app();
        app.routes.clear();

        let content = render_to_string(&app);

        assert!(content.contains("No routes loaded"));
    }

    #[test]
    fn test_loading_screen_renders() {
        let mut app = create_test_app();
        app.state = AppState::Loading;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_loading(frame, &app))
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("Loading routes"));
    }
}
