//! Schedule screen rendering
//!
//! Shows all departure times for the opened stop, grouped by hour, with the
//! next departure highlighted and a countdown in the header.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Renders the schedule screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Next departure header
            Constraint::Min(3),    // Hour-grouped times
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_next(frame, app, chunks[0]);
    render_times(frame, app, chunks[1]);
    render_help(frame, app, chunks[2]);
}

fn render_next(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.next {
        Some(next) => Line::from(vec![
            Span::styled("Next: ", Style::default().fg(app.theme.text())),
            Span::styled(
                next.time.clone(),
                Style::default()
                    .fg(app.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  in {}m", next.diff_min),
                Style::default().fg(Color::Green),
            ),
        ]),
        None => Line::from(Span::styled(
            "No more departures today",
            Style::default().fg(app.theme.dim()),
        )),
    };

    frame.render_widget(Paragraph::new(vec![line, Line::from("")]), area);
}

/// Groups "HH:MM" strings by display hour, one line per hour
fn hour_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current_hour: Option<&str> = None;
    let mut spans: Vec<Span> = Vec::new();
    let next_time = app.next.as_ref().map(|next| next.time.as_str());

    for time in &app.schedule_times {
        let hour = time.split(':').next().unwrap_or("");
        if current_hour != Some(hour) {
            if !spans.is_empty() {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            current_hour = Some(hour);
            spans.push(Span::styled(
                format!("{:>3}  ", hour),
                Style::default().fg(app.theme.dim()),
            ));
        }

        // Schedules use "HH:MM:SS"; show only hours and minutes
        let display: String = time.chars().take(5).collect();
        let style = if next_time == Some(time.as_str()) || next_time == Some(display.as_str()) {
            Style::default()
                .fg(app.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text())
        };
        spans.push(Span::styled(format!("{} ", display), style));
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No departures for this day type",
            Style::default().fg(app.theme.dim()),
        )));
    }
    lines
}

fn render_times(frame: &mut Frame, app: &App, area: Rect) {
    let stop_name = app.current_stop.clone().unwrap_or_default();
    let route_name = app
        .current_route
        .as_ref()
        .map(|route| route.route_short_name.clone())
        .unwrap_or_default();
    let title = format!(
        " {} \u{00B7} {} \u{00B7} {} \u{00B7} {} ",
        route_name,
        stop_name,
        app.direction.label(),
        app.day_type.as_str()
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()));

    let paragraph = Paragraph::new(hour_lines(app))
        .block(block)
        .scroll((app.schedule_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let spans = vec![
        Span::styled("\u{2191}/\u{2193}", Style::default().fg(Color::Yellow)),
        Span::raw(" Scroll  "),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" Direction  "),
        Span::styled("w", Style::default().fg(Color::Yellow)),
        Span::raw(" Day  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorite  "),
        Span::styled("s", Style::default().fg(Color::Yellow)),
        Span::raw(" Stats  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Back"),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(app.theme.dim()));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Route;
    use crate::app::AppState;
    use crate::cli::StartupConfig;
    use crate::schedule::NextDeparture;
    use crate::store::MemoryStore;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn create_test_app() -> App {
        let config = StartupConfig {
            api_url: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let mut app = App::with_store(config, Arc::new(MemoryStore::new()));
        app.state = AppState::ScheduleView;
        app.current_route = Some(Route {
            route_id: "1".to_string(),
            route_short_name: "12".to_string(),
            route_long_name: String::new(),
        });
        app.current_stop = Some("Main St".to_string());
        app.schedule_times = vec![
            "05:12".to_string(),
            "05:32".to_string(),
            "06:02".to_string(),
        ];
        app.next = Some(NextDeparture {
            time: "05:32".to_string(),
            diff_min: 10,
        });
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
    fn test_next_departure_header_renders() {
        let app = create_test_app();

        let content = render_to_string(&app);

        assert!(content.contains("Next:"));
        assert!(content.contains("05:32"));
        assert!(content.contains("in 10m"));
    }

    #[test]
    fn test_times_grouped_by_hour() {
        let app = create_test_app();

        let lines = hour_lines(&app);

        // 05:xx and 06:xx land on separate lines
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_seconds_are_trimmed_for_display() {
        let mut app = create_test_app();
        app.schedule_times = vec!["05:12:00".to_string()];
        app.next = None;

        let content = render_to_string(&app);

        assert!(content.contains("05:12"));
        assert!(!content.contains("05:12:00"));
    }

    #[test]
    fn test_empty_schedule_shows_hint() {
        let mut app = create_test_app();
        app.schedule_times.clear();
        app.next = None;

        let content = render_to_string(&app);

        assert!(content.contains("No departures for this day type"));
        assert!(content.contains("No more departures today"));
    }
}
