//! Stop list screen rendering
//!
//! Shows the stops of the opened route in travel order with a next-departure
//! column that fills in as the batch loader publishes results.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::departures::DepartureStatus;

/// Renders the stop list screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Stop list
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_help(frame, app, chunks[1]);
}

/// Formats a departure status into a right-hand column span
fn departure_span(app: &App, stop_name: &str) -> Span<'static> {
    match app.departures.get(stop_name) {
        Some(DepartureStatus::Upcoming(next)) => Span::styled(
            format!("{}  {}", next.time, format_wait(next.diff_min)),
            Style::default().fg(Color::Green),
        ),
        Some(DepartureStatus::NoneToday) => Span::styled(
            "no more today".to_string(),
            Style::default().fg(app.theme.dim()),
        ),
        Some(DepartureStatus::Unknown) => Span::styled(
            "\u{2014}".to_string(),
            Style::default().fg(app.theme.dim()),
        ),
        None => Span::styled("...".to_string(), Style::default().fg(app.theme.dim())),
    }
}

/// Formats minutes-to-departure as "in 5m" or "in 1h 12m"
fn format_wait(diff_min: u32) -> String {
    if diff_min >= 60 {
        format!("in {}h {}m", diff_min / 60, diff_min % 60)
    } else {
        format!("in {}m", diff_min)
    }
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let route_name = app
        .current_route
        .as_ref()
        .map(|route| route.route_short_name.clone())
        .unwrap_or_default();
    let title = format!(
        " Route {} \u{00B7} {} \u{00B7} {} ",
        route_name,
        app.direction.label(),
        app.day_type.as_str()
    );

    let visible = area.height.saturating_sub(2) as usize;
    let first = if visible == 0 {
        0
    } else {
        app.stop_index.saturating_sub(visible.saturating_sub(1))
    };

    let mut lines: Vec<Line> = Vec::with_capacity(app.stops.len());
    for (index, stop) in app.stops.iter().enumerate().skip(first) {
        let is_selected = index == app.stop_index;
        let cursor = if is_selected { "\u{25B8} " } else { "  " };

        let name_style = if is_selected {
            Style::default()
                .fg(app.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text())
        };

        let star = if app.favorites.is_favorite(
            &route_name,
            &stop.stop_name,
            app.direction,
            app.day_type,
        ) {
            Span::styled("\u{2605} ", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("  ")
        };

        lines.push(Line::from(vec![
            Span::styled(cursor, name_style),
            star,
            Span::styled(format!("{:<32}", stop.stop_name), name_style),
            Span::raw(" "),
            departure_span(app, &stop.stop_name),
        ]));
    }

    if app.stops.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No stops for this direction",
            Style::default().fg(app.theme.dim()),
        )));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let spans = vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Schedule  "),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" Direction  "),
        Span::styled("w", Style::default().fg(Color::Yellow)),
        Span::raw(" Day  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" Favorite  "),
        Span::styled("s", Style::default().fg(Color::Yellow)),
        Span::raw(" Stats  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Back  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(app.theme.dim()));
    frame.render_widget(paragraph, area);
}
