//! Statistics screen rendering
//!
//! Shows per-hour headway intervals as a block chart plus end-to-end trip
//! duration statistics for the current route and direction.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Block characters for the interval chart (8 levels)
const BLOCKS: [char; 8] = ['\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}'];

/// Converts an interval to a block character, scaled against the worst hour
fn interval_block(interval: f64, max_interval: f64) -> char {
    if max_interval <= 0.0 {
        return BLOCKS[0];
    }
    let normalized = (interval / max_interval).clamp(0.0, 1.0);
    let index = ((normalized * 7.0).round() as usize).min(7);
    BLOCKS[index]
}

/// Renders the statistics screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Interval chart
            Constraint::Length(7), // Trip durations
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_intervals(frame, app, chunks[0]);
    render_durations(frame, app, chunks[1]);
    render_help(frame, app, chunks[2]);
}

fn render_intervals(frame: &mut Frame, app: &App, area: Rect) {
    let stats = &app.intervals;
    let title = format!(
        " Intervals \u{00B7} {} \u{00B7} {} \u{00B7} {} ",
        app.current_stop.clone().unwrap_or_default(),
        app.direction.label(),
        app.day_type.as_str()
    );

    let mut lines: Vec<Line> = Vec::new();
    if stats.is_empty() {
        lines.push(Line::from(Span::styled(
            "No interval data for this selection",
            Style::default().fg(app.theme.dim()),
        )));
    } else {
        let worst = stats
            .max_intervals
            .iter()
            .cloned()
            .fold(0.0_f64, f64::max);

        for (position, hour) in stats.hours.iter().enumerate() {
            let min = stats.min_intervals.get(position).copied().unwrap_or(0.0);
            let max = stats.max_intervals.get(position).copied().unwrap_or(0.0);

            let color = if max <= 10.0 {
                Color::Green
            } else if max <= 20.0 {
                Color::Yellow
            } else {
                Color::Red
            };

            lines.push(Line::from(vec![
                Span::styled(format!("{:02}  ", hour), Style::default().fg(app.theme.dim())),
                Span::styled(interval_block(max, worst).to_string(), Style::default().fg(color)),
                Span::raw("  "),
                Span::styled(
                    format_interval_range(min, max),
                    Style::default().fg(app.theme.text()),
                ),
            ]));
        }
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Formats a min/max interval pair as "4-9 min" or "7 min"
fn format_interval_range(min: f64, max: f64) -> String {
    if (max - min).abs() < 0.5 {
        format!("{:.0} min", max)
    } else {
        format!("{:.0}-{:.0} min", min, max)
    }
}

fn render_durations(frame: &mut Frame, app: &App, area: Rect) {
    let durations = &app.durations;

    let lines = if durations.count == 0 {
        vec![Line::from(Span::styled(
            "No trip duration data",
            Style::default().fg(app.theme.dim()),
        ))]
    } else {
        vec![
            Line::from(vec![
                Span::styled("Average  ", Style::default().fg(app.theme.dim())),
                Span::styled(
                    format!("{:.0} min", durations.average),
                    Style::default()
                        .fg(app.theme.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Fastest  ", Style::default().fg(app.theme.dim())),
                Span::styled(
                    format!("{:.0} min", durations.min),
                    Style::default().fg(Color::Green),
                ),
            ]),
            Line::from(vec![
                Span::styled("Slowest  ", Style::default().fg(app.theme.dim())),
                Span::styled(
                    format!("{:.0} min", durations.max),
                    Style::default().fg(Color::Red),
                ),
            ]),
            Line::from(vec![
                Span::styled("Trips    ", Style::default().fg(app.theme.dim())),
                Span::styled(
                    format!("{}", durations.count),
                    Style::default().fg(app.theme.text()),
                ),
            ]),
        ]
    };

    let block = Block::default()
        .title(" Trip duration ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let spans = vec![
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" Direction  "),
        Span::styled("w", Style::default().fg(Color::Yellow)),
        Span::raw(" Day  "),
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
    use crate::api::{IntervalStats, TripDurations};
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
        app.state = AppState::StatsView;
        app.current_stop = Some("Main St".to_string());
        app.intervals = IntervalStats {
            hours: vec![6, 7, 8],
            min_intervals: vec![4.0, 3.0, 5.0],
            max_intervals: vec![9.0, 6.0, 12.0],
        };
        app.durations = TripDurations {
            average: 45.5,
            min: 38.0,
            max: 60.0,
            count: 24,
            trips: Vec::new(),
        };
        app
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 30);
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
    fn test_interval_rows_render() {
        let app = create_test_app();

        let content = render_to_string(&app);

        assert!(content.contains("06"));
        assert!(content.contains("4-9 min"));
        assert!(content.contains("3-6 min"));
    }

    #[test]
    fn test_duration_summary_renders() {
        let app = create_test_app();

        let content = render_to_string(&app);

        assert!(content.contains("46 min") || content.contains("45 min"));
        assert!(content.contains("38 min"));
        assert!(content.contains("60 min"));
        assert!(content.contains("24"));
    }

    #[test]
    fn test_empty_stats_show_hints() {
        let mut app = create_test_app();
        app.intervals = IntervalStats::default();
        app.durations = TripDurations::default();

        let content = render_to_string(&app);

        assert!(content.contains("No interval data"));
        assert!(content.contains("No trip duration data"));
    }

    #[test]
    fn test_interval_block_scales() {
        assert_eq!(interval_block(0.0, 12.0), BLOCKS[0]);
        assert_eq!(interval_block(12.0, 12.0), BLOCKS[7]);
        assert_eq!(interval_block(6.0, 12.0), BLOCKS[4]);
    }

    #[test]
    fn test_interval_block_handles_zero_max() {
        assert_eq!(interval_block(5.0, 0.0), BLOCKS[0]);
    }

    #[test]
    fn test_format_interval_range_collapses_equal_bounds() {
        assert_eq!(format_interval_range(7.0, 7.2), "7 min");
        assert_eq!(format_interval_range(4.0, 9.0), "4-9 min");
    }
}
