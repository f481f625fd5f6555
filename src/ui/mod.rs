//! UI rendering module for Marshrut
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod favorites_view;
pub mod help_overlay;
pub mod route_list;
pub mod schedule_view;
pub mod stats_view;
pub mod stop_list;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

/// Renders the whole frame for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    match app.state {
        AppState::Loading => route_list::render_loading(frame, app),
        AppState::RouteList => route_list::render(frame, app),
        AppState::StopList => stop_list::render(frame, app),
        AppState::ScheduleView => schedule_view::render(frame, app),
        AppState::StatsView => stats_view::render(frame, app),
        AppState::FavoritesView => favorites_view::render(frame, app),
    }

    render_warning_bar(frame, app);

    if app.show_help {
        help_overlay::render(frame);
    }
}

/// Renders the dismissible warning line over the bottom row
fn render_warning_bar(frame: &mut Frame, app: &App) {
    let Some(warning) = &app.warning else {
        return;
    };
    let area = frame.area();
    if area.height == 0 {
        return;
    }
    let bar = Rect::new(area.x, area.y + area.height - 1, area.width, 1);

    frame.render_widget(Clear, bar);
    let line = Line::from(vec![
        Span::styled(
            format!("\u{26A0} {}", warning),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), bar);
}
