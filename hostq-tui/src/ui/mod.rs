//! Top-level UI layout: sidebar, header, active view, status bar.

pub mod header;
pub mod overlays;
pub mod portfolio_view;
pub mod risk_view;
pub mod scheduling_view;
pub mod sidebar;
pub mod status_bar;
pub mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use hostq_core::DemoView;

use crate::app::{AppState, Overlay};

const SIDEBAR_WIDTH: u16 = 30;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: sidebar + content column.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
        .split(f.area());

    sidebar::render(f, columns[0], app);

    // Content: header, active view, 1-line status bar.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    header::render(f, rows[0], app.active_view);

    match app.active_view {
        DemoView::Portfolio => portfolio_view::render(f, rows[1], app),
        DemoView::Scheduling => scheduling_view::render(f, rows[1], app),
        DemoView::Risk => risk_view::render(f, rows[1], app),
    }

    status_bar::render(f, rows[2], app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Help => overlays::render_help(f, f.area()),
        Overlay::ErrorHistory => overlays::render_error_history(f, f.area(), app),
        Overlay::None => {}
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
