//! Left navigation column: brand, one entry per view, footer.

use chrono::Datelike;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use hostq_core::DemoView;

use crate::app::AppState;
use crate::theme;
use crate::ui::widgets::view_glyph;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(theme::panel_border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" ✦ ", theme::accent_bold()),
            Span::styled("HOSTING-Q", theme::text().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
    ];
    for view in DemoView::ALL {
        lines.push(nav_item(view, view == app.active_view));
    }

    f.render_widget(Paragraph::new(lines), chunks[0]);

    let year = chrono::Local::now().year();
    let footer = Line::from(Span::styled(
        format!("© {year} HOSTING-Q Simulations"),
        theme::muted(),
    ))
    .centered();
    f.render_widget(Paragraph::new(footer), chunks[1]);
}

fn nav_item(view: DemoView, active: bool) -> Line<'static> {
    let text = format!(" {} {} {:<14}", view.index() + 1, view_glyph(view), view.label());
    let style = if active {
        Style::default()
            .fg(theme::TEXT)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        theme::muted()
    };
    Line::from(Span::styled(text, style))
}
