//! Top bar showing the active view's title.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use hostq_core::DemoView;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect, view: DemoView) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme::panel_border());
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(view.title(), theme::text().add_modifier(Modifier::BOLD)),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}
