//! Bottom status bar: key hints, service name, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use hostq_core::DemoView;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(" 1-3:view Enter:run h/l:backend", theme::muted()));
    match app.active_view {
        DemoView::Portfolio => spans.push(Span::styled(" s:share", theme::muted())),
        DemoView::Scheduling => spans.push(Span::styled(" j/k:slider +/-:adjust", theme::muted())),
        DemoView::Risk => {}
    }
    spans.push(Span::styled(" ?:help q:quit", theme::muted()));

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(app.service_name.as_str(), theme::neutral()));

    // In-flight runs in views other than the active one.
    let background: Vec<&str> = DemoView::ALL
        .into_iter()
        .filter(|v| *v != app.active_view && app.status_of(*v).is_in_flight())
        .map(|v| v.label())
        .collect();
    if !background.is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("busy: {}", background.join(", ")),
            theme::warning(),
        ));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.as_str(), style));
    }

    let line = Line::from(spans);
    let para = Paragraph::new(line);
    f.render_widget(para, area);
}
