//! Stateless building blocks shared by the views: cards, glyphs, spinner,
//! shimmer placeholders and the run controls.

pub mod slider;

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

use hostq_core::{DemoView, QuantumBackend};

use crate::app::ViewRun;
use crate::theme;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Width of the bright band that sweeps across shimmer placeholders.
const SHIMMER_BAND: usize = 6;

pub fn spinner(frame: u64) -> &'static str {
    SPINNER_FRAMES[(frame % SPINNER_FRAMES.len() as u64) as usize]
}

pub fn backend_glyph(backend: QuantumBackend) -> &'static str {
    match backend {
        QuantumBackend::DWave => "◇",
        QuantumBackend::IbmQuantum => "▣",
        QuantumBackend::Willow => "✳",
        QuantumBackend::AzureQuantum => "△",
    }
}

pub fn view_glyph(view: DemoView) -> &'static str {
    match view {
        DemoView::Portfolio => "⚗",
        DemoView::Scheduling => "▦",
        DemoView::Risk => "⛨",
    }
}

/// Rounded bordered block with an optional title.
pub fn card(title: &str) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::panel_border());
    if title.is_empty() {
        block
    } else {
        block
            .title(format!(" {title} "))
            .title_style(theme::panel_title())
    }
}

/// A `width`-wide placeholder bar with a band sweeping left to right.
pub fn shimmer_line(width: usize, frame: u64) -> String {
    if width == 0 {
        return String::new();
    }
    let period = width + SHIMMER_BAND;
    let head = (frame as usize) % period;
    (0..width)
        .map(|i| {
            if i < head && head - i <= SHIMMER_BAND {
                '▓'
            } else {
                '░'
            }
        })
        .collect()
}

/// Three placeholder lines at decreasing widths, like a loading paragraph.
pub fn shimmer_paragraph(width: usize, frame: u64) -> Vec<Line<'static>> {
    [width, width * 5 / 6, width * 3 / 4]
        .into_iter()
        .map(|w| Line::from(Span::styled(shimmer_line(w, frame), theme::muted())))
        .collect()
}

/// The four backend badges, the selected one highlighted.
pub fn backend_selector(selected: QuantumBackend) -> Line<'static> {
    let mut spans = Vec::with_capacity(QuantumBackend::ALL.len() * 2);
    for backend in QuantumBackend::ALL {
        let label = format!(" {} {} ", backend_glyph(backend), backend.short_label());
        let style = if backend == selected {
            Style::default()
                .fg(theme::BACKGROUND)
                .bg(theme::backend_color(backend))
                .add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Backend selector, run button, status line and error for one view.
pub fn run_controls<R>(button: &str, run: &ViewRun<R>, frame: u64) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled("Simulated Quantum Backend", theme::text())),
        backend_selector(run.backend),
        Line::from(Span::styled("[h/l] change backend", theme::muted())),
        Line::from(""),
    ];

    let button_line = if run.is_loading() {
        Line::from(vec![
            Span::styled(format!("  {}  ", spinner(frame)), theme::accent_bold()),
            Span::styled(button.to_string(), theme::muted()),
        ])
    } else {
        Line::from(vec![
            Span::styled(format!(" ▶ {button} "), theme::accent().add_modifier(Modifier::REVERSED)),
            Span::styled("  [Enter]", theme::muted()),
        ])
    };
    lines.push(button_line);
    lines.push(Line::from(Span::styled(
        run.status_text(),
        theme::status_style(run.status()),
    )));

    if let Some(error) = run.lifecycle.error() {
        lines.push(Line::from(Span::styled(error.to_string(), theme::negative_bold())));
    }
    lines
}

/// Explanation card: shimmer while loading, placeholder before any run.
pub fn render_explanation(
    f: &mut Frame,
    area: Rect,
    explanation: &str,
    loading: bool,
    placeholder: &str,
    frame: u64,
) {
    let block = card("Quantum Approach Explanation");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let para = if loading {
        Paragraph::new(shimmer_paragraph(inner.width as usize, frame))
    } else if explanation.is_empty() {
        Paragraph::new(Span::styled(placeholder.to_string(), theme::muted()))
    } else {
        Paragraph::new(explanation.to_string()).style(theme::text())
    };
    f.render_widget(para.wrap(Wrap { trim: true }), inner);
}

/// Single-metric card. `value` is already formatted.
pub fn render_metric(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    style: Style,
    loading: bool,
    frame: u64,
) {
    let block = card("");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let value_line = if loading {
        Line::from(Span::styled(shimmer_line(10, frame), theme::muted()))
    } else {
        Line::from(Span::styled(value.to_string(), style.add_modifier(Modifier::BOLD)))
    };
    let lines = vec![Line::from(Span::styled(title.to_string(), theme::muted())), value_line];
    f.render_widget(Paragraph::new(lines), inner);
}

/// Centered one-line message used for empty and loading chart areas.
pub fn render_centered_message(f: &mut Frame, area: Rect, message: &str, style: Style) {
    let top = area.height / 2;
    let mut lines: Vec<Line> = (0..top).map(|_| Line::from("")).collect();
    lines.push(Line::from(Span::styled(message.to_string(), style)).centered());
    f.render_widget(Paragraph::new(lines), area);
}
