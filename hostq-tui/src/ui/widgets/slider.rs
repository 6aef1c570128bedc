//! Labeled horizontal slider widget.
//!
//! Used by the Scheduling view for task and resource counts.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// `[=====     ]` bar for `value` within `min..=max`.
pub fn render_slider_inline(value: f64, min: f64, max: f64, width: usize) -> String {
    let range = max - min;
    if range <= 0.0 {
        return format!("[{}]", "=".repeat(width));
    }
    let frac = ((value - min) / range).clamp(0.0, 1.0);
    let filled = (frac * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

/// Label, bar and bounds on one line; the active slider is highlighted.
pub fn slider_line(label: &str, value: u8, range: (u8, u8), active: bool) -> Line<'static> {
    let bar = render_slider_inline(value as f64, range.0 as f64, range.1 as f64, 16);
    let label_style = if active {
        theme::accent().add_modifier(Modifier::REVERSED)
    } else {
        theme::muted()
    };
    let bar_style = if active { theme::accent() } else { theme::muted() };
    Line::from(vec![
        Span::styled(format!("{label}: {value}"), label_style),
        Span::raw("  "),
        Span::styled(format!("{} ", range.0), theme::muted()),
        Span::styled(bar, bar_style),
        Span::styled(format!(" {}", range.1), theme::muted()),
    ])
}
