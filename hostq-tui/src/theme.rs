//! Neon-on-slate palette for the HOSTING-Q TUI.
//!
//! # Color Palette
//! - **Accent**: Sky blue (focus, selection, running state)
//! - **Positive**: Neon green (completed runs)
//! - **Negative**: Rose (errors, risk metrics)
//! - **Warning**: Amber (queued runs, warnings)
//! - **Neutral**: Violet (share marks, secondary highlights)
//! - **Muted**: Slate gray (hints, idle text)

use ratatui::style::{Color, Modifier, Style};

use hostq_core::sediment::ShotAction;
use hostq_core::{QuantumBackend, RunStatus};

pub const BACKGROUND: Color = Color::Rgb(15, 23, 42);
pub const ACCENT: Color = Color::Rgb(14, 165, 233);
pub const POSITIVE: Color = Color::Rgb(74, 222, 128);
pub const NEGATIVE: Color = Color::Rgb(248, 113, 113);
pub const WARNING: Color = Color::Rgb(250, 204, 21);
pub const NEUTRAL: Color = Color::Rgb(167, 139, 250);
pub const MUTED: Color = Color::Rgb(148, 163, 184);
pub const TEXT: Color = Color::Rgb(226, 232, 240);
pub const SURFACE: Color = Color::Rgb(51, 65, 85);

/// Stacked-series colours, cycled by task index.
pub const SERIES: [Color; 8] = [
    Color::Rgb(14, 165, 233),
    Color::Rgb(139, 92, 246),
    Color::Rgb(20, 184, 166),
    Color::Rgb(249, 115, 22),
    Color::Rgb(236, 72, 153),
    Color::Rgb(99, 102, 241),
    Color::Rgb(217, 70, 239),
    Color::Rgb(244, 63, 94),
];

pub fn series_color(index: usize) -> Color {
    SERIES[index % SERIES.len()]
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn negative_bold() -> Style {
    negative().add_modifier(Modifier::BOLD)
}

pub fn panel_border() -> Style {
    Style::default().fg(SURFACE)
}

pub fn panel_title() -> Style {
    text().add_modifier(Modifier::BOLD)
}

/// Colour of the status line under the run button.
pub fn status_style(status: RunStatus) -> Style {
    match status {
        RunStatus::Idle => muted(),
        RunStatus::Queued => warning(),
        RunStatus::Running => accent().add_modifier(Modifier::SLOW_BLINK),
        RunStatus::Completed => positive(),
        RunStatus::Error => negative(),
    }
}

/// Badge colour for a backend glyph.
pub fn backend_color(backend: QuantumBackend) -> Color {
    match backend {
        QuantumBackend::DWave => Color::Rgb(56, 189, 248),
        QuantumBackend::IbmQuantum => Color::Rgb(96, 165, 250),
        QuantumBackend::Willow => Color::Rgb(52, 211, 153),
        QuantumBackend::AzureQuantum => Color::Rgb(129, 140, 248),
    }
}

pub fn shot_style(action: ShotAction) -> Style {
    match action {
        ShotAction::Run => accent_bold(),
        ShotAction::Share => neutral().add_modifier(Modifier::BOLD),
    }
}

/// Sign-aware colour for a numeric metric.
pub fn metric_color(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_wraps() {
        assert_eq!(series_color(0), SERIES[0]);
        assert_eq!(series_color(8), SERIES[0]);
        assert_eq!(series_color(11), SERIES[3]);
    }

    #[test]
    fn status_colours() {
        assert_eq!(status_style(RunStatus::Idle).fg, Some(MUTED));
        assert_eq!(status_style(RunStatus::Queued).fg, Some(WARNING));
        assert_eq!(status_style(RunStatus::Running).fg, Some(ACCENT));
        assert_eq!(status_style(RunStatus::Completed).fg, Some(POSITIVE));
        assert_eq!(status_style(RunStatus::Error).fg, Some(NEGATIVE));
    }

    #[test]
    fn metric_sign() {
        assert_eq!(metric_color(1.5).fg, Some(POSITIVE));
        assert_eq!(metric_color(0.0).fg, Some(POSITIVE));
        assert_eq!(metric_color(-0.1).fg, Some(NEGATIVE));
    }

    #[test]
    fn share_and_run_differ() {
        assert_ne!(shot_style(ShotAction::Run), shot_style(ShotAction::Share));
    }
}
