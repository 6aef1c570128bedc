//! View 1: HOSTING-Q portfolio optimization with the QSL sediment log.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Paragraph, Wrap};
use ratatui::Frame;

use hostq_core::chart::{allocation_bars, format_percent, format_percent_or_zero};
use hostq_core::domain::PortfolioResult;
use hostq_core::sediment::SedimentLog;

use crate::app::AppState;
use crate::theme;
use crate::ui::widgets::{self, card};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(13), Constraint::Min(8)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(rows[0]);
    render_controls(f, top[0], app);
    render_summary(f, top[1], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    render_allocations(f, bottom[0], app);
    render_sediment(f, bottom[1], &app.portfolio.sediment);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let block = card("Configuration");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = widgets::run_controls("Run HOSTING-Q Optimization", &app.portfolio.run, app.frame);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[s] share result to the sediment log",
        theme::muted(),
    )));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_summary(f: &mut Frame, area: Rect, app: &AppState) {
    let run = &app.portfolio.run;
    let loading = run.is_loading();
    let result = run.lifecycle.result();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);

    widgets::render_metric(
        f,
        cards[0],
        "Expected Return",
        &format_percent_or_zero(result.map(|r| r.expected_return)),
        theme::positive(),
        loading,
        app.frame,
    );
    widgets::render_metric(
        f,
        cards[1],
        "Volatility",
        &format_percent_or_zero(result.map(|r| r.volatility)),
        theme::warning(),
        loading,
        app.frame,
    );
    let sharpe = result.map(|r| r.sharpe_ratio).unwrap_or(0.0);
    widgets::render_metric(
        f,
        cards[2],
        "Sharpe Ratio",
        &format!("{sharpe:.2}"),
        theme::metric_color(sharpe),
        loading,
        app.frame,
    );

    widgets::render_explanation(
        f,
        rows[1],
        run.lifecycle.explanation(),
        loading,
        "Run the optimization to see the explanation.",
        app.frame,
    );
}

fn render_allocations(f: &mut Frame, area: Rect, app: &AppState) {
    let block = card("Optimized Allocation");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let run = &app.portfolio.run;
    if run.is_loading() {
        let msg = format!("{} Searching the allocation landscape...", widgets::spinner(app.frame));
        widgets::render_centered_message(f, inner, &msg, theme::muted());
        return;
    }
    match run.lifecycle.result() {
        Some(result) if !result.allocations.is_empty() => render_bars(f, inner, result),
        _ => widgets::render_centered_message(
            f,
            inner,
            "Run optimization to view allocation",
            theme::muted(),
        ),
    }
}

fn render_bars(f: &mut Frame, area: Rect, result: &PortfolioResult) {
    let bars: Vec<Bar> = allocation_bars(&result.allocations)
        .into_iter()
        .enumerate()
        .map(|(i, (asset, pct))| {
            Bar::default()
                // Basis points keep two decimals in the integer bar value.
                .value((pct * 100.0).round().max(0.0) as u64)
                .text_value(format_percent(pct))
                .label(Line::from(asset))
                .style(Style::default().fg(theme::series_color(i)))
        })
        .collect();

    let count = bars.len().max(1) as u16;
    let bar_width = (area.width / count).saturating_sub(1).clamp(3, 10);
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(theme::text());
    f.render_widget(chart, area);
}

/// Newest shot first, two lines per shot.
pub fn sediment_lines(log: &SedimentLog) -> Vec<Line<'static>> {
    if log.is_empty() {
        return vec![
            Line::from(""),
            Line::from(Span::styled("The Sediment Log is empty.", theme::text())).centered(),
            Line::from(Span::styled(
                "Each simulation run will be recorded here as a QSL \"shot\".",
                theme::muted(),
            ))
            .centered(),
        ];
    }

    let mut lines = Vec::with_capacity(log.len() * 2);
    for shot in log.newest_first() {
        lines.push(Line::from(vec![
            Span::styled(format!("L{:<4}", shot.layer_index), theme::accent_bold()),
            Span::styled(
                format!("ACTION: {:<5}", shot.mark.action.label()),
                theme::shot_style(shot.mark.action),
            ),
            Span::styled(
                format!("  {}", shot.ts.format("%Y-%m-%d %H:%M:%S")),
                theme::muted(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("     PRE ", theme::muted()),
            Span::styled(shot.pre_state_hash.clone(), theme::text()),
            Span::styled("  POST ", theme::muted()),
            Span::styled(shot.post_state_hash.clone(), theme::text()),
        ]));
    }
    lines
}

fn render_sediment(f: &mut Frame, area: Rect, log: &SedimentLog) {
    let title = format!("QSL Sediment Log (Append-Only) [{}]", log.len());
    let block = card(&title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(sediment_lines(log)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn empty_log_placeholder() {
        let lines = sediment_lines(&SedimentLog::new());
        assert!(lines.iter().any(|l| l.to_string() == "The Sediment Log is empty."));
    }

    #[test]
    fn newest_shot_listed_first() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut log = SedimentLog::new();
        log.record_run(&1, ts);
        log.record_share(ts);
        let lines = sediment_lines(&log);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].to_string().starts_with("L2"));
        assert!(lines[0].to_string().contains("SHARE"));
        assert!(lines[2].to_string().contains("RUN"));
    }
}
