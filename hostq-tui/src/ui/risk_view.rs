//! View 3: CVaR risk analysis: VaR/CVaR cards and the loss distribution.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

use hostq_core::chart::{distribution_series, format_percent, format_percent_or_zero};
use hostq_core::domain::CvarResult;

use crate::app::AppState;
use crate::theme;
use crate::ui::widgets::{self, card};

const DESCRIPTION: &str = "This simulation calculates the Conditional Value-at-Risk (CVaR) \
for a generic aerospace portfolio, leveraging quantum-inspired Monte Carlo methods.";

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(8)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(rows[0]);

    render_controls(f, top[0], app);
    render_summary(f, top[1], app);
    render_distribution(f, rows[1], app);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let block = card("Configuration");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = widgets::run_controls("Run CVaR Analysis", &app.risk.run, app.frame);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(DESCRIPTION, theme::muted())));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_summary(f: &mut Frame, area: Rect, app: &AppState) {
    let run = &app.risk.run;
    let loading = run.is_loading();
    let result = run.lifecycle.result();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(rows[0]);

    widgets::render_metric(
        f,
        cards[0],
        "Value-at-Risk (95%)",
        &format_percent_or_zero(result.map(|r| r.var95)),
        theme::negative(),
        loading,
        app.frame,
    );
    widgets::render_metric(
        f,
        cards[1],
        "Conditional VaR (95%)",
        &format_percent_or_zero(result.map(|r| r.cvar95)),
        theme::negative_bold(),
        loading,
        app.frame,
    );
    widgets::render_explanation(
        f,
        rows[1],
        run.lifecycle.explanation(),
        loading,
        "Run the analysis to see the explanation.",
        app.frame,
    );
}

fn render_distribution(f: &mut Frame, area: Rect, app: &AppState) {
    let block = card("Portfolio Loss Distribution");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let run = &app.risk.run;
    if run.is_loading() {
        let msg = format!("{} Generating distribution data...", widgets::spinner(app.frame));
        widgets::render_centered_message(f, inner, &msg, theme::muted());
        return;
    }
    match run.lifecycle.result() {
        Some(result) => render_chart(f, inner, result),
        None => widgets::render_centered_message(
            f,
            inner,
            "Run analysis to view chart",
            theme::muted(),
        ),
    }
}

/// Position on the return axis of a positive loss percentage.
///
/// VaR95 and CVaR95 are reported as losses, the distribution as returns, so
/// a 4% loss sits at -4 on the x axis.
pub fn loss_on_return_axis(loss: f64) -> f64 {
    -loss
}

/// Axis bounds covering the series and both reference lines.
pub fn chart_bounds(series: &[(f64, f64)], result: &CvarResult) -> ([f64; 2], [f64; 2]) {
    let markers = [
        loss_on_return_axis(result.var95),
        loss_on_return_axis(result.cvar95),
    ];
    let xs = series.iter().map(|(x, _)| *x).chain(markers);
    let (x_min, x_max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    let y_max = series.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let x_pad = ((x_max - x_min).abs() * 0.05).max(0.5);
    (
        [x_min - x_pad, x_max + x_pad],
        [0.0, (y_max * 1.1).max(1.0)],
    )
}

fn render_chart(f: &mut Frame, area: Rect, result: &CvarResult) {
    let series = distribution_series(&result.distribution);
    let ([x_min, x_max], [y_min, y_max]) = chart_bounds(&series, result);

    let var_x = loss_on_return_axis(result.var95);
    let cvar_x = loss_on_return_axis(result.cvar95);
    let var_line = [(var_x, y_min), (var_x, y_max)];
    let cvar_line = [(cvar_x, y_min), (cvar_x, y_max)];
    let var_label = format!("VaR 95% ({})", format_percent(result.var95));
    let cvar_label = format!("CVaR 95% ({})", format_percent(result.cvar95));

    let datasets = vec![
        Dataset::default()
            .name("Probability Density")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::NEUTRAL))
            .graph_type(GraphType::Line)
            .data(&series),
        Dataset::default()
            .name(var_label)
            .marker(symbols::Marker::Dot)
            .style(theme::negative())
            .graph_type(GraphType::Line)
            .data(&var_line),
        Dataset::default()
            .name(cvar_label)
            .marker(symbols::Marker::Dot)
            .style(theme::negative_bold())
            .graph_type(GraphType::Line)
            .data(&cvar_line),
    ];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("Return %", theme::muted()))
                .style(theme::muted())
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::styled(format!("{x_min:.1}%"), theme::muted()),
                    Span::styled(format!("{x_max:.1}%"), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Probability %", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled("0", theme::muted()),
                    Span::styled(format!("{y_max:.1}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}
