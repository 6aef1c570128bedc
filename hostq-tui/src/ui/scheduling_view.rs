//! View 2: resource scheduling with a text Gantt chart.
//!
//! Rows are resources in first-seen order; each task paints its `[start,
//! end]` span in the colour of its series index.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use hostq_core::chart::{schedule_chart, GanttRow, ScheduleChart};
use hostq_core::domain::{RESOURCE_COUNT_RANGE, TASK_COUNT_RANGE};

use crate::app::{AppState, SchedulingSlider};
use crate::theme;
use crate::ui::widgets::{self, card, slider::slider_line};

const LABEL_WIDTH: usize = 12;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(6)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(rows[0]);

    render_controls(f, top[0], app);
    let run = &app.scheduling.run;
    widgets::render_explanation(
        f,
        top[1],
        run.lifecycle.explanation(),
        run.is_loading(),
        "Run the optimization to see the explanation.",
        app.frame,
    );
    render_gantt(f, rows[1], app);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let s = &app.scheduling;
    let block = card("Configuration");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        slider_line(
            "Number of Tasks",
            s.params.task_count(),
            TASK_COUNT_RANGE,
            s.slider == SchedulingSlider::Tasks,
        ),
        slider_line(
            "Number of Resources",
            s.params.resource_count(),
            RESOURCE_COUNT_RANGE,
            s.slider == SchedulingSlider::Resources,
        ),
        Line::from(Span::styled("[j/k] select  [+/-] adjust", theme::muted())),
        Line::from(""),
    ];
    lines.extend(widgets::run_controls("Optimize Schedule", &s.run, app.frame));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_gantt(f: &mut Frame, area: Rect, app: &AppState) {
    let block = card("Optimized Resource Schedule (Gantt)");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let run = &app.scheduling.run;
    if run.is_loading() {
        let msg = format!("{} Calculating optimal schedule...", widgets::spinner(app.frame));
        widgets::render_centered_message(f, inner, &msg, theme::muted());
        return;
    }
    let chart = match run.lifecycle.result() {
        Some(tasks) if !tasks.is_empty() => schedule_chart(tasks),
        _ => {
            widgets::render_centered_message(
                f,
                inner,
                "Configure and run optimization to see schedule",
                theme::muted(),
            );
            return;
        }
    };

    let width = (inner.width as usize).saturating_sub(LABEL_WIDTH + 1).max(1);
    f.render_widget(Paragraph::new(gantt_lines(&chart, width)), inner);
}

/// Series index painted in each of `width` cells spanning `[0, axis_max]`.
///
/// A task covers every cell its interval touches, so short tasks never
/// vanish. Later tasks on the same row paint over earlier ones.
pub fn gantt_cells(
    row: &GanttRow,
    chart: &ScheduleChart,
    width: usize,
    axis_max: f64,
) -> Vec<Option<usize>> {
    let mut cells = vec![None; width];
    if width == 0 || axis_max <= 0.0 {
        return cells;
    }
    let step = axis_max / width as f64;
    for (task, [start, end]) in &row.intervals {
        let Some(idx) = chart.task_index(task) else {
            continue;
        };
        let first = ((start / step).floor().max(0.0) as usize).min(width - 1);
        let last = ((end / step).ceil() as usize).clamp(first + 1, width);
        for cell in &mut cells[first..last] {
            *cell = Some(idx);
        }
    }
    cells
}

/// Full Gantt rendering: one line per resource, a time axis, a legend.
pub fn gantt_lines(chart: &ScheduleChart, width: usize) -> Vec<Line<'static>> {
    let axis_max = chart.time_axis_max();
    let mut lines = Vec::with_capacity(chart.rows.len() + 3);

    for row in &chart.rows {
        let mut spans = vec![Span::styled(
            format!("{:>w$} ", truncate(&row.resource, LABEL_WIDTH), w = LABEL_WIDTH),
            theme::text(),
        )];
        for cell in gantt_cells(row, chart, width, axis_max) {
            spans.push(match cell {
                Some(idx) => Span::styled("█", Style::default().fg(theme::series_color(idx))),
                None => Span::styled("·", Style::default().fg(theme::SURFACE)),
            });
        }
        lines.push(Line::from(spans));
    }

    let max_label = format!("{axis_max:.0}h");
    let gap = width.saturating_sub(1 + max_label.len());
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 1)),
        Span::styled(format!("0{}{max_label}", " ".repeat(gap)), theme::muted()),
    ]));
    lines.push(Line::from(""));

    let mut legend = vec![Span::raw(" ".repeat(LABEL_WIDTH + 1))];
    for (i, task) in chart.tasks.iter().enumerate() {
        legend.push(Span::styled("■ ", Style::default().fg(theme::series_color(i))));
        legend.push(Span::styled(format!("{task}  "), theme::muted()));
    }
    lines.push(Line::from(legend));
    lines
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
