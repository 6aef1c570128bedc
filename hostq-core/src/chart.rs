//! Chart-ready derivations of result payloads.
//!
//! Everything here is a pure function of the stored result; callers may
//! recompute on every frame.

use crate::domain::{Allocation, DistributionPoint, ScheduledTask};

/// Minimum span of the Gantt time axis, in hours.
pub const SCHEDULE_HORIZON: f64 = 48.0;

/// One Gantt row: a resource and the intervals of the tasks placed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct GanttRow {
    pub resource: String,
    /// `(task, [start, end])` in the order the tasks appear in the result.
    /// Tasks not on this resource are absent, never zero-filled.
    pub intervals: Vec<(String, [f64; 2])>,
}

impl GanttRow {
    pub fn get(&self, task: &str) -> Option<[f64; 2]> {
        self.intervals
            .iter()
            .find(|(t, _)| t == task)
            .map(|(_, span)| *span)
    }

    pub fn contains(&self, task: &str) -> bool {
        self.get(task).is_some()
    }
}

/// Stacked-bar data for the scheduling view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleChart {
    /// Distinct resources, first-seen order (chart rows).
    pub resources: Vec<String>,
    /// Distinct tasks, first-seen order (series keys).
    pub tasks: Vec<String>,
    pub rows: Vec<GanttRow>,
}

impl ScheduleChart {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, resource: &str) -> Option<&GanttRow> {
        self.rows.iter().find(|r| r.resource == resource)
    }

    /// Series index of `task`, used to pick a stable colour.
    pub fn task_index(&self, task: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t == task)
    }

    /// Upper bound of the time axis: the horizon, or the latest end if later.
    pub fn time_axis_max(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| r.intervals.iter().map(|(_, [_, end])| *end))
            .fold(SCHEDULE_HORIZON, f64::max)
    }
}

fn push_distinct(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|x| x == item) {
        list.push(item.to_string());
    }
}

/// Reshape task assignments into per-resource rows.
///
/// A task that appears twice on the same resource keeps its last interval.
pub fn schedule_chart(assignments: &[ScheduledTask]) -> ScheduleChart {
    let mut chart = ScheduleChart::default();
    for a in assignments {
        push_distinct(&mut chart.resources, &a.resource);
        push_distinct(&mut chart.tasks, &a.task);
    }

    chart.rows = chart
        .resources
        .iter()
        .map(|resource| {
            let mut intervals: Vec<(String, [f64; 2])> = Vec::new();
            for a in assignments.iter().filter(|a| &a.resource == resource) {
                let span = [a.start, a.end];
                match intervals.iter_mut().find(|(t, _)| *t == a.task) {
                    Some(existing) => existing.1 = span,
                    None => intervals.push((a.task.clone(), span)),
                }
            }
            GanttRow {
                resource: resource.clone(),
                intervals,
            }
        })
        .collect();
    chart
}

/// Distribution sorted ascending by value. The input is left untouched.
pub fn sorted_distribution(distribution: &[DistributionPoint]) -> Vec<DistributionPoint> {
    let mut sorted = distribution.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
    sorted
}

/// `(x, y)` series for a line/area chart, probability shown in percent.
pub fn distribution_series(distribution: &[DistributionPoint]) -> Vec<(f64, f64)> {
    sorted_distribution(distribution)
        .into_iter()
        .map(|p| (p.value, p.probability * 100.0))
        .collect()
}

/// Allocation bars as `(asset, weight in percent)`, in result order.
pub fn allocation_bars(allocations: &[Allocation]) -> Vec<(String, f64)> {
    allocations
        .iter()
        .map(|a| (a.asset.clone(), a.weight * 100.0))
        .collect()
}

/// Two decimals and a trailing percent sign: `4.2` → `"4.20%"`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// A metric that may not exist yet; absent renders as `0.00%`.
pub fn format_percent_or_zero(value: Option<f64>) -> String {
    format_percent(value.unwrap_or(0.0))
}
