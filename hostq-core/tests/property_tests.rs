//! Property tests for chart derivation and the run lifecycle.
//!
//! Uses proptest to verify:
//! 1. Schedule rows: every assignment lands in exactly its resource row
//! 2. First-seen order: resource and task lists preserve input order
//! 3. Sorted distribution: ascending, same multiset, input untouched
//! 4. Lifecycle: at most one run in flight under any trigger sequence

use proptest::prelude::*;

use hostq_core::chart::{schedule_chart, sorted_distribution};
use hostq_core::domain::{CvarResult, DistributionPoint, ScheduledTask};
use hostq_core::{RunLifecycle, RunStatus};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_assignment() -> impl Strategy<Value = ScheduledTask> {
    (1u8..=8, 1u8..=5, 0.0..40.0_f64, 0.5..8.0_f64).prop_map(|(t, r, start, len)| {
        ScheduledTask::new(format!("T{t}"), format!("R{r}"), start, start + len)
    })
}

fn arb_point() -> impl Strategy<Value = DistributionPoint> {
    (-20.0..20.0_f64, 0.0..1.0_f64).prop_map(|(value, probability)| DistributionPoint {
        value,
        probability,
    })
}

#[derive(Debug, Clone)]
enum Event {
    Trigger,
    Start,
    Succeed,
    Fail,
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Trigger),
        Just(Event::Start),
        Just(Event::Succeed),
        Just(Event::Fail),
    ]
}

// ── 1. Schedule rows ─────────────────────────────────────────────────

proptest! {
    /// Each (task, resource) pair appears in its own row and nowhere else.
    #[test]
    fn assignments_land_in_their_row(tasks in prop::collection::vec(arb_assignment(), 0..20)) {
        let chart = schedule_chart(&tasks);
        prop_assert_eq!(chart.rows.len(), chart.resources.len());
        for a in &tasks {
            let row = chart.row(&a.resource).unwrap();
            prop_assert!(row.contains(&a.task));
        }
        for row in &chart.rows {
            for (task, _) in &row.intervals {
                prop_assert!(tasks.iter().any(|a| &a.task == task && a.resource == row.resource));
            }
        }
    }
}

// ── 2. First-seen order ──────────────────────────────────────────────

proptest! {
    #[test]
    fn lists_follow_first_appearance(tasks in prop::collection::vec(arb_assignment(), 1..20)) {
        let chart = schedule_chart(&tasks);
        prop_assert_eq!(&chart.resources[0], &tasks[0].resource);
        prop_assert_eq!(&chart.tasks[0], &tasks[0].task);

        let first_pos = |key: &str, f: &dyn Fn(&ScheduledTask) -> &str| {
            tasks.iter().position(|a| f(a) == key).unwrap()
        };
        for w in chart.resources.windows(2) {
            prop_assert!(first_pos(&w[0], &|a| &a.resource) < first_pos(&w[1], &|a| &a.resource));
        }
        for w in chart.tasks.windows(2) {
            prop_assert!(first_pos(&w[0], &|a| &a.task) < first_pos(&w[1], &|a| &a.task));
        }
    }
}

// ── 3. Sorted distribution ───────────────────────────────────────────

proptest! {
    #[test]
    fn sorted_is_ascending_permutation(points in prop::collection::vec(arb_point(), 0..30)) {
        let before = points.clone();
        let sorted = sorted_distribution(&points);
        prop_assert_eq!(&points, &before);
        prop_assert_eq!(sorted.len(), points.len());
        for w in sorted.windows(2) {
            prop_assert!(w[0].value <= w[1].value);
        }
        for p in &points {
            prop_assert!(sorted.contains(p));
        }
    }
}

// ── 4. Lifecycle ─────────────────────────────────────────────────────

proptest! {
    /// No event sequence yields two live tickets, and settled states never
    /// carry both a result and an error.
    #[test]
    fn one_run_in_flight(events in prop::collection::vec(arb_event(), 0..40)) {
        let mut lc: RunLifecycle<CvarResult> = RunLifecycle::new();
        let mut issued = 0u64;
        for event in events {
            match event {
                Event::Trigger => {
                    let was_in_flight = lc.is_in_flight();
                    let ticket = lc.begin();
                    prop_assert_eq!(ticket.is_none(), was_in_flight);
                    if ticket.is_some() {
                        issued += 1;
                        prop_assert_eq!(lc.status(), RunStatus::Queued);
                        prop_assert!(lc.result().is_none());
                        prop_assert!(lc.error().is_none());
                    }
                }
                Event::Start => {
                    if let Some(t) = lc.current_ticket() {
                        let _ = lc.start(t);
                    }
                }
                Event::Succeed => {
                    if let Some(t) = lc.current_ticket() {
                        let r = CvarResult { var95: 1.0, cvar95: 2.0, distribution: vec![] };
                        let _ = lc.complete(t, r, "ok");
                    }
                }
                Event::Fail => {
                    if let Some(t) = lc.current_ticket() {
                        let _ = lc.fail(t, "no");
                    }
                }
            }
            prop_assert_eq!(lc.runs_started(), issued);
            prop_assert!(!(lc.result().is_some() && lc.error().is_some()));
            prop_assert_eq!(lc.current_ticket().is_some(), lc.is_in_flight());
        }
    }
}
