//! End-to-end runs through the lifecycle with scripted and synthetic services.

use hostq_core::chart::{format_percent, schedule_chart, sorted_distribution};
use hostq_core::domain::{
    CvarResult, DistributionPoint, OptimizationResponse, PortfolioResult, RunPayload,
    ScheduledTask,
};
use hostq_core::lifecycle::run_to_completion;
use hostq_core::service::{ScriptedService, SyntheticService};
use hostq_core::{
    OptimizationService, QuantumBackend, RunLifecycle, RunRequest, RunStatus, SchedulingParams,
    ViewParams,
};

fn risk_response() -> OptimizationResponse {
    OptimizationResponse {
        result: RunPayload::Risk(CvarResult {
            var95: 4.2,
            cvar95: 6.756,
            distribution: vec![
                DistributionPoint { value: 5.0, probability: 0.1 },
                DistributionPoint { value: -3.0, probability: 0.2 },
                DistributionPoint { value: 0.0, probability: 0.3 },
            ],
        }),
        explanation: "Amplitude estimation on IBM Quantum.".into(),
    }
}

fn risk_request() -> RunRequest {
    RunRequest::new(QuantumBackend::IbmQuantum, ViewParams::Risk)
}

#[test]
fn rejection_message_is_shown_verbatim() {
    let service = ScriptedService::new().reject("backend unavailable");
    let mut lc: RunLifecycle<CvarResult> = RunLifecycle::new();

    let status = run_to_completion(&mut lc, &service, &risk_request());

    assert_eq!(status, RunStatus::Error);
    assert_eq!(lc.error(), Some("backend unavailable"));
    assert!(lc.result().is_none());
    assert_eq!(service.calls(), 1);
}

#[test]
fn resolution_completes_and_formats_metrics() {
    let service = ScriptedService::new().respond(risk_response());
    let mut lc: RunLifecycle<CvarResult> = RunLifecycle::new();

    let status = run_to_completion(&mut lc, &service, &risk_request());

    assert_eq!(status, RunStatus::Completed);
    let r = lc.result().unwrap();
    assert_eq!(format_percent(r.var95), "4.20%");
    assert_eq!(format_percent(r.cvar95), "6.76%");
    assert_eq!(lc.explanation(), "Amplitude estimation on IBM Quantum.");

    let charted: Vec<f64> = sorted_distribution(&r.distribution).iter().map(|p| p.value).collect();
    assert_eq!(charted, vec![-3.0, 0.0, 5.0]);
    let stored: Vec<f64> = r.distribution.iter().map(|p| p.value).collect();
    assert_eq!(stored, vec![5.0, -3.0, 0.0]);
}

#[test]
fn in_flight_trigger_issues_no_second_call() {
    let service = ScriptedService::new().respond(risk_response());
    let mut lc: RunLifecycle<CvarResult> = RunLifecycle::new();

    let ticket = lc.begin().unwrap();
    lc.start(ticket).unwrap();
    // a second trigger while Running is inert
    let status = run_to_completion(&mut lc, &service, &risk_request());
    assert_eq!(status, RunStatus::Running);
    assert_eq!(service.calls(), 0);

    lc.settle(ticket, service.simulate(&risk_request())).unwrap();
    assert_eq!(lc.status(), RunStatus::Completed);
    assert_eq!(service.calls(), 1);
}

#[test]
fn failure_after_success_discards_old_result() {
    let service = ScriptedService::new()
        .respond(risk_response())
        .reject("quota exhausted");
    let mut lc: RunLifecycle<CvarResult> = RunLifecycle::new();

    assert_eq!(run_to_completion(&mut lc, &service, &risk_request()), RunStatus::Completed);
    assert_eq!(run_to_completion(&mut lc, &service, &risk_request()), RunStatus::Error);
    assert!(lc.result().is_none());
    assert!(lc.explanation().is_empty());
    assert_eq!(lc.error(), Some("quota exhausted"));
    assert_eq!(lc.runs_started(), 2);
}

#[test]
fn scheduling_request_carries_counts() {
    let service = ScriptedService::new().respond(OptimizationResponse {
        result: RunPayload::Scheduling(vec![
            ScheduledTask::new("T1", "R1", 0.0, 4.0),
            ScheduledTask::new("T2", "R2", 2.0, 6.0),
        ]),
        explanation: "annealed".into(),
    });
    let mut lc: RunLifecycle<Vec<ScheduledTask>> = RunLifecycle::new();
    let request = RunRequest::new(
        QuantumBackend::DWave,
        ViewParams::Scheduling(SchedulingParams::new(4, 2)),
    );

    assert_eq!(run_to_completion(&mut lc, &service, &request), RunStatus::Completed);
    assert_eq!(service.requests(), vec![request]);

    let chart = schedule_chart(lc.result().unwrap());
    assert_eq!(chart.resources, vec!["R1", "R2"]);
    assert_eq!(chart.tasks, vec!["T1", "T2"]);
    assert_eq!(chart.row("R1").unwrap().intervals.len(), 1);
}

#[test]
fn synthetic_service_drives_every_view() {
    let service = SyntheticService::new(42);

    let mut portfolio: RunLifecycle<PortfolioResult> = RunLifecycle::new();
    let req = RunRequest::new(QuantumBackend::Willow, ViewParams::Portfolio);
    assert_eq!(run_to_completion(&mut portfolio, &service, &req), RunStatus::Completed);

    let mut schedule: RunLifecycle<Vec<ScheduledTask>> = RunLifecycle::new();
    let req = RunRequest::new(
        QuantumBackend::AzureQuantum,
        ViewParams::Scheduling(SchedulingParams::default()),
    );
    assert_eq!(run_to_completion(&mut schedule, &service, &req), RunStatus::Completed);
    assert_eq!(schedule.result().unwrap().len(), 5);

    let mut risk: RunLifecycle<CvarResult> = RunLifecycle::new();
    assert_eq!(run_to_completion(&mut risk, &service, &risk_request()), RunStatus::Completed);
}
