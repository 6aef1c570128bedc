use std::sync::mpsc;
use std::time::Instant;

use ratatui::backend::TestBackend;
use ratatui::Terminal;

use hostq_core::config::UiConfig;
use hostq_core::domain::{CvarResult, DistributionPoint, OptimizationResponse, RunPayload};
use hostq_core::DemoView;
use hostq_tui::app::Overlay;
use hostq_tui::worker::{WorkerCommand, WorkerResponse};
use hostq_tui::{ui, AppState};

fn app() -> (AppState, mpsc::Receiver<WorkerCommand>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let ui = UiConfig {
        queue_delay_ms: 0,
        ..UiConfig::default()
    };
    (AppState::new(cmd_tx, resp_rx, &ui, "scripted"), cmd_rx)
}

/// Render one frame and return it as text rows.
fn render(app: &AppState) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}

fn screen_contains(rows: &[String], needle: &str) -> bool {
    rows.iter().any(|row| row.contains(needle))
}

#[test]
fn idle_portfolio_screen() {
    let (app, _rx) = app();
    let rows = render(&app);
    assert!(screen_contains(&rows, "HOSTING-Q Portfolio Optimization"));
    assert!(screen_contains(&rows, "Ready to run"));
    assert!(screen_contains(&rows, "The Sediment Log is empty."));
    assert!(screen_contains(&rows, "HOSTING-Q Simulations"));
}

#[test]
fn every_view_renders() {
    let (mut app, _rx) = app();
    for (view, title) in [
        (DemoView::Scheduling, "Resource Scheduling"),
        (DemoView::Risk, "CVaR Risk Analysis"),
    ] {
        app.active_view = view;
        let rows = render(&app);
        assert!(screen_contains(&rows, title), "{title} missing");
    }
}

#[test]
fn completed_risk_shows_formatted_metrics() {
    let (mut app, rx) = app();
    app.active_view = DemoView::Risk;
    let now = Instant::now();
    app.trigger_run(now);
    app.tick(now);
    let Ok(WorkerCommand::Run { view, ticket, .. }) = rx.try_recv() else {
        panic!("run was not dispatched");
    };
    app.on_worker_response(WorkerResponse::RunFinished {
        view,
        ticket,
        outcome: Ok(OptimizationResponse {
            result: RunPayload::Risk(CvarResult {
                var95: 4.2,
                cvar95: 6.755,
                distribution: vec![
                    DistributionPoint { value: 5.0, probability: 0.1 },
                    DistributionPoint { value: -3.0, probability: 0.2 },
                    DistributionPoint { value: 0.0, probability: 0.3 },
                ],
            }),
            explanation: "Monte Carlo sampling".into(),
        }),
    });

    let rows = render(&app);
    assert!(screen_contains(&rows, "4.20%"));
    assert!(screen_contains(&rows, "6.76%"));
    assert!(screen_contains(&rows, "Monte Carlo sampling"));
    assert!(!screen_contains(&rows, "Run analysis to view chart"));
}

#[test]
fn error_history_overlay_lists_failures() {
    let (mut app, _rx) = app();
    app.push_error(DemoView::Risk, "backend unavailable".into());
    app.overlay = Overlay::ErrorHistory;
    let rows = render(&app);
    assert!(screen_contains(&rows, "Error History (1)"));
    assert!(screen_contains(&rows, "backend unavailable"));
}
