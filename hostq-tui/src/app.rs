//! Application state: single-owner, main-thread only.
//!
//! Every view owns its run lifecycle, backend selection and inputs; nothing
//! is shared between views. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::{NaiveDateTime, Utc};
use tracing::{info, warn};

use hostq_core::config::UiConfig;
use hostq_core::domain::{
    CvarResult, OptimizationResponse, PortfolioResult, RunPayload, ScheduledTask, ShapeError,
};
use hostq_core::lifecycle::LifecycleError;
use hostq_core::sediment::SedimentLog;
use hostq_core::{
    DemoView, QuantumBackend, RunLifecycle, RunRequest, RunStatus, RunTicket, SchedulingParams,
    ServiceError, ViewParams,
};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// A failed run, kept for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub view: DemoView,
    pub message: String,
}

/// Run state common to every view.
#[derive(Debug)]
pub struct ViewRun<R> {
    pub lifecycle: RunLifecycle<R>,
    pub backend: QuantumBackend,
    /// Trigger time and the request captured at that moment.
    queued: Option<(Instant, RunRequest)>,
}

impl<R> ViewRun<R> {
    pub fn new(backend: QuantumBackend) -> Self {
        Self {
            lifecycle: RunLifecycle::new(),
            backend,
            queued: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.lifecycle.status()
    }

    pub fn status_text(&self) -> String {
        self.lifecycle.status().text(self.backend)
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_in_flight()
    }

    /// Enter Queued with `request` frozen as the call to issue.
    /// `None` while a run is already in flight.
    pub fn trigger(&mut self, now: Instant, request: RunRequest) -> Option<RunTicket> {
        let ticket = self.lifecycle.begin()?;
        self.queued = Some((now, request));
        Some(ticket)
    }

    /// Queued → Running once `delay` has passed since the trigger.
    ///
    /// Returns the ticket and the request captured at trigger time.
    pub fn promote(&mut self, now: Instant, delay: Duration) -> Option<(RunTicket, RunRequest)> {
        if self.lifecycle.status() != RunStatus::Queued {
            return None;
        }
        let (queued_at, request) = self.queued?;
        if now.duration_since(queued_at) < delay {
            return None;
        }
        let ticket = self.lifecycle.current_ticket()?;
        if let Err(e) = self.lifecycle.start(ticket) {
            warn!(error = %e, "queued run could not start");
            return None;
        }
        self.queued = None;
        Some((ticket, request))
    }
}

impl<R> ViewRun<R>
where
    R: TryFrom<RunPayload, Error = ShapeError>,
{
    pub fn settle(
        &mut self,
        ticket: RunTicket,
        outcome: Result<OptimizationResponse, ServiceError>,
    ) -> Result<RunStatus, LifecycleError> {
        self.lifecycle.settle(ticket, outcome)?;
        Ok(self.lifecycle.status())
    }
}

/// HOSTING-Q portfolio view state.
#[derive(Debug)]
pub struct PortfolioViewState {
    pub run: ViewRun<PortfolioResult>,
    pub sediment: SedimentLog,
}

impl PortfolioViewState {
    pub fn new(backend: QuantumBackend) -> Self {
        Self {
            run: ViewRun::new(backend),
            sediment: SedimentLog::new(),
        }
    }

    pub fn request(&self) -> RunRequest {
        RunRequest::new(self.run.backend, ViewParams::Portfolio)
    }
}

/// Which scheduling slider `+`/`-` adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingSlider {
    Tasks,
    Resources,
}

impl SchedulingSlider {
    pub fn toggle(self) -> Self {
        match self {
            SchedulingSlider::Tasks => SchedulingSlider::Resources,
            SchedulingSlider::Resources => SchedulingSlider::Tasks,
        }
    }
}

/// Resource scheduling view state.
#[derive(Debug)]
pub struct SchedulingViewState {
    pub run: ViewRun<Vec<ScheduledTask>>,
    pub params: SchedulingParams,
    pub slider: SchedulingSlider,
}

impl SchedulingViewState {
    pub fn new(backend: QuantumBackend) -> Self {
        Self {
            run: ViewRun::new(backend),
            params: SchedulingParams::default(),
            slider: SchedulingSlider::Tasks,
        }
    }

    pub fn request(&self) -> RunRequest {
        RunRequest::new(self.run.backend, ViewParams::Scheduling(self.params))
    }

    /// Nudge the selected slider by one step, clamped to its range.
    pub fn adjust(&mut self, delta: i8) {
        match self.slider {
            SchedulingSlider::Tasks => self.params.adjust_tasks(delta),
            SchedulingSlider::Resources => self.params.adjust_resources(delta),
        }
    }
}

/// CVaR risk analysis view state.
#[derive(Debug)]
pub struct RiskViewState {
    pub run: ViewRun<CvarResult>,
}

impl RiskViewState {
    pub fn new(backend: QuantumBackend) -> Self {
        Self {
            run: ViewRun::new(backend),
        }
    }

    pub fn request(&self) -> RunRequest {
        RunRequest::new(self.run.backend, ViewParams::Risk)
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_view: DemoView,
    pub running: bool,

    // View states
    pub portfolio: PortfolioViewState,
    pub scheduling: SchedulingViewState,
    pub risk: RiskViewState,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub service_name: String,
    pub queue_delay: Duration,
    /// Advances once per tick; drives spinners and shimmer.
    pub frame: u64,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        ui: &UiConfig,
        service_name: impl Into<String>,
    ) -> Self {
        let backend = ui.default_backend;
        Self {
            active_view: DemoView::Portfolio,
            running: true,
            portfolio: PortfolioViewState::new(backend),
            scheduling: SchedulingViewState::new(backend),
            risk: RiskViewState::new(backend),
            worker_tx,
            worker_rx,
            service_name: service_name.into(),
            queue_delay: Duration::from_millis(ui.queue_delay_ms),
            frame: 0,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    pub fn status_of(&self, view: DemoView) -> RunStatus {
        match view {
            DemoView::Portfolio => self.portfolio.run.status(),
            DemoView::Scheduling => self.scheduling.run.status(),
            DemoView::Risk => self.risk.run.status(),
        }
    }

    pub fn backend_of(&self, view: DemoView) -> QuantumBackend {
        match view {
            DemoView::Portfolio => self.portfolio.run.backend,
            DemoView::Scheduling => self.scheduling.run.backend,
            DemoView::Risk => self.risk.run.backend,
        }
    }

    fn backend_mut(&mut self, view: DemoView) -> &mut QuantumBackend {
        match view {
            DemoView::Portfolio => &mut self.portfolio.run.backend,
            DemoView::Scheduling => &mut self.scheduling.run.backend,
            DemoView::Risk => &mut self.risk.run.backend,
        }
    }

    /// Step the active view's backend selector.
    pub fn cycle_backend(&mut self, forward: bool) {
        let view = self.active_view;
        let backend = self.backend_mut(view);
        *backend = if forward { backend.next() } else { backend.prev() };
    }

    /// Run action on the active view. Inert while that view is in flight.
    pub fn trigger_run(&mut self, now: Instant) {
        let view = self.active_view;
        let ticket = match view {
            DemoView::Portfolio => {
                let request = self.portfolio.request();
                self.portfolio.run.trigger(now, request)
            }
            DemoView::Scheduling => {
                let request = self.scheduling.request();
                self.scheduling.run.trigger(now, request)
            }
            DemoView::Risk => {
                let request = self.risk.request();
                self.risk.run.trigger(now, request)
            }
        };
        match ticket {
            Some(ticket) => {
                info!(?view, %ticket, "run queued");
                self.set_status(format!("{}: job queued", view.label()));
            }
            None => self.set_warning(format!("{}: a run is already in progress", view.label())),
        }
    }

    /// Promote queued runs whose delay has passed and hand them to the worker.
    pub fn tick(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);
        let delay = self.queue_delay;

        if let Some((ticket, request)) = self.portfolio.run.promote(now, delay) {
            self.dispatch(DemoView::Portfolio, ticket, request);
        }
        if let Some((ticket, request)) = self.scheduling.run.promote(now, delay) {
            self.dispatch(DemoView::Scheduling, ticket, request);
        }
        if let Some((ticket, request)) = self.risk.run.promote(now, delay) {
            self.dispatch(DemoView::Risk, ticket, request);
        }
    }

    fn dispatch(&mut self, view: DemoView, ticket: RunTicket, request: RunRequest) {
        info!(?view, %ticket, backend = %request.backend, "dispatching run");
        let sent = self.worker_tx.send(WorkerCommand::Run {
            view,
            ticket,
            request,
        });
        if sent.is_err() {
            // Without a worker the run would sit in Running forever.
            self.on_worker_response(WorkerResponse::RunFinished {
                view,
                ticket,
                outcome: Err(ServiceError::Rejected("run worker is not available".into())),
            });
        }
    }

    /// Apply a worker response to the view that issued the run.
    pub fn on_worker_response(&mut self, resp: WorkerResponse) {
        let WorkerResponse::RunFinished {
            view,
            ticket,
            outcome,
        } = resp;

        let settled = match view {
            DemoView::Portfolio => self.portfolio.run.settle(ticket, outcome),
            DemoView::Scheduling => self.scheduling.run.settle(ticket, outcome),
            DemoView::Risk => self.risk.run.settle(ticket, outcome),
        };

        match settled {
            Ok(RunStatus::Completed) => {
                if view == DemoView::Portfolio {
                    self.record_portfolio_run();
                }
                self.set_status(format!("{}: optimization complete", view.label()));
            }
            Ok(_) => {
                let message = self.error_of(view).unwrap_or_default().to_string();
                self.push_error(view, message);
            }
            Err(e) => warn!(?view, error = %e, "ignoring stale run response"),
        }
    }

    fn error_of(&self, view: DemoView) -> Option<&str> {
        match view {
            DemoView::Portfolio => self.portfolio.run.lifecycle.error(),
            DemoView::Scheduling => self.scheduling.run.lifecycle.error(),
            DemoView::Risk => self.risk.run.lifecycle.error(),
        }
    }

    fn record_portfolio_run(&mut self) {
        let portfolio = &mut self.portfolio;
        if let Some(result) = portfolio.run.lifecycle.result() {
            let shot = portfolio.sediment.record_run(result, Utc::now());
            info!(shot = %shot.id, layer = shot.layer_index, "sediment run recorded");
        }
    }

    /// Append a share mark for the current portfolio result.
    pub fn share_portfolio(&mut self) {
        if self.portfolio.run.status() != RunStatus::Completed {
            self.set_warning("Nothing to share yet: run the optimization first");
            return;
        }
        let shot = self.portfolio.sediment.record_share(Utc::now());
        let id = shot.id.clone();
        info!(shot = %id, "sediment share recorded");
        self.set_status(format!("Shared {id}"));
    }

    /// Push a failed run to the history, capping at 50.
    pub fn push_error(&mut self, view: DemoView, message: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            view,
            message: message.clone(),
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((format!("{}: {message}", view.label()), StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use hostq_core::domain::{Allocation, DistributionPoint};

    fn app_with_delay(ms: u64) -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let ui = UiConfig {
            queue_delay_ms: ms,
            ..UiConfig::default()
        };
        (AppState::new(cmd_tx, resp_rx, &ui, "scripted"), cmd_rx, resp_tx)
    }

    fn portfolio_response() -> OptimizationResponse {
        OptimizationResponse {
            result: RunPayload::Portfolio(PortfolioResult {
                allocations: vec![
                    Allocation { asset: "BA".into(), weight: 0.6 },
                    Allocation { asset: "LMT".into(), weight: 0.4 },
                ],
                expected_return: 8.5,
                volatility: 12.0,
                sharpe_ratio: 0.54,
            }),
            explanation: "QAOA on IBM Quantum".into(),
        }
    }

    fn take_run(rx: &Receiver<WorkerCommand>) -> (DemoView, RunTicket, RunRequest) {
        match rx.try_recv().expect("a run command") {
            WorkerCommand::Run {
                view,
                ticket,
                request,
            } => (view, ticket, request),
            WorkerCommand::Shutdown => panic!("unexpected shutdown"),
        }
    }

    #[test]
    fn defaults() {
        let (app, _rx, _tx) = app_with_delay(500);
        assert_eq!(app.active_view, DemoView::Portfolio);
        for view in DemoView::ALL {
            assert_eq!(app.status_of(view), RunStatus::Idle);
            assert_eq!(app.backend_of(view), QuantumBackend::IbmQuantum);
        }
        assert_eq!(app.scheduling.params.task_count(), 5);
        assert_eq!(app.scheduling.params.resource_count(), 3);
    }

    #[test]
    fn backend_selection_is_per_view() {
        let (mut app, _rx, _tx) = app_with_delay(0);
        app.cycle_backend(true);
        assert_eq!(app.backend_of(DemoView::Portfolio), QuantumBackend::Willow);
        assert_eq!(app.backend_of(DemoView::Risk), QuantumBackend::IbmQuantum);
        app.cycle_backend(false);
        app.cycle_backend(false);
        assert_eq!(app.backend_of(DemoView::Portfolio), QuantumBackend::DWave);
    }

    #[test]
    fn queue_delay_holds_run_in_queued() {
        let (mut app, cmd_rx, _tx) = app_with_delay(500);
        let t0 = Instant::now();
        app.trigger_run(t0);
        assert_eq!(app.status_of(DemoView::Portfolio), RunStatus::Queued);

        app.tick(t0 + Duration::from_millis(100));
        assert_eq!(app.status_of(DemoView::Portfolio), RunStatus::Queued);
        assert!(cmd_rx.try_recv().is_err());

        app.tick(t0 + Duration::from_millis(500));
        assert_eq!(app.status_of(DemoView::Portfolio), RunStatus::Running);
        let (view, ticket, request) = take_run(&cmd_rx);
        assert_eq!(view, DemoView::Portfolio);
        assert_eq!(ticket, RunTicket(1));
        assert_eq!(request.backend, QuantumBackend::IbmQuantum);
    }

    #[test]
    fn queued_run_keeps_inputs_from_trigger_time() {
        let (mut app, cmd_rx, _tx) = app_with_delay(500);
        app.active_view = DemoView::Scheduling;
        let t0 = Instant::now();
        app.trigger_run(t0);

        // Inputs change while the run waits in Queued.
        app.scheduling.adjust(3);
        app.cycle_backend(true);
        assert_eq!(app.scheduling.params.task_count(), 8);
        assert_eq!(app.backend_of(DemoView::Scheduling), QuantumBackend::Willow);

        app.tick(t0 + Duration::from_millis(600));
        let (view, _, request) = take_run(&cmd_rx);
        assert_eq!(view, DemoView::Scheduling);
        assert_eq!(request.backend, QuantumBackend::IbmQuantum);
        assert_eq!(
            request.params,
            ViewParams::Scheduling(SchedulingParams::new(5, 3))
        );

        // The next run picks up the new values.
        app.on_worker_response(WorkerResponse::RunFinished {
            view,
            ticket: RunTicket(1),
            outcome: Err(ServiceError::Rejected("done".into())),
        });
        app.trigger_run(t0 + Duration::from_secs(1));
        app.tick(t0 + Duration::from_secs(2));
        let (_, _, request) = take_run(&cmd_rx);
        assert_eq!(request.backend, QuantumBackend::Willow);
        assert_eq!(
            request.params,
            ViewParams::Scheduling(SchedulingParams::new(8, 3))
        );
    }

    #[test]
    fn trigger_while_in_flight_sends_nothing_more() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        let now = Instant::now();
        app.trigger_run(now);
        app.trigger_run(now);
        app.tick(now);
        app.trigger_run(now);
        app.tick(now);

        take_run(&cmd_rx);
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.portfolio.run.lifecycle.runs_started(), 1);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn completed_portfolio_run_lands_in_sediment() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        let now = Instant::now();
        app.trigger_run(now);
        app.tick(now);
        let (view, ticket, _) = take_run(&cmd_rx);

        app.on_worker_response(WorkerResponse::RunFinished {
            view,
            ticket,
            outcome: Ok(portfolio_response()),
        });

        assert_eq!(app.status_of(DemoView::Portfolio), RunStatus::Completed);
        assert_eq!(app.portfolio.run.lifecycle.explanation(), "QAOA on IBM Quantum");
        assert_eq!(app.portfolio.sediment.len(), 1);

        app.share_portfolio();
        assert_eq!(app.portfolio.sediment.len(), 2);
        assert!(app.portfolio.sediment.verify_chain());
    }

    #[test]
    fn share_before_result_is_refused() {
        let (mut app, _rx, _tx) = app_with_delay(0);
        app.share_portfolio();
        assert!(app.portfolio.sediment.is_empty());
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn rejection_is_recorded_verbatim() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        app.active_view = DemoView::Risk;
        let now = Instant::now();
        app.trigger_run(now);
        app.tick(now);
        let (view, ticket, _) = take_run(&cmd_rx);
        assert_eq!(view, DemoView::Risk);

        app.on_worker_response(WorkerResponse::RunFinished {
            view,
            ticket,
            outcome: Err(ServiceError::Rejected("backend unavailable".into())),
        });

        assert_eq!(app.status_of(DemoView::Risk), RunStatus::Error);
        assert_eq!(app.risk.run.lifecycle.error(), Some("backend unavailable"));
        assert!(app.risk.run.lifecycle.result().is_none());
        assert_eq!(app.error_history[0].message, "backend unavailable");
        assert_eq!(app.error_history[0].view, DemoView::Risk);
    }

    #[test]
    fn wrong_shape_fails_the_run() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        app.active_view = DemoView::Risk;
        let now = Instant::now();
        app.trigger_run(now);
        app.tick(now);
        let (view, ticket, _) = take_run(&cmd_rx);

        app.on_worker_response(WorkerResponse::RunFinished {
            view,
            ticket,
            outcome: Ok(portfolio_response()),
        });
        assert_eq!(app.status_of(DemoView::Risk), RunStatus::Error);
        assert!(app.risk.run.lifecycle.error().unwrap().starts_with("malformed response"));
    }

    #[test]
    fn stale_response_is_ignored() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        app.active_view = DemoView::Risk;
        let now = Instant::now();
        app.trigger_run(now);
        app.tick(now);
        take_run(&cmd_rx);

        app.on_worker_response(WorkerResponse::RunFinished {
            view: DemoView::Risk,
            ticket: RunTicket(99),
            outcome: Ok(OptimizationResponse {
                result: RunPayload::Risk(CvarResult {
                    var95: 1.0,
                    cvar95: 2.0,
                    distribution: vec![DistributionPoint { value: 0.0, probability: 1.0 }],
                }),
                explanation: String::new(),
            }),
        });
        assert_eq!(app.status_of(DemoView::Risk), RunStatus::Running);
        assert!(app.error_history.is_empty());
    }

    #[test]
    fn views_run_independently() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        let now = Instant::now();
        app.trigger_run(now);
        app.active_view = DemoView::Scheduling;
        app.scheduling.adjust(3);
        app.trigger_run(now);
        app.tick(now);

        let (first, _, _) = take_run(&cmd_rx);
        let (second, _, request) = take_run(&cmd_rx);
        assert_eq!(first, DemoView::Portfolio);
        assert_eq!(second, DemoView::Scheduling);
        assert_eq!(
            request.params,
            ViewParams::Scheduling(SchedulingParams::new(8, 3))
        );
        assert_eq!(app.status_of(DemoView::Risk), RunStatus::Idle);
    }

    #[test]
    fn dead_worker_fails_the_run() {
        let (mut app, cmd_rx, _tx) = app_with_delay(0);
        drop(cmd_rx);
        let now = Instant::now();
        app.trigger_run(now);
        app.tick(now);
        assert_eq!(app.status_of(DemoView::Portfolio), RunStatus::Error);
        assert_eq!(
            app.portfolio.run.lifecycle.error(),
            Some("run worker is not available")
        );
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _rx, _tx) = app_with_delay(0);
        for i in 0..60 {
            app.push_error(DemoView::Risk, format!("error {i}"));
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn slider_toggle() {
        let mut state = SchedulingViewState::new(QuantumBackend::DWave);
        state.adjust(-5);
        assert_eq!(state.params.task_count(), 3);
        state.slider = state.slider.toggle();
        state.adjust(10);
        assert_eq!(state.params.resource_count(), 5);
    }
}
