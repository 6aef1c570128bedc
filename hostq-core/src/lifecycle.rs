//! Per-view run lifecycle: Idle → Queued → Running → {Completed | Error}.
//!
//! Each view owns one `RunLifecycle`. `begin` is the only way to enter
//! Queued and it is inert while a run is in flight, so a view never has more
//! than one outstanding service call. Every run carries a `RunTicket`;
//! transitions presented with any ticket other than the current one are
//! rejected, which keeps late or misrouted responses from touching state.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{OptimizationResponse, RunPayload, RunRequest, RunStatus, ShapeError};
use crate::service::{OptimizationService, ServiceError};

/// Monotonic identifier of one run within one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunTicket(pub u64);

impl std::fmt::Display for RunTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// A transition the state machine refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("stale {got}: current run is {current:?}")]
    StaleTicket {
        got: RunTicket,
        current: Option<RunTicket>,
    },

    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: RunStatus, to: RunStatus },
}

/// Run state for one view. `R` is the view's typed result.
#[derive(Debug, Clone)]
pub struct RunLifecycle<R> {
    status: RunStatus,
    result: Option<R>,
    explanation: String,
    error: Option<String>,
    current: Option<RunTicket>,
    runs_started: u64,
}

impl<R> Default for RunLifecycle<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RunLifecycle<R> {
    pub fn new() -> Self {
        Self {
            status: RunStatus::Idle,
            result: None,
            explanation: String::new(),
            error: None,
            current: None,
            runs_started: 0,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Ticket of the run currently Queued or Running.
    pub fn current_ticket(&self) -> Option<RunTicket> {
        self.current
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }

    /// Trigger a run. Clears result, explanation and error, enters Queued.
    ///
    /// Returns `None` (and changes nothing) while a run is in flight.
    pub fn begin(&mut self) -> Option<RunTicket> {
        if self.is_in_flight() {
            debug!(status = ?self.status, "run trigger ignored while in flight");
            return None;
        }
        self.runs_started += 1;
        let ticket = RunTicket(self.runs_started);
        self.result = None;
        self.explanation.clear();
        self.error = None;
        self.current = Some(ticket);
        self.status = RunStatus::Queued;
        debug!(%ticket, "run queued");
        Some(ticket)
    }

    /// Queued → Running. The caller issues the service call after this.
    pub fn start(&mut self, ticket: RunTicket) -> Result<(), LifecycleError> {
        self.check_ticket(ticket)?;
        if self.status != RunStatus::Queued {
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to: RunStatus::Running,
            });
        }
        self.status = RunStatus::Running;
        debug!(%ticket, "run started");
        Ok(())
    }

    /// Running → Completed.
    pub fn complete(
        &mut self,
        ticket: RunTicket,
        result: R,
        explanation: impl Into<String>,
    ) -> Result<(), LifecycleError> {
        self.check_running(ticket, RunStatus::Completed)?;
        self.result = Some(result);
        self.explanation = explanation.into();
        self.error = None;
        self.current = None;
        self.status = RunStatus::Completed;
        debug!(%ticket, "run completed");
        Ok(())
    }

    /// Running → Error. Any partial data is discarded.
    pub fn fail(&mut self, ticket: RunTicket, message: impl Into<String>) -> Result<(), LifecycleError> {
        self.check_running(ticket, RunStatus::Error)?;
        let message = message.into();
        warn!(%ticket, error = %message, "run failed");
        self.result = None;
        self.explanation.clear();
        self.error = Some(message);
        self.current = None;
        self.status = RunStatus::Error;
        Ok(())
    }

    fn check_ticket(&self, ticket: RunTicket) -> Result<(), LifecycleError> {
        if self.current == Some(ticket) {
            Ok(())
        } else {
            Err(LifecycleError::StaleTicket {
                got: ticket,
                current: self.current,
            })
        }
    }

    fn check_running(&self, ticket: RunTicket, to: RunStatus) -> Result<(), LifecycleError> {
        self.check_ticket(ticket)?;
        if self.status != RunStatus::Running {
            return Err(LifecycleError::InvalidTransition { from: self.status, to });
        }
        Ok(())
    }
}

impl<R> RunLifecycle<R>
where
    R: TryFrom<RunPayload, Error = ShapeError>,
{
    /// Settle a Running run with the service outcome.
    ///
    /// A payload of the wrong shape for this view fails the run.
    pub fn settle(
        &mut self,
        ticket: RunTicket,
        outcome: Result<OptimizationResponse, ServiceError>,
    ) -> Result<(), LifecycleError> {
        match outcome {
            Ok(response) => match R::try_from(response.result) {
                Ok(result) => self.complete(ticket, result, response.explanation),
                Err(e) => self.fail(ticket, ServiceError::from(e).to_string()),
            },
            Err(e) => self.fail(ticket, e.to_string()),
        }
    }
}

/// Drive one full run synchronously: begin, start, call, settle.
///
/// Returns the status afterwards. When a run is already in flight nothing
/// happens and the service is not called.
pub fn run_to_completion<R>(
    lifecycle: &mut RunLifecycle<R>,
    service: &dyn OptimizationService,
    request: &RunRequest,
) -> RunStatus
where
    R: TryFrom<RunPayload, Error = ShapeError>,
{
    let Some(ticket) = lifecycle.begin() else {
        return lifecycle.status();
    };
    if let Err(e) = lifecycle.start(ticket) {
        warn!(error = %e, "lifecycle refused start");
        return lifecycle.status();
    }
    let outcome = service.simulate(request);
    if let Err(e) = lifecycle.settle(ticket, outcome) {
        warn!(error = %e, "lifecycle refused settle");
    }
    lifecycle.status()
}
