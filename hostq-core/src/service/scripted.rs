//! Scripted service: replays queued outcomes and counts calls.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{OptimizationService, ServiceError};
use crate::domain::{OptimizationResponse, RunRequest};

/// Returns pre-loaded outcomes in order. Once the script runs out every
/// call fails with "no scripted outcome".
#[derive(Default)]
pub struct ScriptedService {
    outcomes: Mutex<VecDeque<Result<OptimizationResponse, String>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RunRequest>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: OptimizationResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn reject(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, outcome: Result<OptimizationResponse, String>) {
        if let Ok(mut q) = self.outcomes.lock() {
            q.push_back(outcome);
        }
    }

    /// Number of `simulate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received, in call order.
    pub fn requests(&self) -> Vec<RunRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl OptimizationService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    fn simulate(&self, request: &RunRequest) -> Result<OptimizationResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut r) = self.requests.lock() {
            r.push(*request);
        }
        let next = self.outcomes.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ServiceError::Rejected(message)),
            None => Err(ServiceError::Rejected("no scripted outcome".into())),
        }
    }
}
