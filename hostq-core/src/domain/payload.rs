//! Result payloads returned by the optimization service.
//!
//! Field names match the wire format the service is prompted to produce
//! (`VaR95`, `CVaR95`, `distribution`, `task`, `resource`, ...). Every
//! payload is validated before it reaches a view: a response that parses
//! but carries nonsense (empty series, NaN, inverted intervals) is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DemoView;

/// A payload that parsed but does not describe a usable result.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ShapeError(pub String);

fn check_finite(name: &str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ShapeError(format!("{name} is not a finite number")))
    }
}

/// One point of the simulated loss distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionPoint {
    /// Portfolio return, percent.
    pub value: f64,
    /// Probability mass at this value, in `[0, 1]`.
    pub probability: f64,
}

/// Risk view result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvarResult {
    #[serde(rename = "VaR95")]
    pub var95: f64,
    #[serde(rename = "CVaR95")]
    pub cvar95: f64,
    pub distribution: Vec<DistributionPoint>,
}

impl CvarResult {
    pub fn validate(&self) -> Result<(), ShapeError> {
        check_finite("VaR95", self.var95)?;
        check_finite("CVaR95", self.cvar95)?;
        if self.distribution.is_empty() {
            return Err(ShapeError("distribution is empty".into()));
        }
        for (i, p) in self.distribution.iter().enumerate() {
            check_finite(&format!("distribution[{i}].value"), p.value)?;
            check_finite(&format!("distribution[{i}].probability"), p.probability)?;
            if !(0.0..=1.0).contains(&p.probability) {
                return Err(ShapeError(format!(
                    "distribution[{i}].probability {} outside [0, 1]",
                    p.probability
                )));
            }
        }
        Ok(())
    }
}

/// One task placed on one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task: String,
    pub resource: String,
    pub start: f64,
    pub end: f64,
}

impl ScheduledTask {
    pub fn new(task: impl Into<String>, resource: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            task: task.into(),
            resource: resource.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

fn validate_schedule(tasks: &[ScheduledTask]) -> Result<(), ShapeError> {
    if tasks.is_empty() {
        return Err(ShapeError("schedule is empty".into()));
    }
    for (i, t) in tasks.iter().enumerate() {
        if t.task.trim().is_empty() || t.resource.trim().is_empty() {
            return Err(ShapeError(format!("schedule[{i}] has an empty task or resource")));
        }
        check_finite(&format!("schedule[{i}].start"), t.start)?;
        check_finite(&format!("schedule[{i}].end"), t.end)?;
        if t.start > t.end {
            return Err(ShapeError(format!(
                "schedule[{i}] ends ({}) before it starts ({})",
                t.end, t.start
            )));
        }
    }
    Ok(())
}

/// One asset weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub asset: String,
    /// Fraction of the portfolio, `0..=1`.
    pub weight: f64,
}

/// Portfolio view result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResult {
    pub allocations: Vec<Allocation>,
    /// Annualised expected return, percent.
    pub expected_return: f64,
    /// Annualised volatility, percent.
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl PortfolioResult {
    pub fn validate(&self) -> Result<(), ShapeError> {
        check_finite("expectedReturn", self.expected_return)?;
        check_finite("volatility", self.volatility)?;
        check_finite("sharpeRatio", self.sharpe_ratio)?;
        if self.allocations.is_empty() {
            return Err(ShapeError("allocations are empty".into()));
        }
        for (i, a) in self.allocations.iter().enumerate() {
            check_finite(&format!("allocations[{i}].weight"), a.weight)?;
            if a.weight < 0.0 {
                return Err(ShapeError(format!("allocations[{i}].weight is negative")));
            }
        }
        Ok(())
    }

    pub fn total_weight(&self) -> f64 {
        self.allocations.iter().map(|a| a.weight).sum()
    }
}

/// A result, shaped by the view that requested it.
///
/// Serializes untagged. Decoding always goes through [`RunPayload::from_value`],
/// which picks the shape from the requested view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunPayload {
    Portfolio(PortfolioResult),
    Scheduling(Vec<ScheduledTask>),
    Risk(CvarResult),
}

impl RunPayload {
    pub fn view(&self) -> DemoView {
        match self {
            RunPayload::Portfolio(_) => DemoView::Portfolio,
            RunPayload::Scheduling(_) => DemoView::Scheduling,
            RunPayload::Risk(_) => DemoView::Risk,
        }
    }

    /// Decode a raw JSON result for `view` and validate it.
    pub fn from_value(view: DemoView, value: serde_json::Value) -> Result<Self, ShapeError> {
        let payload = match view {
            DemoView::Portfolio => serde_json::from_value(value).map(RunPayload::Portfolio),
            DemoView::Scheduling => serde_json::from_value(value).map(RunPayload::Scheduling),
            DemoView::Risk => serde_json::from_value(value).map(RunPayload::Risk),
        }
        .map_err(|e| ShapeError(format!("result does not match the {view:?} shape: {e}")))?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            RunPayload::Portfolio(p) => p.validate(),
            RunPayload::Scheduling(s) => validate_schedule(s),
            RunPayload::Risk(r) => r.validate(),
        }
    }
}

/// What a successful service call resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResponse {
    pub result: RunPayload,
    pub explanation: String,
}

impl TryFrom<RunPayload> for PortfolioResult {
    type Error = ShapeError;

    fn try_from(payload: RunPayload) -> Result<Self, Self::Error> {
        match payload {
            RunPayload::Portfolio(p) => Ok(p),
            other => Err(ShapeError(format!("expected a Portfolio result, got {:?}", other.view()))),
        }
    }
}

impl TryFrom<RunPayload> for Vec<ScheduledTask> {
    type Error = ShapeError;

    fn try_from(payload: RunPayload) -> Result<Self, Self::Error> {
        match payload {
            RunPayload::Scheduling(s) => Ok(s),
            other => Err(ShapeError(format!("expected a Scheduling result, got {:?}", other.view()))),
        }
    }
}

impl TryFrom<RunPayload> for CvarResult {
    type Error = ShapeError;

    fn try_from(payload: RunPayload) -> Result<Self, Self::Error> {
        match payload {
            RunPayload::Risk(r) => Ok(r),
            other => Err(ShapeError(format!("expected a Risk result, got {:?}", other.view()))),
        }
    }
}
