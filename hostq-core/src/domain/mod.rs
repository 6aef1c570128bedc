//! Domain types: view and backend selectors, run status, result payloads.

pub mod payload;

pub use payload::{
    Allocation, CvarResult, DistributionPoint, OptimizationResponse, PortfolioResult,
    RunPayload, ScheduledTask, ShapeError,
};

use serde::{Deserialize, Serialize};

/// Which demo screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoView {
    Portfolio,
    Scheduling,
    Risk,
}

impl DemoView {
    pub const ALL: [DemoView; 3] = [DemoView::Portfolio, DemoView::Scheduling, DemoView::Risk];

    pub fn index(self) -> usize {
        match self {
            DemoView::Portfolio => 0,
            DemoView::Scheduling => 1,
            DemoView::Risk => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Header title.
    pub fn title(self) -> &'static str {
        match self {
            DemoView::Portfolio => "HOSTING-Q Portfolio Optimization",
            DemoView::Scheduling => "Resource Scheduling",
            DemoView::Risk => "CVaR Risk Analysis",
        }
    }

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            DemoView::Portfolio => "HOSTING-Q",
            DemoView::Scheduling => "Scheduling",
            DemoView::Risk => "Risk Analysis",
        }
    }

    pub fn next(self) -> DemoView {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> DemoView {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::str::FromStr for DemoView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portfolio" | "hosting-q" => Ok(DemoView::Portfolio),
            "scheduling" | "schedule" => Ok(DemoView::Scheduling),
            "risk" | "cvar" => Ok(DemoView::Risk),
            other => Err(format!("unknown view '{other}' (expected portfolio, scheduling, risk)")),
        }
    }
}

/// Cosmetic quantum hardware label forwarded into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumBackend {
    DWave,
    #[default]
    IbmQuantum,
    Willow,
    AzureQuantum,
}

impl QuantumBackend {
    pub const ALL: [QuantumBackend; 4] = [
        QuantumBackend::DWave,
        QuantumBackend::IbmQuantum,
        QuantumBackend::Willow,
        QuantumBackend::AzureQuantum,
    ];

    /// Full name used in status text and prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            QuantumBackend::DWave => "D-Wave",
            QuantumBackend::IbmQuantum => "IBM Quantum",
            QuantumBackend::Willow => "Google Willow",
            QuantumBackend::AzureQuantum => "Azure Quantum",
        }
    }

    /// Short selector label.
    pub fn short_label(self) -> &'static str {
        match self {
            QuantumBackend::DWave => "D-Wave",
            QuantumBackend::IbmQuantum => "IBM",
            QuantumBackend::Willow => "Willow",
            QuantumBackend::AzureQuantum => "Azure",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|b| *b == self).unwrap_or(0)
    }

    pub fn next(self) -> QuantumBackend {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> QuantumBackend {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for QuantumBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for QuantumBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "dwave" => Ok(QuantumBackend::DWave),
            "ibm" | "ibmquantum" => Ok(QuantumBackend::IbmQuantum),
            "willow" | "googlewillow" => Ok(QuantumBackend::Willow),
            "azure" | "azurequantum" => Ok(QuantumBackend::AzureQuantum),
            _ => Err(format!("unknown backend '{s}' (expected dwave, ibm, willow, azure)")),
        }
    }
}

/// Lifecycle status of a view's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunStatus {
    #[default]
    Idle,
    Queued,
    Running,
    Completed,
    Error,
}

impl RunStatus {
    /// Queued or Running: the trigger is inert.
    pub fn is_in_flight(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::Running)
    }

    /// User-facing status line.
    pub fn text(self, backend: QuantumBackend) -> String {
        match self {
            RunStatus::Idle => "Ready to run".to_string(),
            RunStatus::Queued => "Job Queued...".to_string(),
            RunStatus::Running => format!("Running on {}...", backend.display_name()),
            RunStatus::Completed => "Optimization Complete".to_string(),
            RunStatus::Error => "Error".to_string(),
        }
    }
}

/// Minimum and maximum task count for the scheduling view.
pub const TASK_COUNT_RANGE: (u8, u8) = (3, 8);
/// Minimum and maximum resource count for the scheduling view.
pub const RESOURCE_COUNT_RANGE: (u8, u8) = (2, 5);

/// Scheduling inputs. Counts are always kept inside their ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingParams {
    task_count: u8,
    resource_count: u8,
}

impl SchedulingParams {
    pub fn new(task_count: u8, resource_count: u8) -> Self {
        Self {
            task_count: task_count.clamp(TASK_COUNT_RANGE.0, TASK_COUNT_RANGE.1),
            resource_count: resource_count.clamp(RESOURCE_COUNT_RANGE.0, RESOURCE_COUNT_RANGE.1),
        }
    }

    pub fn task_count(&self) -> u8 {
        self.task_count
    }

    pub fn resource_count(&self) -> u8 {
        self.resource_count
    }

    pub fn adjust_tasks(&mut self, delta: i8) {
        *self = Self::new(self.task_count.saturating_add_signed(delta), self.resource_count);
    }

    pub fn adjust_resources(&mut self, delta: i8) {
        *self = Self::new(self.task_count, self.resource_count.saturating_add_signed(delta));
    }
}

impl Default for SchedulingParams {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

/// View-specific request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewParams {
    Portfolio,
    Scheduling(SchedulingParams),
    Risk,
}

impl ViewParams {
    pub fn view(&self) -> DemoView {
        match self {
            ViewParams::Portfolio => DemoView::Portfolio,
            ViewParams::Scheduling(_) => DemoView::Scheduling,
            ViewParams::Risk => DemoView::Risk,
        }
    }
}

/// One call to the optimization service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub backend: QuantumBackend,
    pub params: ViewParams,
}

impl RunRequest {
    pub fn new(backend: QuantumBackend, params: ViewParams) -> Self {
        Self { backend, params }
    }

    pub fn view(&self) -> DemoView {
        self.params.view()
    }
}
