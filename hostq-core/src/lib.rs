//! HOSTING-Q core: everything the dashboard needs except the terminal.
//!
//! - Domain types (view/backend selectors, run status, result payloads)
//! - Per-view run lifecycle state machine
//! - Chart-ready derivations of results
//! - Optimization service trait with Gemini, synthetic and scripted impls
//! - TOML configuration
//! - QSL sediment log for the portfolio view

pub mod chart;
pub mod config;
pub mod domain;
pub mod lifecycle;
pub mod sediment;
pub mod service;

pub use config::AppConfig;
pub use domain::{DemoView, QuantumBackend, RunRequest, RunStatus, SchedulingParams, ViewParams};
pub use lifecycle::{RunLifecycle, RunTicket};
pub use service::{OptimizationService, ServiceError};
