//! HOSTING-Q TUI: sidebar navigation over three demo views.
//!
//! Views:
//! 1. HOSTING-Q: portfolio optimization with the QSL sediment log
//! 2. Scheduling: resource scheduling rendered as a Gantt chart
//! 3. Risk Analysis: CVaR metrics and the loss distribution

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
