//! Optimization service trait and structured error types.
//!
//! The `OptimizationService` trait abstracts over where results come from
//! (the Gemini API, the offline synthetic generator, a scripted test double)
//! so views and the CLI never care which one is wired in.

pub mod gemini;
pub mod prompt;
pub mod scripted;
pub mod synthetic;

pub use gemini::GeminiService;
pub use scripted::ScriptedService;
pub use synthetic::SyntheticService;

use thiserror::Error;

use crate::config::{ServiceConfig, ServiceProvider};
use crate::domain::{OptimizationResponse, RunRequest, ShapeError};

/// Why a run failed. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API key is not set (configure service.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("service returned an empty response")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A failure reported verbatim, with no prefix.
    #[error("{0}")]
    Rejected(String),
}

impl From<ShapeError> for ServiceError {
    fn from(e: ShapeError) -> Self {
        ServiceError::MalformedResponse(e.0)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Network(e.to_string())
    }
}

/// Something that can fabricate a result for a view.
///
/// One call performs exactly one attempt: no retries happen behind it.
pub trait OptimizationService: Send + Sync {
    /// Human-readable name, shown in logs and the status bar.
    fn name(&self) -> &str;

    /// Produce a result and explanation for `request`.
    fn simulate(&self, request: &RunRequest) -> Result<OptimizationResponse, ServiceError>;
}

/// Build the service selected by configuration.
pub fn from_config(config: &ServiceConfig) -> Box<dyn OptimizationService> {
    match config.provider {
        ServiceProvider::Gemini => Box::new(GeminiService::new(config)),
        ServiceProvider::Synthetic => Box::new(SyntheticService::new(config.seed)),
    }
}
