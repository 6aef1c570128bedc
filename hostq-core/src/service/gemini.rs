//! Google Gemini (Generative Language API) service.
//!
//! Sends one `generateContent` request per run with a JSON response MIME
//! type, then decodes the candidate text as `{ "result", "explanation" }`.
//! The decoded result is validated against the requested view's shape;
//! anything that does not fit fails the run.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{prompt, OptimizationService, ServiceError};
use crate::config::ServiceConfig;
use crate::domain::{DemoView, OptimizationResponse, RunPayload, RunRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct GeminiService {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiService {
    pub fn new(config: &ServiceConfig) -> Self {
        let mut builder = reqwest::blocking::Client::builder().user_agent("hostq/0.1");
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        } else {
            // blocking clients default to 30s; a run may wait as long as it takes
            builder = builder.timeout(None);
        }
        let client = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default HTTP client");
            reqwest::blocking::Client::new()
        });
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(request: &RunRequest) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt::build(request) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.7,
            }
        })
    }
}

impl OptimizationService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    fn simulate(&self, request: &RunRequest) -> Result<OptimizationResponse, ServiceError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ServiceError::MissingApiKey)?;

        info!(view = ?request.view(), backend = %request.backend, model = %self.model, "calling Gemini");

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&Self::request_body(request))
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        let body: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::MalformedResponse(format!("unreadable API envelope: {e}")))?;
        parse_response(request.view(), body)
    }
}

fn api_error(status: u16, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "unknown API error".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });
    ServiceError::Api { status, message }
}

fn parse_response(view: DemoView, body: GenerateResponse) -> Result<OptimizationResponse, ServiceError> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ServiceError::Api {
            status: 200,
            message: format!("prompt blocked: {reason}"),
        });
    }

    let candidate = body.candidates.into_iter().next().ok_or(ServiceError::EmptyResponse)?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        debug!(finish_reason = ?candidate.finish_reason, "empty candidate");
        return Err(ServiceError::EmptyResponse);
    }

    decode_document(view, &text)
}

/// Decode the model's JSON document into a validated response.
pub fn decode_document(view: DemoView, text: &str) -> Result<OptimizationResponse, ServiceError> {
    let doc: serde_json::Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ServiceError::MalformedResponse(format!("response is not JSON: {e}")))?;

    let mut obj = match doc {
        serde_json::Value::Object(map) => map,
        _ => return Err(ServiceError::MalformedResponse("response is not a JSON object".into())),
    };
    let result = obj
        .remove("result")
        .ok_or_else(|| ServiceError::MalformedResponse("missing \"result\"".into()))?;
    let explanation = match obj.remove("explanation") {
        Some(serde_json::Value::String(s)) => s,
        Some(_) => {
            return Err(ServiceError::MalformedResponse("\"explanation\" is not a string".into()))
        }
        None => return Err(ServiceError::MalformedResponse("missing \"explanation\"".into())),
    };

    let result = RunPayload::from_value(view, result)?;
    Ok(OptimizationResponse { result, explanation })
}

/// Models sometimes wrap JSON in a Markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
