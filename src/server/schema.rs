//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/run-agent`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunAgentRequest {
    pub query: String,
    /// Model names to run; absent or empty runs the whole pool.
    #[serde(default)]
    pub models: Option<Vec<String>>,
}

/// Query string of `GET /api/run-agent/stream`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamParams {
    pub query: String,
    /// Comma-separated model names.
    #[serde(default)]
    pub models: Option<String>,
}

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub model: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models: usize,
}
