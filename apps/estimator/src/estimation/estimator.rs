//! Estimator: turns a job description, photos, tools and headcount into a feasibility result.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::Tool;
use crate::estimation::prompts::{build_system_prompt, build_user_text};
use crate::estimation::result::{parse_feasibility, FeasibilityResult, ParseStatus};
use crate::images::encode_image;
use crate::llm_client::{InferenceBackend, InputPart, LlmError};

/// Input for one estimate. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub description: String,
    /// Raw image bytes, sent in order.
    pub images: Vec<Vec<u8>>,
    pub tools: Vec<Tool>,
    /// Supplied by the caller; not derived from the catalog's employee count.
    pub available_workers: u32,
}

impl JobRequest {
    pub fn new(description: impl Into<String>, tools: Vec<Tool>, available_workers: u32) -> Self {
        Self {
            description: description.into(),
            images: Vec::new(),
            tools,
            available_workers,
        }
    }

    pub fn with_images(mut self, images: Vec<Vec<u8>>) -> Self {
        self.images = images;
        self
    }
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("job description cannot be empty")]
    EmptyDescription,

    #[error("inference call failed: {0}")]
    Llm(#[from] LlmError),
}

/// Result plus the raw model text, so callers can tell "judged infeasible"
/// apart from "answer could not be read".
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub result: FeasibilityResult,
    pub status: ParseStatus,
    pub raw_text: String,
}

/// Builds the system instruction and user content for a request.
pub fn build_prompt(request: &JobRequest) -> (String, Vec<InputPart>) {
    let tool_names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
    let system = build_system_prompt(&tool_names, request.available_workers);

    let mut content = Vec::with_capacity(request.images.len() + 1);
    content.push(InputPart::text(build_user_text(&request.description)));
    content.extend(
        request
            .images
            .iter()
            .map(|bytes| InputPart::image(encode_image(bytes))),
    );

    (system, content)
}

/// Runs one estimate and keeps the raw model text alongside the result.
///
/// Transport and service failures are returned as errors; only a readable-but-wrong
/// or unreadable answer collapses to the `NA` sentinel.
pub async fn assess(
    request: &JobRequest,
    backend: &dyn InferenceBackend,
) -> Result<Assessment, EstimateError> {
    if request.description.trim().is_empty() {
        return Err(EstimateError::EmptyDescription);
    }

    let (system, content) = build_prompt(request);
    info!(
        "Requesting estimate: {} tools, {} workers, {} images",
        request.tools.len(),
        request.available_workers,
        request.images.len()
    );

    let raw_text = backend.complete(&system, &content).await?;
    let outcome = parse_feasibility(&raw_text);

    match outcome.status {
        ParseStatus::Parsed => {}
        ParseStatus::Malformed => {
            warn!("Model returned JSON in an unexpected shape, treating as NA: {raw_text}")
        }
        ParseStatus::Unparsable => {
            warn!("Model returned non-JSON text, treating as NA: {raw_text}")
        }
    }

    Ok(Assessment {
        result: outcome.result,
        status: outcome.status,
        raw_text,
    })
}

/// Runs one estimate and returns only the two-variant result.
pub async fn estimate(
    request: &JobRequest,
    backend: &dyn InferenceBackend,
) -> Result<FeasibilityResult, EstimateError> {
    Ok(assess(request, backend).await?.result)
}
