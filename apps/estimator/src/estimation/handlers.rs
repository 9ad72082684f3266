//! Axum route handlers for the Estimation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Tool};
use crate::errors::AppError;
use crate::estimation::estimator::{assess, JobRequest};
use crate::estimation::result::{FeasibilityResult, ParseStatus};
use crate::images::decode_base64_image;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub description: String,
    /// Base64 image payloads, bare or as `data:` URLs.
    #[serde(default)]
    pub images: Vec<String>,
    pub available_workers: u32,
    /// Subset of catalog tool names. Defaults to the whole catalog.
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub result: FeasibilityResult,
    pub status: ParseStatus,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub tools: Vec<String>,
    pub employee_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/catalog
pub async fn handle_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        tools: state
            .catalog
            .tool_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        employee_count: state.catalog.employee_count(),
    })
}

/// POST /api/v1/estimate
///
/// Runs one feasibility estimate. `status` tells a judged-infeasible job apart
/// from an answer that could not be read; both carry the `NA` result.
pub async fn handle_estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let tools = select_tools(&state.catalog, request.tools.as_deref())?;

    let images = request
        .images
        .iter()
        .enumerate()
        .map(|(i, encoded)| {
            decode_base64_image(encoded)
                .map_err(|e| AppError::Validation(format!("images[{i}] is not valid base64: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let job = JobRequest::new(request.description, tools, request.available_workers)
        .with_images(images);
    let assessment = assess(&job, state.backend.as_ref()).await?;

    Ok(Json(EstimateResponse {
        result: assessment.result,
        status: assessment.status,
    }))
}

fn select_tools(catalog: &Catalog, names: Option<&[String]>) -> Result<Vec<Tool>, AppError> {
    let Some(names) = names else {
        return Ok(catalog.tools.clone());
    };

    names
        .iter()
        .map(|name| {
            catalog
                .find_tool(name)
                .cloned()
                .ok_or_else(|| AppError::Validation(format!("unknown tool '{name}'")))
        })
        .collect()
}
