//! Printing handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::connection::JobOutcome;
use crate::document::PrintDocument;
use crate::error::SliplineError;
use crate::templates::{self, TemplateKind};

use super::super::state::AppState;

/// Response for a single printed document.
#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub template: String,
}

/// POST /api/print/:template - render `fields` with the named template
/// and print it.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Path(template): Path<String>,
    Json(fields): Json<serde_json::Value>,
) -> Result<Json<PrintResponse>, (StatusCode, String)> {
    let doc = render(&state, &template, fields)?;

    state
        .manager
        .print_document(&doc)
        .await
        .map_err(error_status)?;

    Ok(Json(PrintResponse {
        success: true,
        template: doc.template().to_string(),
    }))
}

/// One job of a batch request.
#[derive(Debug, Deserialize)]
pub struct BatchJob {
    pub template: String,
    pub fields: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub jobs: Vec<BatchJob>,
}

/// POST /api/print/batch - print several documents with the inter-job
/// pause and return every job's outcome, in order.
///
/// All jobs are rendered before anything prints, so one bad job rejects
/// the whole batch.
pub async fn batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<Vec<JobOutcome>>, (StatusCode, String)> {
    let docs = request
        .jobs
        .into_iter()
        .map(|job| render(&state, &job.template, job.fields))
        .collect::<Result<Vec<_>, _>>()?;

    let mut outcomes = state.manager.print_batch(docs);
    let mut results = Vec::new();
    while let Some(outcome) = outcomes.recv().await {
        results.push(outcome);
    }
    Ok(Json(results))
}

fn render(
    state: &AppState,
    template: &str,
    fields: serde_json::Value,
) -> Result<PrintDocument, (StatusCode, String)> {
    let kind = TemplateKind::from_name(template).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!(
                "Unknown template '{}'. Available: {}",
                template,
                templates::list_templates().join(", ")
            ),
        )
    })?;

    templates::render_json(kind, fields, &state.profile).map_err(error_status)
}

fn error_status(e: SliplineError) -> (StatusCode, String) {
    let status = match e {
        SliplineError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
        SliplineError::NotConnected => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
