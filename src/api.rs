//! HTTP API surface
//!
//! A single analysis endpoint plus a health probe. All the interesting work
//! happens in [`crate::report::BurnPlanner`]; this layer only maps domain
//! errors onto status codes.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ReportError;
use crate::models::BurnPlanningReport;
use crate::report::DefaultBurnPlanner;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text location, e.g. a city name
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router(planner: Arc<DefaultBurnPlanner>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_location))
        .route("/health", get(health))
        .with_state(planner)
}

async fn analyze_location(
    State(planner): State<Arc<DefaultBurnPlanner>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<BurnPlanningReport>, (StatusCode, Json<ErrorResponse>)> {
    let report = planner
        .build_report(&request.city)
        .await
        .map_err(error_response)?;
    Ok(Json(report))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

fn error_response(error: ReportError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        ReportError::Validation { .. } => StatusCode::BAD_REQUEST,
        ReportError::NotFound { .. } => StatusCode::NOT_FOUND,
        ReportError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        ReportError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        warn!("Analysis request failed: {error}");
    }

    (
        status,
        Json(ErrorResponse {
            error: error.user_message(),
        }),
    )
}
