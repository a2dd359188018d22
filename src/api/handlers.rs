//! REST API handlers for the crop simulator
//!
//! These handlers use the shared SimulationService.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::service::{ServiceError, SimulationService, SimulationSummary};
use crate::catalog::{self, Covariate};
use crate::models::{SimulationReport, SimulationRequest, SimulatedDay};
use crate::session::SimulationRun;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct CultivarResponse {
    pub name: String,
    /// Whether the sequence model has an indicator column for it
    pub encoded: bool,
}

#[derive(Serialize)]
pub struct CovariateResponse {
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub max_proba: f64,
    pub std: f64,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub simulation: u64,
    pub sheet_name: String,
    pub concluded_at: DateTime<Utc>,
    pub rows: usize,
    pub mean_gy: Option<f64>,
}

impl From<SimulationSummary> for SummaryResponse {
    fn from(s: SimulationSummary) -> Self {
        Self {
            simulation: s.simulation,
            sheet_name: s.sheet_name,
            concluded_at: s.concluded_at,
            rows: s.rows,
            mean_gy: s.mean_gy.map(|v| (v * 100.0).round() / 100.0),
        }
    }
}

#[derive(Serialize)]
pub struct SimulationResponse {
    pub simulation: u64,
    pub sheet_name: String,
    pub rows: Vec<SimulatedDay>,
    pub report: Option<SimulationReport>,
}

impl From<SimulationRun> for SimulationResponse {
    fn from(run: SimulationRun) -> Self {
        Self {
            simulation: run.simulation,
            sheet_name: run.sheet_name,
            rows: run.result.rows,
            report: Some(run.report),
        }
    }
}

#[derive(Serialize)]
pub struct YieldPointResponse {
    pub date: NaiveDate,
    pub gy: f64,
}

#[derive(Serialize)]
pub struct YieldSeriesResponse {
    pub sheet_name: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<YieldPointResponse>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::Simulation(inner) if inner.is_input_error() => StatusCode::BAD_REQUEST,
        ServiceError::Simulation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn not_found(id: u64) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Simulation {} not found", id),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<SimulationService>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/cultivars
pub async fn get_cultivars() -> Json<Vec<CultivarResponse>> {
    let cultivars = catalog::CULTIVAR_CATALOG
        .iter()
        .map(|name| CultivarResponse {
            name: name.to_string(),
            encoded: catalog::is_encoded(name),
        })
        .collect();
    Json(cultivars)
}

/// GET /api/v1/covariates
pub async fn get_covariates() -> Json<Vec<CovariateResponse>> {
    let covariates = Covariate::ALL
        .iter()
        .map(|c| {
            let spec = c.spec();
            CovariateResponse {
                name: c.name().to_string(),
                unit: c.unit().to_string(),
                min: spec.min,
                max: spec.max,
                max_proba: spec.max_proba,
                std: spec.std,
            }
        })
        .collect();
    Json(covariates)
}

/// POST /api/v1/simulations
pub async fn create_simulation(
    State(service): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<(StatusCode, Json<SimulationResponse>), ApiError> {
    match service.run(request).await {
        Ok(run) => Ok((StatusCode::CREATED, Json(SimulationResponse::from(run)))),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/v1/simulations
pub async fn list_simulations(State(service): State<AppState>) -> Json<Vec<SummaryResponse>> {
    let summaries = service.list().await;
    Json(summaries.into_iter().map(SummaryResponse::from).collect())
}

/// GET /api/v1/simulations/:id
pub async fn get_simulation(
    State(service): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SimulationResponse>, ApiError> {
    match service.get(id).await {
        Some(stored) => Ok(Json(SimulationResponse {
            simulation: stored.simulation,
            sheet_name: stored.sheet_name,
            rows: stored.result.rows,
            report: stored.report,
        })),
        None => Err(not_found(id)),
    }
}

/// GET /api/v1/simulations/:id/yield
pub async fn get_yield_series(
    State(service): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<YieldSeriesResponse>, ApiError> {
    let (x_label, y_label) = service.language().yield_axis_labels();
    match service.yield_series(id).await {
        Some(series) => Ok(Json(YieldSeriesResponse {
            sheet_name: series.sheet_name,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            points: series
                .points
                .into_iter()
                .map(|(date, gy)| YieldPointResponse { date, gy })
                .collect(),
        })),
        None => Err(not_found(id)),
    }
}
