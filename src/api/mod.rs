//! API module for the crop simulator
//!
//! REST interface over a shared simulation session.

pub mod handlers;
pub mod service;

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use service::{ServiceError, SimulationService};

pub fn create_router(service: Arc<SimulationService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        // Catalog
        .route("/api/v1/cultivars", get(handlers::get_cultivars))
        .route("/api/v1/covariates", get(handlers::get_covariates))
        // Simulations
        .route(
            "/api/v1/simulations",
            get(handlers::list_simulations).post(handlers::create_simulation),
        )
        .route("/api/v1/simulations/:id", get(handlers::get_simulation))
        .route("/api/v1/simulations/:id/yield", get(handlers::get_yield_series))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
