//! REST surface tests driven through the router without a socket.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{request, write_artifacts};
use crop_simulator::api::{create_router, SimulationService};
use crop_simulator::config::SimulatorConfig;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn router(config: SimulatorConfig) -> Router {
    create_router(Arc::new(SimulationService::new(config)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = router(SimulatorConfig::default());
    let (status, body) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = router(SimulatorConfig::default());

    let (status, cultivars) = send(&app, get("/api/v1/cultivars")).await;
    assert_eq!(status, StatusCode::OK);
    let cultivars = cultivars.as_array().unwrap();
    assert_eq!(cultivars.len(), 40);
    let encoded = cultivars.iter().filter(|c| c["encoded"] == true).count();
    assert_eq!(encoded, 12);

    let (status, covariates) = send(&app, get("/api/v1/covariates")).await;
    assert_eq!(status, StatusCode::OK);
    let covariates = covariates.as_array().unwrap();
    assert_eq!(covariates.len(), 6);
    assert_eq!(covariates[0]["name"], "PH");
    assert_eq!(covariates[0]["unit"], "cm");
}

#[tokio::test]
async fn test_simulation_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(write_artifacts(dir.path()));
    let body = serde_json::to_value(request("2024-01-01", "2024-01-10", "SUZY IPRO")).unwrap();

    let (status, created) = send(&app, post_json("/api/v1/simulations", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["simulation"], 1);
    assert_eq!(created["rows"].as_array().unwrap().len(), 9);
    assert!(created["rows"][0]["GY"].as_f64().unwrap() > 0.0);

    let (status, listed) = send(&app, get("/api/v1/simulations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["rows"], 9);

    let (status, fetched) = send(&app, get("/api/v1/simulations/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["sheet_name"], created["sheet_name"]);
    assert!(fetched["report"]["entries"].is_array());

    let (status, series) = send(&app, get("/api/v1/simulations/1/yield")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(series["x_label"], "timestamp");
    assert_eq!(series["y_label"], "GY");
    assert_eq!(series["points"].as_array().unwrap().len(), 9);
    assert_eq!(series["points"][0]["date"], "2024-01-01");
}

#[tokio::test]
async fn test_unknown_simulation_is_404() {
    let app = router(SimulatorConfig::default());
    let (status, body) = send(&app, get("/api/v1/simulations/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("42"));

    let (status, _) = send(&app, get("/api/v1/simulations/42/yield")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_request_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(write_artifacts(dir.path()));
    let body = serde_json::to_value(request("2024-01-10", "2024-01-01", "SUZY IPRO")).unwrap();

    let (status, response) = send(&app, post_json("/api/v1/simulations", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("Invalid date range"));

    let (_, listed) = send(&app, get("/api/v1/simulations")).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_artifacts_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimulatorConfig {
        cluster_model_path: dir.path().join("missing.json"),
        ..SimulatorConfig::default()
    };
    let app = router(config);
    let body = serde_json::to_value(request("2024-01-01", "2024-01-10", "SUZY IPRO")).unwrap();

    let (status, response) = send(&app, post_json("/api/v1/simulations", &body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["error"].as_str().unwrap().contains("missing.json"));
}
