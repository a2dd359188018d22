//! Shared fixtures: on-disk model artifacts and a standard request.

#![allow(dead_code)]

use crop_simulator::artifacts::{KMeansArtifact, LstmArtifact};
use crop_simulator::config::SimulatorConfig;
use crop_simulator::features::MODEL_COLUMNS;
use crop_simulator::models::SimulationRequest;
use std::path::Path;

pub const FLAT_YIELD: f64 = 3000.0;

/// Two centroids in log-covariate space
pub fn kmeans_artifact() -> KMeansArtifact {
    let low = [60.0f64, 12.0, 30.0, 1.5, 2.5, 140.0];
    let high = [80.0f64, 18.0, 50.0, 2.5, 4.0, 180.0];
    KMeansArtifact {
        centroids: vec![
            low.iter().map(|v| v.ln()).collect(),
            high.iter().map(|v| v.ln()).collect(),
        ],
    }
}

/// Zero recurrent weights, so every step emits `ln(FLAT_YIELD)`
pub fn lstm_artifact() -> LstmArtifact {
    let hidden = 2;
    let inputs = MODEL_COLUMNS.len();
    LstmArtifact {
        input_size: inputs,
        hidden_size: hidden,
        weight_ih: vec![vec![0.0; inputs]; 4 * hidden],
        weight_hh: vec![vec![0.0; hidden]; 4 * hidden],
        bias: vec![0.0; 4 * hidden],
        dense_weight: vec![0.5; hidden],
        dense_bias: FLAT_YIELD.ln(),
    }
}

/// Write both artifacts into `dir` and return a seeded config pointing at them
pub fn write_artifacts(dir: &Path) -> SimulatorConfig {
    let cluster_path = dir.join("kmeans_model.json");
    let lstm_path = dir.join("lstm.json");
    std::fs::write(&cluster_path, serde_json::to_string(&kmeans_artifact()).unwrap()).unwrap();
    std::fs::write(&lstm_path, serde_json::to_string(&lstm_artifact()).unwrap()).unwrap();

    SimulatorConfig {
        cluster_model_path: cluster_path,
        lstm_model_path: lstm_path,
        seed: Some(7),
        ..SimulatorConfig::default()
    }
}

pub fn request(start: &str, end: &str, cultivar: &str) -> SimulationRequest {
    SimulationRequest {
        start_date: start.into(),
        end_date: end.into(),
        cultivar: cultivar.into(),
        ph: 70.0,
        nlp: 40.0,
        ngl: 2.0,
        ns: 3.5,
        ifp: 15.0,
        mhg: 160.0,
    }
}
