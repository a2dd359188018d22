//! Pre-trained model artifacts.
//!
//! The pipeline talks to its two models through the `ClusterClassifier` and
//! `SequencePredictor` traits. The JSON-backed implementations here are
//! loaded from a path at the start of every run and are read-only afterwards.

use ndarray::{s, Array1, Array2, ArrayD, ArrayView1, ArrayView2, IxDyn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SimulationError};

/// Pre-fitted clustering model
pub trait ClusterClassifier {
    /// One non-negative cluster id per row of `features`
    fn predict(&self, features: ArrayView2<f64>) -> Result<Vec<u32>>;
}

/// Pre-trained sequence model returning log-scale yields
pub trait SequencePredictor {
    /// Raw output tensor; its leading axis matches the input rows
    fn predict(&self, features: ArrayView2<f64>) -> Result<ArrayD<f64>>;
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).map_err(|e| SimulationError::artifact_load(path, e))?;
    serde_json::from_str(&contents).map_err(|e| SimulationError::artifact_load(path, e))
}

// ============================================================================
// K-Means
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansArtifact {
    pub centroids: Vec<Vec<f64>>,
}

/// Nearest-centroid classifier
#[derive(Debug, Clone)]
pub struct KMeansModel {
    centroids: Array2<f64>,
}

impl KMeansModel {
    pub fn new(centroids: Array2<f64>) -> Result<Self> {
        if centroids.nrows() == 0 || centroids.ncols() == 0 {
            return Err(SimulationError::shape_mismatch("k-means model needs at least one centroid"));
        }
        Ok(Self { centroids })
    }

    pub fn from_artifact(artifact: KMeansArtifact) -> Result<Self> {
        let k = artifact.centroids.len();
        let dims = artifact.centroids.first().map(Vec::len).unwrap_or(0);
        if artifact.centroids.iter().any(|c| c.len() != dims) {
            return Err(SimulationError::shape_mismatch("centroids have differing dimensions"));
        }
        let flat: Vec<f64> = artifact.centroids.into_iter().flatten().collect();
        let centroids = Array2::from_shape_vec((k, dims), flat)
            .map_err(|e| SimulationError::shape_mismatch(e.to_string()))?;
        Self::new(centroids)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let artifact: KMeansArtifact = read_artifact(path)?;
        let model =
            Self::from_artifact(artifact).map_err(|e| SimulationError::artifact_load(path, e))?;
        info!(
            path = %path.display(),
            clusters = model.n_clusters(),
            "Loaded cluster model"
        );
        Ok(model)
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.centroids.ncols()
    }

    fn nearest(&self, point: ArrayView1<f64>) -> u32 {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (idx, centroid) in self.centroids.outer_iter().enumerate() {
            let dist: f64 = centroid
                .iter()
                .zip(point.iter())
                .map(|(c, p)| (c - p).powi(2))
                .sum();
            if dist < best_dist {
                best_dist = dist;
                best = idx;
            }
        }
        best as u32
    }
}

impl ClusterClassifier for KMeansModel {
    fn predict(&self, features: ArrayView2<f64>) -> Result<Vec<u32>> {
        if features.ncols() != self.n_features() {
            return Err(SimulationError::shape_mismatch(format!(
                "cluster model expects {} features, got {}",
                self.n_features(),
                features.ncols()
            )));
        }
        Ok(features.outer_iter().map(|row| self.nearest(row)).collect())
    }
}

// ============================================================================
// LSTM
// ============================================================================

/// Serialized single-layer LSTM with a dense regression head.
///
/// Gate blocks in `weight_ih`, `weight_hh` and `bias` follow the
/// input, forget, cell, output order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmArtifact {
    pub input_size: usize,
    pub hidden_size: usize,
    /// `[4 * hidden_size][input_size]`
    pub weight_ih: Vec<Vec<f64>>,
    /// `[4 * hidden_size][hidden_size]`
    pub weight_hh: Vec<Vec<f64>>,
    /// `[4 * hidden_size]`
    pub bias: Vec<f64>,
    /// `[hidden_size]`
    pub dense_weight: Vec<f64>,
    pub dense_bias: f64,
}

/// LSTM that reads the feature matrix as one sequence of daily steps and
/// emits one value per step, shaped `[N, 1]`.
#[derive(Debug, Clone)]
pub struct LstmModel {
    input_size: usize,
    hidden_size: usize,
    weight_ih: Array2<f64>,
    weight_hh: Array2<f64>,
    bias: Array1<f64>,
    dense_weight: Array1<f64>,
    dense_bias: f64,
}

fn to_matrix(name: &str, rows: Vec<Vec<f64>>, shape: (usize, usize)) -> Result<Array2<f64>> {
    if rows.len() != shape.0 || rows.iter().any(|r| r.len() != shape.1) {
        return Err(SimulationError::shape_mismatch(format!(
            "{} must be {}x{}",
            name, shape.0, shape.1
        )));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec(shape, flat).map_err(|e| SimulationError::shape_mismatch(e.to_string()))
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl LstmModel {
    pub fn from_artifact(artifact: LstmArtifact) -> Result<Self> {
        let h = artifact.hidden_size;
        let f = artifact.input_size;
        if h == 0 || f == 0 {
            return Err(SimulationError::shape_mismatch("LSTM sizes must be positive"));
        }
        let weight_ih = to_matrix("weight_ih", artifact.weight_ih, (4 * h, f))?;
        let weight_hh = to_matrix("weight_hh", artifact.weight_hh, (4 * h, h))?;
        if artifact.bias.len() != 4 * h {
            return Err(SimulationError::shape_mismatch(format!("bias must have {} values", 4 * h)));
        }
        if artifact.dense_weight.len() != h {
            return Err(SimulationError::shape_mismatch(format!(
                "dense_weight must have {} values",
                h
            )));
        }

        Ok(Self {
            input_size: f,
            hidden_size: h,
            weight_ih,
            weight_hh,
            bias: Array1::from(artifact.bias),
            dense_weight: Array1::from(artifact.dense_weight),
            dense_bias: artifact.dense_bias,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let artifact: LstmArtifact = read_artifact(path)?;
        let model =
            Self::from_artifact(artifact).map_err(|e| SimulationError::artifact_load(path, e))?;
        info!(
            path = %path.display(),
            input_size = model.input_size,
            hidden_size = model.hidden_size,
            "Loaded sequence model"
        );
        Ok(model)
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

impl SequencePredictor for LstmModel {
    fn predict(&self, features: ArrayView2<f64>) -> Result<ArrayD<f64>> {
        if features.ncols() != self.input_size {
            return Err(SimulationError::shape_mismatch(format!(
                "sequence model expects {} features, got {}",
                self.input_size,
                features.ncols()
            )));
        }

        let h = self.hidden_size;
        let mut hidden = Array1::<f64>::zeros(h);
        let mut cell = Array1::<f64>::zeros(h);
        let mut outputs = Vec::with_capacity(features.nrows());

        for step in features.outer_iter() {
            let gates = self.weight_ih.dot(&step) + self.weight_hh.dot(&hidden) + &self.bias;

            let i = gates.slice(s![0..h]).mapv(sigmoid);
            let f = gates.slice(s![h..2 * h]).mapv(sigmoid);
            let g = gates.slice(s![2 * h..3 * h]).mapv(f64::tanh);
            let o = gates.slice(s![3 * h..4 * h]).mapv(sigmoid);

            // c' = f * c + i * g, h' = o * tanh(c')
            cell = &f * &cell + &i * &g;
            hidden = &o * &cell.mapv(f64::tanh);

            outputs.push(self.dense_weight.dot(&hidden) + self.dense_bias);
        }

        ArrayD::from_shape_vec(IxDyn(&[outputs.len(), 1]), outputs)
            .map_err(|e| SimulationError::shape_mismatch(e.to_string()))
    }
}
