//! End-to-end prediction for one observation table.

use tracing::info;

use crate::artifacts::{ClusterClassifier, KMeansModel, LstmModel, SequencePredictor};
use crate::config::{CategoryPolicy, SimulatorConfig};
use crate::error::Result;
use crate::features::feature_engineering;
use crate::models::{ObservationTable, SimulationResult};
use crate::postprocess::{attach_yield, inverse_log, predict};

/// Feature engineering, inference and inverse transform.
///
/// The observation table is left untouched; the result table is a new copy
/// with `GY` appended.
pub fn prediction_pipeline(
    table: &ObservationTable,
    cluster_model: &dyn ClusterClassifier,
    sequence_model: &dyn SequencePredictor,
    policy: CategoryPolicy,
) -> Result<SimulationResult> {
    let features = feature_engineering(table, cluster_model, policy)?;
    let log_yields = predict(sequence_model, &features)?;
    let yields = inverse_log(&log_yields);
    let result = attach_yield(table, &yields)?;

    info!(
        rows = result.len(),
        mean_gy = result.mean_yield().unwrap_or_default(),
        "Prediction pipeline finished"
    );
    Ok(result)
}

/// Load both artifacts named by the config
pub fn load_models(config: &SimulatorConfig) -> Result<(KMeansModel, LstmModel)> {
    let cluster_model = KMeansModel::load(&config.cluster_model_path)?;
    let sequence_model = LstmModel::load(&config.lstm_model_path)?;
    Ok((cluster_model, sequence_model))
}
