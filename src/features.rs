//! Feature engineering for the sequence model
//!
//! Turns an observation table into the fixed 33-column matrix the sequence
//! model was trained on:
//!
//! ```text
//! timestamp ──► f1..f8 sin/cos (16)
//! Cultivar  ──► one-hot indicators (12)
//! PH..MHG   ──► *_log (6) ──► cluster (1)
//! project   ──► 16 periodic + cluster + 12 one-hot + PH/NLP/NGL/NS _log
//! ```
//!
//! Column order is a contract with the trained models and is never inferred
//! from the input frame.

use std::f64::consts::PI;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use crate::artifacts::ClusterClassifier;
use crate::catalog::{
    one_hot_column, Covariate, CLUSTER_INPUT_ORDER, ENCODED_CULTIVARS, MODEL_LOG_COVARIATES,
    PERIODIC_FREQUENCIES, SECONDS_PER_YEAR,
};
use crate::config::CategoryPolicy;
use crate::error::{Result, SimulationError};
use crate::frame::FeatureFrame;
use crate::models::ObservationTable;

pub const CLUSTER_COLUMN: &str = "cluster";

/// Columns fed to the sequence model, in training order
pub static MODEL_COLUMNS: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut columns = Vec::with_capacity(33);
    for (prefix, _) in PERIODIC_FREQUENCIES {
        columns.push(format!("{}_sin", prefix));
        columns.push(format!("{}_cos", prefix));
    }
    columns.push(CLUSTER_COLUMN.to_string());
    for cultivar in ENCODED_CULTIVARS {
        columns.push(one_hot_column(cultivar));
    }
    for covariate in MODEL_LOG_COVARIATES {
        columns.push(covariate.log_name());
    }
    columns
});

/// POSIX seconds at midnight UTC
pub fn posix_seconds(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

/// Replace the timestamp column with sine/cosine encodings at each of the
/// eight target frequencies.
pub fn encode_time(frame: &mut FeatureFrame) -> Result<()> {
    let seconds: Vec<f64> = frame.take_timestamps()?.into_iter().map(posix_seconds).collect();

    for (prefix, frequency) in PERIODIC_FREQUENCIES {
        let period = 1.0 / frequency;
        let angular = 2.0 * PI / (SECONDS_PER_YEAR * period);

        let sin = seconds.iter().map(|t| (t * angular).sin()).collect();
        let cos = seconds.iter().map(|t| (t * angular).cos()).collect();
        frame.set_column(format!("{}_sin", prefix), sin)?;
        frame.set_column(format!("{}_cos", prefix), cos)?;
    }

    Ok(())
}

/// Replace the cultivar column with one indicator column per encoded cultivar.
///
/// Under `Lenient`, names outside the encoded set produce an all-zero row.
pub fn one_hot_encode_cultivar(frame: &mut FeatureFrame, policy: CategoryPolicy) -> Result<()> {
    let cultivars = frame.take_cultivars()?;

    if let Some(unknown) = cultivars
        .iter()
        .find(|c| !ENCODED_CULTIVARS.contains(&c.as_str()))
    {
        match policy {
            CategoryPolicy::Strict => return Err(SimulationError::UnknownCategory(unknown.clone())),
            CategoryPolicy::Lenient => {
                warn!(cultivar = %unknown, "Cultivar has no encoding, indicators left at zero")
            }
        }
    }

    for name in ENCODED_CULTIVARS {
        let indicator = cultivars
            .iter()
            .map(|c| if c == name { 1.0 } else { 0.0 })
            .collect();
        frame.set_column(one_hot_column(name), indicator)?;
    }

    Ok(())
}

/// Replace each named column with its natural log as `<name>_log`
pub fn log_transform(frame: &mut FeatureFrame, columns: &[Covariate]) -> Result<()> {
    for covariate in columns {
        let name = covariate.name();
        let values = frame.column(name)?;
        if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| v.is_nan() || **v <= 0.0) {
            return Err(SimulationError::Domain {
                column: name.to_string(),
                row,
                value,
            });
        }
        let logged = values.iter().map(|v| v.ln()).collect();
        frame.set_column(covariate.log_name(), logged)?;
        frame.drop_column(name)?;
    }
    Ok(())
}

/// Append the cluster id predicted from the six log covariates
pub fn assign_cluster(frame: &mut FeatureFrame, model: &dyn ClusterClassifier) -> Result<()> {
    let inputs: Vec<String> = CLUSTER_INPUT_ORDER.iter().map(|c| c.log_name()).collect();
    let names: Vec<&str> = inputs.iter().map(String::as_str).collect();
    let matrix = frame.matrix_of(&names)?;

    let labels = model.predict(matrix.view())?;
    if labels.len() != frame.rows() {
        return Err(SimulationError::shape_mismatch(format!(
            "cluster model returned {} labels for {} rows",
            labels.len(),
            frame.rows()
        )));
    }

    frame.set_column(CLUSTER_COLUMN, labels.into_iter().map(f64::from).collect())
}

/// Narrow the frame to `MODEL_COLUMNS`, dropping everything else
pub fn project_for_model(frame: &FeatureFrame) -> Result<FeatureFrame> {
    let names: Vec<&str> = MODEL_COLUMNS.iter().map(String::as_str).collect();
    frame.select(&names)
}

/// Full transform from observation table to model-ready frame
pub fn feature_engineering(
    table: &ObservationTable,
    cluster_model: &dyn ClusterClassifier,
    policy: CategoryPolicy,
) -> Result<FeatureFrame> {
    let mut frame = FeatureFrame::from_observations(table);
    encode_time(&mut frame)?;
    one_hot_encode_cultivar(&mut frame, policy)?;
    log_transform(&mut frame, &Covariate::ALL)?;
    assign_cluster(&mut frame, cluster_model)?;
    let projected = project_for_model(&frame)?;

    debug!(
        rows = projected.rows(),
        columns = projected.width(),
        "Feature matrix ready"
    );
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use ndarray::ArrayView2;

    struct FirstColumnSign;

    impl ClusterClassifier for FirstColumnSign {
        fn predict(&self, features: ArrayView2<f64>) -> Result<Vec<u32>> {
            Ok(features
                .outer_iter()
                .map(|row| if row[0] > 4.2 { 1 } else { 0 })
                .collect())
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table(cultivar: &str, ph: &[f64]) -> ObservationTable {
        let rows = ph
            .iter()
            .enumerate()
            .map(|(i, &ph)| Observation {
                timestamp: date("2024-01-01") + chrono::Duration::days(i as i64),
                cultivar: cultivar.to_string(),
                ph,
                nlp: 40.0,
                ngp: 0.0,
                ngl: 2.0,
                ns: 3.0,
                ifp: 15.0,
                mhg: 150.0,
            })
            .collect();
        ObservationTable { rows }
    }

    #[test]
    fn test_model_columns_layout() {
        assert_eq!(MODEL_COLUMNS.len(), 33);
        assert_eq!(MODEL_COLUMNS[0], "f1_sin");
        assert_eq!(MODEL_COLUMNS[15], "f8_cos");
        assert_eq!(MODEL_COLUMNS[16], "cluster");
        assert_eq!(MODEL_COLUMNS[17], "Cultivar_82I78RSF IPRO_OneHotEnc");
        assert_eq!(MODEL_COLUMNS[28], "Cultivar_TMG 22X83I2X_OneHotEnc");
        assert_eq!(&MODEL_COLUMNS[29..], &["PH_log", "NLP_log", "NGL_log", "NS_log"]);
    }

    #[test]
    fn test_encode_time_values() {
        let mut frame = FeatureFrame::new(2);
        frame.set_timestamps(vec![date("1970-01-01"), date("2024-01-01")]).unwrap();
        encode_time(&mut frame).unwrap();

        assert!(frame.timestamps().is_none());
        assert_eq!(frame.width(), 16);
        // Epoch encodes to sin 0, cos 1 at every frequency
        assert_eq!(frame.column("f3_sin").unwrap()[0], 0.0);
        assert_eq!(frame.column("f3_cos").unwrap()[0], 1.0);

        let t = posix_seconds(date("2024-01-01"));
        assert_eq!(t, 1_704_067_200.0);
        let expected = (t * (2.0 * PI / (SECONDS_PER_YEAR * (1.0 / 6.0)))).sin();
        assert_eq!(frame.column("f8_sin").unwrap()[1], expected);
    }

    #[test]
    fn test_encode_time_is_deterministic() {
        let dates = vec![date("2023-03-15"), date("2023-09-30")];
        let mut a = FeatureFrame::new(2);
        a.set_timestamps(dates.clone()).unwrap();
        let mut b = FeatureFrame::new(2);
        b.set_timestamps(dates).unwrap();
        encode_time(&mut a).unwrap();
        encode_time(&mut b).unwrap();
        assert_eq!(a.to_matrix(), b.to_matrix());
    }

    #[test]
    fn test_encode_time_requires_timestamps() {
        let mut frame = FeatureFrame::new(1);
        assert!(matches!(encode_time(&mut frame), Err(SimulationError::MissingColumn(_))));
    }

    #[test]
    fn test_one_hot_known_cultivar() {
        let mut frame = FeatureFrame::from_observations(&table("SUZY IPRO", &[60.0, 61.0]));
        one_hot_encode_cultivar(&mut frame, CategoryPolicy::Lenient).unwrap();

        assert!(frame.cultivars().is_none());
        for row in 0..2 {
            let ones: f64 = ENCODED_CULTIVARS
                .iter()
                .map(|c| frame.column(&one_hot_column(c)).unwrap()[row])
                .sum();
            assert_eq!(ones, 1.0);
        }
        assert_eq!(frame.column("Cultivar_SUZY IPRO_OneHotEnc").unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn test_one_hot_unknown_cultivar_lenient() {
        let mut frame = FeatureFrame::from_observations(&table("UNKNOWN_NAME", &[60.0]));
        one_hot_encode_cultivar(&mut frame, CategoryPolicy::Lenient).unwrap();
        for c in ENCODED_CULTIVARS {
            assert_eq!(frame.column(&one_hot_column(c)).unwrap(), &[0.0]);
        }
    }

    #[test]
    fn test_one_hot_unknown_cultivar_strict() {
        let mut frame = FeatureFrame::from_observations(&table("UNKNOWN_NAME", &[60.0]));
        let err = one_hot_encode_cultivar(&mut frame, CategoryPolicy::Strict).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownCategory(name) if name == "UNKNOWN_NAME"));
    }

    #[test]
    fn test_log_transform_round_trip() {
        let values = [0.4, 1.0, 47.6, 216.0, 1e-9];
        let mut frame = FeatureFrame::new(values.len());
        frame.set_column("PH", values.to_vec()).unwrap();
        log_transform(&mut frame, &[Covariate::Ph]).unwrap();

        assert!(!frame.has_column("PH"));
        for (logged, original) in frame.column("PH_log").unwrap().iter().zip(values) {
            assert!((logged.exp() - original).abs() <= original * 1e-12);
        }
    }

    #[test]
    fn test_log_transform_domain_error() {
        let mut frame = FeatureFrame::new(3);
        frame.set_column("NS", vec![1.0, 0.0, 2.0]).unwrap();
        let err = log_transform(&mut frame, &[Covariate::Ns]).unwrap_err();
        assert!(matches!(err, SimulationError::Domain { row: 1, .. }));

        let mut frame = FeatureFrame::new(1);
        frame.set_column("NS", vec![f64::NAN]).unwrap();
        assert!(log_transform(&mut frame, &[Covariate::Ns]).is_err());
    }

    #[test]
    fn test_cluster_uses_training_order() {
        // PH_log is first in the cluster input; ln(80) > 4.2 > ln(60)
        let mut frame = FeatureFrame::from_observations(&table("SUZY IPRO", &[60.0, 80.0]));
        log_transform(&mut frame, &Covariate::ALL).unwrap();
        assign_cluster(&mut frame, &FirstColumnSign).unwrap();
        assert_eq!(frame.column("cluster").unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn test_projection_ignores_input_order() {
        let obs = table("96R29 IPRO", &[60.0, 70.0, 80.0]);
        let projected = feature_engineering(&obs, &FirstColumnSign, CategoryPolicy::Lenient).unwrap();

        let names: Vec<&str> = projected.column_names();
        let expected: Vec<&str> = MODEL_COLUMNS.iter().map(String::as_str).collect();
        assert_eq!(names, expected);
        assert!(!projected.has_column("IFP_log"));
        assert!(!projected.has_column("MHG_log"));

        // Same columns added in reverse order project identically
        let mut shuffled = FeatureFrame::new(projected.rows());
        for name in expected.iter().rev() {
            shuffled
                .set_column(*name, projected.column(name).unwrap().to_vec())
                .unwrap();
        }
        shuffled.set_column("IFP_log", vec![1.0; 3]).unwrap();
        let reprojected = project_for_model(&shuffled).unwrap();
        assert_eq!(reprojected.to_matrix(), projected.to_matrix());
    }
}
