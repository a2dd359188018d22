//! Model output post-processing: squeeze to one value per row, undo the log
//! transform, attach the yield column.

use ndarray::{Array1, ArrayD, Axis, Ix1};

use crate::artifacts::SequencePredictor;
use crate::error::{Result, SimulationError};
use crate::frame::FeatureFrame;
use crate::models::{ObservationTable, SimulatedDay, SimulationResult};

/// Highest output rank the squeeze accepts
const MAX_OUTPUT_RANK: usize = 4;

/// Run the sequence model and reduce its output to one log-yield per row
pub fn predict(model: &dyn SequencePredictor, features: &FeatureFrame) -> Result<Array1<f64>> {
    let matrix = features.to_matrix();
    let raw = model.predict(matrix.view())?;
    squeeze_predictions(raw, features.rows())
}

/// Drop trailing singleton axes, then require shape `[rows]`.
///
/// Accepts `[N]`, `[N, 1]`, `[N, 1, 1]` and `[N, 1, 1, 1]`.
pub fn squeeze_predictions(raw: ArrayD<f64>, rows: usize) -> Result<Array1<f64>> {
    let original_shape = raw.shape().to_vec();
    if raw.ndim() == 0 || raw.ndim() > MAX_OUTPUT_RANK {
        return Err(SimulationError::shape_mismatch(format!(
            "unsupported prediction rank {} (shape {:?})",
            raw.ndim(),
            original_shape
        )));
    }

    let mut squeezed = raw;
    while squeezed.ndim() > 1 && squeezed.shape()[squeezed.ndim() - 1] == 1 {
        let last = squeezed.ndim() - 1;
        squeezed = squeezed.index_axis_move(Axis(last), 0);
    }

    if squeezed.ndim() != 1 || squeezed.len() != rows {
        return Err(SimulationError::shape_mismatch(format!(
            "expected one prediction per row ({}), got shape {:?}",
            rows, original_shape
        )));
    }

    squeezed
        .into_dimensionality::<Ix1>()
        .map_err(|e| SimulationError::shape_mismatch(e.to_string()))
}

/// exp() of each log-scale prediction
pub fn inverse_log(predictions: &Array1<f64>) -> Array1<f64> {
    predictions.mapv(f64::exp)
}

/// Join linear-scale yields onto the observation table
pub fn attach_yield(table: &ObservationTable, yields: &Array1<f64>) -> Result<SimulationResult> {
    if yields.len() != table.len() {
        return Err(SimulationError::shape_mismatch(format!(
            "{} yields for {} observations",
            yields.len(),
            table.len()
        )));
    }

    let rows = table
        .rows
        .iter()
        .zip(yields.iter())
        .map(|(obs, &gy)| SimulatedDay::from_observation(obs, gy))
        .collect();
    Ok(SimulationResult { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};

    fn raw(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        ArrayD::from_shape_vec(IxDyn(shape), (0..n).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn test_squeeze_rank_two() {
        let out = squeeze_predictions(raw(&[5, 1]), 5).unwrap();
        assert_eq!(out, array![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_squeeze_higher_ranks() {
        assert_eq!(squeeze_predictions(raw(&[3, 1, 1]), 3).unwrap().len(), 3);
        assert_eq!(squeeze_predictions(raw(&[3, 1, 1, 1]), 3).unwrap().len(), 3);
        assert_eq!(squeeze_predictions(raw(&[3]), 3).unwrap().len(), 3);
    }

    #[test]
    fn test_squeeze_single_row() {
        let out = squeeze_predictions(raw(&[1, 1]), 1).unwrap();
        assert_eq!(out, array![0.0]);
    }

    #[test]
    fn test_squeeze_rejects_bad_shapes() {
        for shape in [&[3, 2][..], &[3, 1, 2], &[1, 1, 1, 1, 1], &[4, 1]] {
            assert!(
                matches!(
                    squeeze_predictions(raw(shape), 3),
                    Err(SimulationError::ShapeMismatch(_))
                ),
                "shape {:?} should fail",
                shape
            );
        }
        let scalar = ArrayD::from_elem(IxDyn(&[]), 1.0);
        assert!(squeeze_predictions(scalar, 1).is_err());
    }

    #[test]
    fn test_inverse_log() {
        let logs = array![0.0, 1.0, 8.0, -50.0];
        let linear = inverse_log(&logs);
        assert_eq!(linear[0], 1.0);
        assert!((linear[1] - std::f64::consts::E).abs() < 1e-12);
        assert!(linear.iter().all(|&v| v > 0.0));
        for (l, x) in logs.iter().zip(linear.iter()) {
            assert!((x.ln() - l).abs() < 1e-9);
        }
    }

    #[test]
    fn test_attach_yield_length_checked() {
        let table = ObservationTable::default();
        assert!(attach_yield(&table, &array![1.0]).is_err());
        assert!(attach_yield(&table, &Array1::zeros(0)).unwrap().is_empty());
    }
}
