//! Column-oriented working table for feature engineering.
//!
//! A `FeatureFrame` holds named `f64` columns in insertion order, plus the two
//! non-numeric columns of an observation table (timestamps and cultivar names)
//! until the transformer re-encodes them.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::catalog::Covariate;
use crate::error::{Result, SimulationError};
use crate::models::ObservationTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    rows: usize,
    timestamps: Option<Vec<NaiveDate>>,
    cultivars: Option<Vec<String>>,
    columns: Vec<Column>,
}

impl FeatureFrame {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            timestamps: None,
            cultivars: None,
            columns: Vec::new(),
        }
    }

    /// Working copy of an observation table: timestamps, cultivars and the
    /// six covariates. NGP is reporting-only and stays behind.
    pub fn from_observations(table: &ObservationTable) -> Self {
        let mut frame = Self::new(table.len());
        frame.timestamps = Some(table.timestamps());
        frame.cultivars = Some(table.cultivars());
        for covariate in Covariate::ALL {
            frame.columns.push(Column {
                name: covariate.name().to_string(),
                values: table.column(covariate),
            });
        }
        frame
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| SimulationError::MissingColumn(name.to_string()))
    }

    /// Append a column, replacing any column of the same name in place
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows {
            return Err(SimulationError::shape_mismatch(format!(
                "column {} has {} values, frame has {} rows",
                name,
                values.len(),
                self.rows
            )));
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SimulationError::MissingColumn(name.to_string()))?;
        Ok(self.columns.remove(idx).values)
    }

    pub fn timestamps(&self) -> Option<&[NaiveDate]> {
        self.timestamps.as_deref()
    }

    pub fn take_timestamps(&mut self) -> Result<Vec<NaiveDate>> {
        self.timestamps
            .take()
            .ok_or_else(|| SimulationError::MissingColumn("timestamp".into()))
    }

    pub fn set_timestamps(&mut self, timestamps: Vec<NaiveDate>) -> Result<()> {
        if timestamps.len() != self.rows {
            return Err(SimulationError::shape_mismatch("timestamp column length differs from frame"));
        }
        self.timestamps = Some(timestamps);
        Ok(())
    }

    pub fn cultivars(&self) -> Option<&[String]> {
        self.cultivars.as_deref()
    }

    pub fn take_cultivars(&mut self) -> Result<Vec<String>> {
        self.cultivars
            .take()
            .ok_or_else(|| SimulationError::MissingColumn("Cultivar".into()))
    }

    pub fn set_cultivars(&mut self, cultivars: Vec<String>) -> Result<()> {
        if cultivars.len() != self.rows {
            return Err(SimulationError::shape_mismatch("cultivar column length differs from frame"));
        }
        self.cultivars = Some(cultivars);
        Ok(())
    }

    /// New frame holding exactly `names`, in that order
    pub fn select(&self, names: &[&str]) -> Result<FeatureFrame> {
        let mut selected = FeatureFrame::new(self.rows);
        for name in names {
            selected.columns.push(Column {
                name: name.to_string(),
                values: self.column(name)?.to_vec(),
            });
        }
        Ok(selected)
    }

    /// Numeric columns as a `[rows, width]` matrix
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows, self.columns.len()), |(r, c)| self.columns[c].values[r])
    }

    /// Chosen columns as a `[rows, names.len()]` matrix
    pub fn matrix_of(&self, names: &[&str]) -> Result<Array2<f64>> {
        Ok(self.select(names)?.to_matrix())
    }
}
