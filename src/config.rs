//! Simulator configuration.
//!
//! Artifact locations, presentation language, randomness and the two policy
//! switches that the pipeline leaves to the operator: whether the end date
//! belongs to the simulated range and how unknown cultivars are encoded.
//! Configurations round-trip through TOML or JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Language;

/// Whether `end_date` is part of the simulated range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBoundary {
    /// `[start, end)`: one row per day in `(end - start).days`
    #[default]
    ExcludeEnd,
    /// `[start, end]`
    IncludeEnd,
}

/// Treatment of cultivars without a one-hot column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Emit an all-zero indicator row and continue
    #[default]
    Lenient,
    /// Fail with `UnknownCategory`
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Pre-fitted cluster model artifact
    pub cluster_model_path: PathBuf,
    /// Pre-trained sequence model artifact
    pub lstm_model_path: PathBuf,
    pub language: Language,
    /// Fixed seed for reproducible runs; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub date_boundary: DateBoundary,
    pub category_policy: CategoryPolicy,
    /// Upper bound on one run when served over the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_timeout_secs: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            cluster_model_path: PathBuf::from("kmeans_model.json"),
            lstm_model_path: PathBuf::from("lstm.json"),
            language: Language::En,
            seed: None,
            date_boundary: DateBoundary::ExcludeEnd,
            category_policy: CategoryPolicy::Lenient,
            inference_timeout_secs: None,
        }
    }
}

impl SimulatorConfig {
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: SimulatorConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: SimulatorConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load by extension: `.json` as JSON, anything else as TOML
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_toml(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.date_boundary, DateBoundary::ExcludeEnd);
        assert_eq!(config.category_policy, CategoryPolicy::Lenient);
        assert_eq!(config.cluster_model_path, PathBuf::from("kmeans_model.json"));
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_save_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulator.toml");

        let config = SimulatorConfig {
            language: Language::Pt,
            seed: Some(7),
            category_policy: CategoryPolicy::Strict,
            date_boundary: DateBoundary::IncludeEnd,
            ..SimulatorConfig::default()
        };
        config.save_toml(&path).unwrap();

        let loaded = SimulatorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: SimulatorConfig = toml::from_str("language = \"pt\"\nseed = 42\n").unwrap();
        assert_eq!(parsed.language, Language::Pt);
        assert_eq!(parsed.seed, Some(42));
        assert_eq!(parsed.lstm_model_path, PathBuf::from("lstm.json"));
    }

    #[test]
    fn test_save_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulator.json");

        let config = SimulatorConfig {
            inference_timeout_secs: Some(30),
            ..SimulatorConfig::default()
        };
        config.save_json(&path).unwrap();
        assert_eq!(SimulatorConfig::load(&path).unwrap(), config);
    }
}
