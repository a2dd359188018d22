//! Crop yield simulator
//!
//! Generates synthetic daily covariates for a soybean cultivar, derives the
//! model features, predicts grain yield with a pre-fitted cluster model and a
//! pre-trained sequence model, and keeps every run in an exportable log.

pub mod api;
pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod frame;
pub mod generator;
pub mod models;
pub mod pipeline;
pub mod postprocess;
pub mod session;

pub use config::SimulatorConfig;
pub use error::{Result, SimulationError};
pub use models::{Language, SimulationRequest, SimulationResult};
pub use session::SimulationSession;
