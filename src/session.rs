//! Simulation orchestration.
//!
//! A `SimulationSession` owns everything that outlives a single run: the
//! configuration, the RNG, the run counter and the append-only log of
//! exported tables. Runs take `&mut self`, so one session processes one
//! simulation at a time; callers that serve concurrent requests must put the
//! session behind a lock (see `api::service`).

use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::artifacts::{ClusterClassifier, SequencePredictor};
use crate::config::SimulatorConfig;
use crate::error::Result;
use crate::generator::CovariateGenerator;
use crate::models::{posix_identifier, SimulationReport, SimulationRequest, SimulationResult};
use crate::pipeline::{load_models, prediction_pipeline};

/// Prefix marking report records in the log
pub const REPORT_PREFIX: &str = "REP_";

/// Payload of one exported record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportedData {
    Simulation(SimulationResult),
    Report(SimulationReport),
}

/// One `{table, sheet_name}` record of the result log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedTable {
    pub sheet_name: String,
    pub simulation: u64,
    pub concluded_at: DateTime<Utc>,
    pub data: ExportedData,
}

impl ExportedTable {
    pub fn is_report(&self) -> bool {
        matches!(self.data, ExportedData::Report(_))
    }
}

/// Output of a single run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub simulation: u64,
    pub sheet_name: String,
    pub concluded_at: DateTime<Utc>,
    pub result: SimulationResult,
    pub report: SimulationReport,
}

/// Date/yield series of one simulation, for plotting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldSeries {
    pub sheet_name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

pub struct SimulationSession {
    config: SimulatorConfig,
    generator: CovariateGenerator,
    rng: StdRng,
    started_at: DateTime<Utc>,
    counter: u64,
    exported: Vec<ExportedTable>,
}

impl SimulationSession {
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            generator: CovariateGenerator::new(),
            rng,
            started_at: Utc::now(),
            counter: 0,
            exported: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of completed simulations
    pub fn simulation_counter(&self) -> u64 {
        self.counter
    }

    pub fn exported_tables(&self) -> &[ExportedTable] {
        &self.exported
    }

    /// Run one simulation with the artifacts named in the config
    pub fn run(&mut self, request: &SimulationRequest) -> Result<SimulationRun> {
        let (cluster_model, sequence_model) = load_models(&self.config)?;
        self.run_with(request, &cluster_model, &sequence_model)
    }

    /// Run one simulation with already-loaded models.
    ///
    /// On error nothing is appended and the counter is unchanged.
    pub fn run_with(
        &mut self,
        request: &SimulationRequest,
        cluster_model: &dyn ClusterClassifier,
        sequence_model: &dyn SequencePredictor,
    ) -> Result<SimulationRun> {
        request.validate()?;

        let table = self.generator.build_observation_table(
            request,
            self.config.date_boundary,
            &mut self.rng,
        )?;
        let result = prediction_pipeline(
            &table,
            cluster_model,
            sequence_model,
            self.config.category_policy,
        )?;

        self.counter += 1;
        let concluded_at = Utc::now();
        let sheet_name = format!("sim{}_{}", self.counter, posix_identifier(concluded_at));
        let report = SimulationReport::build(
            self.config.language,
            self.counter,
            self.started_at,
            concluded_at,
            request,
        );

        self.exported.push(ExportedTable {
            sheet_name: sheet_name.clone(),
            simulation: self.counter,
            concluded_at,
            data: ExportedData::Simulation(result.clone()),
        });
        self.exported.push(ExportedTable {
            sheet_name: format!("{}{}", REPORT_PREFIX, sheet_name),
            simulation: self.counter,
            concluded_at,
            data: ExportedData::Report(report.clone()),
        });

        info!(
            simulation = self.counter,
            sheet = %sheet_name,
            rows = result.len(),
            "Simulation completed"
        );

        Ok(SimulationRun {
            simulation: self.counter,
            sheet_name,
            concluded_at,
            result,
            report,
        })
    }

    /// Result table of simulation `id`
    pub fn result(&self, id: u64) -> Option<&SimulationResult> {
        self.exported.iter().find_map(|t| match &t.data {
            ExportedData::Simulation(result) if t.simulation == id => Some(result),
            _ => None,
        })
    }

    pub fn report(&self, id: u64) -> Option<&SimulationReport> {
        self.exported.iter().find_map(|t| match &t.data {
            ExportedData::Report(report) if t.simulation == id => Some(report),
            _ => None,
        })
    }

    /// One yield series per simulation record, skipping reports
    pub fn yield_series(&self) -> Vec<YieldSeries> {
        self.exported
            .iter()
            .filter_map(|t| match &t.data {
                ExportedData::Simulation(result) => Some(YieldSeries {
                    sheet_name: t.sheet_name.clone(),
                    points: result.yield_points(),
                }),
                ExportedData::Report(_) => None,
            })
            .collect()
    }
}
