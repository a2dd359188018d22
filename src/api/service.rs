//! Shared simulation service behind the REST handlers
//!
//! All runs go through one `SimulationSession` guarded by a mutex, so requests
//! are processed one at a time in arrival order. Completed records are mirrored
//! into a read cache so listing and fetching never wait on a running
//! simulation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::SimulatorConfig;
use crate::error::SimulationError;
use crate::models::{Language, SimulationReport, SimulationRequest, SimulationResult};
use crate::session::{ExportedData, ExportedTable, SimulationRun, SimulationSession, YieldSeries};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Simulation exceeded {0}s timeout")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub simulation: u64,
    pub sheet_name: String,
    pub concluded_at: chrono::DateTime<chrono::Utc>,
    pub rows: usize,
    pub mean_gy: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct StoredSimulation {
    pub simulation: u64,
    pub sheet_name: String,
    pub result: SimulationResult,
    pub report: Option<SimulationReport>,
}

// ============================================================================
// Simulation Service
// ============================================================================

pub struct SimulationService {
    session: Arc<Mutex<SimulationSession>>,
    log: Arc<RwLock<Vec<ExportedTable>>>,
    language: Language,
    timeout: Option<Duration>,
}

impl SimulationService {
    pub fn new(config: SimulatorConfig) -> Self {
        let language = config.language;
        let timeout = config.inference_timeout_secs.map(Duration::from_secs);
        Self {
            session: Arc::new(Mutex::new(SimulationSession::new(config))),
            log: Arc::new(RwLock::new(Vec::new())),
            language,
            timeout,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run one simulation on the blocking pool.
    ///
    /// The session lock is held until the run's records are in the read
    /// cache, so a run that outlives its timeout still becomes visible to
    /// `list` and `get`. Later requests queue behind it.
    pub async fn run(&self, request: SimulationRequest) -> Result<SimulationRun, ServiceError> {
        let session = Arc::clone(&self.session);
        let log = Arc::clone(&self.log);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = session
                .lock()
                .map_err(|_| ServiceError::Internal("simulation session lock poisoned".into()))?;
            let before = guard.exported_tables().len();
            let run = guard.run(&request)?;
            log.blocking_write()
                .extend_from_slice(&guard.exported_tables()[before..]);
            info!(simulation = run.simulation, "Simulation stored");
            Ok::<_, ServiceError>(run)
        });

        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                error!(timeout_secs = limit.as_secs(), "Simulation timed out");
                ServiceError::Timeout(limit.as_secs())
            })?,
            None => task.await,
        };
        joined.map_err(|e| ServiceError::Internal(e.to_string()))?
    }

    pub async fn list(&self) -> Vec<SimulationSummary> {
        let log = self.log.read().await;
        log.iter()
            .filter_map(|t| match &t.data {
                ExportedData::Simulation(result) => Some(SimulationSummary {
                    simulation: t.simulation,
                    sheet_name: t.sheet_name.clone(),
                    concluded_at: t.concluded_at,
                    rows: result.len(),
                    mean_gy: result.mean_yield(),
                }),
                ExportedData::Report(_) => None,
            })
            .collect()
    }

    pub async fn get(&self, id: u64) -> Option<StoredSimulation> {
        let log = self.log.read().await;
        let mut found: Option<StoredSimulation> = None;
        let mut report = None;

        for table in log.iter().filter(|t| t.simulation == id) {
            match &table.data {
                ExportedData::Simulation(result) => {
                    found = Some(StoredSimulation {
                        simulation: id,
                        sheet_name: table.sheet_name.clone(),
                        result: result.clone(),
                        report: None,
                    })
                }
                ExportedData::Report(r) => report = Some(r.clone()),
            }
        }

        found.map(|mut stored| {
            stored.report = report;
            stored
        })
    }

    pub async fn yield_series(&self, id: u64) -> Option<YieldSeries> {
        self.get(id).await.map(|stored| YieldSeries {
            sheet_name: stored.sheet_name,
            points: stored.result.yield_points(),
        })
    }

    /// Snapshot of every record, reports included
    pub async fn exported_tables(&self) -> Vec<ExportedTable> {
        self.log.read().await.clone()
    }
}
