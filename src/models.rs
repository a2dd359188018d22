use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::catalog::Covariate;
use crate::error::{Result, SimulationError};

/// Language used for table headers and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pt,
}

impl Language {
    /// Result table headers, in `SimulatedDay` field order
    pub fn result_headers(&self) -> [&'static str; 10] {
        match self {
            Language::En => [
                "timestamp", "Cultivar", "PH", "NLP", "NGP", "NGL", "NS", "IFP", "MHG", "GY",
            ],
            Language::Pt => [
                "dia",
                "hibrido_de_soja",
                "altura_da_planta",
                "hastes_e_ramos",
                "leguminosas_por_planta",
                "graos_por_planta",
                "graos_por_vagem",
                "insercao_da_primeira_vagem",
                "massa_de_mil_sementes",
                "produtividade_de_graos",
            ],
        }
    }

    /// Names of the date and yield columns consumed by plotting
    pub fn yield_axis_labels(&self) -> (&'static str, &'static str) {
        let headers = self.result_headers();
        (headers[0], headers[9])
    }
}

/// User parameters for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// First simulated day, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day of the range, `YYYY-MM-DD`
    pub end_date: String,
    pub cultivar: String,
    #[serde(rename = "PH")]
    pub ph: f64,
    #[serde(rename = "NLP")]
    pub nlp: f64,
    #[serde(rename = "NGL")]
    pub ngl: f64,
    #[serde(rename = "NS")]
    pub ns: f64,
    #[serde(rename = "IFP")]
    pub ifp: f64,
    #[serde(rename = "MHG")]
    pub mhg: f64,
}

impl SimulationRequest {
    pub fn setpoint(&self, covariate: Covariate) -> f64 {
        match covariate {
            Covariate::Ph => self.ph,
            Covariate::Nlp => self.nlp,
            Covariate::Ngl => self.ngl,
            Covariate::Ns => self.ns,
            Covariate::Ifp => self.ifp,
            Covariate::Mhg => self.mhg,
        }
    }

    pub fn parse_dates(&self) -> Result<(NaiveDate, NaiveDate)> {
        Ok((parse_date(&self.start_date)?, parse_date(&self.end_date)?))
    }

    /// Check dates parse and every setpoint is a positive finite number
    pub fn validate(&self) -> Result<()> {
        self.parse_dates()?;
        for covariate in Covariate::ALL {
            let value = self.setpoint(covariate);
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::InvalidInput(format!(
                    "{} setpoint must be a positive number, got {}",
                    covariate, value
                )));
            }
        }
        Ok(())
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| SimulationError::InvalidDate {
        value: value.to_string(),
    })
}

/// One simulated day before prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: NaiveDate,
    #[serde(rename = "Cultivar")]
    pub cultivar: String,
    #[serde(rename = "PH")]
    pub ph: f64,
    #[serde(rename = "NLP")]
    pub nlp: f64,
    #[serde(rename = "NGP")]
    pub ngp: f64,
    #[serde(rename = "NGL")]
    pub ngl: f64,
    #[serde(rename = "NS")]
    pub ns: f64,
    #[serde(rename = "IFP")]
    pub ifp: f64,
    #[serde(rename = "MHG")]
    pub mhg: f64,
}

impl Observation {
    pub fn value(&self, covariate: Covariate) -> f64 {
        match covariate {
            Covariate::Ph => self.ph,
            Covariate::Nlp => self.nlp,
            Covariate::Ngl => self.ngl,
            Covariate::Ns => self.ns,
            Covariate::Ifp => self.ifp,
            Covariate::Mhg => self.mhg,
        }
    }
}

/// Observation table: one row per simulated day
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationTable {
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn cultivars(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.cultivar.clone()).collect()
    }

    pub fn column(&self, covariate: Covariate) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(covariate)).collect()
    }
}

/// One simulated day with its predicted grain yield
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedDay {
    pub timestamp: NaiveDate,
    #[serde(rename = "Cultivar")]
    pub cultivar: String,
    #[serde(rename = "PH")]
    pub ph: f64,
    #[serde(rename = "NLP")]
    pub nlp: f64,
    #[serde(rename = "NGP")]
    pub ngp: f64,
    #[serde(rename = "NGL")]
    pub ngl: f64,
    #[serde(rename = "NS")]
    pub ns: f64,
    #[serde(rename = "IFP")]
    pub ifp: f64,
    #[serde(rename = "MHG")]
    pub mhg: f64,
    /// Grain yield, kg/ha
    #[serde(rename = "GY")]
    pub gy: f64,
}

impl SimulatedDay {
    pub fn from_observation(obs: &Observation, gy: f64) -> Self {
        Self {
            timestamp: obs.timestamp,
            cultivar: obs.cultivar.clone(),
            ph: obs.ph,
            nlp: obs.nlp,
            ngp: obs.ngp,
            ngl: obs.ngl,
            ns: obs.ns,
            ifp: obs.ifp,
            mhg: obs.mhg,
            gy,
        }
    }

    /// Field values as text, in `Language::result_headers` order
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d").to_string(),
            self.cultivar.clone(),
            self.ph.to_string(),
            self.nlp.to_string(),
            self.ngp.to_string(),
            self.ngl.to_string(),
            self.ns.to_string(),
            self.ifp.to_string(),
            self.mhg.to_string(),
            self.gy.to_string(),
        ]
    }
}

/// Simulation result table, immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub rows: Vec<SimulatedDay>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (date, GY) pairs for plotting
    pub fn yield_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.timestamp, r.gy)).collect()
    }

    pub fn mean_yield(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        Some(self.rows.iter().map(|r| r.gy).sum::<f64>() / self.rows.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub parameter: String,
    pub value: String,
}

/// Two-column summary of a run's inputs and timing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub entries: Vec<ReportEntry>,
}

impl SimulationReport {
    pub const HEADERS: [&'static str; 2] = ["SIMULATION_REPORT", "USER_INPUT"];

    pub fn build(
        language: Language,
        counter: u64,
        server_start: DateTime<Utc>,
        concluded_at: DateTime<Utc>,
        request: &SimulationRequest,
    ) -> Self {
        let labels: [&str; 13] = match language {
            Language::En => [
                "SIMULATION #",
                "IDENTIFIER",
                "STARTED SIMULATION AT (SERVER TIME)",
                "FINISHED SIMULATION AT (SERVER TIME)",
                "START DATE",
                "END DATE",
                "CULTIVAR",
                "PLANT HEIGHT (PH)",
                "INSERTION OF THE FIRST POD (IFP)",
                "NUMBER OF STEMS (NLP)",
                "NUMBER OF GRAINS PER PLANT (NGL)",
                "NUMBER OF GRAINS PER POD (NS)",
                "THOUSAND SEED WEIGHT (MHG)",
            ],
            Language::Pt => [
                "SIMULAÇÃO #",
                "IDENTIFICADOR",
                "SIMULAÇÃO INICIADA EM (TEMPO DO SERVIDOR)",
                "SIMULAÇÃO FINALIZADA EM (TEMPO DO SERVIDOR)",
                "DATA DE INÍCIO",
                "DATA DE TÉRMINO",
                "HÍBRIDO DE SOJA",
                "ALTURA DA PLANTA (PH)",
                "INSERÇÃO DA PRIMEIRA VAGEM (IFP)",
                "NÚMERO DE HASTES E RAMOS (NLP)",
                "NÚMERO DE GRÃOS POR PLANTA (NGL)",
                "NÚMERO DE GRÃOS POR VAGEM (NS)",
                "MASSA DE MIL SEMENTES (MHG)",
            ],
        };

        let with_unit = |c: Covariate| format!("{} {}", request.setpoint(c), c.unit());
        let values = [
            counter.to_string(),
            posix_identifier(concluded_at),
            server_start.to_rfc3339(),
            concluded_at.to_rfc3339(),
            request.start_date.clone(),
            request.end_date.clone(),
            request.cultivar.clone(),
            with_unit(Covariate::Ph),
            with_unit(Covariate::Ifp),
            with_unit(Covariate::Nlp),
            with_unit(Covariate::Ngl),
            with_unit(Covariate::Ns),
            with_unit(Covariate::Mhg),
        ];

        let entries = labels
            .iter()
            .zip(values)
            .map(|(label, value)| ReportEntry {
                parameter: label.to_string(),
                value,
            })
            .collect();

        Self { entries }
    }

    pub fn value_of(&self, parameter: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.parameter == parameter)
            .map(|e| e.value.as_str())
    }
}

/// POSIX seconds with sub-second precision, used to tell runs apart
pub fn posix_identifier(at: DateTime<Utc>) -> String {
    let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1e6;
    format!("{}", seconds)
}
