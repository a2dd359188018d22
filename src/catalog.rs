//! Static tables the simulator is built around
//!
//! Covariate bounds, the cultivar catalog, the periodic frequencies used for
//! time encoding and the NGP regression coefficients. None of these change at
//! runtime; the encoded cultivar order and the frequency order are part of the
//! contract with the pre-trained models.

use serde::Serialize;
use std::fmt;

/// Sampling bounds for one agronomic covariate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CovariateSpec {
    pub min: f64,
    pub max: f64,
    /// Mode of the observed distribution, used as the normal mean
    pub max_proba: f64,
    pub std: f64,
}

/// The six agronomic covariates a user sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Covariate {
    /// Plant height (cm)
    Ph,
    /// Number of stems and branches
    Nlp,
    /// Number of grains per plant
    Ngl,
    /// Number of grains per pod
    Ns,
    /// Insertion of the first pod (cm)
    Ifp,
    /// Thousand seed weight (g)
    Mhg,
}

impl Covariate {
    /// Generation order of the observation table columns
    pub const ALL: [Covariate; 6] = [
        Covariate::Ph,
        Covariate::Nlp,
        Covariate::Ngl,
        Covariate::Ns,
        Covariate::Ifp,
        Covariate::Mhg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Covariate::Ph => "PH",
            Covariate::Nlp => "NLP",
            Covariate::Ngl => "NGL",
            Covariate::Ns => "NS",
            Covariate::Ifp => "IFP",
            Covariate::Mhg => "MHG",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Covariate::Ph | Covariate::Ifp => "cm",
            Covariate::Mhg => "g",
            _ => "units",
        }
    }

    /// Name of the log-transformed column
    pub fn log_name(&self) -> String {
        format!("{}_log", self.name())
    }

    pub fn spec(&self) -> CovariateSpec {
        match self {
            Covariate::Ph => CovariateSpec { min: 47.6, max: 94.8, max_proba: 63.3, std: 9.0 },
            Covariate::Nlp => CovariateSpec { min: 20.2, max: 123.0, max_proba: 43.0, std: 20.1 },
            Covariate::Ngl => CovariateSpec { min: 0.94, max: 14.86, max_proba: 1.71, std: 0.84 },
            Covariate::Ns => CovariateSpec { min: 0.4, max: 9.0, max_proba: 3.7, std: 1.5 },
            Covariate::Ifp => CovariateSpec { min: 7.2, max: 26.4, max_proba: 16.8, std: 3.0 },
            Covariate::Mhg => CovariateSpec { min: 127.1, max: 216.0, max_proba: 156.7, std: 19.6 },
        }
    }

    pub fn from_name(name: &str) -> Option<Covariate> {
        Covariate::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Covariates fed to the cluster model, in its training order
pub const CLUSTER_INPUT_ORDER: [Covariate; 6] = [
    Covariate::Ph,
    Covariate::Ifp,
    Covariate::Nlp,
    Covariate::Ngl,
    Covariate::Ns,
    Covariate::Mhg,
];

/// Log covariates kept for the sequence model, in its training order
pub const MODEL_LOG_COVARIATES: [Covariate; 4] =
    [Covariate::Ph, Covariate::Nlp, Covariate::Ngl, Covariate::Ns];

/// Target frequencies in cycles per year, with their column prefix
pub const PERIODIC_FREQUENCIES: [(&str, f64); 8] = [
    ("f1", 0.3000),
    ("f2", 0.4125),
    ("f3", 0.4500),
    ("f4", 0.6000),
    ("f5", 0.9000),
    ("f6", 2.1000),
    ("f7", 4.2000),
    ("f8", 6.0000),
];

/// Seconds in a 365.2425-day year
pub const SECONDS_PER_YEAR: f64 = 60.0 * 60.0 * 24.0 * 365.2425;

/// NGP = slope * NLP + intercept, fitted offline (R² = 0.4651)
pub const NGP_SLOPE: f64 = 2_056_079_224.54;
pub const NGP_INTERCEPT: f64 = 55.46;

/// Cultivars with a one-hot column, in model column order
pub const ENCODED_CULTIVARS: [&str; 12] = [
    "82I78RSF IPRO",
    "83IX84RSF I2X",
    "96R29 IPRO",
    "97Y97 IPRO",
    "BRASMAX OLIMPO IPRO",
    "FORTALECE L090183 RR",
    "FTR 3179 IPRO",
    "GNS7900 IPRO - AMPLA",
    "MONSOY 8330I2X",
    "NK 7777 IPRO",
    "SUZY IPRO",
    "TMG 22X83I2X",
];

/// Every cultivar offered to users
pub const CULTIVAR_CATALOG: [&str; 40] = [
    "NEO 760 CE",
    "MANU IPRO",
    "77HO111I2X - GUAPORÉ",
    "NK 7777 IPRO",
    "GNS7900 IPRO - AMPLA",
    "LTT 7901 IPRO",
    "BRASMAX BÔNUS IPRO",
    "97Y97 IPRO",
    "BRASMAX OLIMPO IPRO",
    "LYNDA IPRO",
    "NK 8100 IPRO",
    "82HO111 IPRO - HO COXIM IPRO",
    "83IX84RSF I2X",
    "ADAPTA LTT 8402 IPRO",
    "98R30 CE",
    "FORTALEZA IPRO",
    "MONSOY 8330I2X",
    "SUZY IPRO",
    "TMG 22X83I2X",
    "EXPANDE LTT 8301 IPRO",
    "FORTALECE L090183 RR",
    "96R29 IPRO",
    "74K75RSF CE",
    "FTR 3868 IPRO",
    "GNS7700 IPRO",
    "ELISA IPRO",
    "79I81RSF IPRO",
    "NEO 790 IPRO",
    "PAULA IPRO",
    "FTR 3179 IPRO",
    "LAT 1330BT",
    "FTR 4280 IPRO",
    "ATAQUE I2X",
    "SYN2282IPRO",
    "82I78RSF IPRO",
    "M 8644 IPRO",
    "MONSOY M8606I2X",
    "NK 8770 IPRO",
    "FTR 4288 IPRO",
    "FTR 3190 IPRO",
];

/// One-hot column name for an encoded cultivar
pub fn one_hot_column(cultivar: &str) -> String {
    format!("Cultivar_{}_OneHotEnc", cultivar)
}

/// Whether the sequence model has a one-hot column for this cultivar
pub fn is_encoded(cultivar: &str) -> bool {
    ENCODED_CULTIVARS.contains(&cultivar)
}

pub fn is_in_catalog(cultivar: &str) -> bool {
    CULTIVAR_CATALOG.contains(&cultivar)
}
