//! Synthetic series generation
//!
//! Builds the daily date axis and the six covariate columns of an observation
//! table. Each covariate mixes the user's setpoint with draws from a normal
//! centred on the covariate's mode, hard-clipped into its training range, so
//! generated values never leave the region the models were fitted on.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand_distr::Normal;
use std::collections::HashMap;
use tracing::debug;

use crate::catalog::{Covariate, CovariateSpec, NGP_INTERCEPT, NGP_SLOPE};
use crate::config::DateBoundary;
use crate::error::{Result, SimulationError};
use crate::models::{Observation, ObservationTable, SimulationRequest};

/// Daily dates from `start`, one per day of the range.
///
/// With `ExcludeEnd` the series holds `(end - start).days` entries, so
/// `2024-01-01 -> 2024-01-10` yields nine days ending on the 9th.
pub fn build_date_series(
    start: NaiveDate,
    end: NaiveDate,
    boundary: DateBoundary,
) -> Result<Vec<NaiveDate>> {
    if end < start {
        return Err(SimulationError::invalid_range(start, end, "end date precedes start date"));
    }

    let span = (end - start).num_days();
    let days = match boundary {
        DateBoundary::ExcludeEnd => span,
        DateBoundary::IncludeEnd => span + 1,
    };
    if days <= 0 {
        return Err(SimulationError::invalid_range(start, end, "range contains no days"));
    }

    Ok((0..days).map(|offset| start + Duration::days(offset)).collect())
}

/// Draw `count` covariate values: setpoint where a fair coin lands, a
/// clipped normal sample elsewhere.
pub fn generate_covariate(
    spec: &CovariateSpec,
    setpoint: f64,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<f64>> {
    let dist = Normal::new(spec.max_proba, spec.std).map_err(|e| {
        SimulationError::InvalidInput(format!("bad covariate spec {:?}: {}", spec, e))
    })?;
    // All normal draws first, then the mask draws.
    let samples: Vec<f64> = (0..count)
        .map(|_| dist.sample(rng).clamp(spec.min, spec.max))
        .collect();
    let mask: Vec<bool> = (0..count).map(|_| rng.gen::<f64>() >= 0.5).collect();

    Ok(samples
        .into_iter()
        .zip(mask)
        .map(|(sample, use_setpoint)| if use_setpoint { setpoint } else { sample })
        .collect())
}

/// Number of legumes per plant from the stem count
pub fn derive_pod_count(stem_counts: &[f64]) -> Vec<f64> {
    stem_counts
        .iter()
        .map(|nlp| nlp * NGP_SLOPE + NGP_INTERCEPT)
        .collect()
}

/// Generator over the covariate bounds table
pub struct CovariateGenerator {
    /// Indexed by `Covariate` discriminant, in `Covariate::ALL` order
    specs: [CovariateSpec; 6],
}

impl CovariateGenerator {
    pub fn new() -> Self {
        Self {
            specs: Covariate::ALL.map(|c| c.spec()),
        }
    }

    /// Replace the bounds used for one covariate
    pub fn with_spec(mut self, covariate: Covariate, spec: CovariateSpec) -> Self {
        self.specs[covariate as usize] = spec;
        self
    }

    pub fn spec(&self, covariate: Covariate) -> &CovariateSpec {
        &self.specs[covariate as usize]
    }

    pub fn generate(
        &self,
        covariate: Covariate,
        setpoint: f64,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<f64>> {
        generate_covariate(self.spec(covariate), setpoint, count, rng)
    }

    /// Build the observation table for a request.
    ///
    /// Covariates are drawn in `Covariate::ALL` order so a seeded RNG gives
    /// the same table every time.
    pub fn build_observation_table(
        &self,
        request: &SimulationRequest,
        boundary: DateBoundary,
        rng: &mut impl Rng,
    ) -> Result<ObservationTable> {
        let (start, end) = request.parse_dates()?;
        let dates = build_date_series(start, end, boundary)?;
        let count = dates.len();

        let mut columns: HashMap<Covariate, Vec<f64>> = HashMap::new();
        for covariate in Covariate::ALL {
            let values = self.generate(covariate, request.setpoint(covariate), count, rng)?;
            columns.insert(covariate, values);
        }
        let ngp = derive_pod_count(&columns[&Covariate::Nlp]);

        let rows = dates
            .into_iter()
            .enumerate()
            .map(|(i, timestamp)| Observation {
                timestamp,
                cultivar: request.cultivar.clone(),
                ph: columns[&Covariate::Ph][i],
                nlp: columns[&Covariate::Nlp][i],
                ngp: ngp[i],
                ngl: columns[&Covariate::Ngl][i],
                ns: columns[&Covariate::Ns][i],
                ifp: columns[&Covariate::Ifp][i],
                mhg: columns[&Covariate::Mhg][i],
            })
            .collect::<Vec<_>>();

        debug!(rows = rows.len(), cultivar = %request.cultivar, "Generated observation table");
        Ok(ObservationTable { rows })
    }
}

impl Default for CovariateGenerator {
    fn default() -> Self {
        Self::new()
    }
}
