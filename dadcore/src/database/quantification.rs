use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::algorithm::regression::LinearFit;
use crate::error::{DadError, DadResult};

/// One standard injection: known concentration and the integrated response it produced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub concentration: f64,
    pub response: f64,
}

impl From<(f64, f64)> for CalibrationPoint {
    fn from((concentration, response): (f64, f64)) -> Self {
        CalibrationPoint { concentration, response }
    }
}

/// Calibration data per compound id.
///
/// Points are kept in insertion order and repeated injections of the same
/// concentration are allowed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuantificationDatabase {
    calibrations: BTreeMap<String, Vec<CalibrationPoint>>,
}

impl QuantificationDatabase {
    pub fn new() -> Self {
        QuantificationDatabase { calibrations: BTreeMap::new() }
    }

    /// Appends a `(concentration, response)` pair, creating the compound's entry if needed.
    pub fn add_compound_concentration(&mut self, compound_id: &str, pair: (f64, f64)) {
        self.calibrations
            .entry(compound_id.to_string())
            .or_default()
            .push(pair.into());
    }

    pub fn get(&self, compound_id: &str) -> DadResult<&[CalibrationPoint]> {
        self.calibrations
            .get(compound_id)
            .map(Vec::as_slice)
            .ok_or_else(|| DadError::MissingCalibration(compound_id.to_string()))
    }

    /// Least squares fit of `response = slope * concentration + intercept`.
    ///
    /// # Errors
    ///
    /// * `MissingCalibration` if the compound has no entry
    /// * `DegenerateCalibration` if fewer than two distinct concentrations were recorded
    pub fn calibration_curve(&self, compound_id: &str) -> DadResult<LinearFit> {
        let pairs: Vec<(f64, f64)> = self
            .get(compound_id)?
            .iter()
            .map(|p| (p.concentration, p.response))
            .collect();
        LinearFit::fit(&pairs).ok_or_else(|| DadError::DegenerateCalibration {
            compound: compound_id.to_string(),
            slope: f64::NAN,
        })
    }

    pub fn contains(&self, compound_id: &str) -> bool {
        self.calibrations.contains_key(compound_id)
    }

    /// Compound ids in lexicographic order.
    pub fn compounds(&self) -> impl Iterator<Item = &str> + '_ {
        self.calibrations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.calibrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calibrations.is_empty()
    }
}
