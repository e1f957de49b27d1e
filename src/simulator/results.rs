use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView1, Axis};
use serde_derive::Serialize;

use super::simulation::Changes;
use crate::error::{EmpagliflozinError, Result};
use crate::model::observables::N_OBSERVABLES;
use crate::model::Observable;

/// Observables of a timecourse simulation, one row per output point in model units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimecourseResult {
    data: Array2<f64>,
}

impl TimecourseResult {
    pub(crate) fn from_rows(rows: Vec<[f64; N_OBSERVABLES]>) -> Self {
        let mut data = Array2::zeros((rows.len(), N_OBSERVABLES));
        for (mut row, values) in data.axis_iter_mut(Axis(0)).zip(rows.iter()) {
            for (cell, value) in row.iter_mut().zip(values.iter()) {
                *cell = *value;
            }
        }
        TimecourseResult { data }
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn npoints(&self) -> usize {
        self.data.nrows()
    }

    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.column(Observable::Time)
    }

    pub fn column(&self, observable: Observable) -> ArrayView1<'_, f64> {
        self.data.column(observable.column())
    }

    /// Column by observable identifier, e.g. `[Cve_emp]`
    pub fn get(&self, id: &str) -> Result<ArrayView1<'_, f64>> {
        Observable::from_id(id)
            .map(|observable| self.column(observable))
            .ok_or_else(|| EmpagliflozinError::UnknownObservable(id.to_string()))
    }

    /// Value of the observable at the last output point
    pub fn last(&self, observable: Observable) -> f64 {
        self.column(observable)
            .last()
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Rows as `Vec`s for tabular output
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        self.data.axis_iter(Axis(0)).map(|row| row.to_vec())
    }
}

/// A single point of a parameter scan with its changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanPoint {
    pub changes: Changes,
    pub result: TimecourseResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub points: Vec<ScanPoint>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Scan values of `id`, `NaN` where the point does not change it
    pub fn values(&self, id: &str) -> Vec<f64> {
        self.points
            .iter()
            .map(|point| point.changes.get(id).unwrap_or(f64::NAN))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationResult {
    Timecourse(TimecourseResult),
    Scan(ScanResult),
}

impl SimulationResult {
    pub fn as_timecourse(&self) -> Option<&TimecourseResult> {
        match self {
            SimulationResult::Timecourse(result) => Some(result),
            SimulationResult::Scan(_) => None,
        }
    }

    pub fn as_scan(&self) -> Option<&ScanResult> {
        match self {
            SimulationResult::Scan(result) => Some(result),
            SimulationResult::Timecourse(_) => None,
        }
    }
}

/// Results of all simulations of an experiment by task key
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperimentResults(BTreeMap<String, SimulationResult>);

impl ExperimentResults {
    pub fn new() -> Self {
        ExperimentResults::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, result: SimulationResult) {
        self.0.insert(key.into(), result);
    }

    pub fn get(&self, key: &str) -> Option<&SimulationResult> {
        self.0.get(key)
    }

    pub fn timecourse(&self, key: &str) -> Result<&TimecourseResult> {
        self.get(key)
            .and_then(SimulationResult::as_timecourse)
            .ok_or_else(|| EmpagliflozinError::UnknownTask(key.to_string()))
    }

    pub fn scan(&self, key: &str) -> Result<&ScanResult> {
        self.get(key)
            .and_then(SimulationResult::as_scan)
            .ok_or_else(|| EmpagliflozinError::UnknownTask(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SimulationResult)> {
        self.0.iter().map(|(key, result)| (key.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SimulationResult)> for ExperimentResults {
    fn from_iter<I: IntoIterator<Item = (String, SimulationResult)>>(iter: I) -> Self {
        ExperimentResults(iter.into_iter().collect())
    }
}
