use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

use crate::error::{EmpagliflozinError, Result};
use crate::model::Model;

/// Changes applied to a model before a timecourse: identifier to value
///
/// Identifiers address parameters (`BW`), boundary concentrations (`[KI__fpg]`)
/// or state amounts (`PODOSE_emp`, `Aurine_emp`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changes(BTreeMap<String, f64>);

impl Changes {
    pub fn new() -> Self {
        Changes::default()
    }

    /// Builder style insertion
    pub fn with(mut self, id: impl Into<String>, value: f64) -> Self {
        self.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, value: f64) {
        self.0.insert(id.into(), value);
    }

    /// Add all changes of `other`, overriding existing values
    pub fn extend(&mut self, other: &Changes) {
        for (id, value) in other.iter() {
            self.0.insert(id.to_string(), value);
        }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(id, value)| (id.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply all changes to the model
    pub fn apply(&self, model: &mut Model) -> Result<()> {
        for (id, value) in self.iter() {
            model.set(id, value)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Changes {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Changes(iter.into_iter().map(|(id, value)| (id.into(), value)).collect())
    }
}

/// A single simulation segment with `steps` output intervals between `start` and `end` in `min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timecourse {
    pub start: f64,
    pub end: f64,
    pub steps: usize,
    pub changes: Changes,
}

impl Timecourse {
    pub fn new(start: f64, end: f64, steps: usize, changes: Changes) -> Self {
        Timecourse {
            start,
            end,
            steps,
            changes,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 || !(self.end > self.start) || !self.start.is_finite() || !self.end.is_finite()
        {
            return Err(EmpagliflozinError::InvalidTimecourse {
                start: self.start,
                end: self.end,
                steps: self.steps,
            });
        }
        Ok(())
    }
}

/// Consecutive timecourses, each continuing from the final state of the previous one
///
/// Time is cumulative over the segments; reported time is shifted by `time_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimecourseSim {
    pub timecourses: Vec<Timecourse>,
    #[serde(default)]
    pub time_offset: f64,
}

impl TimecourseSim {
    pub fn new(timecourses: Vec<Timecourse>) -> Self {
        TimecourseSim {
            timecourses,
            time_offset: 0.0,
        }
    }

    pub fn single(timecourse: Timecourse) -> Self {
        TimecourseSim::new(vec![timecourse])
    }

    /// A first segment, `repeats` copies of a daily segment and an optional final segment
    pub fn repeated(
        first: Timecourse,
        repeat: Timecourse,
        repeats: usize,
        last: Option<Timecourse>,
    ) -> Self {
        let mut timecourses = Vec::with_capacity(repeats + 2);
        timecourses.push(first);
        timecourses.extend(std::iter::repeat(repeat).take(repeats));
        timecourses.extend(last);
        TimecourseSim::new(timecourses)
    }

    pub fn with_offset(mut self, time_offset: f64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Total number of output points over all segments
    pub fn npoints(&self) -> usize {
        self.timecourses.iter().map(|tc| tc.steps + 1).sum()
    }

    pub fn duration(&self) -> f64 {
        self.timecourses.iter().map(Timecourse::duration).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.timecourses.is_empty() {
            return Err(EmpagliflozinError::InvalidTimecourse {
                start: 0.0,
                end: 0.0,
                steps: 0,
            });
        }
        self.timecourses.iter().try_for_each(Timecourse::validate)
    }
}

/// A scan dimension: one or more identifiers with value lists of equal length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub changes: BTreeMap<String, Vec<f64>>,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Dimension {
            name: name.into(),
            changes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, id: impl Into<String>, values: Vec<f64>) -> Self {
        self.changes.insert(id.into(), values);
        self
    }

    /// Number of points along the dimension
    pub fn len(&self) -> Result<usize> {
        let mut lengths = self.changes.values().map(Vec::len);
        let first = lengths
            .next()
            .ok_or_else(|| EmpagliflozinError::InvalidDimension(self.name.clone()))?;
        if first == 0 || lengths.any(|len| len != first) {
            return Err(EmpagliflozinError::InvalidDimension(self.name.clone()));
        }
        Ok(first)
    }

    pub fn is_empty(&self) -> bool {
        !matches!(self.len(), Ok(len) if len > 0)
    }

    fn point(&self, index: usize) -> Changes {
        self.changes
            .iter()
            .map(|(id, values)| (id.clone(), values[index]))
            .collect()
    }
}

/// A timecourse simulation repeated over the Cartesian product of the scan dimensions
///
/// The changes of a scan point are applied after the changes of the first timecourse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSim {
    pub simulation: TimecourseSim,
    pub dimensions: Vec<Dimension>,
}

impl ScanSim {
    pub fn new(simulation: TimecourseSim, dimensions: Vec<Dimension>) -> Self {
        ScanSim {
            simulation,
            dimensions,
        }
    }

    /// Changes of every scan point, the last dimension varies fastest
    pub fn points(&self) -> Result<Vec<Changes>> {
        let mut points = vec![Changes::new()];
        for dimension in &self.dimensions {
            let len = dimension.len()?;
            points = points
                .into_iter()
                .flat_map(|point| {
                    (0..len).map(move |index| {
                        let mut changes = point.clone();
                        changes.extend(&dimension.point(index));
                        changes
                    })
                })
                .collect();
        }
        Ok(points)
    }

    /// The timecourse simulation of every scan point
    pub fn simulations(&self) -> Result<Vec<(Changes, TimecourseSim)>> {
        self.points()?
            .into_iter()
            .map(|point| {
                let mut simulation = self.simulation.clone();
                if let Some(first) = simulation.timecourses.first_mut() {
                    first.changes.extend(&point);
                }
                Ok((point, simulation))
            })
            .collect()
    }
}

/// Any simulation an experiment can define
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Simulation {
    Timecourse(TimecourseSim),
    Scan(ScanSim),
}

impl From<TimecourseSim> for Simulation {
    fn from(simulation: TimecourseSim) -> Self {
        Simulation::Timecourse(simulation)
    }
}

impl From<ScanSim> for Simulation {
    fn from(scan: ScanSim) -> Self {
        Simulation::Scan(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timecourse() -> Timecourse {
        Timecourse::new(0.0, 60.0, 10, Changes::new().with("PODOSE_emp", 10.0))
    }

    #[test]
    fn repeated_segments() {
        let sim = TimecourseSim::repeated(timecourse(), timecourse(), 3, Some(timecourse()))
            .with_offset(-60.0);
        assert_eq!(sim.timecourses.len(), 5);
        assert_eq!(sim.npoints(), 55);
        assert_eq!(sim.duration(), 300.0);
        assert_eq!(sim.time_offset, -60.0);
    }

    #[test]
    fn invalid_timecourses() {
        assert!(Timecourse::new(0.0, 0.0, 10, Changes::new()).validate().is_err());
        assert!(Timecourse::new(0.0, 10.0, 0, Changes::new()).validate().is_err());
        assert!(TimecourseSim::new(vec![]).validate().is_err());
        assert!(TimecourseSim::single(timecourse()).validate().is_ok());
    }

    #[test]
    fn scan_is_cartesian_product() {
        let scan = ScanSim::new(
            TimecourseSim::single(timecourse()),
            vec![
                Dimension::new("dim_dose").with("PODOSE_emp", vec![1.0, 2.0, 3.0]),
                Dimension::new("dim_renal")
                    .with("KI__f_renal_function", vec![0.5, 1.0])
                    .with("BW", vec![60.0, 80.0]),
            ],
        );
        let points = scan.points().unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].get("PODOSE_emp"), Some(1.0));
        assert_eq!(points[1].get("BW"), Some(80.0));
        assert_eq!(points[5].get("PODOSE_emp"), Some(3.0));

        let simulations = scan.simulations().unwrap();
        // the scan value overrides the dose of the first timecourse
        assert_eq!(
            simulations[2].1.timecourses[0].changes.get("PODOSE_emp"),
            Some(2.0)
        );
    }

    #[test]
    fn dimension_lengths_must_match() {
        let dimension = Dimension::new("dim")
            .with("BW", vec![60.0, 70.0])
            .with("HCT", vec![0.4]);
        assert!(dimension.len().is_err());
        assert!(Dimension::new("empty").is_empty());
    }
}
