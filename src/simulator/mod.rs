pub mod ode_solvers;
pub mod results;
pub mod simulation;

use rayon::prelude::*;

pub use results::{ExperimentResults, ScanPoint, ScanResult, SimulationResult, TimecourseResult};
pub use simulation::{Changes, Dimension, ScanSim, Simulation, Timecourse, TimecourseSim};

use crate::error::Result;
use crate::model::{observables::Observable, Model};

pub use self::ode_solvers::{ATOL, RTOL};

/// Runs simulations of fresh model instances
#[derive(Debug, Clone)]
pub struct Simulator {
    rtol: f64,
    atol: f64,
    parallel: bool,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(RTOL, ATOL, true)
    }
}

impl Simulator {
    pub fn new(rtol: f64, atol: f64, parallel: bool) -> Self {
        Simulator {
            rtol,
            atol,
            parallel,
        }
    }

    /// Default tolerances, simulations of a scan run one after another
    pub fn sequential() -> Self {
        Simulator::new(RTOL, ATOL, false)
    }

    pub fn tolerances(&self) -> (f64, f64) {
        (self.rtol, self.atol)
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Simulates consecutive timecourses starting from the default model
    ///
    /// The changes of each timecourse are applied to the state reached by the previous one.
    /// The first output point of a timecourse is the state after its changes.
    pub fn run_timecourse(&self, sim: &TimecourseSim) -> Result<TimecourseResult> {
        sim.validate()?;
        let mut model = Model::default();
        let mut rows = Vec::with_capacity(sim.npoints());
        let mut t0 = sim.timecourses.first().map(|tc| tc.start).unwrap_or(0.0);

        for tc in &sim.timecourses {
            tc.changes.apply(&mut model)?;
            let dt = tc.duration() / tc.steps as f64;
            model.advance(t0, *model.state());
            rows.push(self.observe(&model, sim.time_offset));

            for k in 1..=tc.steps {
                let t = t0 + k as f64 * dt;
                let state = ode_solvers::simulate_interval(
                    model.parameters(),
                    model.derived(),
                    *model.state(),
                    model.time(),
                    t,
                    self.rtol,
                    self.atol,
                )?;
                model.advance(t, state);
                rows.push(self.observe(&model, sim.time_offset));
            }
            t0 += tc.duration();
        }
        tracing::trace!(
            "Simulated {} timecourses with {} points",
            sim.timecourses.len(),
            rows.len()
        );
        Ok(TimecourseResult::from_rows(rows))
    }

    /// Simulates every point of a scan, in parallel if enabled
    pub fn run_scan(&self, scan: &ScanSim) -> Result<ScanResult> {
        let simulations = scan.simulations()?;
        let run = |(changes, sim): (Changes, TimecourseSim)| -> Result<ScanPoint> {
            let result = self.run_timecourse(&sim)?;
            Ok(ScanPoint { changes, result })
        };
        let points = if self.parallel {
            simulations
                .into_par_iter()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        } else {
            simulations.into_iter().map(run).collect::<Result<Vec<_>>>()?
        };
        Ok(ScanResult { points })
    }

    pub fn run(&self, simulation: &Simulation) -> Result<SimulationResult> {
        match simulation {
            Simulation::Timecourse(sim) => self.run_timecourse(sim).map(SimulationResult::Timecourse),
            Simulation::Scan(scan) => self.run_scan(scan).map(SimulationResult::Scan),
        }
    }

    fn observe(&self, model: &Model, offset: f64) -> [f64; crate::model::observables::N_OBSERVABLES] {
        let mut row = model.observables();
        row[Observable::Time.column()] += offset;
        row
    }
}
