//! Physiologically based pharmacokinetic/pharmacodynamic model of empagliflozin
//!
//! The whole-body model with intestine, liver and kidney submodels is integrated with
//! [ode_solvers]. Simulation experiments reproduce the clinical studies of empagliflozin,
//! the dose and glucose dependency and parameter scans of renal function, cirrhosis and dose.
//!
//! ```no_run
//! use empagliflozin::prelude::*;
//!
//! let mut settings = Settings::default();
//! settings.config.analysis = Some("renal_impairment".to_string());
//! let summary = entrypoints::run(settings).unwrap();
//! println!("{:?}", summary.figures_dir);
//! ```

pub mod entrypoints;
pub mod error;
pub mod experiments;
pub mod logger;
pub mod model;
pub mod output;
pub mod pk;
pub mod settings;
pub mod simulator;

pub mod prelude {
    pub use crate::entrypoints;
    pub use crate::error::{EmpagliflozinError, Result};
    pub use crate::experiments::{
        group, initialize_experiment, select, SimulationExperiment, EXPERIMENTS, GROUPS,
    };
    pub use crate::model::{Model, Observable, Parameters, State};
    pub use crate::pk::PkParameters;
    pub use crate::settings::{read_settings, Settings};
    pub use crate::simulator::{
        Changes, Dimension, ExperimentResults, ScanResult, ScanSim, Simulation, SimulationResult,
        Simulator, Timecourse, TimecourseResult, TimecourseSim,
    };
}
