//! Simulation experiments: clinical studies, dose dependency and parameter scans
//!
//! An experiment defines its simulations and turns their results into figures and tables.
//! Experiments are organized in groups which can be selected on the command line.

pub mod base;
pub mod dose_dependency;
pub mod fitting;
pub mod metadata;
pub mod scan;
pub mod studies;

use std::collections::BTreeMap;

use crate::error::{EmpagliflozinError, Result};
use crate::output::figures::Figure;
use crate::output::Table;
use crate::simulator::{ExperimentResults, Simulation};

use fitting::FitMapping;

pub trait SimulationExperiment: Send + Sync {
    /// Identifier of the experiment, used for output directories and file names
    fn sid(&self) -> &str;

    /// Simulations by task key
    fn simulations(&self) -> BTreeMap<String, Simulation>;

    fn figures(&self, results: &ExperimentResults) -> Result<Vec<Figure>>;

    /// Additional result tables, e.g. pharmacokinetic parameters of scans
    fn tables(&self, _results: &ExperimentResults) -> Result<Vec<Table>> {
        Ok(Vec::new())
    }

    /// Mappings of simulated observables onto clinical data
    fn fit_mappings(&self) -> Vec<FitMapping> {
        Vec::new()
    }
}

/// Experiments available by name
pub const EXPERIMENTS: [&str; 22] = [
    "Ayoub2017",
    "Brand2012",
    "Chen2015a",
    "Chen2020",
    "Friedrich2013",
    "Hailat2022",
    "Heise2013a",
    "Jiang2023b",
    "Kim2021",
    "Kim2023",
    "Macha2013d",
    "Macha2013e",
    "Macha2014",
    "Macha2014b",
    "Macha2014f",
    "Macha2015b",
    "Sarashina2013",
    "Seman2013",
    "vanderAartvanderBeek2020",
    "Zhao2015",
    "DoseDependency",
    "ParameterScan",
];

const STUDIES: [&str; 15] = [
    "Ayoub2017",
    "Brand2012",
    "Chen2015a",
    "Chen2020",
    "Friedrich2013",
    "Heise2013a",
    "Jiang2023b",
    "Kim2021",
    "Kim2023",
    "Macha2014b",
    "Macha2014f",
    "Sarashina2013",
    "Seman2013",
    "vanderAartvanderBeek2020",
    "Zhao2015",
];

const MISC: [&str; 1] = ["DoseDependency"];

/// Analysis groups
pub const GROUPS: [&str; 8] = [
    "all",
    "studies",
    "pharmacodynamics",
    "dose_dependency",
    "hepatic_impairment",
    "renal_impairment",
    "misc",
    "scan",
];

/// Experiment names of an analysis group
pub fn group(name: &str) -> Result<Vec<&'static str>> {
    let members: Vec<&'static str> = match name {
        "all" => STUDIES.iter().chain(MISC.iter()).copied().collect(),
        "studies" => STUDIES.to_vec(),
        "pharmacodynamics" => vec!["Heise2013a", "Macha2014b", "Sarashina2013", "Seman2013"],
        "dose_dependency" => vec!["Heise2013a", "Sarashina2013", "Seman2013", "Zhao2015"],
        "hepatic_impairment" => vec!["Macha2014b"],
        "renal_impairment" => vec!["Macha2014f"],
        "misc" => MISC.to_vec(),
        "scan" => vec!["ParameterScan"],
        _ => {
            return Err(EmpagliflozinError::UnknownAnalysis {
                name: name.to_string(),
                valid: GROUPS.join(", "),
            })
        }
    };
    Ok(members)
}

/// Creates an experiment by name
pub fn initialize_experiment(name: &str) -> Result<Box<dyn SimulationExperiment>> {
    let experiment: Box<dyn SimulationExperiment> = match name {
        "DoseDependency" => Box::new(dose_dependency::DoseDependency::default()),
        "ParameterScan" => Box::new(scan::ParameterScan::default()),
        study => match studies::study(study) {
            Some(study) => Box::new(study),
            None => {
                return Err(EmpagliflozinError::UnknownExperiment {
                    name: name.to_string(),
                    valid: EXPERIMENTS.join(", "),
                })
            }
        },
    };
    Ok(experiment)
}

/// Experiments of the selected group and individually selected experiments, without duplicates
pub fn select(
    analysis: Option<&str>,
    experiments: &[String],
) -> Result<Vec<Box<dyn SimulationExperiment>>> {
    let mut names: Vec<&str> = match analysis {
        Some(analysis) => group(analysis)?,
        None => Vec::new(),
    };
    for name in experiments {
        if !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }
    if names.is_empty() {
        return Err(EmpagliflozinError::NoSelection {
            valid: GROUPS.join(", "),
        });
    }
    names.into_iter().map(initialize_experiment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_experiment_can_be_created() {
        for name in EXPERIMENTS {
            let experiment = initialize_experiment(name).unwrap();
            assert_eq!(experiment.sid(), name);
            assert!(!experiment.simulations().is_empty(), "{name}");
        }
    }

    #[test]
    fn groups() {
        assert_eq!(group("all").unwrap().len(), 16);
        assert_eq!(group("scan").unwrap(), vec!["ParameterScan"]);
        for name in GROUPS {
            for member in group(name).unwrap() {
                assert!(EXPERIMENTS.contains(&member));
            }
        }
        assert!(matches!(
            group("everything"),
            Err(EmpagliflozinError::UnknownAnalysis { .. })
        ));
    }

    #[test]
    fn selection() {
        let selected = select(Some("renal_impairment"), &["Macha2014f".to_string(), "Hailat2022".to_string()]).unwrap();
        let sids: Vec<&str> = selected.iter().map(|e| e.sid()).collect();
        assert_eq!(sids, vec!["Macha2014f", "Hailat2022"]);

        assert!(matches!(select(None, &[]), Err(EmpagliflozinError::NoSelection { .. })));
        assert!(matches!(
            select(None, &["Foo2000".to_string()]),
            Err(EmpagliflozinError::UnknownExperiment { .. })
        ));
    }
}
