//! Output of experiments into the results directory
//!
//! Every experiment writes into `<results>/<Experiment>/`:
//! - `<Experiment>_<task>.tsv`: simulation results, scans with the scanned values as leading columns
//! - `<Experiment>_<table>.tsv`: additional tables such as pharmacokinetic parameters
//! - `<Experiment>_<figure>.html`: figures
//! - `<Experiment>.json`: description of the simulations and fit mappings
//!
//! Figures of all experiments are additionally copied into `<results>/_figures/`.

pub mod figures;

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use eyre::{Result, WrapErr};
use serde_derive::Serialize;

use crate::experiments::fitting::FitMapping;
use crate::experiments::SimulationExperiment;
use crate::model::Observable;
use crate::simulator::{ExperimentResults, ScanResult, Simulation, SimulationResult, TimecourseResult};

use figures::Figure;

/// Directory collecting the figures of all experiments
pub const FIGURES_DIR: &str = "_figures";

/// A table of strings with a header, written tab separated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub sid: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(sid: impl Into<String>, header: impl IntoIterator<Item = S>) -> Self {
        Table {
            sid: sid.into(),
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: impl IntoIterator<Item = String>) {
        self.rows.push(row.into_iter().collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table to `<dir>/<prefix>_<sid>.tsv`
    pub fn write(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{prefix}_{}.tsv", self.sid));
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(&path)
            .wrap_err_with(|| format!("Could not create {}", path.display()))?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

/// Column header of timecourse results: observable identifiers
fn observable_header() -> Vec<String> {
    Observable::ALL.iter().map(|o| o.id().to_string()).collect()
}

fn timecourse_table(task: &str, result: &TimecourseResult) -> Table {
    let mut table = Table::new(task, observable_header());
    for row in result.rows() {
        table.push(row.iter().map(|v| v.to_string()));
    }
    table
}

/// Scan results in long format, the scanned identifiers precede the observables
fn scan_table(task: &str, result: &ScanResult) -> Table {
    let ids: Vec<String> = result
        .points
        .first()
        .map(|point| point.changes.iter().map(|(id, _)| id.to_string()).collect())
        .unwrap_or_default();
    let mut header = ids.clone();
    header.extend(observable_header());
    let mut table = Table::new(task, header);
    for point in &result.points {
        let values: Vec<String> = ids
            .iter()
            .map(|id| point.changes.get(id).unwrap_or(f64::NAN).to_string())
            .collect();
        for row in point.result.rows() {
            table.push(values.iter().cloned().chain(row.iter().map(|v| v.to_string())));
        }
    }
    table
}

/// Result tables of all tasks of an experiment
pub fn result_tables(results: &ExperimentResults) -> Vec<Table> {
    results
        .iter()
        .map(|(task, result)| match result {
            SimulationResult::Timecourse(tc) => timecourse_table(task, tc),
            SimulationResult::Scan(scan) => scan_table(task, scan),
        })
        .collect()
}

#[derive(Serialize)]
struct Description<'a> {
    sid: &'a str,
    simulations: std::collections::BTreeMap<String, Simulation>,
    figures: Vec<&'a str>,
    tables: Vec<&'a str>,
    fit_mappings: Vec<FitMapping>,
}

/// Files written for an experiment
#[derive(Debug, Default, Clone)]
pub struct ExperimentOutput {
    pub tables: Vec<PathBuf>,
    pub figures: Vec<PathBuf>,
    pub description: PathBuf,
}

/// Writes results, tables, figures and the description of an experiment into `dir`
pub fn write_experiment(
    dir: &Path,
    experiment: &dyn SimulationExperiment,
    results: &ExperimentResults,
    tables: &[Table],
    figures: &[Figure],
) -> Result<ExperimentOutput> {
    let sid = experiment.sid();
    fs::create_dir_all(dir).wrap_err_with(|| format!("Could not create {}", dir.display()))?;

    let mut output = ExperimentOutput::default();
    for table in result_tables(results).iter().chain(tables) {
        output.tables.push(table.write(dir, sid)?);
    }
    for figure in figures {
        output.figures.push(figure.write(dir, sid)?);
    }

    let description = Description {
        sid,
        simulations: experiment.simulations(),
        figures: figures.iter().map(|f| f.sid.as_str()).collect(),
        tables: tables.iter().map(|t| t.sid.as_str()).collect(),
        fit_mappings: experiment.fit_mappings(),
    };
    output.description = dir.join(format!("{sid}.json"));
    fs::write(&output.description, serde_json::to_string_pretty(&description)?)
        .wrap_err_with(|| format!("Could not write {}", output.description.display()))?;

    tracing::debug!(
        "{}: {} tables and {} figures written to {}",
        sid,
        output.tables.len(),
        output.figures.len(),
        dir.display()
    );
    Ok(output)
}

/// Copies figures into the common figure directory of the results
pub fn collect_figures(results_dir: &Path, figures: &[PathBuf]) -> Result<PathBuf> {
    let dir = results_dir.join(FIGURES_DIR);
    fs::create_dir_all(&dir).wrap_err_with(|| format!("Could not create {}", dir.display()))?;
    for path in figures {
        if let Some(name) = path.file_name() {
            fs::copy(path, dir.join(name))
                .wrap_err_with(|| format!("Could not copy {}", path.display()))?;
        }
    }
    Ok(dir)
}
