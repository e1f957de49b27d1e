use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use eyre::{Result, WrapErr};
use rayon::prelude::*;

use crate::experiments::{self, fitting, SimulationExperiment, EXPERIMENTS, GROUPS};
use crate::logger;
use crate::model::{report, Parameters};
use crate::output::{self, ExperimentOutput};
use crate::settings::{self, Settings};
use crate::simulator::{ExperimentResults, Simulation, Simulator};

/// Prefix of the files written for the whole run
const RUN_PREFIX: &str = "empagliflozin";

/// Files and experiments of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub experiments: Vec<String>,
    pub outputs: Vec<ExperimentOutput>,
    pub figures_dir: PathBuf,
}

/// Primary entrypoint: runs the selected experiments and writes their results
///
/// The experiments are the members of `config.analysis` together with `config.experiments`.
/// Into the results directory are written:
/// - `settings.json`: the resolved settings
/// - `model/`: description of the model (if `config.model_report`)
/// - `<Experiment>/`: results, tables and figures of every experiment
/// - `_figures/`: the figures of all experiments
/// - `empagliflozin_fit_parameters.tsv` and `empagliflozin_fit_mappings.tsv` (if `config.fit_tables`)
pub fn run(settings: Settings) -> Result<RunSummary> {
    let now = Instant::now();
    // an invalid selection or solver fails before anything is written
    let experiments = experiments::select(
        settings.config.analysis.as_deref(),
        &settings.config.experiments,
    )?;
    settings.solver.validate()?;

    let results_dir = settings.paths.results.clone();
    std::fs::create_dir_all(&results_dir)
        .wrap_err_with(|| format!("Could not create {}", results_dir.display()))?;
    let log_file = settings.paths.log.as_ref().map(|log| results_dir.join(log));
    logger::setup_log(&settings.config.log_level, log_file.as_deref())?;
    tracing::info!("Starting empagliflozin");

    let sids: Vec<String> = experiments.iter().map(|e| e.sid().to_string()).collect();
    tracing::info!("Selected experiments: {}", sids.join(", "));
    tracing::info!("Output files will be written to {}", results_dir.display());
    settings::write_settings_to_file(&settings, &results_dir)
        .wrap_err("Could not write settings")?;

    if settings.config.model_report {
        report::write_model_report(&Parameters::default(), &results_dir.join("model"))?;
    }

    let simulator = Simulator::new(
        settings.solver.rtol,
        settings.solver.atol,
        settings.config.parallel,
    );
    let mut outputs = Vec::with_capacity(experiments.len());
    for experiment in &experiments {
        let dir = results_dir.join(experiment.sid());
        let output = match run_experiment(&simulator, experiment.as_ref(), &dir) {
            Ok(output) => output,
            Err(err) => {
                tracing::error!("Experiment {} failed: {}", experiment.sid(), err);
                return Err(err);
            }
        };
        outputs.push(output);
    }

    let figures: Vec<PathBuf> = outputs.iter().flat_map(|o| o.figures.clone()).collect();
    let figures_dir = output::collect_figures(&results_dir, &figures)?;

    if settings.config.fit_tables {
        write_fit_tables(&results_dir, &experiments)?;
    }

    tracing::info!("Program complete after {:.2?}", now.elapsed());
    Ok(RunSummary {
        experiments: sids,
        outputs,
        figures_dir,
    })
}

/// Simulates every task of an experiment
pub fn simulate_experiment(
    simulator: &Simulator,
    experiment: &dyn SimulationExperiment,
) -> Result<ExperimentResults> {
    let simulations: Vec<_> = experiment.simulations().into_iter().collect();
    let simulate = |(task, simulation): (String, Simulation)| {
        simulator
            .run(&simulation)
            .map(|result| (task.clone(), result))
            .wrap_err_with(|| format!("Simulation {}/{} failed", experiment.sid(), task))
    };
    let results: Vec<_> = if simulator.parallel() {
        simulations.into_par_iter().map(simulate).collect::<Result<Vec<_>>>()?
    } else {
        simulations.into_iter().map(simulate).collect::<Result<Vec<_>>>()?
    };
    Ok(results.into_iter().collect())
}

/// Simulates an experiment and writes its output into `dir`
pub fn run_experiment(
    simulator: &Simulator,
    experiment: &dyn SimulationExperiment,
    dir: &Path,
) -> Result<ExperimentOutput> {
    let now = Instant::now();
    let results = simulate_experiment(simulator, experiment)?;
    tracing::info!(
        "{}: {} simulations in {:.2?}",
        experiment.sid(),
        results.len(),
        now.elapsed()
    );

    let figures = experiment.figures(&results)?;
    let tables = experiment.tables(&results)?;
    output::write_experiment(dir, experiment, &results, &tables, &figures)
}

/// Writes the fit parameters and the fit mappings of all experiments
fn write_fit_tables(dir: &Path, experiments: &[Box<dyn SimulationExperiment>]) -> Result<()> {
    fitting::parameter_table().write(dir, RUN_PREFIX)?;

    let mut mappings = fitting::mapping_table(RUN_PREFIX, &[]);
    for experiment in experiments {
        let table = fitting::mapping_table(experiment.sid(), &experiment.fit_mappings());
        mappings.rows.extend(table.rows);
    }
    tracing::debug!("{} fit mappings", mappings.len());
    mappings.write(dir, RUN_PREFIX)?;
    Ok(())
}

/// Description of the analysis groups and experiments
pub fn list() -> Result<String> {
    let mut text = String::from("Analysis groups:\n");
    for name in GROUPS {
        let members = experiments::group(name)?;
        writeln!(text, "  {name:<20} {}", members.join(", "))?;
    }
    text.push_str("\nExperiments:\n");
    for name in EXPERIMENTS {
        writeln!(text, "  {name}")?;
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_contains_groups() {
        let text = list().unwrap();
        for name in GROUPS.iter().chain(EXPERIMENTS.iter()) {
            assert!(text.contains(name), "{name}");
        }
    }

    #[test]
    fn run_without_selection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.results = dir.path().to_path_buf();
        let err = run(settings).unwrap_err();
        assert!(err.to_string().contains("renal_impairment"));
    }

    #[test]
    fn invalid_selection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let mut settings = Settings::default();
        settings.paths.results = results.clone();
        settings.paths.log = Some(PathBuf::from("empagliflozin.log"));
        settings.config.analysis = Some("everything".to_string());

        assert!(run(settings).is_err());
        assert!(!results.exists());
    }

    #[test]
    fn invalid_tolerance_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let mut settings = Settings::default();
        settings.paths.results = results.clone();
        settings.config.experiments = vec!["Ayoub2017".to_string()];
        settings.solver.rtol = -1.0;

        let err = run(settings).unwrap_err();
        assert!(err.to_string().contains("solver.rtol"));
        assert!(!results.exists());
    }
}
