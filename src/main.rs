use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use empagliflozin::prelude::*;
use eyre::{Result, WrapErr};

/// Simulation experiments of the empagliflozin PBPK/PD model
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Analysis group, e.g. `all`, `studies` or `renal_impairment`
    #[arg(short, long)]
    analysis: Option<String>,

    /// Results directory
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Experiment to run in addition to the analysis group, can be repeated
    #[arg(long = "experiment", value_name = "NAME")]
    experiments: Vec<String>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,

    /// List analysis groups and experiments
    #[arg(long)]
    list: bool,

    /// Only write the model description into the results directory
    #[arg(long)]
    model: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = read_settings(self.config.as_deref()).wrap_err("Could not read settings")?;
        if let Some(analysis) = &self.analysis {
            settings.config.analysis = Some(analysis.clone());
        }
        if let Some(results) = &self.results {
            settings.paths.results = results.clone();
        }
        settings.config.experiments.extend(self.experiments.iter().cloned());
        if let Some(level) = &self.log_level {
            settings.config.log_level = level.clone();
        }
        Ok(settings)
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        print!("{}", entrypoints::list()?);
        return Ok(());
    }
    let settings = cli.settings()?;
    if cli.model {
        let dir = settings.paths.results.join("model");
        empagliflozin::model::report::write_model_report(&Parameters::default(), &dir)?;
        println!("Model written to {}", dir.display());
        return Ok(());
    }
    entrypoints::run(settings)?;
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
