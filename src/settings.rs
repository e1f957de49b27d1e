use std::path::{Path, PathBuf};

use config::Config as eConfig;
use serde_derive::{Deserialize, Serialize};

use crate::simulator::{ATOL, RTOL};

/// Settings of a run, read from an optional TOML file and `EMPAGLIFLOZIN__*` environment variables
///
/// Every field has a default, an empty configuration is valid. Command line arguments
/// take precedence over the values read here.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
pub struct Settings {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub solver: Solver,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Paths {
    /// Results directory
    #[serde(default = "default_results")]
    pub results: PathBuf,
    /// Log file, relative paths are resolved against the results directory
    pub log: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Config {
    /// Analysis group to run
    pub analysis: Option<String>,
    /// Experiments to run in addition to the analysis group
    #[serde(default)]
    pub experiments: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Run the simulations of an experiment in parallel
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Write the model description next to the results
    #[serde(default = "default_true")]
    pub model_report: bool,
    /// Write the fit parameters and mappings of the selected experiments
    #[serde(default = "default_true")]
    pub fit_tables: bool,
}

/// Tolerances of the adaptive step size control
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Solver {
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    /// Absolute tolerance [mmol]
    #[serde(default = "default_atol")]
    pub atol: f64,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            results: default_results(),
            log: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            analysis: None,
            experiments: Vec::new(),
            log_level: default_log_level(),
            parallel: true,
            model_report: true,
            fit_tables: true,
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            rtol: default_rtol(),
            atol: default_atol(),
        }
    }
}

pub fn read_settings(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let mut builder = eConfig::builder();
    if let Some(path) = path {
        builder = builder.add_source(
            config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
        );
    }
    let parsed = builder
        .add_source(
            config::Environment::with_prefix("EMPAGLIFLOZIN")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = parsed.try_deserialize()?;
    settings.solver.validate()?;
    Ok(settings)
}

impl Solver {
    /// Both tolerances must be positive and finite
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        for (name, value) in [("rtol", self.rtol), ("atol", self.atol)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(config::ConfigError::Message(format!(
                    "solver.{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Writes the resolved settings as `settings.json` into `dir`
pub fn write_settings_to_file(settings: &Settings, dir: &Path) -> Result<PathBuf, std::io::Error> {
    let serialized = serde_json::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let file_path = dir.join("settings.json");
    let mut file = std::fs::File::create(&file_path)?;
    std::io::Write::write_all(&mut file, serialized.as_bytes())?;
    Ok(file_path)
}

// *********************************
// Default values for deserializing
// *********************************
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_results() -> PathBuf {
    PathBuf::from("results")
}

fn default_rtol() -> f64 {
    RTOL
}

fn default_atol() -> f64 {
    ATOL
}
