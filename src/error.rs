use thiserror::Error;

/// Errors raised while building or running empagliflozin simulations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmpagliflozinError {
    /// A change refers to an identifier that is neither a parameter nor a state
    #[error("unknown change target `{0}`")]
    UnknownTarget(String),
    #[error("unknown observable `{0}`")]
    UnknownObservable(String),
    #[error("no results for task `{0}`")]
    UnknownTask(String),
    #[error("unknown analysis `{name}`, valid analyses are: {valid}")]
    UnknownAnalysis { name: String, valid: String },
    #[error("unknown experiment `{name}`, valid experiments are: {valid}")]
    UnknownExperiment { name: String, valid: String },
    #[error("no analysis selected, use --analysis or --experiment (valid analyses are: {valid})")]
    NoSelection { valid: String },
    #[error("invalid timecourse from {start} to {end} with {steps} steps")]
    InvalidTimecourse { start: f64, end: f64, steps: usize },
    #[error("scan dimension `{0}` is empty or has value lists of different length")]
    InvalidDimension(String),
    #[error("integration failed at t={time} min: {message}")]
    Integration { time: f64, message: String },
}

pub type Result<T> = std::result::Result<T, EmpagliflozinError>;
