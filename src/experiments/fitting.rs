//! Parameter fitting problems: parameter bounds, fit mappings and their filters
//!
//! Fitting itself is not performed, the definitions are exported as tables.

use serde_derive::Serialize;

use super::metadata::{Coadministration, Fasting, Health, MappingMetaData, Route};
use crate::output::Table;

/// A fitted parameter with its bounds and start value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitParameter {
    pub pid: &'static str,
    pub lower: f64,
    pub start: f64,
    pub upper: f64,
    pub unit: &'static str,
}

const fn parameter(pid: &'static str, lower: f64, start: f64, upper: f64, unit: &'static str) -> FitParameter {
    FitParameter {
        pid,
        lower,
        start,
        upper,
        unit,
    }
}

pub const PK_PARAMETERS: [FitParameter; 10] = [
    parameter("ftissue_emp", 0.01, 0.1, 10.0, "l/min"),
    parameter("Kp_emp", 0.1, 1.0, 10.0, "dimensionless"),
    parameter("GU__EMPABS_k", 1e-4, 0.01, 1.0, "1/min"),
    parameter("GU__METEXC_k", 1e-6, 0.001, 0.1, "1/min"),
    parameter("LI__EMP2EG_Vmax", 1e-3, 0.01, 100.0, "mmol/min/l"),
    parameter("LI__EMP2EG_Km_emp", 1e-3, 0.02, 1.0, "mM"),
    parameter("LI__EGEX_k", 1e-3, 0.01, 100.0, "1/min"),
    parameter("LI__EGBIEX_k", 1e-5, 0.01, 1.0, "1/min"),
    parameter("KI__EMPEX_k", 1e-4, 0.1, 10.0, "1/min"),
    parameter("KI__EGEX_k", 1e-4, 0.1, 10.0, "1/min"),
];

pub const PD_PARAMETERS: [FitParameter; 4] = [
    parameter("KI__RTG_E50", 1e-8, 2.5e-6, 44.0, "mM"),
    parameter("KI__RTG_base", 9.0, 12.5, 14.0, "mM"),
    parameter("KI__RTG_max_inhibition", 0.2, 0.75, 1.0, "dimensionless"),
    parameter("KI__RTG_m_fpg", 0.2, 1.0, 3.0, "dimensionless"),
];

/// Observables fitted in the pharmacokinetic problem
pub const PK_OBSERVABLES: [&str; 9] = [
    "[Cve_emp]",
    "[Cve_eg]",
    "[Cve_emptot]",
    "Aurine_emp",
    "Aurine_eg",
    "Aurine_emptot",
    "Afeces_emp",
    "Afeces_eg",
    "Afeces_emptot",
];

/// Observables fitted in the pharmacodynamic problem
pub const PD_OBSERVABLES: [&str; 2] = ["KI__RTG", "KI__UGE"];

/// Maps a simulated observable of a task onto clinical data of a study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitMapping {
    pub key: String,
    pub task: String,
    pub observable: &'static str,
    pub metadata: MappingMetaData,
}

impl FitMapping {
    pub fn new(task: impl Into<String>, observable: &'static str, metadata: MappingMetaData) -> Self {
        let task = task.into();
        FitMapping {
            key: format!("fm_{}_{}", observable.trim_matches(['[', ']']), task),
            task,
            observable,
            metadata,
        }
    }

    /// Names the mapping after a data subset, for several data sets compared to one task
    pub fn dataset(mut self, dataset: &str) -> Self {
        self.key = format!("fm_{}_{}", self.observable.trim_matches(['[', ']']), dataset);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FitProblem {
    Pk,
    Pd,
}

impl FitProblem {
    pub fn parameters(&self) -> &'static [FitParameter] {
        match self {
            FitProblem::Pk => &PK_PARAMETERS,
            FitProblem::Pd => &PD_PARAMETERS,
        }
    }

    pub fn observables(&self) -> &'static [&'static str] {
        match self {
            FitProblem::Pk => &PK_OBSERVABLES,
            FitProblem::Pd => &PD_OBSERVABLES,
        }
    }

    /// Whether the mapping is part of this fit problem
    pub fn includes(&self, mapping: &FitMapping) -> bool {
        is_control(&mapping.metadata) && self.observables().contains(&mapping.observable)
    }
}

/// Control data: oral or intravenous application without coadministration in healthy,
/// diabetic or hypertensive subjects, fasted or not reported, no outliers
pub fn is_control(metadata: &MappingMetaData) -> bool {
    matches!(metadata.route, Route::Po | Route::Iv)
        && metadata.coadministration == Coadministration::None
        && matches!(
            metadata.health,
            Health::Healthy | Health::T2dm | Health::Hypertension
        )
        && matches!(metadata.fasting, Fasting::Fasted | Fasting::NotReported)
        && !metadata.outlier
}

/// Table of the fitted parameters of all problems
pub fn parameter_table() -> Table {
    let mut table = Table::new(
        "fit_parameters",
        ["problem", "pid", "lower", "start", "upper", "unit"],
    );
    for problem in [FitProblem::Pk, FitProblem::Pd] {
        let name = match problem {
            FitProblem::Pk => "pk",
            FitProblem::Pd => "pd",
        };
        for p in problem.parameters() {
            table.push([
                name.to_string(),
                p.pid.to_string(),
                p.lower.to_string(),
                p.start.to_string(),
                p.upper.to_string(),
                p.unit.to_string(),
            ]);
        }
    }
    table
}

/// Table of fit mappings of an experiment with their metadata and problem membership
pub fn mapping_table(sid: &str, mappings: &[FitMapping]) -> Table {
    let mut header = vec!["experiment", "mapping", "task", "observable"];
    header.extend(MappingMetaData::HEADER);
    header.extend(["pk", "pd"]);
    let mut table = Table::new("fit_mappings", header);
    for mapping in mappings {
        let mut row = vec![
            sid.to_string(),
            mapping.key.clone(),
            mapping.task.clone(),
            mapping.observable.to_string(),
        ];
        row.extend(mapping.metadata.record());
        row.push(FitProblem::Pk.includes(mapping).to_string());
        row.push(FitProblem::Pd.includes(mapping).to_string());
        table.push(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::base::default_changes;
    use crate::experiments::metadata::{Dosing, Tissue};

    fn mapping(observable: &'static str, metadata: MappingMetaData) -> FitMapping {
        FitMapping::new("po_emp25", observable, metadata)
    }

    #[test]
    fn defaults_within_bounds() {
        let defaults = default_changes();
        for p in PK_PARAMETERS.iter().chain(PD_PARAMETERS.iter()) {
            assert!(p.lower <= p.start && p.start <= p.upper, "{}", p.pid);
            let value = defaults.get(p.pid).unwrap();
            assert!(p.lower <= value && value <= p.upper, "{}", p.pid);
        }
    }

    #[test]
    fn control_filter() {
        let healthy = MappingMetaData::new(Tissue::Plasma, Dosing::Single, Health::Healthy, Fasting::Fasted);
        assert!(is_control(&healthy));
        assert!(!is_control(&healthy.outlier(true)));
        assert!(!is_control(&healthy.coadministration(Coadministration::Sitagliptin)));

        let mut fed = healthy;
        fed.fasting = Fasting::Fed;
        assert!(!is_control(&fed));

        let mut cirrhosis = healthy;
        cirrhosis.health = Health::HepaticImpairment;
        assert!(!is_control(&cirrhosis));
    }

    #[test]
    fn problems_split_observables() {
        let metadata = MappingMetaData::new(Tissue::Urine, Dosing::Single, Health::T2dm, Fasting::NotReported);
        let uge = mapping("KI__UGE", metadata);
        let plasma = mapping("[Cve_emp]", metadata);
        assert!(FitProblem::Pd.includes(&uge));
        assert!(!FitProblem::Pk.includes(&uge));
        assert!(FitProblem::Pk.includes(&plasma));
        assert_eq!(plasma.key, "fm_Cve_emp_po_emp25");
    }

    #[test]
    fn tables() {
        assert_eq!(parameter_table().rows.len(), 14);
        let metadata = MappingMetaData::new(Tissue::Plasma, Dosing::Single, Health::Healthy, Fasting::Fasted);
        let table = mapping_table("Ayoub2017", &[mapping("[Cve_emp]", metadata)]);
        assert_eq!(table.header.len(), 14);
        assert_eq!(table.rows[0][12], "true");
        assert_eq!(table.rows[0][13], "false");
    }
}
