//! Constants, default changes and display conventions shared by all experiments

use crate::model::Observable;
use crate::output::figures::Trace;
use crate::simulator::{Changes, Timecourse, TimecourseResult};

/// Healthy reference fasting plasma glucose [mM]
pub const FPG_HEALTHY: f64 = 6.5;
/// Healthy reference glomerular filtration rate [ml/min]
pub const GFR_HEALTHY: f64 = 100.0;
/// Healthy reference body weight [kg]
pub const BODYWEIGHT_HEALTHY: f64 = 75.0;

/// Molecular weight of empagliflozin [g/mol]
pub const MR_EMP: f64 = 450.909;
/// Molecular weight of empagliflozin-glucuronide [g/mol]
pub const MR_EG: f64 = 627.0;

pub const HOUR: f64 = 60.0;
pub const DAY: f64 = 24.0 * HOUR;

/// Default number of output intervals of a timecourse
pub const STEPS: usize = 500;

pub const RENAL_MAP: [(&str, f64); 4] = [
    ("Normal renal function", 101.0 / 101.0),
    ("Mild renal impairment", 69.5 / 101.0),
    ("Moderate renal impairment", 32.5 / 101.0),
    ("Severe renal impairment", 19.5 / 101.0),
];

pub const CIRRHOSIS_MAP: [(&str, f64); 4] = [
    ("Control", 0.0),
    ("Mild cirrhosis", 0.3994897959183674),
    ("Moderate cirrhosis", 0.6979591836734694),
    ("Severe cirrhosis", 0.8127551020408164),
];

pub const CIRRHOSIS_COLORS: [&str; 4] = ["black", "#74a9cf", "#2b8cbe", "#045a8d"];
pub const RENAL_COLORS: [&str; 4] = ["black", "#66c2a4", "#2ca25f", "#006d2c"];

const DOSE_COLORS: [(f64, &str); 12] = [
    (0.0, "black"),
    (0.5, "#FFF44F"),
    (1.0, "#FFD700"),
    (2.5, "#FFA500"),
    (5.0, "#FF8C00"),
    (10.0, "#FF6B35"),
    (25.0, "#FF5722"),
    (50.0, "#F4511E"),
    (100.0, "#E53935"),
    (200.0, "#C62828"),
    (400.0, "#B71C1C"),
    (800.0, "#8B0000"),
];

const GLUCOSE_COLORS: [(f64, &str); 7] = [
    (5.0, "black"),
    (6.0, "#F5B8D8"),
    (7.0, "#EFA3CB"),
    (8.0, "#E88EBE"),
    (9.0, "#E279B1"),
    (10.0, "#DB64A4"),
    (11.0, "#D44F97"),
];

/// Value of a renal function or cirrhosis map by name
pub fn lookup(map: &[(&str, f64)], key: &str) -> Option<f64> {
    map.iter().find(|(name, _)| *name == key).map(|(_, value)| *value)
}

/// Color of a dose in `mg`, grey for doses without an assigned color
pub fn dose_color(dose: f64) -> &'static str {
    DOSE_COLORS
        .iter()
        .find(|(d, _)| (d - dose).abs() < 1e-9)
        .map(|(_, color)| *color)
        .unwrap_or("grey")
}

pub fn glucose_color(glucose: f64) -> &'static str {
    GLUCOSE_COLORS
        .iter()
        .find(|(g, _)| (g - glucose).abs() < 1e-9)
        .map(|(_, color)| *color)
        .unwrap_or("grey")
}

/// Fitted parameter values applied to every simulation
pub fn default_changes() -> Changes {
    Changes::new()
        // pharmacokinetics
        .with("ftissue_emp", 0.3832934310804301)
        .with("Kp_emp", 0.573747586082099)
        .with("GU__EMPABS_k", 0.007439770316739214)
        .with("GU__METEXC_k", 0.0008998014627372138)
        .with("LI__EMP2EG_Vmax", 0.012490394598835162)
        .with("LI__EMP2EG_Km_emp", 0.24667266695912698)
        .with("LI__EGEX_k", 0.014033858848302178)
        .with("LI__EGBIEX_k", 0.00735528424770721)
        .with("KI__EMPEX_k", 0.11795401426241267)
        .with("KI__EGEX_k", 1.4994487519741735)
        // pharmacodynamics
        .with("KI__RTG_E50", 1.7063026384665662e-06)
        .with("KI__RTG_base", 12.397702595815295)
        .with("KI__RTG_max_inhibition", 0.6842787312726607)
        .with("KI__RTG_m_fpg", 0.8981650940449492)
}

/// Changes of the first timecourse: default changes, optional body weight and glucose, oral dose
pub fn initial_changes(bodyweight: Option<f64>, fpg: Option<f64>, dose: f64) -> Changes {
    let mut changes = default_changes();
    if let Some(bodyweight) = bodyweight {
        changes.insert("BW", bodyweight);
    }
    if let Some(fpg) = fpg {
        changes.insert("[KI__fpg]", fpg);
    }
    changes.insert("PODOSE_emp", dose);
    changes
}

/// A timecourse of `hours` duration starting at zero
pub fn timecourse(hours: f64, steps: usize, changes: Changes) -> Timecourse {
    Timecourse::new(0.0, hours * HOUR, steps, changes)
}

pub fn label(observable: Observable) -> &'static str {
    match observable {
        Observable::Time => "Time",
        Observable::PoDose => "Empagliflozin dose (po)",
        Observable::IvDose => "Empagliflozin dose (iv)",
        Observable::CveEmp => "Empagliflozin Plasma",
        Observable::CveEg => "Empagliflozin-glucuronide Plasma",
        Observable::CveEmpTot => "Empagliflozin Total Plasma",
        Observable::UrineEmp => "Empagliflozin Urine",
        Observable::UrineEg => "Empagliflozin-glucuronide Urine",
        Observable::UrineEmpTot => "Empagliflozin Total Urine",
        Observable::FecesEmp => "Empagliflozin Feces",
        Observable::FecesEg => "Empagliflozin-glucuronide Feces",
        Observable::FecesEmpTot => "Empagliflozin Total Feces",
        Observable::GlcUrine => "Glucose Urine",
        Observable::Glcex => "Glucose excretion",
        Observable::Uge => "UGE",
        Observable::Rtg => "RTG",
        Observable::Fpg => "Glucose",
        Observable::RenalFunction => "Renal function",
        Observable::Cirrhosis => "Cirrhosis degree",
    }
}

/// Unit of an observable in figures
pub fn unit(observable: Observable) -> &'static str {
    match observable {
        Observable::Time => "hr",
        Observable::CveEmp | Observable::CveEg | Observable::CveEmpTot => "µM",
        Observable::UrineEmp
        | Observable::UrineEg
        | Observable::UrineEmpTot
        | Observable::FecesEmp
        | Observable::FecesEg
        | Observable::FecesEmpTot
        | Observable::GlcUrine => "µmole",
        other => other.unit(),
    }
}

/// Factor converting model units into figure units
pub fn factor(observable: Observable) -> f64 {
    match observable {
        Observable::Time => 1.0 / HOUR,
        Observable::CveEmp
        | Observable::CveEg
        | Observable::CveEmpTot
        | Observable::UrineEmp
        | Observable::UrineEg
        | Observable::UrineEmpTot
        | Observable::FecesEmp
        | Observable::FecesEg
        | Observable::FecesEmpTot
        | Observable::GlcUrine => 1000.0,
        _ => 1.0,
    }
}

/// Axis title of an observable, e.g. `Empagliflozin Plasma [µM]`
pub fn axis_label(observable: Observable) -> String {
    format!("{} [{}]", label(observable), unit(observable))
}

/// Values of an observable in figure units
pub fn display(result: &TimecourseResult, observable: Observable) -> Vec<f64> {
    let factor = factor(observable);
    result.column(observable).iter().map(|v| v * factor).collect()
}

/// Timecourse of an observable in figure units
pub fn trace(result: &TimecourseResult, observable: Observable, name: impl Into<String>) -> Trace {
    Trace::new(
        name,
        display(result, Observable::Time),
        display(result, observable),
    )
}

/// Label of a dose in a legend
pub fn dose_label(dose: f64) -> String {
    if dose == 0.0 {
        "Placebo".to_string()
    } else {
        format!("{dose} mg Emp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[test]
    fn default_changes_address_parameters() {
        let mut model = Model::default();
        default_changes().apply(&mut model).unwrap();
        assert_eq!(model.parameters().kp_emp, 0.573747586082099);
        assert_eq!(model.parameters().ki_rtg_base, 12.397702595815295);
    }

    #[test]
    fn maps_and_colors() {
        assert_eq!(lookup(&RENAL_MAP, "Normal renal function"), Some(1.0));
        assert_eq!(lookup(&CIRRHOSIS_MAP, "Control"), Some(0.0));
        assert_eq!(lookup(&CIRRHOSIS_MAP, "Unknown"), None);
        assert_eq!(dose_color(25.0), "#FF5722");
        assert_eq!(dose_color(3.0), "grey");
        assert_eq!(glucose_color(5.0), "black");
        assert_eq!(dose_label(0.0), "Placebo");
        assert_eq!(dose_label(2.5), "2.5 mg Emp");
    }

    #[test]
    fn initial_changes_carry_dose() {
        let changes = initial_changes(Some(80.0), None, 25.0);
        assert_eq!(changes.get("BW"), Some(80.0));
        assert_eq!(changes.get("[KI__fpg]"), None);
        assert_eq!(changes.get("PODOSE_emp"), Some(25.0));
        assert_eq!(changes.len(), 16);
    }

    #[test]
    fn display_units() {
        assert_eq!(axis_label(Observable::CveEmp), "Empagliflozin Plasma [µM]");
        assert_eq!(factor(Observable::Time), 1.0 / 60.0);
        assert_eq!(unit(Observable::Uge), "g");
    }
}
