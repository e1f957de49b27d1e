//! Layout of the state vector.
//!
//! All states are amounts in `mmol`, except the dose depots which are in `mg`.
//! Compartments holding both substances store empagliflozin at offset [EMP]
//! and the glucuronide at offset [EG].

pub const NSTATES: usize = 40;

/// State vector of the model
pub type State = nalgebra::SVector<f64, NSTATES>;

/// Offset of empagliflozin within a substance pair
pub const EMP: usize = 0;
/// Offset of empagliflozin-glucuronide within a substance pair
pub const EG: usize = 1;
pub const SUBSTANCES: [usize; 2] = [EMP, EG];

/// Number of transit segments in the intestine
pub const N_INTESTINE: usize = 5;

pub const PODOSE_EMP: usize = 0;
pub const IVDOSE_EMP: usize = 1;
pub const LUMEN: usize = 2;
const INTESTINE: usize = 4;
pub const FECES: usize = 14;
pub const AGU: usize = 16;
pub const APO: usize = 18;
pub const ALI: usize = 20;
pub const LI_CELL: usize = 22;
pub const AHV: usize = 24;
pub const AKI: usize = 26;
pub const URINE: usize = 28;
pub const GLC_URINE: usize = 30;
pub const AVE: usize = 31;
pub const ALU: usize = 33;
pub const AAR: usize = 35;
pub const ARE: usize = 37;
pub const XRE_EMP: usize = 39;

/// Index of intestinal transit segment `k` of a substance
pub const fn intestine(substance: usize, k: usize) -> usize {
    INTESTINE + substance * N_INTESTINE + k
}

/// Static information about a state
#[derive(Debug, Clone, Copy, PartialEq, serde_derive::Serialize)]
pub struct StateInfo {
    pub id: &'static str,
    pub unit: &'static str,
    pub name: &'static str,
}

const fn info(id: &'static str, unit: &'static str, name: &'static str) -> StateInfo {
    StateInfo { id, unit, name }
}

pub const STATES: [StateInfo; NSTATES] = [
    info("PODOSE_emp", "mg", "oral dose empagliflozin"),
    info("IVDOSE_emp", "mg", "intravenous dose empagliflozin"),
    info("GU__emp_lumen", "mmol", "empagliflozin (intestinal lumen)"),
    info("GU__eg_lumen", "mmol", "empagliflozin-glucuronide (intestinal lumen)"),
    info("GU__emp_intestine_0", "mmol", "empagliflozin (transit 0)"),
    info("GU__emp_intestine_1", "mmol", "empagliflozin (transit 1)"),
    info("GU__emp_intestine_2", "mmol", "empagliflozin (transit 2)"),
    info("GU__emp_intestine_3", "mmol", "empagliflozin (transit 3)"),
    info("GU__emp_intestine_4", "mmol", "empagliflozin (transit 4)"),
    info("GU__eg_intestine_0", "mmol", "empagliflozin-glucuronide (transit 0)"),
    info("GU__eg_intestine_1", "mmol", "empagliflozin-glucuronide (transit 1)"),
    info("GU__eg_intestine_2", "mmol", "empagliflozin-glucuronide (transit 2)"),
    info("GU__eg_intestine_3", "mmol", "empagliflozin-glucuronide (transit 3)"),
    info("GU__eg_intestine_4", "mmol", "empagliflozin-glucuronide (transit 4)"),
    info("GU__emp_feces", "mmol", "empagliflozin (feces)"),
    info("GU__eg_feces", "mmol", "empagliflozin-glucuronide (feces)"),
    info("Agu_emp", "mmol", "empagliflozin (gut extracellular)"),
    info("Agu_eg", "mmol", "empagliflozin-glucuronide (gut extracellular)"),
    info("Apo_emp", "mmol", "empagliflozin (portal vein)"),
    info("Apo_eg", "mmol", "empagliflozin-glucuronide (portal vein)"),
    info("Ali_emp", "mmol", "empagliflozin (liver extracellular)"),
    info("Ali_eg", "mmol", "empagliflozin-glucuronide (liver extracellular)"),
    info("LI__emp", "mmol", "empagliflozin (hepatocytes)"),
    info("LI__eg", "mmol", "empagliflozin-glucuronide (hepatocytes)"),
    info("Ahv_emp", "mmol", "empagliflozin (hepatic vein)"),
    info("Ahv_eg", "mmol", "empagliflozin-glucuronide (hepatic vein)"),
    info("Aki_emp", "mmol", "empagliflozin (kidney extracellular)"),
    info("Aki_eg", "mmol", "empagliflozin-glucuronide (kidney extracellular)"),
    info("KI__emp_urine", "mmol", "empagliflozin (urine)"),
    info("KI__eg_urine", "mmol", "empagliflozin-glucuronide (urine)"),
    info("KI__glc_urine", "mmol", "glucose (urine)"),
    info("Ave_emp", "mmol", "empagliflozin (venous plasma)"),
    info("Ave_eg", "mmol", "empagliflozin-glucuronide (venous plasma)"),
    info("Alu_emp", "mmol", "empagliflozin (lung extracellular)"),
    info("Alu_eg", "mmol", "empagliflozin-glucuronide (lung extracellular)"),
    info("Aar_emp", "mmol", "empagliflozin (arterial plasma)"),
    info("Aar_eg", "mmol", "empagliflozin-glucuronide (arterial plasma)"),
    info("Are_emp", "mmol", "empagliflozin (rest extracellular)"),
    info("Are_eg", "mmol", "empagliflozin-glucuronide (rest extracellular)"),
    info("Xre_emp", "mmol", "empagliflozin (rest tissue)"),
];

/// Resolve a state identifier, including the urine and feces aliases
pub fn index(id: &str) -> Option<usize> {
    match id {
        "Aurine_emp" => Some(URINE + EMP),
        "Aurine_eg" => Some(URINE + EG),
        "Afeces_emp" => Some(FECES + EMP),
        "Afeces_eg" => Some(FECES + EG),
        _ => STATES.iter().position(|info| info.id == id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_info() {
        assert_eq!(STATES[LUMEN + EG].id, "GU__eg_lumen");
        assert_eq!(STATES[intestine(EMP, 0)].id, "GU__emp_intestine_0");
        assert_eq!(STATES[intestine(EG, N_INTESTINE - 1)].id, "GU__eg_intestine_4");
        assert_eq!(STATES[FECES + EG].id, "GU__eg_feces");
        assert_eq!(STATES[LI_CELL].id, "LI__emp");
        assert_eq!(STATES[GLC_URINE].id, "KI__glc_urine");
        assert_eq!(STATES[AVE + EG].id, "Ave_eg");
        assert_eq!(STATES[XRE_EMP].id, "Xre_emp");
    }

    #[test]
    fn aliases() {
        assert_eq!(index("Aurine_emp"), Some(URINE));
        assert_eq!(index("Afeces_eg"), Some(FECES + EG));
        assert_eq!(index("PODOSE_emp"), Some(PODOSE_EMP));
        assert_eq!(index("[Cve_emp]"), None);
    }
}
