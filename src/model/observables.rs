use serde_derive::Serialize;

use super::body::Derived;
use super::equations::{glucose_excretion, kidney_emp, renal_threshold};
use super::parameters::Parameters;
use super::state::*;

pub const N_OBSERVABLES: usize = 19;

/// Quantities reported by every simulation, in model units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Observable {
    Time,
    PoDose,
    IvDose,
    CveEmp,
    CveEg,
    CveEmpTot,
    UrineEmp,
    UrineEg,
    UrineEmpTot,
    FecesEmp,
    FecesEg,
    FecesEmpTot,
    GlcUrine,
    Glcex,
    Uge,
    Rtg,
    Fpg,
    RenalFunction,
    Cirrhosis,
}

impl Observable {
    pub const ALL: [Observable; N_OBSERVABLES] = [
        Observable::Time,
        Observable::PoDose,
        Observable::IvDose,
        Observable::CveEmp,
        Observable::CveEg,
        Observable::CveEmpTot,
        Observable::UrineEmp,
        Observable::UrineEg,
        Observable::UrineEmpTot,
        Observable::FecesEmp,
        Observable::FecesEg,
        Observable::FecesEmpTot,
        Observable::GlcUrine,
        Observable::Glcex,
        Observable::Uge,
        Observable::Rtg,
        Observable::Fpg,
        Observable::RenalFunction,
        Observable::Cirrhosis,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Observable::Time => "time",
            Observable::PoDose => "PODOSE_emp",
            Observable::IvDose => "IVDOSE_emp",
            Observable::CveEmp => "[Cve_emp]",
            Observable::CveEg => "[Cve_eg]",
            Observable::CveEmpTot => "[Cve_emptot]",
            Observable::UrineEmp => "Aurine_emp",
            Observable::UrineEg => "Aurine_eg",
            Observable::UrineEmpTot => "Aurine_emptot",
            Observable::FecesEmp => "Afeces_emp",
            Observable::FecesEg => "Afeces_eg",
            Observable::FecesEmpTot => "Afeces_emptot",
            Observable::GlcUrine => "KI__glc_urine",
            Observable::Glcex => "KI__GLCEX",
            Observable::Uge => "KI__UGE",
            Observable::Rtg => "KI__RTG",
            Observable::Fpg => "[KI__fpg]",
            Observable::RenalFunction => "KI__f_renal_function",
            Observable::Cirrhosis => "f_cirrhosis",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Observable::Time => "min",
            Observable::PoDose | Observable::IvDose => "mg",
            Observable::CveEmp | Observable::CveEg | Observable::CveEmpTot => "mM",
            Observable::UrineEmp
            | Observable::UrineEg
            | Observable::UrineEmpTot
            | Observable::FecesEmp
            | Observable::FecesEg
            | Observable::FecesEmpTot
            | Observable::GlcUrine => "mmol",
            Observable::Glcex => "mmol/min",
            Observable::Uge => "g",
            Observable::Rtg | Observable::Fpg => "mM",
            Observable::RenalFunction | Observable::Cirrhosis => "-",
        }
    }

    pub fn from_id(id: &str) -> Option<Observable> {
        Observable::ALL.iter().copied().find(|o| o.id() == id)
    }

    /// Column of the observable in result tables
    pub fn column(&self) -> usize {
        *self as usize
    }

    pub fn value(&self, p: &Parameters, d: &Derived, time: f64, y: &State) -> f64 {
        match self {
            Observable::Time => time,
            Observable::PoDose => y[PODOSE_EMP],
            Observable::IvDose => y[IVDOSE_EMP],
            Observable::CveEmp => y[AVE + EMP] / d.v_ve,
            Observable::CveEg => y[AVE + EG] / d.v_ve,
            Observable::CveEmpTot => (y[AVE + EMP] + y[AVE + EG]) / d.v_ve,
            Observable::UrineEmp => y[URINE + EMP],
            Observable::UrineEg => y[URINE + EG],
            Observable::UrineEmpTot => y[URINE + EMP] + y[URINE + EG],
            Observable::FecesEmp => y[FECES + EMP],
            Observable::FecesEg => y[FECES + EG],
            Observable::FecesEmpTot => y[FECES + EMP] + y[FECES + EG],
            Observable::GlcUrine => y[GLC_URINE],
            Observable::Glcex => glucose_excretion(p, d, kidney_emp(d, y)),
            Observable::Uge => y[GLC_URINE] * p.ki_mr_glc / 1000.0,
            Observable::Rtg => renal_threshold(p, d, kidney_emp(d, y)),
            Observable::Fpg => p.ki_fpg,
            Observable::RenalFunction => p.ki_f_renal_function,
            Observable::Cirrhosis => p.f_cirrhosis,
        }
    }
}
