use serde_derive::{Deserialize, Serialize};

/// Static information about a model parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub id: &'static str,
    pub unit: &'static str,
    pub name: &'static str,
}

/// Declares the [Parameters] struct together with identifier based access.
///
/// Every line maps a struct field to its identifier, default value, unit and description.
macro_rules! parameters {
    ($( $field:ident : $id:literal = $default:expr, $unit:literal, $name:literal; )*) => {
        /// Parameters of the whole-body model and its organ submodels
        ///
        /// Submodel parameters carry the prefix of their organ: `GU__` (intestine),
        /// `LI__` (liver) and `KI__` (kidney).
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct Parameters {
            $( pub $field: f64, )*
        }

        impl Default for Parameters {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl Parameters {
            pub const INFO: &'static [ParameterInfo] = &[
                $( ParameterInfo { id: $id, unit: $unit, name: $name }, )*
            ];

            /// Get a parameter value by identifier
            pub fn get(&self, id: &str) -> Option<f64> {
                match id {
                    $( $id => Some(self.$field), )*
                    _ => None,
                }
            }

            /// Mutable access to a parameter by identifier
            pub fn get_mut(&mut self, id: &str) -> Option<&mut f64> {
                match id {
                    $( $id => Some(&mut self.$field), )*
                    _ => None,
                }
            }
        }
    };
}

parameters! {
    // body
    bw: "BW" = 75.0, "kg", "body weight";
    cobw: "COBW" = 1.548, "ml/s/kg", "cardiac output per body weight";
    hct: "HCT" = 0.51, "-", "hematocrit";
    fv_gu: "FVgu" = 0.0171, "l/kg", "gut volume per body weight";
    fv_ki: "FVki" = 0.0044, "l/kg", "kidney volume per body weight";
    fv_li: "FVli" = 0.0210, "l/kg", "liver volume per body weight";
    fv_lu: "FVlu" = 0.0076, "l/kg", "lung volume per body weight";
    fv_ve: "FVve" = 0.0514, "l/kg", "venous blood volume per body weight";
    fv_ar: "FVar" = 0.0257, "l/kg", "arterial blood volume per body weight";
    fv_po: "FVpo" = 0.001, "l/kg", "portal vein volume per body weight";
    fv_hv: "FVhv" = 0.001, "l/kg", "hepatic vein volume per body weight";
    fq_gu: "FQgu" = 0.18, "-", "gut blood flow fraction of cardiac output";
    fq_ki: "FQki" = 0.19, "-", "kidney blood flow fraction of cardiac output";
    fq_h: "FQh" = 0.215, "-", "hepatic blood flow fraction of cardiac output";
    fext_gu: "Fext_gu" = 0.15, "-", "extracellular fraction of gut volume";
    fext_ki: "Fext_ki" = 0.2, "-", "extracellular fraction of kidney volume";
    fext_li: "Fext_li" = 0.25, "-", "extracellular fraction of liver volume";
    fext_lu: "Fext_lu" = 0.3, "-", "extracellular fraction of lung volume";
    fext_re: "Fext_re" = 0.15, "-", "extracellular fraction of rest volume";
    f_cirrhosis: "f_cirrhosis" = 0.0, "-", "degree of liver cirrhosis";
    ftissue_emp: "ftissue_emp" = 0.1, "l/min", "tissue distribution of empagliflozin";
    kp_emp: "Kp_emp" = 1.0, "-", "tissue/plasma partition coefficient of empagliflozin";
    mr_emp: "Mr_emp" = 450.909, "g/mol", "molecular weight empagliflozin";
    mr_eg: "Mr_eg" = 627.0, "g/mol", "molecular weight empagliflozin-glucuronide";
    ti_emp: "ti_emp" = 10.0, "s", "injection time of intravenous empagliflozin";
    ri_emp: "Ri_emp" = 0.0, "mg/min", "infusion rate of empagliflozin";

    // intestine
    gu_f_emp_abs: "GU__F_emp_abs" = 0.65, "-", "fraction of absorbed empagliflozin reaching the circulation";
    gu_empabs_k: "GU__EMPABS_k" = 0.01, "1/min", "rate of empagliflozin absorption";
    gu_metexc_k: "GU__METEXC_k" = 0.001, "1/min", "rate of fecal excretion";
    gu_ka_dis_emp: "GU__Ka_dis_emp" = 2.0, "1/hr", "dissolution rate of oral empagliflozin";
    gu_flumen: "GU__Flumen" = 0.9, "-", "lumen fraction of gut volume";

    // liver
    li_empim_k: "LI__EMPIM_k" = 100.0, "1/min", "rate of empagliflozin import";
    li_emp2eg_vmax: "LI__EMP2EG_Vmax" = 0.04, "mmol/min/l", "maximal rate of glucuronidation";
    li_emp2eg_km_emp: "LI__EMP2EG_Km_emp" = 0.02, "mM", "Km of empagliflozin glucuronidation";
    li_f_ugt: "LI__f_ugt" = 1.0, "-", "scaling factor UGT activity";
    li_egex_k: "LI__EGEX_k" = 10.0, "1/min", "rate of glucuronide export";
    li_egbiex_k: "LI__EGBIEX_k" = 0.0001, "1/min", "rate of biliary glucuronide excretion";

    // kidney
    ki_f_renal_function: "KI__f_renal_function" = 1.0, "-", "scaling factor renal function";
    ki_empex_k: "KI__EMPEX_k" = 0.003, "1/min", "rate of renal empagliflozin excretion";
    ki_egex_k: "KI__EGEX_k" = 0.01, "1/min", "rate of renal glucuronide excretion";
    ki_fpg: "KI__fpg" = 5.0, "mM", "fasting plasma glucose";
    ki_mr_glc: "KI__Mr_glc" = 180.0, "g/mol", "molecular weight glucose";
    ki_gfr_healthy: "KI__GFR_healthy" = 100.0, "ml/min", "glomerular filtration rate healthy";
    ki_rtg_e50: "KI__RTG_E50" = 71.9e-7, "mM", "half-maximal empagliflozin effect on renal threshold";
    ki_rtg_gamma: "KI__RTG_gamma" = 1.0, "-", "hill coefficient of renal threshold inhibition";
    ki_rtg_base: "KI__RTG_base" = 12.5, "mM", "renal threshold for glucose at healthy glucose";
    ki_rtg_m_fpg: "KI__RTG_m_fpg" = 0.5, "-", "slope of renal threshold with fasting glucose";
    ki_rtg_max_inhibition: "KI__RTG_max_inhibition" = 0.75, "-", "maximal inhibition of renal threshold";
    ki_fpg_healthy: "KI__fpg_healthy" = 5.0, "mM", "healthy fasting plasma glucose";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_identifier() {
        let mut p = Parameters::default();
        assert_eq!(p.get("BW"), Some(75.0));
        assert_eq!(p.get("KI__RTG_base"), Some(12.5));
        assert_eq!(p.get("unknown"), None);

        if let Some(value) = p.get_mut("LI__EMP2EG_Km_emp") {
            *value = 0.25;
        }
        assert_eq!(p.li_emp2eg_km_emp, 0.25);
    }

    #[test]
    fn info_is_complete() {
        let p = Parameters::default();
        for info in Parameters::INFO {
            assert!(p.get(info.id).is_some(), "missing {}", info.id);
        }
        let mut ids: Vec<&str> = Parameters::INFO.iter().map(|info| info.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), Parameters::INFO.len());
    }
}
