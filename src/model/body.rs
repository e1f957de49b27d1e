use serde_derive::Serialize;

use super::parameters::Parameters;

/// Quantities derived from the [Parameters] by assignment rules
///
/// Flows are plasma flows in `l/min`, volumes in `l`. Blood vessel volumes are plasma volumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Derived {
    /// Cardiac output (blood)
    pub co: f64,
    pub q_lu: f64,
    pub q_gu: f64,
    pub q_ki: f64,
    pub q_h: f64,
    /// Hepatic arterial flow
    pub q_ha: f64,
    pub q_re: f64,
    pub v_gu: f64,
    pub v_ki: f64,
    pub v_li: f64,
    pub v_lu: f64,
    pub v_re: f64,
    pub v_ve: f64,
    pub v_ar: f64,
    pub v_po: f64,
    pub v_hv: f64,
    pub v_gu_ext: f64,
    pub v_ki_ext: f64,
    pub v_li_ext: f64,
    pub v_lu_ext: f64,
    pub v_re_ext: f64,
    /// Functional hepatocyte volume, reduced by cirrhosis
    pub v_li_cell: f64,
    pub v_re_tissue: f64,
    pub v_lumen: f64,
    /// Volume of a single intestinal transit segment
    pub v_intestine: f64,
    /// Fraction of liver inflow bypassing the liver
    pub f_shunts: f64,
    /// Injection rate of the intravenous depot
    pub ki_emp: f64,
    /// Glomerular filtration rate in `ml/min`
    pub gfr: f64,
    /// Renal threshold for glucose without drug in `mM`
    pub rtg_fpg: f64,
    /// Maximal reduction of the renal threshold in `mM`
    pub rtg_delta: f64,
}

impl Derived {
    pub fn new(p: &Parameters) -> Self {
        let co = p.bw * p.cobw * 60.0 / 1000.0;
        let plasma = 1.0 - p.hct;
        let co_pl = co * plasma;

        let q_gu = p.fq_gu * co_pl;
        let q_ki = p.fq_ki * co_pl;
        let q_h = p.fq_h * co_pl;

        let v_gu = p.fv_gu * p.bw;
        let v_ki = p.fv_ki * p.bw;
        let v_li = p.fv_li * p.bw;
        let v_lu = p.fv_lu * p.bw;
        let fv_rest = 1.0
            - (p.fv_gu + p.fv_ki + p.fv_li + p.fv_lu + p.fv_ve + p.fv_ar + p.fv_po + p.fv_hv);
        let v_re = fv_rest * p.bw;
        let v_lumen = p.gu_flumen * v_gu;

        let rtg_fpg = p.ki_rtg_base + p.ki_rtg_m_fpg * (p.ki_fpg - p.ki_fpg_healthy);

        Derived {
            co,
            q_lu: co_pl,
            q_gu,
            q_ki,
            q_h,
            q_ha: q_h - q_gu,
            q_re: co_pl - q_ki - q_h,
            v_gu,
            v_ki,
            v_li,
            v_lu,
            v_re,
            v_ve: p.fv_ve * p.bw * plasma,
            v_ar: p.fv_ar * p.bw * plasma,
            v_po: p.fv_po * p.bw * plasma,
            v_hv: p.fv_hv * p.bw * plasma,
            v_gu_ext: p.fext_gu * v_gu,
            v_ki_ext: p.fext_ki * v_ki,
            v_li_ext: p.fext_li * v_li,
            v_lu_ext: p.fext_lu * v_lu,
            v_re_ext: p.fext_re * v_re,
            v_li_cell: v_li * (1.0 - p.fext_li) * (1.0 - p.f_cirrhosis),
            v_re_tissue: v_re * (1.0 - p.fext_re),
            v_lumen,
            v_intestine: v_lumen / super::state::N_INTESTINE as f64,
            f_shunts: p.f_cirrhosis,
            ki_emp: 1.386 / (p.ti_emp / 60.0),
            gfr: p.ki_f_renal_function * p.ki_gfr_healthy,
            rtg_fpg,
            rtg_delta: rtg_fpg * p.ki_rtg_max_inhibition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flows_are_balanced() {
        let d = Derived::new(&Parameters::default());
        assert_relative_eq!(d.q_gu + d.q_ha, d.q_h, epsilon = 1e-12);
        assert_relative_eq!(d.q_h + d.q_ki + d.q_re, d.q_lu, epsilon = 1e-12);
        assert!(d.q_ha > 0.0);
        assert!(d.q_re > 0.0);
    }

    #[test]
    fn volumes_scale_with_bodyweight() {
        let mut p = Parameters::default();
        let d75 = Derived::new(&p);
        p.bw = 150.0;
        let d150 = Derived::new(&p);
        assert_relative_eq!(d150.v_li, 2.0 * d75.v_li, epsilon = 1e-12);
        assert_relative_eq!(d150.v_re, 2.0 * d75.v_re, epsilon = 1e-12);
        assert_relative_eq!(d150.co, 2.0 * d75.co, epsilon = 1e-12);
    }

    #[test]
    fn cirrhosis_reduces_functional_liver() {
        let mut p = Parameters::default();
        p.f_cirrhosis = 0.5;
        let d = Derived::new(&p);
        assert_relative_eq!(d.v_li_cell, d.v_li * 0.75 * 0.5, epsilon = 1e-12);
        assert_relative_eq!(d.f_shunts, 0.5);
    }

    #[test]
    fn renal_threshold_depends_on_glucose() {
        let mut p = Parameters::default();
        p.ki_fpg = p.ki_fpg_healthy;
        assert_relative_eq!(Derived::new(&p).rtg_fpg, p.ki_rtg_base);
        p.ki_fpg = 9.0;
        assert_relative_eq!(Derived::new(&p).rtg_fpg, 12.5 + 0.5 * 4.0);
    }
}
