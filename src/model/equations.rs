use super::body::Derived;
use super::parameters::Parameters;
use super::state::*;

#[inline(always)]
fn conc(amount: f64, volume: f64) -> f64 {
    if volume > 0.0 {
        amount / volume
    } else {
        0.0
    }
}

/// Renal threshold for glucose in `mM` at the given empagliflozin concentration in the kidney
pub fn renal_threshold(p: &Parameters, d: &Derived, emp: f64) -> f64 {
    let effect = emp.max(0.0).powf(p.ki_rtg_gamma);
    let e50 = p.ki_rtg_e50.powf(p.ki_rtg_gamma);
    d.rtg_fpg - d.rtg_delta * effect / (e50 + effect)
}

/// Urinary glucose excretion in `mmol/min`, only glucose above the renal threshold is excreted
pub fn glucose_excretion(p: &Parameters, d: &Derived, emp: f64) -> f64 {
    let rtg = renal_threshold(p, d, emp);
    if p.ki_fpg > rtg {
        d.gfr / 1000.0 * (p.ki_fpg - rtg)
    } else {
        0.0
    }
}

/// Empagliflozin concentration in the kidney extracellular space
pub fn kidney_emp(d: &Derived, y: &State) -> f64 {
    conc(y[AKI + EMP], d.v_ki_ext)
}

/// Right hand side of the model
pub fn rates(p: &Parameters, d: &Derived, y: &State, dy: &mut State) {
    dy.fill(0.0);
    dosing(p, d, y, dy);
    gut(p, d, y, dy);
    liver(p, d, y, dy);
    kidney(p, d, y, dy);
    circulation(d, y, dy);
    distribution(p, d, y, dy);
}

fn dosing(p: &Parameters, d: &Derived, y: &State, dy: &mut State) {
    // dissolution of the oral dose into the lumen
    let dissolution = p.gu_ka_dis_emp / 60.0 * y[PODOSE_EMP] / p.mr_emp;
    dy[PODOSE_EMP] -= dissolution * p.mr_emp;
    dy[LUMEN + EMP] += dissolution;

    let injection = d.ki_emp * y[IVDOSE_EMP] / p.mr_emp;
    dy[IVDOSE_EMP] -= injection * p.mr_emp;
    dy[AVE + EMP] += injection + p.ri_emp / p.mr_emp;
}

fn gut(p: &Parameters, d: &Derived, y: &State, dy: &mut State) {
    let absorption = p.gu_empabs_k * d.v_gu * conc(y[LUMEN + EMP], d.v_lumen);
    dy[LUMEN + EMP] -= absorption;
    dy[AGU + EMP] += p.gu_f_emp_abs * absorption;
    dy[intestine(EMP, 0)] += (1.0 - p.gu_f_emp_abs) * absorption;

    let egexc = p.gu_metexc_k * d.v_gu * conc(y[LUMEN + EG], d.v_lumen);
    dy[LUMEN + EG] -= egexc;
    dy[intestine(EG, 0)] += egexc;

    for s in SUBSTANCES {
        for k in 0..N_INTESTINE {
            let transport = p.gu_metexc_k * y[intestine(s, k)];
            dy[intestine(s, k)] -= transport;
            if k + 1 < N_INTESTINE {
                dy[intestine(s, k + 1)] += transport;
            } else {
                dy[FECES + s] += transport;
            }
        }
    }
}

fn liver(p: &Parameters, d: &Derived, y: &State, dy: &mut State) {
    let emp_ext = conc(y[ALI + EMP], d.v_li_ext);
    let eg_ext = conc(y[ALI + EG], d.v_li_ext);
    let emp = conc(y[LI_CELL + EMP], d.v_li_cell);
    let eg = conc(y[LI_CELL + EG], d.v_li_cell);

    let empim = p.li_empim_k * d.v_li_cell * (emp_ext - emp);
    let emp2eg =
        p.li_f_ugt * p.li_emp2eg_vmax * d.v_li_cell * emp / (emp + p.li_emp2eg_km_emp);
    let egex = p.li_egex_k * d.v_li_cell * (eg - eg_ext);
    let egbiex = p.li_egbiex_k * d.v_li_cell * eg;

    dy[ALI + EMP] -= empim;
    dy[LI_CELL + EMP] += empim - emp2eg;
    dy[LI_CELL + EG] += emp2eg - egex - egbiex;
    dy[ALI + EG] += egex;
    // enterohepatic circulation via bile
    dy[LUMEN + EG] += egbiex;
}

fn kidney(p: &Parameters, d: &Derived, y: &State, dy: &mut State) {
    let emp = conc(y[AKI + EMP], d.v_ki_ext);
    let eg = conc(y[AKI + EG], d.v_ki_ext);

    let empex = p.ki_f_renal_function * p.ki_empex_k * d.v_ki * emp;
    let egex = p.ki_f_renal_function * p.ki_egex_k * d.v_ki * eg;
    dy[AKI + EMP] -= empex;
    dy[URINE + EMP] += empex;
    dy[AKI + EG] -= egex;
    dy[URINE + EG] += egex;

    dy[GLC_URINE] += glucose_excretion(p, d, emp);
}

fn circulation(d: &Derived, y: &State, dy: &mut State) {
    for s in SUBSTANCES {
        let ve = conc(y[AVE + s], d.v_ve);
        let lu = conc(y[ALU + s], d.v_lu_ext);
        let ar = conc(y[AAR + s], d.v_ar);
        let gu = conc(y[AGU + s], d.v_gu_ext);
        let po = conc(y[APO + s], d.v_po);
        let li = conc(y[ALI + s], d.v_li_ext);
        let hv = conc(y[AHV + s], d.v_hv);
        let ki = conc(y[AKI + s], d.v_ki_ext);
        let re = conc(y[ARE + s], d.v_re_ext);

        let hepatic_inflow = d.q_gu * po + d.q_ha * ar;
        let perfused = 1.0 - d.f_shunts;

        dy[AVE + s] += d.q_h * hv + d.q_ki * ki + d.q_re * re - d.q_lu * ve;
        dy[ALU + s] += d.q_lu * (ve - lu);
        dy[AAR + s] += d.q_lu * lu - (d.q_gu + d.q_ha + d.q_ki + d.q_re) * ar;
        dy[AGU + s] += d.q_gu * (ar - gu);
        dy[APO + s] += d.q_gu * (gu - po);
        dy[ALI + s] += perfused * (hepatic_inflow - d.q_h * li);
        dy[AHV + s] += perfused * d.q_h * li + d.f_shunts * hepatic_inflow - d.q_h * hv;
        dy[AKI + s] += d.q_ki * (ar - ki);
        dy[ARE + s] += d.q_re * (ar - re);
    }
}

fn distribution(p: &Parameters, d: &Derived, y: &State, dy: &mut State) {
    let plasma = conc(y[ARE + EMP], d.v_re_ext);
    let tissue = conc(y[XRE_EMP], d.v_re_tissue);
    let flux = p.ftissue_emp * (plasma - tissue / p.kp_emp);
    dy[ARE + EMP] -= flux;
    dy[XRE_EMP] += flux;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn total_substance(p: &Parameters, y: &State) -> f64 {
        let mut total = (y[PODOSE_EMP] + y[IVDOSE_EMP]) / p.mr_emp;
        for (k, value) in y.iter().enumerate() {
            if k != PODOSE_EMP && k != IVDOSE_EMP && k != GLC_URINE {
                total += value;
            }
        }
        total
    }

    #[test]
    fn rates_conserve_substance() {
        let p = Parameters::default();
        let d = Derived::new(&p);
        let mut y = State::zeros();
        for (k, value) in y.iter_mut().enumerate() {
            *value = 0.01 * (k as f64 + 1.0);
        }
        y[PODOSE_EMP] = 25.0;
        y[IVDOSE_EMP] = 5.0;
        let mut dy = State::zeros();
        rates(&p, &d, &y, &mut dy);

        let mut change = (dy[PODOSE_EMP] + dy[IVDOSE_EMP]) / p.mr_emp;
        for (k, value) in dy.iter().enumerate() {
            if k != PODOSE_EMP && k != IVDOSE_EMP && k != GLC_URINE {
                change += value;
            }
        }
        assert!(change.abs() < 1e-10, "net change {change}");
        assert!(total_substance(&p, &y) > 0.0);
    }

    #[test]
    fn empty_body_is_at_rest() {
        let p = Parameters::default();
        let d = Derived::new(&p);
        let y = State::zeros();
        let mut dy = State::zeros();
        rates(&p, &d, &y, &mut dy);
        // glucose excretion without drug at healthy glucose is zero
        assert!(dy.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn empagliflozin_lowers_renal_threshold() {
        let p = Parameters::default();
        let d = Derived::new(&p);
        let baseline = renal_threshold(&p, &d, 0.0);
        assert_relative_eq!(baseline, p.ki_rtg_base);

        let half = renal_threshold(&p, &d, p.ki_rtg_e50);
        assert_relative_eq!(half, baseline - 0.5 * d.rtg_delta, epsilon = 1e-12);

        let saturated = renal_threshold(&p, &d, 1.0);
        assert!(saturated < half);
        assert!(saturated > baseline * (1.0 - p.ki_rtg_max_inhibition) - 1e-9);
    }

    #[test]
    fn glucose_excretion_above_threshold_only() {
        let mut p = Parameters::default();
        let d = Derived::new(&p);
        assert_eq!(glucose_excretion(&p, &d, 0.0), 0.0);

        // high glucose exceeds the inhibited threshold
        p.ki_fpg = 11.0;
        let d = Derived::new(&p);
        let rtg = renal_threshold(&p, &d, 1e-3);
        assert!(p.ki_fpg > rtg);
        assert_relative_eq!(
            glucose_excretion(&p, &d, 1e-3),
            d.gfr / 1000.0 * (p.ki_fpg - rtg),
            epsilon = 1e-12
        );
    }
}
