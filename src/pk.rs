//! Pharmacokinetic parameters of simulated concentration curves
//!
//! Curves are in model units: time in `min`, concentrations in `mM` and doses in `mmol`.
//! Parameters that can not be determined from a curve are `NaN`.

use serde_derive::Serialize;

/// Minimal number of points of the terminal phase
const MIN_TERMINAL_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PkParameters {
    /// Dose [mmol]
    pub dose: f64,
    /// Maximal concentration [mM]
    pub cmax: f64,
    /// Time of maximal concentration [min]
    pub tmax: f64,
    /// Area under the curve until the last time point [mmol*min/l]
    pub auc: f64,
    /// Area under the curve extrapolated to infinity [mmol*min/l]
    pub aucinf: f64,
    /// Elimination rate [1/min]
    pub kel: f64,
    /// Half-life [min]
    pub thalf: f64,
    /// Apparent volume of distribution [l]
    pub vd: f64,
    /// Apparent clearance [l/min]
    pub cl: f64,
}

impl PkParameters {
    pub const HEADER: [&'static str; 9] = [
        "dose", "cmax", "tmax", "auc", "aucinf", "kel", "thalf", "vd", "cl",
    ];

    pub const UNITS: [&'static str; 9] = [
        "mmol", "mM", "min", "mmol*min/l", "mmol*min/l", "1/min", "min", "l", "l/min",
    ];

    pub fn values(&self) -> [f64; 9] {
        [
            self.dose,
            self.cmax,
            self.tmax,
            self.auc,
            self.aucinf,
            self.kel,
            self.thalf,
            self.vd,
            self.cl,
        ]
    }

    /// Calculates the parameters of the curve `concentrations(times)` after `dose`
    pub fn from_curve(times: &[f64], concentrations: &[f64], dose: f64) -> PkParameters {
        let n = times.len().min(concentrations.len());
        let times = &times[..n];
        let concentrations = &concentrations[..n];

        let (tmax_idx, cmax) = concentrations
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NAN), |(idx, max), (k, c)| {
                if max.is_nan() || c > max {
                    (k, c)
                } else {
                    (idx, max)
                }
            });
        let tmax = times.get(tmax_idx).copied().unwrap_or(f64::NAN);

        let auc = auc(times, concentrations);
        let kel = elimination_rate(&times[tmax_idx.min(n)..], &concentrations[tmax_idx.min(n)..]);
        let clast = concentrations.last().copied().unwrap_or(f64::NAN);

        let (thalf, aucinf) = if kel > 0.0 {
            (std::f64::consts::LN_2 / kel, auc + clast / kel)
        } else {
            (f64::NAN, f64::NAN)
        };
        let vd = if dose > 0.0 && aucinf > 0.0 {
            dose / (kel * aucinf)
        } else {
            f64::NAN
        };
        let cl = kel * vd;

        PkParameters {
            dose,
            cmax,
            tmax,
            auc,
            aucinf,
            kel,
            thalf,
            vd,
            cl,
        }
    }
}

/// Linear trapezoidal area under the curve
pub fn auc(times: &[f64], concentrations: &[f64]) -> f64 {
    if times.len() < 2 {
        return f64::NAN;
    }
    times
        .windows(2)
        .zip(concentrations.windows(2))
        .map(|(t, c)| (c[0] + c[1]) / 2.0 * (t[1] - t[0]))
        .sum()
}

/// Elimination rate from a log-linear regression of the terminal phase
///
/// The terminal phase is the last half of the points with positive concentration after
/// the maximum, with at least [MIN_TERMINAL_POINTS] points.
pub fn elimination_rate(times: &[f64], concentrations: &[f64]) -> f64 {
    let (t, ln_c): (Vec<f64>, Vec<f64>) = times
        .iter()
        .zip(concentrations.iter())
        .skip(1)
        .filter(|(_, c)| **c > 0.0)
        .map(|(t, c)| (*t, c.ln()))
        .unzip();

    let npoints = (t.len() / 2).max(MIN_TERMINAL_POINTS);
    if t.len() < npoints {
        return f64::NAN;
    }
    let start = t.len() - npoints;
    match linear_regression(&t[start..], &ln_c[start..]) {
        Some((slope, _)) if slope < 0.0 => -slope,
        _ => f64::NAN,
    }
}

/// Least squares fit of `y = a + b*x`, returns `(b, a)`
fn linear_regression(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let (ss_xy, ss_xx) = x
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0), |(xy, xx), (xi, yi)| {
            let dx = xi - x_mean;
            (xy + dx * (yi - y_mean), xx + dx * dx)
        });
    if ss_xx.abs() < 1e-15 {
        return None;
    }
    let slope = ss_xy / ss_xx;
    Some((slope, y_mean - slope * x_mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// One compartment bolus: c(t) = dose/V * exp(-k t)
    fn bolus(dose: f64, volume: f64, k: f64) -> (Vec<f64>, Vec<f64>) {
        let times: Vec<f64> = (0..=2000).map(|i| i as f64 * 0.5).collect();
        let concentrations = times.iter().map(|t| dose / volume * (-k * t).exp()).collect();
        (times, concentrations)
    }

    #[test]
    fn one_compartment_bolus() {
        let (times, concentrations) = bolus(2.0, 10.0, 0.01);
        let pk = PkParameters::from_curve(&times, &concentrations, 2.0);
        assert_eq!(pk.tmax, 0.0);
        assert_relative_eq!(pk.cmax, 0.2);
        assert_relative_eq!(pk.kel, 0.01, max_relative = 1e-9);
        assert_relative_eq!(pk.thalf, std::f64::consts::LN_2 / 0.01, max_relative = 1e-9);
        assert_relative_eq!(pk.aucinf, 0.2 / 0.01, max_relative = 1e-3);
        assert_relative_eq!(pk.vd, 10.0, max_relative = 1e-3);
        assert_relative_eq!(pk.cl, 0.1, max_relative = 1e-3);
    }

    #[test]
    fn undefined_parameters_are_nan() {
        let times = vec![0.0, 1.0, 2.0];
        let zeros = vec![0.0; 3];
        let pk = PkParameters::from_curve(&times, &zeros, 1.0);
        assert_eq!(pk.auc, 0.0);
        assert!(pk.kel.is_nan());
        assert!(pk.thalf.is_nan());
        assert!(pk.vd.is_nan());

        let pk = PkParameters::from_curve(&[], &[], 1.0);
        assert!(pk.cmax.is_nan());
        assert!(pk.auc.is_nan());
    }

    #[test]
    fn zero_dose_has_no_volume() {
        let (times, concentrations) = bolus(1.0, 5.0, 0.02);
        let pk = PkParameters::from_curve(&times, &concentrations, 0.0);
        assert!(pk.kel > 0.0);
        assert!(pk.vd.is_nan());
        assert!(pk.cl.is_nan());
    }

    #[test]
    fn trapezoid() {
        assert_relative_eq!(auc(&[0.0, 1.0, 3.0], &[0.0, 2.0, 2.0]), 5.0);
    }
}
