use ode_solvers::dop_shared::OutputType;
use ode_solvers::Dopri5;

use crate::error::{EmpagliflozinError, Result};
use crate::model::{Derived, Parameters, State};

type Time = f64;

/// Default relative tolerance of the adaptive step size control
pub const RTOL: f64 = 1e-6;
/// Default absolute tolerance [mmol]
pub const ATOL: f64 = 1e-10;

const MAX_STEPS: u32 = 1_000_000;

#[derive(Debug, Clone, Copy)]
struct Rhs<'a> {
    parameters: &'a Parameters,
    derived: &'a Derived,
}

impl ode_solvers::System<Time, State> for Rhs<'_> {
    fn system(&self, _t: Time, y: &State, dy: &mut State) {
        crate::model::equations::rates(self.parameters, self.derived, y, dy)
    }
}

/// Integrates the model from `ti` to `tf` with an adaptive Dormand-Prince method
///
/// Hepatic uptake makes the system mildly stiff, the step size is then limited by the
/// stability of the method rather than by the tolerances. Stiffness detection is therefore
/// disabled.
#[inline(always)]
pub fn simulate_interval(
    parameters: &Parameters,
    derived: &Derived,
    x: State,
    ti: Time,
    tf: Time,
    rtol: f64,
    atol: f64,
) -> Result<State> {
    if ti > tf {
        return Err(EmpagliflozinError::Integration {
            time: ti,
            message: format!("end time {tf} before start time"),
        });
    } else if ti == tf {
        return Ok(x);
    }

    let rhs = Rhs {
        parameters,
        derived,
    };
    let mut stepper = Dopri5::from_param(
        rhs,
        ti,
        tf,
        tf - ti,
        x,
        rtol,
        atol,
        0.9,
        0.04,
        0.2,
        10.0,
        tf - ti,
        0.0,
        MAX_STEPS,
        u32::MAX,
        OutputType::Sparse,
    );
    stepper
        .integrate()
        .map_err(|e| EmpagliflozinError::Integration {
            time: ti,
            message: e.to_string(),
        })?;

    // sparse output ends with the accepted step onto tf
    let state = stepper
        .y_out()
        .last()
        .copied()
        .ok_or_else(|| EmpagliflozinError::Integration {
            time: ti,
            message: "no output".to_string(),
        })?;

    if state.iter().all(|v| v.is_finite()) {
        Ok(state)
    } else {
        Err(EmpagliflozinError::Integration {
            time: tf,
            message: "non-finite state".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::state::{AVE, EMP, IVDOSE_EMP};

    #[test]
    fn zero_length_interval_returns_state() {
        let p = Parameters::default();
        let d = Derived::new(&p);
        let mut x = State::zeros();
        x[AVE + EMP] = 0.1;
        let y = simulate_interval(&p, &d, x, 5.0, 5.0, RTOL, ATOL).unwrap();
        assert_eq!(y, x);
        assert!(simulate_interval(&p, &d, x, 5.0, 4.0, RTOL, ATOL).is_err());
    }

    #[test]
    fn intravenous_dose_reaches_plasma() {
        let p = Parameters::default();
        let d = Derived::new(&p);
        let mut x = State::zeros();
        x[IVDOSE_EMP] = 10.0;
        let y = simulate_interval(&p, &d, x, 0.0, 30.0, RTOL, ATOL).unwrap();
        assert!(y[IVDOSE_EMP] < x[IVDOSE_EMP]);
        assert!(y[AVE + EMP] > 0.0);
    }

    #[test]
    fn long_intervals_are_stable() {
        // one output interval over several hours needs thousands of steps
        let p = Parameters::default();
        let d = Derived::new(&p);
        let mut x = State::zeros();
        x[IVDOSE_EMP] = 25.0;
        let y = simulate_interval(&p, &d, x, 0.0, 6.0 * 60.0, RTOL, ATOL).unwrap();
        assert!(y.iter().all(|v| v.is_finite() && *v > -1e-6));
    }
}
