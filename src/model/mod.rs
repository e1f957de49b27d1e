//! Whole-body PBPK/PD model of empagliflozin.
//!
//! The body consists of venous, lung, arterial, gut, portal vein, liver, hepatic vein,
//! kidney and rest compartments. Organ submodels describe intestinal dissolution,
//! absorption and fecal excretion ([equations]), hepatic glucuronidation with biliary
//! excretion, and renal excretion with the effect of empagliflozin on urinary glucose.

pub mod body;
pub mod equations;
pub mod observables;
pub mod parameters;
pub mod report;
pub mod sbml;
pub mod state;

pub use body::Derived;
pub use observables::Observable;
pub use parameters::Parameters;
pub use state::State;

use crate::error::{EmpagliflozinError, Result};

/// A model instance: parameters, derived quantities and the current state
#[derive(Debug, Clone)]
pub struct Model {
    parameters: Parameters,
    derived: Derived,
    state: State,
    time: f64,
}

impl Default for Model {
    fn default() -> Self {
        Model::new(Parameters::default())
    }
}

impl Model {
    /// Create a model at time zero with all amounts zero
    pub fn new(parameters: Parameters) -> Self {
        let derived = Derived::new(&parameters);
        Model {
            parameters,
            derived,
            state: State::zeros(),
            time: 0.0,
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Move the model to a new time point with the integrated state
    pub fn advance(&mut self, time: f64, state: State) {
        self.time = time;
        self.state = state;
    }

    /// Set a parameter, a boundary concentration (`[id]`) or a state amount
    pub fn set(&mut self, id: &str, value: f64) -> Result<()> {
        let (target, concentration) = match id.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => (inner, true),
            None => (id, false),
        };
        if let Some(slot) = self.parameters.get_mut(target) {
            *slot = value;
            self.derived = Derived::new(&self.parameters);
            return Ok(());
        }
        if !concentration {
            if let Some(index) = state::index(target) {
                self.state[index] = value;
                return Ok(());
            }
        }
        Err(EmpagliflozinError::UnknownTarget(id.to_string()))
    }

    /// Current value of a parameter, state or observable
    pub fn get(&self, id: &str) -> Option<f64> {
        if let Some(observable) = Observable::from_id(id) {
            return Some(self.observe(observable));
        }
        let target = id
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(id);
        self.parameters
            .get(target)
            .or_else(|| state::index(id).map(|index| self.state[index]))
    }

    pub fn observe(&self, observable: Observable) -> f64 {
        observable.value(&self.parameters, &self.derived, self.time, &self.state)
    }

    /// Values of all [Observable]s in column order
    pub fn observables(&self) -> [f64; observables::N_OBSERVABLES] {
        Observable::ALL.map(|observable| self.observe(observable))
    }

    /// Evaluate the right hand side at the given state
    pub fn rates(&self, y: &State, dy: &mut State) {
        equations::rates(&self.parameters, &self.derived, y, dy)
    }

    /// Total substance in `mmol`: empagliflozin and glucuronide in all compartments,
    /// excreted amounts and the remaining dose depots
    pub fn total_substance(&self) -> f64 {
        let y = &self.state;
        let doses = (y[state::PODOSE_EMP] + y[state::IVDOSE_EMP]) / self.parameters.mr_emp;
        let amounts: f64 = y
            .iter()
            .enumerate()
            .filter(|(k, _)| {
                *k != state::PODOSE_EMP && *k != state::IVDOSE_EMP && *k != state::GLC_URINE
            })
            .map(|(_, value)| value)
            .sum();
        doses + amounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parameters_and_states() {
        let mut model = Model::default();
        model.set("BW", 60.0).unwrap();
        assert_eq!(model.parameters().bw, 60.0);
        assert!((model.derived().v_li - 0.021 * 60.0).abs() < 1e-12);

        model.set("[KI__fpg]", 9.0).unwrap();
        assert_eq!(model.get("[KI__fpg]"), Some(9.0));

        model.set("PODOSE_emp", 25.0).unwrap();
        assert_eq!(model.state()[state::PODOSE_EMP], 25.0);

        model.set("Aurine_emp", 0.5).unwrap();
        assert_eq!(model.get("Aurine_emp"), Some(0.5));
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let mut model = Model::default();
        assert_eq!(
            model.set("XYZ", 1.0),
            Err(EmpagliflozinError::UnknownTarget("XYZ".to_string()))
        );
        // states can not be set as concentrations
        assert!(model.set("[PODOSE_emp]", 1.0).is_err());
    }

    #[test]
    fn total_substance_counts_doses() {
        let mut model = Model::default();
        model.set("PODOSE_emp", 450.909).unwrap();
        assert!((model.total_substance() - 1.0).abs() < 1e-12);
    }
}
