//! Dependency of pharmacokinetics and pharmacodynamics on the oral dose and on fasting glucose

use std::collections::BTreeMap;

use super::base::{self, HOUR};
use super::SimulationExperiment;
use crate::error::Result;
use crate::model::Observable;
use crate::output::figures::{Figure, Panel, Trace};
use crate::simulator::{ExperimentResults, Simulation, Timecourse, TimecourseSim};

const PK_OBSERVABLES: [Observable; 9] = [
    Observable::CveEmp,
    Observable::CveEg,
    Observable::CveEmpTot,
    Observable::UrineEmp,
    Observable::UrineEg,
    Observable::UrineEmpTot,
    Observable::FecesEmp,
    Observable::FecesEg,
    Observable::FecesEmpTot,
];

const PD_OBSERVABLES: [Observable; 3] = [Observable::Uge, Observable::Rtg, Observable::Fpg];

/// Observables plotted against the plasma concentration
const RESPONSES: [Observable; 3] = [Observable::Glcex, Observable::Rtg, Observable::Uge];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Varied {
    Dose,
    Glucose,
}

impl Varied {
    fn key(&self) -> &'static str {
        match self {
            Varied::Dose => "dose",
            Varied::Glucose => "glucose",
        }
    }

    fn label(&self, value: f64) -> String {
        match self {
            Varied::Dose => format!("{value} mg Emp PO"),
            Varied::Glucose => format!("FPG {value} mM"),
        }
    }

    fn color(&self, value: f64) -> &'static str {
        match self {
            Varied::Dose => base::dose_color(value),
            Varied::Glucose => base::glucose_color(value),
        }
    }
}

/// Single oral doses between 0 and 800 mg and 25 mg doses at fasting glucose between 5 and 11 mM
#[derive(Debug, Clone)]
pub struct DoseDependency {
    /// Doses [mg]
    pub doses: Vec<f64>,
    /// Fasting plasma glucose [mM]
    pub glucoses: Vec<f64>,
}

impl Default for DoseDependency {
    fn default() -> Self {
        DoseDependency {
            doses: vec![0.0, 2.5, 5.0, 10.0, 50.0, 100.0, 200.0, 800.0],
            glucoses: vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0],
        }
    }
}

impl DoseDependency {
    fn values(&self, varied: Varied) -> &[f64] {
        match varied {
            Varied::Dose => &self.doses,
            Varied::Glucose => &self.glucoses,
        }
    }

    fn task(varied: Varied, value: f64) -> String {
        format!("emp_{}_{value}", varied.key())
    }

    fn timecourse_panel(
        &self,
        varied: Varied,
        observable: Observable,
        results: &ExperimentResults,
    ) -> Result<Panel> {
        let mut panel = Panel::new(
            base::label(observable),
            base::axis_label(Observable::Time),
            base::axis_label(observable),
        );
        for value in self.values(varied) {
            let result = results.timecourse(&Self::task(varied, *value))?;
            panel.add_trace(
                base::trace(result, observable, varied.label(*value)).color(varied.color(*value)),
            );
        }
        Ok(panel)
    }

    fn response_panel(
        &self,
        varied: Varied,
        observable: Observable,
        results: &ExperimentResults,
    ) -> Result<Panel> {
        let mut panel = Panel::new(
            format!("{} response", base::label(observable)),
            base::axis_label(Observable::CveEmp),
            base::axis_label(observable),
        );
        for value in self.values(varied) {
            let result = results.timecourse(&Self::task(varied, *value))?;
            let trace = Trace::new(
                varied.label(*value),
                base::display(result, Observable::CveEmp),
                base::display(result, observable),
            );
            panel.add_trace(trace.color(varied.color(*value)));
        }
        Ok(panel)
    }

    fn figure_pk(&self, varied: Varied, results: &ExperimentResults) -> Result<Figure> {
        let title = match varied {
            Varied::Dose => "Dose dependency of empagliflozin (PK)",
            Varied::Glucose => "Glucose dependency (PK)",
        };
        let panels = PK_OBSERVABLES
            .iter()
            .map(|observable| self.timecourse_panel(varied, *observable, results))
            .collect::<Result<Vec<_>>>()?;
        Ok(Figure::new(format!("Fig_{}_dependency_pk", varied.key()), title).with_panels(panels))
    }

    fn figure_pd(&self, varied: Varied, results: &ExperimentResults) -> Result<Figure> {
        let title = match varied {
            Varied::Dose => "Dose dependency of empagliflozin (PD)",
            Varied::Glucose => "Glucose dependency (PD)",
        };
        let mut panels = PD_OBSERVABLES
            .iter()
            .map(|observable| self.timecourse_panel(varied, *observable, results))
            .collect::<Result<Vec<_>>>()?;
        for observable in RESPONSES {
            panels.push(self.response_panel(varied, observable, results)?);
        }
        Ok(Figure::new(format!("Fig_{}_dependency_pd", varied.key()), title).with_panels(panels))
    }
}

impl SimulationExperiment for DoseDependency {
    fn sid(&self) -> &str {
        "DoseDependency"
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        let mut simulations = BTreeMap::new();
        for dose in &self.doses {
            let changes = base::default_changes().with("PODOSE_emp", *dose);
            let tc = Timecourse::new(0.0, 25.0 * HOUR, 1000, changes);
            simulations.insert(
                Self::task(Varied::Dose, *dose),
                TimecourseSim::single(tc).into(),
            );
        }
        for glucose in &self.glucoses {
            let changes = base::default_changes()
                .with("PODOSE_emp", 25.0)
                .with("[KI__fpg]", *glucose);
            let tc = Timecourse::new(0.0, 25.0 * HOUR, 5000, changes);
            simulations.insert(
                Self::task(Varied::Glucose, *glucose),
                TimecourseSim::single(tc).into(),
            );
        }
        simulations
    }

    fn figures(&self, results: &ExperimentResults) -> Result<Vec<Figure>> {
        let mut figures = Vec::with_capacity(4);
        for varied in [Varied::Dose, Varied::Glucose] {
            figures.push(self.figure_pk(varied, results)?);
        }
        for varied in [Varied::Dose, Varied::Glucose] {
            figures.push(self.figure_pd(varied, results)?);
        }
        Ok(figures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulator;

    #[test]
    fn task_names() {
        let experiment = DoseDependency::default();
        let simulations = experiment.simulations();
        assert_eq!(simulations.len(), 15);
        assert!(simulations.contains_key("emp_dose_2.5"));
        assert!(simulations.contains_key("emp_dose_0"));
        assert!(simulations.contains_key("emp_glucose_11"));
    }

    #[test]
    fn figures_from_short_simulations() {
        let experiment = DoseDependency {
            doses: vec![0.0, 10.0],
            glucoses: vec![5.0],
        };
        let simulator = Simulator::sequential();
        let mut results = ExperimentResults::new();
        for (task, simulation) in experiment.simulations() {
            let mut simulation = simulation;
            if let Simulation::Timecourse(tc) = &mut simulation {
                tc.timecourses[0].end = 2.0 * HOUR;
                tc.timecourses[0].steps = 20;
            }
            results.insert(task, simulator.run(&simulation).unwrap());
        }

        let figures = experiment.figures(&results).unwrap();
        let sids: Vec<&str> = figures.iter().map(|f| f.sid.as_str()).collect();
        assert_eq!(
            sids,
            vec![
                "Fig_dose_dependency_pk",
                "Fig_glucose_dependency_pk",
                "Fig_dose_dependency_pd",
                "Fig_glucose_dependency_pd"
            ]
        );
        assert_eq!(figures[0].panels.len(), 9);
        assert_eq!(figures[0].ntraces(), 18);
        assert_eq!(figures[3].panels.len(), 6);
    }
}
