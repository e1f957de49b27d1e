//! Parameter scans of renal function, cirrhosis degree and oral dose
//!
//! Every scan is repeated for fasting plasma glucose between 5 and 11 mM to show the
//! glucose dependency of the urinary glucose excretion. Pharmacokinetic parameters of
//! empagliflozin, the glucuronide and total empagliflozin are calculated for every scan point.

use std::collections::BTreeMap;

use ndarray::Array1;

use super::base::{self, HOUR, MR_EMP};
use super::SimulationExperiment;
use crate::error::Result;
use crate::model::Observable;
use crate::output::figures::{Figure, Panel, Trace};
use crate::output::Table;
use crate::pk::PkParameters;
use crate::simulator::{
    Changes, Dimension, ExperimentResults, ScanResult, ScanSim, Simulation, Timecourse,
    TimecourseSim,
};

/// Oral dose of the renal and hepatic scans [mg]
const SCAN_DOSE: f64 = 50.0;

const EMP_COLOR: &str = "black";
const EG_COLOR: &str = "#4A6FA5";

const TIMECOURSE_OBSERVABLES: [Observable; 6] = [
    Observable::CveEmp,
    Observable::CveEg,
    Observable::UrineEmp,
    Observable::UrineEg,
    Observable::FecesEmp,
    Observable::FecesEg,
];

/// Concentrations for which pharmacokinetic parameters are calculated
const SUBSTANCES: [(&str, Observable); 3] = [
    ("empagliflozin", Observable::CveEmp),
    ("empagliflozin-glucuronide", Observable::CveEg),
    ("total empagliflozin", Observable::CveEmpTot),
];

/// A scanned parameter with its range and display settings
#[derive(Debug, Clone)]
pub struct ScanDefinition {
    pub key: &'static str,
    pub parameter: &'static str,
    pub label: &'static str,
    /// Reference value highlighted in figures
    pub default: Option<f64>,
    pub log_scale: bool,
    pub values: Vec<f64>,
    /// Colors of the smallest and largest value
    gradient: [(u8, u8, u8); 2],
}

impl ScanDefinition {
    /// Renal function between 0.1 and 2 on a log scale, including normal function
    pub fn renal(num_points: usize) -> Self {
        let mut values = Array1::logspace(10.0, -1.0, 2f64.log10(), num_points).to_vec();
        values.push(1.0);
        values.sort_by(f64::total_cmp);
        ScanDefinition {
            key: "renal",
            parameter: "KI__f_renal_function",
            label: "Renal Function [-]",
            default: Some(1.0),
            log_scale: true,
            values,
            gradient: [(0xe5, 0xf5, 0xf9), (0x00, 0x6d, 0x2c)],
        }
    }

    /// Cirrhosis degree between 0 and 0.9
    pub fn hepatic(num_points: usize) -> Self {
        ScanDefinition {
            key: "hepatic",
            parameter: "f_cirrhosis",
            label: "Cirrhosis Degree [-]",
            default: Some(0.0),
            log_scale: false,
            values: Array1::linspace(0.0, 0.9, num_points).to_vec(),
            gradient: [(0xd0, 0xd1, 0xe6), (0x04, 0x5a, 0x8d)],
        }
    }

    /// Oral doses between 0.1 and 800 mg on a log scale, including 100 mg
    pub fn dose(num_points: usize) -> Self {
        let mut values =
            Array1::logspace(10.0, 0.1f64.log10(), 800f64.log10(), num_points).to_vec();
        values.push(100.0);
        values.sort_by(f64::total_cmp);
        ScanDefinition {
            key: "dose",
            parameter: "PODOSE_emp",
            label: "Oral Dose [mg]",
            default: None,
            log_scale: true,
            values,
            gradient: [(0xff, 0xf4, 0x4f), (0x8b, 0x00, 0x00)],
        }
    }

    /// Task of the scan, optionally at a fasting plasma glucose
    pub fn task(&self, glucose: Option<f64>) -> String {
        match glucose {
            Some(glucose) => format!("scan_po_{}_glc{glucose}", self.key),
            None => format!("scan_po_{}", self.key),
        }
    }

    fn is_default(&self, value: f64) -> bool {
        self.default
            .map(|default| (default - value).abs() < 1e-9)
            .unwrap_or(false)
    }

    /// Color of a scan value, position in the range mapped onto the gradient
    pub fn color(&self, value: f64) -> String {
        if self.is_default(value) {
            return "black".to_string();
        }
        let (min, max) = match (self.values.first(), self.values.last()) {
            (Some(min), Some(max)) if max > min => (*min, *max),
            _ => return "grey".to_string(),
        };
        let fraction = if self.log_scale {
            (value.log10() - min.log10()) / (max.log10() - min.log10())
        } else {
            (value - min) / (max - min)
        };
        let fraction = fraction.clamp(0.0, 1.0);
        let [(r0, g0, b0), (r1, g1, b1)] = self.gradient;
        let mix = |a: u8, b: u8| (a as f64 + fraction * (b as f64 - a as f64)).round() as u8;
        format!("#{:02x}{:02x}{:02x}", mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }

    /// Changes of the scanned timecourse, the dose scan sets the dose in its dimension
    fn changes(&self, glucose: Option<f64>) -> Changes {
        let mut changes = base::default_changes();
        if self.parameter != "PODOSE_emp" {
            changes.insert("PODOSE_emp", SCAN_DOSE);
        }
        if let Some(glucose) = glucose {
            changes.insert("[KI__fpg]", glucose);
        }
        changes
    }
}

/// Parameter scans of the oral application
#[derive(Debug, Clone)]
pub struct ParameterScan {
    pub scans: Vec<ScanDefinition>,
    /// Fasting plasma glucose of the repeated scans [mM]
    pub glucoses: Vec<f64>,
    /// Duration of each simulation [hr]
    pub hours: f64,
    pub steps: usize,
}

impl Default for ParameterScan {
    fn default() -> Self {
        let num_points = 15;
        ParameterScan {
            scans: vec![
                ScanDefinition::renal(num_points),
                ScanDefinition::hepatic(num_points),
                ScanDefinition::dose(num_points),
            ],
            glucoses: vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0],
            hours: 24.0,
            steps: 5000,
        }
    }
}

/// Unit conversion of pharmacokinetic parameters into figure units
struct PkDisplay {
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    factor: f64,
}

const PK_DISPLAY: [PkDisplay; 4] = [
    PkDisplay {
        key: "aucinf",
        label: "AUC∞",
        unit: "µM·hr",
        factor: 1000.0 / HOUR,
    },
    PkDisplay {
        key: "cmax",
        label: "Cmax",
        unit: "µM",
        factor: 1000.0,
    },
    PkDisplay {
        key: "tmax",
        label: "Tmax",
        unit: "hr",
        factor: 1.0 / HOUR,
    },
    PkDisplay {
        key: "thalf",
        label: "Half-life",
        unit: "hr",
        factor: 1.0 / HOUR,
    },
];

fn pk_value(pk: &PkParameters, key: &str) -> f64 {
    match key {
        "aucinf" => pk.aucinf,
        "cmax" => pk.cmax,
        "tmax" => pk.tmax,
        "thalf" => pk.thalf,
        _ => f64::NAN,
    }
}

impl ParameterScan {
    fn scan_sim(&self, scan: &ScanDefinition, glucose: Option<f64>) -> ScanSim {
        let tc = Timecourse::new(0.0, self.hours * HOUR, self.steps, scan.changes(glucose));
        ScanSim::new(
            TimecourseSim::single(tc),
            vec![Dimension::new("dim_scan").with(scan.parameter, scan.values.clone())],
        )
    }

    /// Pharmacokinetic parameters of every scan point and substance
    fn pharmacokinetics(
        scan: &ScanDefinition,
        result: &ScanResult,
    ) -> Vec<(f64, &'static str, PkParameters)> {
        let mut pks = Vec::with_capacity(result.len() * SUBSTANCES.len());
        for point in &result.points {
            let value = point.changes.get(scan.parameter).unwrap_or(f64::NAN);
            let dose = point.changes.get("PODOSE_emp").unwrap_or(SCAN_DOSE);
            let times = point.result.time().to_vec();
            for (substance, observable) in SUBSTANCES {
                let concentrations = point.result.column(observable).to_vec();
                let pk = PkParameters::from_curve(&times, &concentrations, dose / MR_EMP);
                pks.push((value, substance, pk));
            }
        }
        pks
    }

    fn pk_table(scan: &ScanDefinition, task: &str, result: &ScanResult) -> Table {
        let mut header = vec![scan.parameter.to_string(), "substance".to_string()];
        header.extend(
            PkParameters::HEADER
                .iter()
                .zip(PkParameters::UNITS.iter())
                .map(|(name, unit)| format!("{name} [{unit}]")),
        );
        let mut table = Table::new(format!("pk_{task}"), header);
        for (value, substance, pk) in Self::pharmacokinetics(scan, result) {
            let mut row = vec![value.to_string(), substance.to_string()];
            row.extend(pk.values().iter().map(|v| v.to_string()));
            table.push(row);
        }
        table
    }

    fn figure_timecourses(&self, scan: &ScanDefinition, results: &ExperimentResults) -> Result<Figure> {
        let result = results.scan(&scan.task(None))?;
        let mut figure = Figure::new(
            format!("fig_emp_po__{}__timecourse", scan.key),
            format!("Parameter scan {}", scan.label),
        );
        for observable in TIMECOURSE_OBSERVABLES {
            let mut panel = Panel::new(
                base::label(observable),
                base::axis_label(Observable::Time),
                base::axis_label(observable),
            )
            .x_range(0.0, self.hours);
            let mut reference = None;
            for point in &result.points {
                let value = point.changes.get(scan.parameter).unwrap_or(f64::NAN);
                let trace = base::trace(&point.result, observable, format!("{value:.3}"))
                    .color(scan.color(value));
                if scan.is_default(value) {
                    reference = Some(trace);
                } else {
                    panel.add_trace(trace);
                }
            }
            // reference curve drawn on top
            if let Some(trace) = reference {
                panel.add_trace(trace);
            }
            figure.add_panel(panel);
        }
        Ok(figure)
    }

    fn figure_pharmacokinetics(
        &self,
        scan: &ScanDefinition,
        results: &ExperimentResults,
    ) -> Result<Figure> {
        let result = results.scan(&scan.task(None))?;
        let pks = Self::pharmacokinetics(scan, result);
        let mut figure = Figure::new(
            format!("fig_emp_po__{}", scan.key),
            format!("Pharmacokinetics {}", scan.label),
        );
        for display in &PK_DISPLAY {
            let mut panel = Panel::new(
                display.label,
                scan.label,
                format!("{} [{}]", display.label, display.unit),
            );
            if scan.log_scale {
                panel = panel.log_x();
            }
            for (substance, name, color) in [
                ("empagliflozin", "Emp", EMP_COLOR),
                ("empagliflozin-glucuronide", "Eg", EG_COLOR),
            ] {
                let (x, y): (Vec<f64>, Vec<f64>) = pks
                    .iter()
                    .filter(|(_, s, _)| *s == substance)
                    .map(|(value, _, pk)| (*value, pk_value(pk, display.key) * display.factor))
                    .unzip();
                panel.add_trace(Trace::new(name, x, y).color(color));
            }
            figure.add_panel(panel);
        }

        // urinary glucose excretion after 24 hr
        let mut panel = Panel::new(
            base::label(Observable::Uge),
            scan.label,
            format!("{} ({} hr)", base::axis_label(Observable::Uge), self.hours),
        );
        if scan.log_scale {
            panel = panel.log_x();
        }
        for glucose in &self.glucoses {
            let result = results.scan(&scan.task(Some(*glucose)))?;
            let x = result.values(scan.parameter);
            let y = result
                .points
                .iter()
                .map(|point| point.result.last(Observable::Uge) * base::factor(Observable::Uge))
                .collect();
            panel.add_trace(
                Trace::new(format!("FPG {glucose} mM"), x, y).color(base::glucose_color(*glucose)),
            );
        }
        figure.add_panel(panel);
        Ok(figure)
    }
}

impl SimulationExperiment for ParameterScan {
    fn sid(&self) -> &str {
        "ParameterScan"
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        let mut simulations = BTreeMap::new();
        for scan in &self.scans {
            simulations.insert(scan.task(None), self.scan_sim(scan, None).into());
            for glucose in &self.glucoses {
                simulations.insert(
                    scan.task(Some(*glucose)),
                    self.scan_sim(scan, Some(*glucose)).into(),
                );
            }
        }
        simulations
    }

    fn figures(&self, results: &ExperimentResults) -> Result<Vec<Figure>> {
        let mut figures = Vec::with_capacity(2 * self.scans.len());
        for scan in &self.scans {
            figures.push(self.figure_timecourses(scan, results)?);
        }
        for scan in &self.scans {
            figures.push(self.figure_pharmacokinetics(scan, results)?);
        }
        Ok(figures)
    }

    fn tables(&self, results: &ExperimentResults) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for scan in &self.scans {
            let glucoses = std::iter::once(None).chain(self.glucoses.iter().map(|g| Some(*g)));
            for glucose in glucoses {
                let task = scan.task(glucose);
                let result = results.scan(&task)?;
                tables.push(Self::pk_table(scan, &task, result));
            }
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulator;
    use approx::assert_relative_eq;

    fn small() -> ParameterScan {
        ParameterScan {
            scans: vec![
                ScanDefinition::renal(3),
                ScanDefinition::hepatic(3),
                ScanDefinition::dose(3),
            ],
            glucoses: vec![5.0, 8.0],
            hours: 2.0,
            steps: 20,
        }
    }

    #[test]
    fn scan_ranges() {
        let renal = ScanDefinition::renal(15);
        assert_eq!(renal.values.len(), 16);
        assert_relative_eq!(renal.values[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(renal.values[15], 2.0, epsilon = 1e-12);
        assert!(renal.values.windows(2).all(|w| w[0] <= w[1]));

        let hepatic = ScanDefinition::hepatic(15);
        assert_eq!(hepatic.values.len(), 15);
        assert_relative_eq!(hepatic.values[14], 0.9, epsilon = 1e-12);

        let dose = ScanDefinition::dose(15);
        assert!(dose.values.contains(&100.0));
        assert_relative_eq!(dose.values[15], 800.0, epsilon = 1e-9);
    }

    #[test]
    fn colors() {
        let renal = ScanDefinition::renal(15);
        assert_eq!(renal.color(1.0), "black");
        assert_eq!(renal.color(0.1), "#e5f5f9");
        assert_eq!(renal.color(2.0), "#006d2c");
        assert_eq!(ScanDefinition::dose(15).color(800.0), "#8b0000");
    }

    #[test]
    fn tasks() {
        let experiment = ParameterScan::default();
        let simulations = experiment.simulations();
        assert_eq!(simulations.len(), 24);
        assert!(simulations.contains_key("scan_po_renal"));
        assert!(simulations.contains_key("scan_po_dose_glc11"));
        let Simulation::Scan(scan) = &simulations["scan_po_dose"] else {
            panic!("dose scan is not a scan")
        };
        assert_eq!(scan.simulation.timecourses[0].changes.get("PODOSE_emp"), None);
        assert_eq!(scan.points().unwrap().len(), 16);
    }

    #[test]
    fn figures_and_tables() {
        let experiment = small();
        let simulator = Simulator::default();
        let results: ExperimentResults = experiment
            .simulations()
            .into_iter()
            .map(|(task, simulation)| (task, simulator.run(&simulation).unwrap()))
            .collect();

        let figures = experiment.figures(&results).unwrap();
        assert_eq!(figures.len(), 6);
        assert_eq!(figures[0].sid, "fig_emp_po__renal__timecourse");
        assert_eq!(figures[0].panels.len(), 6);
        assert_eq!(figures[3].panels.len(), 5);

        let tables = experiment.tables(&results).unwrap();
        assert_eq!(tables.len(), 9);
        assert_eq!(tables[0].sid, "pk_scan_po_renal");
        // four renal values times three substances
        assert_eq!(tables[0].rows.len(), 12);
        assert_eq!(tables[0].header[0], "KI__f_renal_function");

        let dose_table = tables.iter().find(|t| t.sid == "pk_scan_po_dose").unwrap();
        let dose: f64 = dose_table.rows.last().unwrap()[2].parse().unwrap();
        assert_relative_eq!(dose, 800.0 / MR_EMP, epsilon = 1e-9);
    }
}
