//! Clinical studies of empagliflozin
//!
//! Each study reproduces the dosing protocol of the publication (body weight, fasting glucose,
//! renal function or cirrhosis degree of the groups) and plots the reported observables.

use std::collections::BTreeMap;

use super::base::{self, DAY, FPG_HEALTHY, STEPS};
use super::fitting::FitMapping;
use super::metadata::{
    tissue, ApplicationForm, Coadministration, Dosing, Fasting, Health, MappingMetaData, Tissue,
};
use super::SimulationExperiment;
use crate::error::Result;
use crate::model::Observable;
use crate::output::figures::{Figure, Panel};
use crate::simulator::{Changes, ExperimentResults, Simulation, TimecourseSim};

const BLUE: &str = "#1f77b4";
const ORANGE: &str = "#ff7f0e";
const GREEN: &str = "#2ca02c";
const RED: &str = "#d62728";
const PURPLE: &str = "#9467bd";

/// A simulated task shown in a figure
#[derive(Debug, Clone)]
pub struct Curve {
    pub task: String,
    pub label: String,
    pub color: String,
}

impl Curve {
    pub fn new(task: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Curve {
            task: task.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Figure of a study: one panel per observable group, one trace per curve and observable
#[derive(Debug, Clone)]
pub struct StudyFigure {
    pub sid: String,
    pub panels: Vec<Vec<Observable>>,
    pub curves: Vec<Curve>,
    pub x_range: Option<(f64, f64)>,
}

impl StudyFigure {
    pub fn new(sid: impl Into<String>, observables: &[Observable]) -> Self {
        StudyFigure {
            sid: sid.into(),
            panels: observables.iter().map(|o| vec![*o]).collect(),
            curves: Vec::new(),
            x_range: None,
        }
    }

    /// Several observables in a single panel
    pub fn grouped(sid: impl Into<String>, panels: Vec<Vec<Observable>>) -> Self {
        StudyFigure {
            sid: sid.into(),
            panels,
            curves: Vec::new(),
            x_range: None,
        }
    }

    pub fn curve(mut self, task: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        self.curves.push(Curve::new(task, label, color));
        self
    }

    pub fn x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    fn render(&self, title: &str, results: &ExperimentResults) -> Result<Figure> {
        let mut figure = Figure::new(self.sid.clone(), title);
        for observables in &self.panels {
            let (first, grouped) = match observables.as_slice() {
                [single] => (*single, false),
                [first, ..] => (*first, true),
                [] => continue,
            };
            let panel_title = if grouped {
                format!("Empagliflozin {}", tissue(first.id()))
            } else {
                base::label(first).to_string()
            };
            let mut panel = Panel::new(
                panel_title,
                base::axis_label(Observable::Time),
                base::axis_label(first),
            );
            if let Some((min, max)) = self.x_range {
                panel = panel.x_range(min, max);
            }
            for curve in &self.curves {
                let result = results.timecourse(&curve.task)?;
                for observable in observables {
                    let name = if grouped {
                        format!("{} {}", curve.label, base::label(*observable))
                    } else {
                        curve.label.clone()
                    };
                    let trace = base::trace(result, *observable, name);
                    // grouped panels distinguish observables, single panels the curves
                    let color = if grouped {
                        substance_color(*observable)
                    } else {
                        curve.color.as_str()
                    };
                    panel.add_trace(trace.color(color));
                }
            }
            figure.add_panel(panel);
        }
        Ok(figure)
    }
}

fn substance_color(observable: Observable) -> &'static str {
    match observable {
        Observable::CveEmp | Observable::UrineEmp | Observable::FecesEmp => BLUE,
        Observable::CveEg | Observable::UrineEg | Observable::FecesEg => ORANGE,
        _ => "black",
    }
}

/// A clinical study: its simulations, figures and fit mappings
#[derive(Debug, Clone)]
pub struct Study {
    sid: &'static str,
    title: String,
    simulations: BTreeMap<String, TimecourseSim>,
    figures: Vec<StudyFigure>,
    mappings: Vec<FitMapping>,
}

impl Study {
    fn new(sid: &'static str, subjects: &str) -> Self {
        Study {
            sid,
            title: format!("{sid} ({subjects})"),
            simulations: BTreeMap::new(),
            figures: Vec::new(),
            mappings: Vec::new(),
        }
    }

    fn simulation(mut self, task: impl Into<String>, simulation: TimecourseSim) -> Self {
        self.simulations.insert(task.into(), simulation);
        self
    }

    fn figure(mut self, figure: StudyFigure) -> Self {
        self.figures.push(figure);
        self
    }

    fn mapping(mut self, mapping: FitMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.simulations.keys().map(String::as_str)
    }
}

impl SimulationExperiment for Study {
    fn sid(&self) -> &str {
        self.sid
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        self.simulations
            .iter()
            .map(|(task, sim)| (task.clone(), Simulation::from(sim.clone())))
            .collect()
    }

    fn figures(&self, results: &ExperimentResults) -> Result<Vec<Figure>> {
        self.figures
            .iter()
            .map(|figure| figure.render(&self.title, results))
            .collect()
    }

    fn fit_mappings(&self) -> Vec<FitMapping> {
        self.mappings.clone()
    }
}

/// Study by name
pub fn study(name: &str) -> Option<Study> {
    let study = match name {
        "Ayoub2017" => ayoub2017(),
        "Brand2012" => brand2012(),
        "Chen2015a" => chen2015a(),
        "Chen2020" => chen2020(),
        "Friedrich2013" => friedrich2013(),
        "Hailat2022" => hailat2022(),
        "Heise2013a" => heise2013a(),
        "Jiang2023b" => jiang2023b(),
        "Kim2021" => kim2021(),
        "Kim2023" => kim2023(),
        "Macha2013d" => macha2013d(),
        "Macha2013e" => macha2013e(),
        "Macha2014" => macha2014(),
        "Macha2014b" => macha2014b(),
        "Macha2014f" => macha2014f(),
        "Macha2015b" => macha2015b(),
        "Sarashina2013" => sarashina2013(),
        "Seman2013" => seman2013(),
        "vanderAartvanderBeek2020" => vanderaartvanderbeek2020(),
        "Zhao2015" => zhao2015(),
        _ => return None,
    };
    Some(study)
}

/// A single oral dose
fn single_dose(hours: f64, changes: Changes) -> TimecourseSim {
    TimecourseSim::single(base::timecourse(hours, STEPS, changes))
}

/// Daily doses: a first day with all changes, `repeats` further days and a final period
///
/// `resets` are applied together with every following dose, e.g. emptying the urine collection.
fn daily_doses(
    first: Changes,
    dose: f64,
    resets: &Changes,
    repeats: usize,
    last_hours: Option<f64>,
) -> TimecourseSim {
    let mut repeated = Changes::new().with("PODOSE_emp", dose);
    repeated.extend(resets);
    TimecourseSim::repeated(
        base::timecourse(24.0, STEPS, first),
        base::timecourse(24.0, STEPS, repeated.clone()),
        repeats,
        last_hours.map(|hours| base::timecourse(hours, STEPS, repeated)),
    )
}

fn plasma(dosing: Dosing, health: Health, fasting: Fasting) -> MappingMetaData {
    MappingMetaData::new(Tissue::Plasma, dosing, health, fasting)
}

fn observed(observable: &'static str, dosing: Dosing, health: Health, fasting: Fasting) -> MappingMetaData {
    MappingMetaData::new(tissue(observable), dosing, health, fasting)
}

pub fn ayoub2017() -> Study {
    Study::new("Ayoub2017", "Healthy")
        .simulation(
            "po_emp25",
            single_dose(13.0, base::initial_changes(Some(77.8), Some(FPG_HEALTHY), 25.0)),
        )
        .figure(StudyFigure::new("Fig6", &[Observable::CveEmp]).curve("po_emp25", "25 mg Emp", "black"))
        .mapping(FitMapping::new(
            "po_emp25",
            "[Cve_emp]",
            plasma(Dosing::Single, Health::Healthy, Fasting::NotReported),
        ))
}

pub fn brand2012() -> Study {
    let first = base::initial_changes(Some(78.0), Some(FPG_HEALTHY), 50.0);
    let resets = Changes::new().with("Aurine_emp", 0.0);
    let d5 = daily_doses(first.clone(), 50.0, &resets, 3, Some(25.0)).with_offset(-4.0 * DAY);
    let d10 = daily_doses(first, 50.0, &resets, 8, Some(25.0)).with_offset(-9.0 * DAY);

    let mut study = Study::new("Brand2012", "Healthy")
        .simulation("po_EMP50_D5", d5)
        .simulation("po_EMP50_D10", d10)
        .figure(
            StudyFigure::new("Fig2_3", &[Observable::CveEmp, Observable::UrineEmp])
                .curve("po_EMP50_D5", "50 mg Emp", "black")
                .x_range(-5.0, 25.0),
        );
    for intervention in ["EMP50_D5", "EMP50_D10"] {
        for observable in ["[Cve_emp]", "Aurine_emp"] {
            let coadministration = if intervention.ends_with("D10") {
                Coadministration::Sitagliptin
            } else {
                Coadministration::None
            };
            study = study.mapping(FitMapping::new(
                format!("po_{intervention}"),
                observable,
                observed(observable, Dosing::Multiple, Health::Healthy, Fasting::NotReported)
                    .coadministration(coadministration),
            ));
        }
    }
    study
}

pub fn chen2015a() -> Study {
    let changes = base::initial_changes(Some(79.0), Some(FPG_HEALTHY), 50.0)
        .with("KI__f_renal_function", 1.0);
    let observables = [
        "[Cve_emptot]",
        "[Cve_emp]",
        "[Cve_eg]",
        "Afeces_emptot",
        "Afeces_emp",
        "Afeces_eg",
        "Aurine_emptot",
        "Aurine_emp",
        "Aurine_eg",
    ];
    let mut study = Study::new("Chen2015a", "Healthy")
        .simulation("po_C14EMP", single_dose(180.0, changes))
        .figure(
            StudyFigure::grouped(
                "Fig1_2",
                vec![
                    vec![Observable::CveEmpTot, Observable::CveEmp, Observable::CveEg],
                    vec![Observable::FecesEmpTot, Observable::FecesEmp, Observable::FecesEg],
                    vec![Observable::UrineEmpTot, Observable::UrineEmp, Observable::UrineEg],
                ],
            )
            .curve("po_C14EMP", "50 mg [14C]Emp", "black"),
        );
    for observable in observables {
        study = study.mapping(FitMapping::new(
            "po_C14EMP",
            observable,
            observed(observable, Dosing::Single, Health::Healthy, Fasting::NotReported)
                .application_form(ApplicationForm::Solution),
        ));
    }
    study
}

pub fn chen2020() -> Study {
    let groups = [
        ("Fasting_T", 62.93, "black"),
        ("Fasting_R", 62.93, BLUE),
        ("Fed_T", 60.99, GREEN),
        ("Fed_R", 60.99, ORANGE),
    ];
    let mut study = Study::new("Chen2020", "Healthy");
    let mut figure = StudyFigure::new("Fig2", &[Observable::CveEmp]);
    for (group, bodyweight, color) in groups {
        let task = format!("po_emp10_{group}");
        let fasting = if group.starts_with("Fasting") {
            Fasting::Fasted
        } else {
            Fasting::Fed
        };
        study = study
            .simulation(
                task.clone(),
                single_dose(73.0, base::initial_changes(Some(bodyweight), Some(FPG_HEALTHY), 10.0)),
            )
            .mapping(FitMapping::new(
                task.clone(),
                "[Cve_emp]",
                plasma(Dosing::Single, Health::Healthy, fasting),
            ));
        figure = figure.curve(task, format!("10 mg Emp ({group})"), color);
    }
    study.figure(figure)
}

pub fn friedrich2013() -> Study {
    let first = base::initial_changes(Some(81.5), Some(FPG_HEALTHY), 50.0);
    let resets = Changes::new().with("Aurine_emp", 0.0);
    let d5 = daily_doses(first.clone(), 50.0, &resets, 3, Some(25.0)).with_offset(-4.0 * DAY);
    let d7 = daily_doses(first, 50.0, &resets, 5, Some(25.0)).with_offset(-6.0 * DAY);

    let mut study = Study::new("Friedrich2013", "Healthy")
        .simulation("po_EMP50_D5", d5)
        .simulation("po_EMP50_D7", d7)
        .figure(
            StudyFigure::new("Fig2_3", &[Observable::CveEmp, Observable::UrineEmp])
                .curve("po_EMP50_D5", "50 mg Emp", BLUE)
                .curve("po_EMP50_D7", "50 mg Emp + LIN", ORANGE)
                .x_range(-5.0, 25.0),
        );
    for intervention in ["EMP50_D5", "EMP50_D7"] {
        let coadministration = if intervention.ends_with("D7") {
            Coadministration::Linagliptin
        } else {
            Coadministration::None
        };
        for observable in ["[Cve_emp]", "Aurine_emp"] {
            study = study.mapping(FitMapping::new(
                format!("po_{intervention}"),
                observable,
                observed(observable, Dosing::Multiple, Health::Healthy, Fasting::NotReported)
                    .coadministration(coadministration),
            ));
        }
    }
    study
}

pub fn hailat2022() -> Study {
    let mut study = Study::new("Hailat2022", "Healthy")
        .simulation(
            "po_emp10",
            single_dose(52.0, base::initial_changes(Some(79.5), Some(FPG_HEALTHY), 10.0)),
        )
        .figure(StudyFigure::new("Fig3", &[Observable::CveEmp]).curve("po_emp10", "10 mg Emp", "black"));
    for intervention in ["fasting_test", "fasting_reference", "fed_test", "fed_reference"] {
        let fasting = if intervention.starts_with("fasting") {
            Fasting::Fasted
        } else {
            Fasting::Fed
        };
        // reported concentrations are inconsistent with the dose
        study = study.mapping(
            FitMapping::new(
                "po_emp10",
                "[Cve_emp]",
                plasma(Dosing::Single, Health::Healthy, fasting).outlier(true),
            )
            .dataset(intervention),
        );
    }
    study
}

pub fn heise2013a() -> Study {
    let groups = [
        ("Placebo", 89.3, 152.1 / 18.0, 0.0),
        ("EMP10", 89.6, 164.8 / 18.0, 10.0),
        ("EMP25", 89.6, 166.3 / 18.0, 25.0),
        ("EMP100", 92.4, 149.4 / 18.0, 100.0),
    ];
    let resets = Changes::new().with("KI__glc_urine", 0.0);
    let mut study = Study::new("Heise2013a", "T2DM");
    let mut figures = vec![
        StudyFigure::new("Fig1_2_all", &[Observable::CveEmp, Observable::Uge]),
        StudyFigure::new("Fig1_2_start", &[Observable::CveEmp, Observable::Uge]).x_range(-3.0, 30.0),
        StudyFigure::new("Fig1_2_end", &[Observable::CveEmp, Observable::Uge]).x_range(640.0, 750.0),
    ];
    for (intervention, bodyweight, fpg, dose) in groups {
        let mut first = base::initial_changes(Some(bodyweight), Some(fpg), dose);
        first.extend(&resets);
        study = study.simulation(
            intervention,
            daily_doses(first, dose, &resets, 26, Some(100.0)),
        );
        figures = figures
            .into_iter()
            .map(|figure| figure.curve(intervention, base::dose_label(dose), base::dose_color(dose)))
            .collect();
        for observable in ["[Cve_emp]", "KI__UGE"] {
            if observable == "[Cve_emp]" && dose == 0.0 {
                continue;
            }
            study = study.mapping(FitMapping::new(
                intervention,
                observable,
                observed(observable, Dosing::Multiple, Health::T2dm, Fasting::NotReported),
            ));
        }
    }
    figures.into_iter().fold(study, Study::figure)
}

pub fn jiang2023b() -> Study {
    let changes = base::initial_changes(Some(69.4), Some(FPG_HEALTHY), 25.0)
        .with("KI__f_renal_function", 1.0);
    let mut study = Study::new("Jiang2023b", "Healthy")
        .simulation("po_emp25", single_dose(50.0, changes))
        .figure(StudyFigure::new("Fig2", &[Observable::CveEmp]).curve("po_emp25", "25 mg Emp", "black"));
    for intervention in ["test", "ref"] {
        study = study.mapping(
            FitMapping::new(
                "po_emp25",
                "[Cve_emp]",
                plasma(Dosing::Single, Health::Healthy, Fasting::Fasted),
            )
            .dataset(intervention),
        );
    }
    study
}

pub fn kim2021() -> Study {
    let first = base::initial_changes(Some(73.1), Some(FPG_HEALTHY), 25.0)
        .with("KI__f_renal_function", 1.0);
    let mut study = Study::new("Kim2021", "Healthy");
    let mut figure = StudyFigure::new("Fig3", &[Observable::CveEmp]);
    for (intervention, label, color, coadministration) in [
        ("E", "25 mg Emp", "black", Coadministration::None),
        ("E, L", "25 mg Emp + Lob", BLUE, Coadministration::Lobeglitazone),
    ] {
        let task = format!("po_emp25_{intervention}");
        study = study
            .simulation(
                task.clone(),
                daily_doses(first.clone(), 25.0, &Changes::new(), 3, Some(30.0)).with_offset(-4.0 * DAY),
            )
            .mapping(FitMapping::new(
                task.clone(),
                "[Cve_emp]",
                plasma(Dosing::Multiple, Health::Healthy, Fasting::Fasted).coadministration(coadministration),
            ));
        figure = figure.curve(task, label, color);
    }
    study.figure(figure)
}

pub fn kim2023() -> Study {
    let first = base::initial_changes(None, None, 25.0);
    let mut study = Study::new("Kim2023", "Healthy")
        .simulation(
            "po_emp25",
            daily_doses(first, 25.0, &Changes::new(), 3, Some(25.0)).with_offset(-4.0 * DAY),
        )
        .figure(StudyFigure::new("Fig1", &[Observable::CveEmp]).curve("po_emp25", "25 mg Emp", "black"));
    for (intervention, coadministration) in [
        ("EP25", Coadministration::None),
        ("EV5, EP25", Coadministration::Evogliptin),
    ] {
        study = study.mapping(
            FitMapping::new(
                "po_emp25",
                "[Cve_emp]",
                plasma(Dosing::Multiple, Health::Healthy, Fasting::Fasted).coadministration(coadministration),
            )
            .dataset(intervention),
        );
    }
    study
}

pub fn macha2013d() -> Study {
    let groups = [
        ("emp25_single", 71.0, "black"),
        ("emp25_single, ver120_single", 71.0, ORANGE),
        ("emp25_multi", 69.0, BLUE),
        ("emp25_multi, ram5_multi", 69.0, GREEN),
    ];
    let mut study = Study::new("Macha2013d", "Healthy");
    let mut figure = StudyFigure::new("Fig1", &[Observable::CveEmp]);
    for (intervention, bodyweight, color) in groups {
        let task = format!("po_emp25_{intervention}");
        let changes = base::initial_changes(Some(bodyweight), Some(FPG_HEALTHY), 25.0)
            .with("KI__f_renal_function", 1.0);
        let dosing = if intervention.contains("single") {
            Dosing::Single
        } else {
            Dosing::Multiple
        };
        study = study
            .simulation(task.clone(), single_dose(73.0, changes))
            .mapping(FitMapping::new(
                task.clone(),
                "[Cve_emp]",
                plasma(dosing, Health::Healthy, Fasting::Fasted),
            ));
        figure = figure.curve(task, intervention.replace("emp25_", ""), color);
    }
    study.figure(figure)
}

pub fn macha2013e() -> Study {
    let mut study = Study::new("Macha2013e", "Healthy");
    let mut figure = StudyFigure::new("Fig3", &[Observable::CveEmp]);
    for (intervention, repeats, color, coadministration) in [
        ("emp", 3, "black", Coadministration::None),
        ("emp, war", 5, BLUE, Coadministration::Warfarin),
    ] {
        let task = format!("po_emp25_{intervention}");
        let first = base::initial_changes(None, Some(FPG_HEALTHY), 25.0)
            .with("KI__f_renal_function", 1.0);
        let dose = Changes::new().with("PODOSE_emp", 25.0);
        let mut sim = daily_doses(first, 25.0, &Changes::new(), repeats, None);
        sim.timecourses.push(base::timecourse(170.0, 2000, dose));
        let sim = sim.with_offset(-((repeats + 1) as f64) * DAY);
        study = study.simulation(task.clone(), sim).mapping(FitMapping::new(
            task.clone(),
            "[Cve_emp]",
            plasma(Dosing::Multiple, Health::Healthy, Fasting::Fasted).coadministration(coadministration),
        ));
        figure = figure.curve(task, intervention, color);
    }
    study.figure(figure)
}

pub fn macha2014() -> Study {
    let interventions = [
        ("EMP10", 10.0, "black"),
        ("EMP25", 25.0, BLUE),
        ("EMP25, GEM", 25.0, ORANGE),
        ("EMP10, RIF", 10.0, GREEN),
        ("EMP10, PROB", 10.0, RED),
    ];
    let mut study = Study::new("Macha2014", "Healthy");
    let mut figure = StudyFigure::new("Fig2", &[Observable::CveEmp]);
    for (intervention, dose, color) in interventions {
        let task = format!("po_emp{dose}_{intervention}");
        let changes = base::initial_changes(None, Some(FPG_HEALTHY), dose)
            .with("KI__f_renal_function", 1.0);
        study = study
            .simulation(task.clone(), single_dose(73.0, changes))
            .mapping(FitMapping::new(
                task.clone(),
                "[Cve_emp]",
                plasma(Dosing::Single, Health::Healthy, Fasting::Fasted),
            ));
        figure = figure.curve(task, intervention, color);
    }
    study.figure(figure)
}

pub fn macha2014b() -> Study {
    let groups = [
        ("normal", 75.0, "Control"),
        ("mild", 82.5, "Mild cirrhosis"),
        ("moderate", 75.5, "Moderate cirrhosis"),
        ("severe", 70.5, "Severe cirrhosis"),
    ];
    let observables = ["[Cve_emp]", "Aurine_emp", "Aurine_eg", "Aurine_emptot", "KI__UGE"];
    let mut study = Study::new("Macha2014b", "Hepatic impairment");
    let mut figure = StudyFigure::new(
        "Fig1_2",
        &[
            Observable::CveEmp,
            Observable::UrineEmp,
            Observable::UrineEg,
            Observable::UrineEmpTot,
            Observable::Uge,
        ],
    );
    for (k, (group, bodyweight, cirrhosis)) in groups.into_iter().enumerate() {
        let f_cirrhosis = base::lookup(&base::CIRRHOSIS_MAP, cirrhosis).unwrap_or(0.0);
        let changes = base::initial_changes(Some(bodyweight), Some(FPG_HEALTHY), 50.0)
            .with("f_cirrhosis", f_cirrhosis);
        study = study.simulation(group, single_dose(100.0, changes));
        figure = figure.curve(group, cirrhosis, base::CIRRHOSIS_COLORS[k]);

        let health = if group == "normal" {
            Health::Healthy
        } else {
            Health::HepaticImpairment
        };
        for observable in observables {
            study = study.mapping(FitMapping::new(
                group,
                observable,
                observed(observable, Dosing::Single, health, Fasting::Fasted),
            ));
        }
    }
    study.figure(figure)
}

pub fn macha2014f() -> Study {
    let groups = [
        ("normal", 56.0, 1.0),
        ("mild", 70.2, 0.5 * (60.0 + 89.0) / 100.0),
        ("moderate", 78.6, 0.5 * (30.0 + 59.0) / 100.0),
        ("severe", 75.1, 15.0 / 100.0),
    ];
    let mut study = Study::new("Macha2014f", "Renal impairment");
    let mut figure = StudyFigure::new(
        "Fig1_3_Tab2A",
        &[Observable::CveEmp, Observable::UrineEmp, Observable::Uge],
    );
    for (k, (group, bodyweight, renal_function)) in groups.into_iter().enumerate() {
        let changes = base::initial_changes(Some(bodyweight), Some(10.0), 50.0)
            .with("KI__f_renal_function", renal_function);
        study = study.simulation(group, single_dose(100.0, changes));
        figure = figure.curve(group, format!("{group} renal function"), base::RENAL_COLORS[k]);

        let health = if group == "normal" {
            Health::T2dm
        } else {
            Health::T2dmRenalImpairment
        };
        for observable in ["[Cve_emp]", "Aurine_emp", "KI__UGE"] {
            study = study.mapping(FitMapping::new(
                group,
                observable,
                observed(observable, Dosing::Single, health, Fasting::NotReported),
            ));
        }
    }
    study.figure(figure)
}

pub fn macha2015b() -> Study {
    let mut study = Study::new("Macha2015b", "Healthy");
    let mut figure = StudyFigure::new("Fig1", &[Observable::CveEmp]);
    for (intervention, color) in [("emp50", "black"), ("emp50, piog45", BLUE)] {
        let task = format!("po_emp50_{intervention}");
        let first = base::initial_changes(None, Some(FPG_HEALTHY), 50.0)
            .with("KI__f_renal_function", 1.0);
        study = study
            .simulation(
                task.clone(),
                daily_doses(first, 50.0, &Changes::new(), 3, Some(30.0)).with_offset(-4.0 * DAY),
            )
            .mapping(FitMapping::new(
                task.clone(),
                "[Cve_emp]",
                plasma(Dosing::Single, Health::Healthy, Fasting::Fasted),
            ));
        figure = figure.curve(task, intervention, color);
    }
    study.figure(figure)
}

/// Single dose escalation with placebo, emp data only for active doses
fn dose_escalation(
    sid: &'static str,
    figure_sid: &str,
    bodyweight: f64,
    doses: &[(&str, f64)],
    observables: &[&'static str],
) -> Study {
    let mut study = Study::new(sid, "Healthy");
    let mut figure = StudyFigure::new(
        figure_sid,
        &[Observable::CveEmp, Observable::UrineEmp, Observable::Uge],
    );
    for (intervention, dose) in doses {
        let changes = base::initial_changes(Some(bodyweight), Some(FPG_HEALTHY), *dose);
        study = study.simulation(*intervention, single_dose(75.0, changes));
        figure = figure.curve(*intervention, base::dose_label(*dose), base::dose_color(*dose));
        for observable in observables {
            if *dose == 0.0 && observable.contains("emp") {
                continue;
            }
            study = study.mapping(FitMapping::new(
                *intervention,
                observable,
                observed(observable, Dosing::Single, Health::Healthy, Fasting::NotReported),
            ));
        }
    }
    study.figure(figure)
}

pub fn sarashina2013() -> Study {
    dose_escalation(
        "Sarashina2013",
        "Fig1_2_Tab3A",
        78.0,
        &[
            ("placebo", 0.0),
            ("EMP1", 1.0),
            ("EMP5", 5.0),
            ("EMP10", 10.0),
            ("EMP25", 25.0),
            ("EMP100", 100.0),
        ],
        &["[Cve_emp]", "Aurine_emp", "KI__UGE"],
    )
}

pub fn seman2013() -> Study {
    dose_escalation(
        "Seman2013",
        "Fig1_2",
        79.0,
        &[
            ("placebo", 0.0),
            ("EMP0.5", 0.5),
            ("EMP2.5", 2.5),
            ("EMP10", 10.0),
            ("EMP25", 25.0),
            ("EMP50", 50.0),
            ("EMP100", 100.0),
            ("EMP200", 200.0),
            ("EMP400", 400.0),
            ("EMP800", 800.0),
        ],
        // urinary empagliflozin is not part of the data
        &["[Cve_emp]", "KI__UGE"],
    )
}

pub fn vanderaartvanderbeek2020() -> Study {
    let first = base::initial_changes(None, Some(10.0), 10.0);
    let mut study = Study::new("vanderAartvanderBeek2020", "T2DM")
        .simulation(
            "po_emp10",
            daily_doses(first, 10.0, &Changes::new(), 9, None).with_offset(-9.0 * DAY),
        )
        .figure(
            StudyFigure::new("Fig3", &[Observable::CveEmp])
                .curve("po_emp10", "10 mg Emp", "black")
                .x_range(-1.0, 25.0),
        );
    for subject in 1..=6 {
        study = study.mapping(
            FitMapping::new(
                "po_emp10",
                "[Cve_emp]",
                plasma(Dosing::Multiple, Health::T2dm, Fasting::NotReported),
            )
            .dataset(&format!("S{subject}")),
        );
    }
    study
}

pub fn zhao2015() -> Study {
    // glucose as reported, converted with a factor of 180
    let groups = [
        ("MULTI10", 74.0, 166.67 / 180.0, 10.0, BLUE),
        ("MULTI25", 67.0, 160.56 / 180.0, 25.0, PURPLE),
    ];
    let resets = Changes::new().with("Aurine_emp", 0.0);
    let mut study = Study::new("Zhao2015", "T2DM");
    let mut figure = StudyFigure::new("Fig1", &[Observable::CveEmp, Observable::UrineEmp]);
    for (intervention, bodyweight, fpg, dose, color) in groups {
        let mut first = base::initial_changes(Some(bodyweight), Some(fpg), dose);
        first.extend(&resets);
        let repeated = Changes::new().with("PODOSE_emp", dose).with("Aurine_emp", 0.0);
        let sim = TimecourseSim::repeated(
            base::timecourse(48.0, STEPS, first),
            base::timecourse(24.0, STEPS, repeated.clone()),
            6,
            Some(base::timecourse(75.0, STEPS, repeated)),
        );
        study = study.simulation(intervention, sim);
        figure = figure.curve(intervention, base::dose_label(dose), color);
        for observable in ["[Cve_emp]", "Aurine_emp"] {
            study = study.mapping(FitMapping::new(
                intervention,
                observable,
                observed(observable, Dosing::Multiple, Health::T2dm, Fasting::Fasted),
            ));
        }
    }
    study.figure(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::EXPERIMENTS;

    #[test]
    fn figure_tasks_exist() {
        for name in EXPERIMENTS {
            let Some(study) = study(name) else { continue };
            let tasks: Vec<&str> = study.tasks().collect();
            for figure in &study.figures {
                for curve in &figure.curves {
                    assert!(tasks.contains(&curve.task.as_str()), "{name}: {}", curve.task);
                }
            }
            for mapping in &study.mappings {
                assert!(tasks.contains(&mapping.task.as_str()), "{name}: {}", mapping.task);
                assert!(Observable::from_id(mapping.observable).is_some());
            }
        }
    }

    #[test]
    fn mapping_keys_are_unique() {
        for name in EXPERIMENTS {
            let Some(study) = study(name) else { continue };
            let mut keys: Vec<&str> = study.mappings.iter().map(|m| m.key.as_str()).collect();
            let n = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), n, "{name}");
        }
    }

    #[test]
    fn multiple_dosing_protocols() {
        let brand = brand2012();
        let d10 = &brand.simulations["po_EMP50_D10"];
        assert_eq!(d10.timecourses.len(), 10);
        assert_eq!(d10.time_offset, -9.0 * DAY);
        assert_eq!(d10.timecourses[0].changes.get("Aurine_emp"), None);
        assert_eq!(d10.timecourses[1].changes.get("Aurine_emp"), Some(0.0));
        assert_eq!(d10.timecourses[9].end, 25.0 * 60.0);

        let heise = heise2013a();
        let placebo = &heise.simulations["Placebo"];
        assert_eq!(placebo.timecourses.len(), 28);
        assert!(placebo
            .timecourses
            .iter()
            .all(|tc| tc.changes.get("KI__glc_urine") == Some(0.0)));

        let macha = macha2013e();
        let war = &macha.simulations["po_emp25_emp, war"];
        assert_eq!(war.timecourses.len(), 7);
        assert_eq!(war.timecourses[6].steps, 2000);
        assert_eq!(war.time_offset, -6.0 * DAY);
    }

    #[test]
    fn group_parameters() {
        let study = macha2014b();
        let severe = &study.simulations["severe"].timecourses[0].changes;
        assert_eq!(severe.get("f_cirrhosis"), Some(0.8127551020408164));
        assert_eq!(severe.get("BW"), Some(70.5));

        let study = macha2014f();
        let mild = &study.simulations["mild"].timecourses[0].changes;
        assert!((mild.get("KI__f_renal_function").unwrap() - 0.745).abs() < 1e-12);
        assert_eq!(mild.get("[KI__fpg]"), Some(10.0));

        let study = kim2023();
        let first = &study.simulations["po_emp25"].timecourses[0].changes;
        assert_eq!(first.get("BW"), None);
    }

    #[test]
    fn outliers_are_flagged() {
        assert!(hailat2022().mappings.iter().all(|m| m.metadata.outlier));
        assert!(ayoub2017().mappings.iter().all(|m| !m.metadata.outlier));
    }
}
