//! The whole-body model and the organ submodels as [SbmlModel]s.
//!
//! Organ submodels are written once for both documents. Flattened into the body their
//! identifiers carry the organ prefix (`GU__`, `LI__`, `KI__`) and their volumes follow
//! from assignment rules; as standalone documents the identifiers are local and the
//! volumes are the values of the given parameters. Substances enter and leave a
//! submodel through the extracellular species of its organ (the port).

use super::{ci, cn, gt, piecewise, power, Compartment, Initial, Math, Parameter, Rule, SbmlModel, Species};
use crate::model::body::Derived;
use crate::model::parameters::Parameters;
use crate::model::state::{N_INTESTINE, STATES};

const SUBSTANCES: [(&str, &str); 2] = [("emp", "empagliflozin"), ("eg", "empagliflozin-glucuronide")];

const ORGANS: [&str; 3] = ["GU__", "LI__", "KI__"];

/// Compartment of the body level amounts by identifier prefix
const BODY_COMPARTMENTS: [(&str, &str); 10] = [
    ("Agu", "Vgu_ext"),
    ("Apo", "Vpo"),
    ("Ali", "Vli_ext"),
    ("Ahv", "Vhv"),
    ("Aki", "Vki_ext"),
    ("Ave", "Vve"),
    ("Alu", "Vlu_ext"),
    ("Aar", "Var"),
    ("Are", "Vre_ext"),
    ("Xre", "Vre_tissue"),
];

pub const BODY_FLAT: &str = "empagliflozin_body_flat";
pub const INTESTINE: &str = "empagliflozin_intestine";
pub const LIVER: &str = "empagliflozin_liver";
pub const KIDNEY: &str = "empagliflozin_kidney";

/// Flattened whole-body model followed by the intestine, liver and kidney submodels
pub fn all(p: &Parameters) -> Vec<SbmlModel> {
    vec![body_flat(p), intestine_model(p), liver_model(p), kidney_model(p)]
}

struct Scope {
    organ: &'static str,
    flat: bool,
}

impl Scope {
    fn flat(organ: &'static str) -> Self {
        Scope { organ, flat: true }
    }

    fn submodel(organ: &'static str) -> Self {
        Scope { organ, flat: false }
    }

    fn id(&self, local: &str) -> String {
        if self.flat {
            format!("{}{}", self.organ, local)
        } else {
            local.to_string()
        }
    }

    fn ci(&self, local: &str) -> Math {
        ci(self.id(local))
    }

    fn state_name(&self, local: &str) -> String {
        let id = format!("{}{}", self.organ, local);
        STATES
            .iter()
            .find(|info| info.id == id)
            .map_or_else(|| local.to_string(), |info| info.name.to_string())
    }

    fn add_species(&self, model: &mut SbmlModel, local: &str, compartment: &str) {
        model.add_species(self.id(local), self.state_name(local), &self.id(compartment));
    }

    /// Organ parameters, constant in both documents
    fn add_parameters(&self, model: &mut SbmlModel, p: &Parameters, skip: &[&str]) {
        for info in Parameters::INFO
            .iter()
            .filter(|info| info.id.starts_with(self.organ) && !skip.contains(&info.id))
        {
            if let Some(value) = p.get(info.id) {
                let local = &info.id[self.organ.len()..];
                model
                    .parameters
                    .push(Parameter::constant(self.id(local), label(info.name, info.unit), value));
            }
        }
    }

    fn add_compartment(&self, model: &mut SbmlModel, local: &str, name: &str, rule: Math, size: f64) {
        let id = self.id(local);
        if self.flat {
            model.compartments.push(Compartment::assigned(&id, name));
            model.assign(id, rule);
        } else {
            model.compartments.push(Compartment::constant(id, name, size));
        }
    }

    /// Assigned in both documents
    fn add_assigned(&self, model: &mut SbmlModel, local: &str, name: &str, rule: Math) {
        let id = self.id(local);
        model.parameters.push(Parameter::variable(&id, name, None));
        model.assign(id, rule);
    }

    /// Body level quantity the submodel depends on
    fn add_external(&self, model: &mut SbmlModel, id: &str, name: &str, value: f64) {
        if !self.flat {
            model.parameters.push(Parameter::constant(id, name, value));
        }
    }
}

/// Extracellular species of an organ
struct Port {
    prefix: &'static str,
    compartment: &'static str,
}

impl Port {
    const SUBMODEL: Port = Port {
        prefix: "ext",
        compartment: "Vext",
    };

    fn species(&self, substance: &str) -> String {
        format!("{}_{}", self.prefix, substance)
    }

    fn conc(&self, substance: &str) -> Math {
        ci(self.species(substance)) / ci(self.compartment)
    }

    fn add_to(&self, model: &mut SbmlModel, volume: f64, organ: &str) {
        let region = format!("{organ} extracellular");
        model
            .compartments
            .push(Compartment::constant(self.compartment, &region, volume));
        for (substance, name) in SUBSTANCES {
            model.add_species(self.species(substance), format!("{name} ({region})"), self.compartment);
        }
    }
}

fn label(name: &str, unit: &str) -> String {
    format!("{name} [{unit}]")
}

fn one_minus(x: Math) -> Math {
    cn(1.0) - x
}

pub fn body_flat(p: &Parameters) -> SbmlModel {
    let d = Derived::new(p);
    let mut model = SbmlModel::new(BODY_FLAT, "Empagliflozin whole-body model (flat)");
    body(&mut model, p);
    intestine(
        &mut model,
        p,
        &d,
        &Scope::flat("GU__"),
        &Port {
            prefix: "Agu",
            compartment: "Vgu_ext",
        },
    );
    liver(
        &mut model,
        p,
        &d,
        &Scope::flat("LI__"),
        &Port {
            prefix: "Ali",
            compartment: "Vli_ext",
        },
        "GU__eg_lumen",
    );
    kidney(
        &mut model,
        p,
        &d,
        &Scope::flat("KI__"),
        &Port {
            prefix: "Aki",
            compartment: "Vki_ext",
        },
    );
    model
}

pub fn intestine_model(p: &Parameters) -> SbmlModel {
    let d = Derived::new(p);
    let mut model = SbmlModel::new(INTESTINE, "Empagliflozin intestine");
    Port::SUBMODEL.add_to(&mut model, d.v_gu_ext, "gut");
    intestine(&mut model, p, &d, &Scope::submodel("GU__"), &Port::SUBMODEL);
    model
}

pub fn liver_model(p: &Parameters) -> SbmlModel {
    let d = Derived::new(p);
    let mut model = SbmlModel::new(LIVER, "Empagliflozin liver");
    Port::SUBMODEL.add_to(&mut model, d.v_li_ext, "liver");
    model.compartments.push(Compartment::constant("Vbi", "bile", 1.0));
    model.add_species("eg_bi", "empagliflozin-glucuronide (bile)", "Vbi");
    liver(&mut model, p, &d, &Scope::submodel("LI__"), &Port::SUBMODEL, "eg_bi");
    model
}

pub fn kidney_model(p: &Parameters) -> SbmlModel {
    let d = Derived::new(p);
    let mut model = SbmlModel::new(KIDNEY, "Empagliflozin kidney");
    Port::SUBMODEL.add_to(&mut model, d.v_ki_ext, "kidney");
    kidney(&mut model, p, &d, &Scope::submodel("KI__"), &Port::SUBMODEL);
    model
}

fn body(model: &mut SbmlModel, p: &Parameters) {
    for info in Parameters::INFO
        .iter()
        .filter(|info| !ORGANS.iter().any(|organ| info.id.starts_with(organ)))
    {
        if let Some(value) = p.get(info.id) {
            model
                .parameters
                .push(Parameter::constant(info.id, label(info.name, info.unit), value));
        }
    }

    assigned(
        model,
        "CO",
        "cardiac output [l/min]",
        ci("BW") * ci("COBW") * cn(60.0) / cn(1000.0),
    );
    assigned(model, "QC", "cardiac plasma output [l/min]", ci("CO") * one_minus(ci("HCT")));
    assigned(model, "Qlu", "lung plasma flow [l/min]", ci("QC"));
    for (organ, name) in [("gu", "gut"), ("ki", "kidney"), ("h", "hepatic")] {
        assigned(
            model,
            &format!("Q{organ}"),
            &format!("{name} plasma flow [l/min]"),
            ci(format!("FQ{organ}")) * ci("QC"),
        );
    }
    assigned(model, "Qha", "hepatic arterial plasma flow [l/min]", ci("Qh") - ci("Qgu"));
    assigned(
        model,
        "Qre",
        "rest plasma flow [l/min]",
        ci("QC") - ci("Qki") - ci("Qh"),
    );

    for (organ, name) in [("gu", "gut"), ("ki", "kidney"), ("li", "liver"), ("lu", "lung")] {
        assigned(
            model,
            &format!("V{organ}"),
            &format!("{name} volume [l]"),
            ci(format!("FV{organ}")) * ci("BW"),
        );
    }
    let fractions = ["gu", "ki", "li", "lu", "ve", "ar", "po", "hv"]
        .iter()
        .map(|organ| ci(format!("FV{organ}")))
        .collect();
    assigned(
        model,
        "FVre",
        "rest volume per body weight [l/kg]",
        one_minus(Math::Apply(super::Op::Plus, fractions)),
    );
    assigned(model, "Vre", "rest volume [l]", ci("FVre") * ci("BW"));

    for (vessel, name) in [
        ("ve", "venous plasma"),
        ("ar", "arterial plasma"),
        ("po", "portal vein plasma"),
        ("hv", "hepatic vein plasma"),
    ] {
        let id = format!("V{vessel}");
        model.compartments.push(Compartment::assigned(&id, name));
        model.assign(id, ci(format!("FV{vessel}")) * ci("BW") * one_minus(ci("HCT")));
    }
    for (organ, name) in [
        ("gu", "gut"),
        ("ki", "kidney"),
        ("li", "liver"),
        ("lu", "lung"),
        ("re", "rest"),
    ] {
        let id = format!("V{organ}_ext");
        model
            .compartments
            .push(Compartment::assigned(&id, format!("{name} extracellular")));
        model.assign(id, ci(format!("Fext_{organ}")) * ci(format!("V{organ}")));
    }
    model
        .compartments
        .push(Compartment::assigned("Vre_tissue", "rest tissue"));
    model.assign("Vre_tissue", ci("Vre") * one_minus(ci("Fext_re")));

    assigned(model, "f_shunts", "fraction of hepatic inflow shunted [-]", ci("f_cirrhosis"));
    assigned(
        model,
        "Ki_emp",
        "injection rate of intravenous empagliflozin [1/min]",
        cn(1.386) / (ci("ti_emp") / cn(60.0)),
    );

    for info in STATES
        .iter()
        .filter(|info| !info.id.contains("__") && info.unit == "mmol")
    {
        if let Some((_, compartment)) = BODY_COMPARTMENTS
            .iter()
            .find(|(prefix, _)| info.id.starts_with(prefix))
        {
            model.add_species(info.id, info.name, compartment);
        }
    }

    // intravenous dose and infusion
    model.parameters.push(Parameter::variable(
        "IVDOSE_emp",
        "intravenous dose empagliflozin [mg]",
        Some(0.0),
    ));
    model.rules.push(Rule::Rate {
        variable: "IVDOSE_emp".to_string(),
        math: -(ci("iv_emp") * ci("Mr_emp")),
    });
    model.add_reaction(
        "iv_emp",
        "injection empagliflozin",
        &[],
        &["Ave_emp"],
        ci("Ki_emp") * ci("IVDOSE_emp") / ci("Mr_emp"),
    );
    model.add_reaction(
        "infusion_emp",
        "infusion empagliflozin",
        &[],
        &["Ave_emp"],
        ci("Ri_emp") / ci("Mr_emp"),
    );

    for (substance, _) in SUBSTANCES {
        let conc = |prefix: &str, compartment: &str| ci(format!("{prefix}_{substance}")) / ci(compartment);
        let perfused = || one_minus(ci("f_shunts"));
        let flows = [
            ("ve", "lu", ci("Qlu") * conc("Ave", "Vve")),
            ("lu", "ar", ci("Qlu") * conc("Alu", "Vlu_ext")),
            ("ar", "gu", ci("Qgu") * conc("Aar", "Var")),
            ("ar", "ki", ci("Qki") * conc("Aar", "Var")),
            ("ar", "re", ci("Qre") * conc("Aar", "Var")),
            ("ar", "li", perfused() * ci("Qha") * conc("Aar", "Var")),
            ("ar", "hv", ci("f_shunts") * ci("Qha") * conc("Aar", "Var")),
            ("gu", "po", ci("Qgu") * conc("Agu", "Vgu_ext")),
            ("po", "li", perfused() * ci("Qgu") * conc("Apo", "Vpo")),
            ("po", "hv", ci("f_shunts") * ci("Qgu") * conc("Apo", "Vpo")),
            ("li", "hv", perfused() * ci("Qh") * conc("Ali", "Vli_ext")),
            ("hv", "ve", ci("Qh") * conc("Ahv", "Vhv")),
            ("ki", "ve", ci("Qki") * conc("Aki", "Vki_ext")),
            ("re", "ve", ci("Qre") * conc("Are", "Vre_ext")),
        ];
        for (from, to, rate) in flows {
            let source = species_of(from, substance);
            let target = species_of(to, substance);
            model.add_reaction(
                format!("Flow_{from}_{to}_{substance}"),
                format!("flow {from} to {to} ({substance})"),
                &[source.as_str()],
                &[target.as_str()],
                rate,
            );
        }
    }

    model.add_reaction(
        "EMPRE",
        "tissue distribution empagliflozin",
        &["Are_emp"],
        &["Xre_emp"],
        ci("ftissue_emp")
            * (ci("Are_emp") / ci("Vre_ext") - ci("Xre_emp") / ci("Vre_tissue") / ci("Kp_emp")),
    );
}

fn species_of(region: &str, substance: &str) -> String {
    format!("A{region}_{substance}")
}

fn assigned(model: &mut SbmlModel, id: &str, name: &str, rule: Math) {
    model.parameters.push(Parameter::variable(id, name, None));
    model.assign(id, rule);
}

fn intestine(model: &mut SbmlModel, p: &Parameters, d: &Derived, s: &Scope, port: &Port) {
    s.add_parameters(model, p, &[]);
    s.add_external(model, "Vgu", "gut volume [l]", d.v_gu);
    s.add_external(model, "Mr_emp", "molecular weight empagliflozin [g/mol]", p.mr_emp);
    s.add_compartment(model, "Vlumen", "intestinal lumen", s.ci("Flumen") * ci("Vgu"), d.v_lumen);
    s.add_compartment(
        model,
        "Vintestine",
        "intestinal transit segment",
        s.ci("Vlumen") / cn(N_INTESTINE as f64),
        d.v_intestine,
    );
    model
        .compartments
        .push(Compartment::constant(s.id("Vfeces"), "feces", 1.0));

    for (substance, _) in SUBSTANCES {
        s.add_species(model, &format!("{substance}_lumen"), "Vlumen");
        for k in 0..N_INTESTINE {
            s.add_species(model, &format!("{substance}_intestine_{k}"), "Vintestine");
        }
        s.add_species(model, &format!("{substance}_feces"), "Vfeces");
    }

    // oral dose
    let dissolution = s.id("dissolution_emp");
    let lumen_emp = s.id("emp_lumen");
    model
        .parameters
        .push(Parameter::variable("PODOSE_emp", "oral dose empagliflozin [mg]", Some(0.0)));
    model.rules.push(Rule::Rate {
        variable: "PODOSE_emp".to_string(),
        math: -(ci(&dissolution) * ci("Mr_emp")),
    });
    model.add_reaction(
        &dissolution,
        "dissolution empagliflozin",
        &[],
        &[lumen_emp.as_str()],
        s.ci("Ka_dis_emp") / cn(60.0) * ci("PODOSE_emp") / ci("Mr_emp"),
    );

    let lumen = |substance: &str| s.ci(&format!("{substance}_lumen")) / s.ci("Vlumen");
    let absorption = s.ci("EMPABS_k") * ci("Vgu") * lumen("emp");
    model.add_reaction(
        s.id("EMPABS"),
        "absorption empagliflozin",
        &[lumen_emp.as_str()],
        &[port.species("emp").as_str()],
        s.ci("F_emp_abs") * absorption.clone(),
    );
    model.add_reaction(
        s.id("EMPEXC"),
        "excretion of unabsorbed empagliflozin",
        &[lumen_emp.as_str()],
        &[s.id("emp_intestine_0").as_str()],
        one_minus(s.ci("F_emp_abs")) * absorption,
    );
    model.add_reaction(
        s.id("EGEXC"),
        "excretion empagliflozin-glucuronide",
        &[s.id("eg_lumen").as_str()],
        &[s.id("eg_intestine_0").as_str()],
        s.ci("METEXC_k") * ci("Vgu") * lumen("eg"),
    );

    for (substance, _) in SUBSTANCES {
        for k in 0..N_INTESTINE {
            let segment = s.id(&format!("{substance}_intestine_{k}"));
            let next = if k + 1 < N_INTESTINE {
                s.id(&format!("{substance}_intestine_{}", k + 1))
            } else {
                s.id(&format!("{substance}_feces"))
            };
            model.add_reaction(
                s.id(&format!("{}TRANS{k}", substance.to_uppercase())),
                format!("transit {substance} {k}"),
                &[segment.as_str()],
                &[next.as_str()],
                s.ci("METEXC_k") * ci(&segment),
            );
        }
    }
}

fn liver(model: &mut SbmlModel, p: &Parameters, d: &Derived, s: &Scope, port: &Port, bile: &str) {
    s.add_parameters(model, p, &[]);
    s.add_compartment(
        model,
        "Vcell",
        "hepatocytes",
        ci("Vli") * one_minus(ci("Fext_li")) * one_minus(ci("f_cirrhosis")),
        d.v_li_cell,
    );
    s.add_species(model, "emp", "Vcell");
    s.add_species(model, "eg", "Vcell");

    let cell = |substance: &str| s.ci(substance) / s.ci("Vcell");
    model.add_reaction(
        s.id("EMPIM"),
        "import empagliflozin",
        &[port.species("emp").as_str()],
        &[s.id("emp").as_str()],
        s.ci("EMPIM_k") * s.ci("Vcell") * (port.conc("emp") - cell("emp")),
    );
    model.add_reaction(
        s.id("EMP2EG"),
        "glucuronidation empagliflozin",
        &[s.id("emp").as_str()],
        &[s.id("eg").as_str()],
        s.ci("f_ugt") * s.ci("EMP2EG_Vmax") * s.ci("Vcell") * cell("emp")
            / (cell("emp") + s.ci("EMP2EG_Km_emp")),
    );
    model.add_reaction(
        s.id("EGEX"),
        "export empagliflozin-glucuronide",
        &[s.id("eg").as_str()],
        &[port.species("eg").as_str()],
        s.ci("EGEX_k") * s.ci("Vcell") * (cell("eg") - port.conc("eg")),
    );
    model.add_reaction(
        s.id("EGBIEX"),
        "biliary excretion empagliflozin-glucuronide",
        &[s.id("eg").as_str()],
        &[bile],
        s.ci("EGBIEX_k") * s.ci("Vcell") * cell("eg"),
    );
}

fn kidney(model: &mut SbmlModel, p: &Parameters, d: &Derived, s: &Scope, port: &Port) {
    s.add_parameters(model, p, &["KI__fpg"]);
    s.add_external(model, "Vki", "kidney volume [l]", d.v_ki);
    model
        .compartments
        .push(Compartment::constant(s.id("Vurine"), "urine", 1.0));
    for local in ["emp_urine", "eg_urine", "glc_urine"] {
        s.add_species(model, local, "Vurine");
    }
    model.species.push(Species {
        id: s.id("fpg"),
        name: "fasting plasma glucose".to_string(),
        compartment: port.compartment.to_string(),
        initial: Initial::Concentration(p.ki_fpg),
        boundary: true,
    });

    s.add_assigned(
        model,
        "GFR",
        "glomerular filtration rate [ml/min]",
        s.ci("f_renal_function") * s.ci("GFR_healthy"),
    );
    s.add_assigned(
        model,
        "RTG_fpg",
        "renal threshold for glucose without empagliflozin [mM]",
        s.ci("RTG_base") + s.ci("RTG_m_fpg") * (s.ci("fpg") - s.ci("fpg_healthy")),
    );
    s.add_assigned(
        model,
        "RTG_delta",
        "maximal reduction of the renal threshold [mM]",
        s.ci("RTG_fpg") * s.ci("RTG_max_inhibition"),
    );
    let effect = power(port.conc("emp"), s.ci("RTG_gamma"));
    s.add_assigned(
        model,
        "RTG",
        "renal threshold for glucose [mM]",
        s.ci("RTG_fpg")
            - s.ci("RTG_delta") * effect.clone()
                / (power(s.ci("RTG_E50"), s.ci("RTG_gamma")) + effect),
    );
    s.add_assigned(
        model,
        "UGE",
        "urinary glucose excretion [g]",
        s.ci("glc_urine") * s.ci("Mr_glc") / cn(1000.0),
    );

    for (substance, name) in SUBSTANCES {
        let rate = format!("{}EX_k", substance.to_uppercase());
        model.add_reaction(
            s.id(&format!("{}EX", substance.to_uppercase())),
            format!("renal excretion {name}"),
            &[port.species(substance).as_str()],
            &[s.id(&format!("{substance}_urine")).as_str()],
            s.ci("f_renal_function") * s.ci(&rate) * ci("Vki") * port.conc(substance),
        );
    }
    model.add_reaction(
        s.id("GLCEX"),
        "urinary glucose excretion",
        &[],
        &[s.id("glc_urine").as_str()],
        piecewise(
            s.ci("GFR") / cn(1000.0) * (s.ci("fpg") - s.ci("RTG")),
            gt(s.ci("fpg"), s.ci("RTG")),
            cn(0.0),
        ),
    );
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use approx::assert_relative_eq;

    use super::super::Op;
    use super::*;
    use crate::model::equations;
    use crate::model::state::{self, State, IVDOSE_EMP, PODOSE_EMP};

    fn eval(math: &Math, env: &HashMap<String, f64>) -> f64 {
        match math {
            Math::Ci(id) => *env.get(id).unwrap_or_else(|| panic!("undefined {id}")),
            Math::Cn(value) => *value,
            Math::Apply(op, args) => {
                let v: Vec<f64> = args.iter().map(|arg| eval(arg, env)).collect();
                match op {
                    Op::Plus => v.iter().sum(),
                    Op::Minus if v.len() == 1 => -v[0],
                    Op::Minus => v[0] - v[1],
                    Op::Times => v.iter().product(),
                    Op::Divide => v[0] / v[1],
                    Op::Power => v[0].powf(v[1]),
                    Op::Gt => f64::from(u8::from(v[0] > v[1])),
                }
            }
            Math::Piecewise {
                value,
                condition,
                otherwise,
            } => {
                if eval(condition, env) != 0.0 {
                    eval(value, env)
                } else {
                    eval(otherwise, env)
                }
            }
        }
    }

    /// Time derivative of the flat model in the layout of the state vector
    fn flat_rates(model: &SbmlModel, y: &State) -> State {
        let mut env = HashMap::new();
        for compartment in &model.compartments {
            if let Some(size) = compartment.size {
                env.insert(compartment.id.clone(), size);
            }
        }
        for parameter in &model.parameters {
            if let Some(value) = parameter.value {
                env.insert(parameter.id.clone(), value);
            }
        }
        for species in &model.species {
            let value = match species.initial {
                Initial::Concentration(value) => value,
                Initial::Amount(_) => y[state::index(&species.id).unwrap()],
            };
            env.insert(species.id.clone(), value);
        }
        env.insert("PODOSE_emp".to_string(), y[PODOSE_EMP]);
        env.insert("IVDOSE_emp".to_string(), y[IVDOSE_EMP]);

        for rule in &model.rules {
            if let Rule::Assignment { variable, math } = rule {
                let value = eval(math, &env);
                env.insert(variable.clone(), value);
            }
        }
        let mut dy = State::zeros();
        for reaction in &model.reactions {
            let rate = eval(&reaction.kinetic_law, &env);
            env.insert(reaction.id.clone(), rate);
            for species in &reaction.reactants {
                dy[state::index(species).unwrap()] -= rate;
            }
            for species in &reaction.products {
                dy[state::index(species).unwrap()] += rate;
            }
        }
        for rule in &model.rules {
            if let Rule::Rate { variable, math } = rule {
                dy[state::index(variable).unwrap()] = eval(math, &env);
            }
        }
        dy
    }

    #[test]
    fn flat_model_has_the_model_equations() {
        let mut p = Parameters::default();
        p.ki_fpg = 11.0;
        p.f_cirrhosis = 0.3;
        p.ri_emp = 0.5;
        let d = Derived::new(&p);

        let mut y = State::zeros();
        for (k, value) in y.iter_mut().enumerate() {
            *value = 0.01 * (k as f64 + 1.0);
        }
        y[PODOSE_EMP] = 25.0;
        y[IVDOSE_EMP] = 5.0;

        let mut expected = State::zeros();
        equations::rates(&p, &d, &y, &mut expected);
        assert!(expected[state::GLC_URINE] > 0.0);

        let actual = flat_rates(&body_flat(&p), &y);
        for k in 0..state::NSTATES {
            assert_relative_eq!(
                actual[k],
                expected[k],
                epsilon = 1e-10,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn flat_species_are_the_state_vector() {
        let model = body_flat(&Parameters::default());
        let species: HashSet<&str> = model
            .species
            .iter()
            .filter(|s| !s.boundary)
            .map(|s| s.id.as_str())
            .collect();
        let states: HashSet<&str> = STATES
            .iter()
            .filter(|info| info.unit == "mmol")
            .map(|info| info.id)
            .collect();
        assert_eq!(species, states);
        assert_eq!(species.len(), model.species.len() - 1);
    }

    #[test]
    fn identifiers_are_unique_and_defined() {
        for model in all(&Parameters::default()) {
            let ids = model.identifiers();
            let defined: HashSet<&str> = ids.iter().copied().collect();
            assert_eq!(defined.len(), ids.len(), "duplicate identifier in {}", model.id);

            for rule in &model.rules {
                assert!(defined.contains(rule.variable()), "{}: {}", model.id, rule.variable());
            }
            let maths = model
                .rules
                .iter()
                .map(|rule| match rule {
                    Rule::Assignment { math, .. } | Rule::Rate { math, .. } => math,
                })
                .chain(model.reactions.iter().map(|r| &r.kinetic_law));
            for math in maths {
                for id in math.identifiers() {
                    assert!(defined.contains(id), "{}: undefined {id}", model.id);
                }
            }
            for reaction in &model.reactions {
                for species in reaction.reactants.iter().chain(&reaction.products) {
                    assert!(model.species.iter().any(|s| &s.id == species));
                }
            }
        }
    }

    #[test]
    fn submodels_exchange_through_ports() {
        let p = Parameters::default();

        let intestine = intestine_model(&p);
        let absorption = intestine.reactions.iter().find(|r| r.id == "EMPABS").unwrap();
        assert_eq!(absorption.products, vec!["ext_emp"]);
        assert!(intestine.parameters.iter().any(|p| p.id == "F_emp_abs"));
        assert_eq!(
            intestine.compartments.iter().find(|c| c.id == "Vlumen").unwrap().size,
            Some(Derived::new(&p).v_lumen)
        );

        let liver = liver_model(&p);
        let bile = liver.reactions.iter().find(|r| r.id == "EGBIEX").unwrap();
        assert_eq!(bile.products, vec!["eg_bi"]);

        let kidney = kidney_model(&p);
        assert!(kidney.reactions.iter().any(|r| r.id == "GLCEX"));
        let fpg = kidney.species.iter().find(|s| s.id == "fpg").unwrap();
        assert_eq!(fpg.initial, Initial::Concentration(p.ki_fpg));
        assert!(!kidney.parameters.iter().any(|p| p.id == "fpg"));
    }
}
