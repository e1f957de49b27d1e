//! SBML (Level 3 Version 2) export of the model.
//!
//! The whole-body model is written flattened into a single document, the organ submodels
//! of intestine, liver and kidney as separate documents. All of them are bundled into a
//! COMBINE archive (`.omex`). Species are amounts (`hasOnlySubstanceUnits`), kinetic laws
//! divide by the compartment size where a concentration is needed.

pub mod models;
pub mod omex;

use std::io::{self, Write};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use super::parameters::Parameters;

const SBML_NS: &str = "http://www.sbml.org/sbml/level3/version2/core";
const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Name of the COMBINE archive with all models
pub const OMEX_FILE: &str = "empagliflozin.omex";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
    Gt,
}

impl Op {
    fn tag(&self) -> &'static str {
        match self {
            Op::Plus => "plus",
            Op::Minus => "minus",
            Op::Times => "times",
            Op::Divide => "divide",
            Op::Power => "power",
            Op::Gt => "gt",
        }
    }
}

/// Content MathML expression
#[derive(Debug, Clone, PartialEq)]
pub enum Math {
    Ci(String),
    Cn(f64),
    Apply(Op, Vec<Math>),
    /// `value` if `condition` holds, otherwise `otherwise`
    Piecewise {
        value: Box<Math>,
        condition: Box<Math>,
        otherwise: Box<Math>,
    },
}

pub fn ci(id: impl Into<String>) -> Math {
    Math::Ci(id.into())
}

pub fn cn(value: f64) -> Math {
    Math::Cn(value)
}

pub fn power(base: Math, exponent: Math) -> Math {
    Math::Apply(Op::Power, vec![base, exponent])
}

pub fn gt(lhs: Math, rhs: Math) -> Math {
    Math::Apply(Op::Gt, vec![lhs, rhs])
}

pub fn piecewise(value: Math, condition: Math, otherwise: Math) -> Math {
    Math::Piecewise {
        value: Box::new(value),
        condition: Box::new(condition),
        otherwise: Box::new(otherwise),
    }
}

macro_rules! math_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for Math {
            type Output = Math;

            fn $method(self, rhs: Math) -> Math {
                Math::Apply($op, vec![self, rhs])
            }
        }
    };
}

math_op!(Add, add, Op::Plus);
math_op!(Sub, sub, Op::Minus);
math_op!(Mul, mul, Op::Times);
math_op!(Div, div, Op::Divide);

impl Neg for Math {
    type Output = Math;

    fn neg(self) -> Math {
        Math::Apply(Op::Minus, vec![self])
    }
}

impl Math {
    /// Identifiers referenced by the expression
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_identifiers(&mut ids);
        ids
    }

    fn collect_identifiers<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Math::Ci(id) => ids.push(id),
            Math::Cn(_) => {}
            Math::Apply(_, args) => args.iter().for_each(|arg| arg.collect_identifiers(ids)),
            Math::Piecewise {
                value,
                condition,
                otherwise,
            } => {
                value.collect_identifiers(ids);
                condition.collect_identifiers(ids);
                otherwise.collect_identifiers(ids);
            }
        }
    }

    fn write<W: Write>(&self, w: &mut Writer<W>) -> io::Result<()> {
        match self {
            Math::Ci(id) => {
                w.create_element("ci").write_text_content(BytesText::new(id))?;
            }
            Math::Cn(value) => {
                w.create_element("cn")
                    .write_text_content(BytesText::new(&value.to_string()))?;
            }
            Math::Apply(op, args) => {
                w.create_element("apply").write_inner_content(|w| {
                    w.create_element(op.tag()).write_empty()?;
                    args.iter().try_for_each(|arg| arg.write(w))
                })?;
            }
            Math::Piecewise {
                value,
                condition,
                otherwise,
            } => {
                w.create_element("piecewise").write_inner_content(|w| {
                    w.create_element("piece").write_inner_content(|w| {
                        value.write(w)?;
                        condition.write(w)
                    })?;
                    w.create_element("otherwise")
                        .write_inner_content(|w| otherwise.write(w))?;
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    fn write_math<W: Write>(&self, w: &mut Writer<W>) -> io::Result<()> {
        w.create_element("math")
            .with_attribute(("xmlns", MATHML_NS))
            .write_inner_content(|w| self.write(w))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    pub id: String,
    pub name: String,
    /// Constant size in `l`, `None` if set by an assignment rule
    pub size: Option<f64>,
}

impl Compartment {
    pub fn constant(id: impl Into<String>, name: impl Into<String>, size: f64) -> Self {
        Compartment {
            id: id.into(),
            name: name.into(),
            size: Some(size),
        }
    }

    pub fn assigned(id: impl Into<String>, name: impl Into<String>) -> Self {
        Compartment {
            id: id.into(),
            name: name.into(),
            size: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initial {
    /// Amount in `mmol`
    Amount(f64),
    /// Concentration in `mM`
    Concentration(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: String,
    pub name: String,
    pub compartment: String,
    pub initial: Initial,
    /// Boundary species are not changed by reactions
    pub boundary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub name: String,
    pub value: Option<f64>,
    pub constant: bool,
}

impl Parameter {
    pub fn constant(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Parameter {
            id: id.into(),
            name: name.into(),
            value: Some(value),
            constant: true,
        }
    }

    /// A parameter changed by a rule, `value` is the initial value of rate rules
    pub fn variable(id: impl Into<String>, name: impl Into<String>, value: Option<f64>) -> Self {
        Parameter {
            id: id.into(),
            name: name.into(),
            value,
            constant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Assignment { variable: String, math: Math },
    Rate { variable: String, math: Math },
}

impl Rule {
    pub fn variable(&self) -> &str {
        match self {
            Rule::Assignment { variable, .. } | Rule::Rate { variable, .. } => variable,
        }
    }
}

/// Irreversible reaction with unit stoichiometries
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub id: String,
    pub name: String,
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    /// Rate in `mmol/min`
    pub kinetic_law: Math,
}

/// An SBML model, rules are kept in evaluation order
#[derive(Debug, Clone, PartialEq)]
pub struct SbmlModel {
    pub id: String,
    pub name: String,
    pub compartments: Vec<Compartment>,
    pub species: Vec<Species>,
    pub parameters: Vec<Parameter>,
    pub rules: Vec<Rule>,
    pub reactions: Vec<Reaction>,
}

impl SbmlModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        SbmlModel {
            id: id.into(),
            name: name.into(),
            compartments: Vec::new(),
            species: Vec::new(),
            parameters: Vec::new(),
            rules: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// Adds a species holding an amount, initially zero
    pub fn add_species(&mut self, id: impl Into<String>, name: impl Into<String>, compartment: &str) {
        self.species.push(Species {
            id: id.into(),
            name: name.into(),
            compartment: compartment.to_string(),
            initial: Initial::Amount(0.0),
            boundary: false,
        });
    }

    pub fn add_reaction(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        reactants: &[&str],
        products: &[&str],
        kinetic_law: Math,
    ) {
        self.reactions.push(Reaction {
            id: id.into(),
            name: name.into(),
            reactants: reactants.iter().map(|s| s.to_string()).collect(),
            products: products.iter().map(|s| s.to_string()).collect(),
            kinetic_law,
        });
    }

    pub fn assign(&mut self, variable: impl Into<String>, math: Math) {
        self.rules.push(Rule::Assignment {
            variable: variable.into(),
            math,
        });
    }

    /// Identifiers of all compartments, species, parameters and reactions
    pub fn identifiers(&self) -> Vec<&str> {
        self.compartments
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.species.iter().map(|s| s.id.as_str()))
            .chain(self.parameters.iter().map(|p| p.id.as_str()))
            .chain(self.reactions.iter().map(|r| r.id.as_str()))
            .collect()
    }

    pub fn to_xml(&self) -> io::Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element("sbml")
            .with_attribute(("xmlns", SBML_NS))
            .with_attribute(("level", "3"))
            .with_attribute(("version", "2"))
            .write_inner_content(|w| {
                w.create_element("model")
                    .with_attribute(("id", self.id.as_str()))
                    .with_attribute(("name", self.name.as_str()))
                    .with_attribute(("substanceUnits", "mmole"))
                    .with_attribute(("timeUnits", "min"))
                    .with_attribute(("volumeUnits", "litre"))
                    .with_attribute(("extentUnits", "mmole"))
                    .write_inner_content(|w| self.write_content(w))?;
                Ok(())
            })?;
        String::from_utf8(writer.into_inner()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write_content<W: Write>(&self, w: &mut Writer<W>) -> io::Result<()> {
        w.create_element("listOfUnitDefinitions").write_inner_content(|w| {
            for (id, kind, scale, multiplier) in [("min", "second", "0", "60"), ("mmole", "mole", "-3", "1")] {
                w.create_element("unitDefinition")
                    .with_attribute(("id", id))
                    .write_inner_content(|w| {
                        w.create_element("listOfUnits").write_inner_content(|w| {
                            w.create_element("unit")
                                .with_attribute(("kind", kind))
                                .with_attribute(("exponent", "1"))
                                .with_attribute(("scale", scale))
                                .with_attribute(("multiplier", multiplier))
                                .write_empty()?;
                            Ok(())
                        })?;
                        Ok(())
                    })?;
            }
            Ok(())
        })?;

        if !self.compartments.is_empty() {
            w.create_element("listOfCompartments").write_inner_content(|w| {
                for compartment in &self.compartments {
                    let mut element = w
                        .create_element("compartment")
                        .with_attribute(("id", compartment.id.as_str()))
                        .with_attribute(("name", compartment.name.as_str()))
                        .with_attribute(("spatialDimensions", "3"))
                        .with_attribute(("units", "litre"));
                    let size = compartment.size.map(|size| size.to_string());
                    if let Some(size) = &size {
                        element = element.with_attribute(("size", size.as_str()));
                    }
                    element
                        .with_attribute(("constant", bool_attr(compartment.size.is_some())))
                        .write_empty()?;
                }
                Ok(())
            })?;
        }

        if !self.species.is_empty() {
            w.create_element("listOfSpecies").write_inner_content(|w| {
                for species in &self.species {
                    let (initial, value, only_substance) = match species.initial {
                        Initial::Amount(value) => ("initialAmount", value, true),
                        Initial::Concentration(value) => ("initialConcentration", value, false),
                    };
                    let value = value.to_string();
                    w.create_element("species")
                        .with_attribute(("id", species.id.as_str()))
                        .with_attribute(("name", species.name.as_str()))
                        .with_attribute(("compartment", species.compartment.as_str()))
                        .with_attribute((initial, value.as_str()))
                        .with_attribute(("substanceUnits", "mmole"))
                        .with_attribute(("hasOnlySubstanceUnits", bool_attr(only_substance)))
                        .with_attribute(("boundaryCondition", bool_attr(species.boundary)))
                        .with_attribute(("constant", bool_attr(species.boundary)))
                        .write_empty()?;
                }
                Ok(())
            })?;
        }

        if !self.parameters.is_empty() {
            w.create_element("listOfParameters").write_inner_content(|w| {
                for parameter in &self.parameters {
                    let mut element = w
                        .create_element("parameter")
                        .with_attribute(("id", parameter.id.as_str()))
                        .with_attribute(("name", parameter.name.as_str()));
                    let value = parameter.value.map(|value| value.to_string());
                    if let Some(value) = &value {
                        element = element.with_attribute(("value", value.as_str()));
                    }
                    element
                        .with_attribute(("constant", bool_attr(parameter.constant)))
                        .write_empty()?;
                }
                Ok(())
            })?;
        }

        if !self.rules.is_empty() {
            w.create_element("listOfRules").write_inner_content(|w| {
                for rule in &self.rules {
                    let (tag, math) = match rule {
                        Rule::Assignment { math, .. } => ("assignmentRule", math),
                        Rule::Rate { math, .. } => ("rateRule", math),
                    };
                    w.create_element(tag)
                        .with_attribute(("variable", rule.variable()))
                        .write_inner_content(|w| math.write_math(w))?;
                }
                Ok(())
            })?;
        }

        if !self.reactions.is_empty() {
            w.create_element("listOfReactions").write_inner_content(|w| {
                for reaction in &self.reactions {
                    w.create_element("reaction")
                        .with_attribute(("id", reaction.id.as_str()))
                        .with_attribute(("name", reaction.name.as_str()))
                        .with_attribute(("reversible", "false"))
                        .write_inner_content(|w| write_reaction(w, reaction))?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }
}

fn write_reaction<W: Write>(w: &mut Writer<W>, reaction: &Reaction) -> io::Result<()> {
    for (tag, references) in [
        ("listOfReactants", &reaction.reactants),
        ("listOfProducts", &reaction.products),
    ] {
        if references.is_empty() {
            continue;
        }
        w.create_element(tag).write_inner_content(|w| {
            for species in references {
                w.create_element("speciesReference")
                    .with_attribute(("species", species.as_str()))
                    .with_attribute(("stoichiometry", "1"))
                    .with_attribute(("constant", "true"))
                    .write_empty()?;
            }
            Ok(())
        })?;
    }
    w.create_element("kineticLaw")
        .write_inner_content(|w| reaction.kinetic_law.write_math(w))?;
    Ok(())
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Writes the SBML documents and the COMBINE archive into `dir`
///
/// Returns the paths of the documents followed by the archive.
pub fn write_sbml(parameters: &Parameters, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for model in models::all(parameters) {
        let xml = model
            .to_xml()
            .wrap_err_with(|| format!("Could not serialize {}", model.id))?;
        documents.push((format!("{}.xml", model.id), xml));
    }

    let mut paths = Vec::with_capacity(documents.len() + 1);
    for (file, xml) in &documents {
        let path = dir.join(file);
        std::fs::write(&path, xml)
            .wrap_err_with(|| format!("Could not write {}", path.display()))?;
        paths.push(path);
    }

    let archive = dir.join(OMEX_FILE);
    omex::write_omex(&archive, &documents)?;
    paths.push(archive);
    tracing::debug!("SBML written to {}", dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn element_counts(xml: &str, names: &[&str]) -> Vec<usize> {
        let mut reader = Reader::from_str(xml);
        let mut counts = vec![0; names.len()];
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => {
                    let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    if let Some(k) = names.iter().position(|n| *n == name) {
                        counts[k] += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        counts
    }

    #[test]
    fn math_is_content_mathml() {
        let mut model = SbmlModel::new("test", "test");
        model.compartments.push(Compartment::constant("V", "volume", 2.0));
        model.add_species("A", "a", "V");
        model.parameters.push(Parameter::constant("k", "rate [1/min]", 0.1));
        model.add_reaction("R", "decay", &["A"], &[], ci("k") * (ci("A") / ci("V")));
        let xml = model.to_xml().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<times/>"));
        assert!(xml.contains("<ci>k</ci>"));
        assert!(xml.contains("initialAmount=\"0\""));
        assert!(!xml.contains("listOfRules"));
        assert_eq!(
            element_counts(&xml, &["species", "reaction", "speciesReference", "math"]),
            vec![1, 1, 1, 1]
        );
    }

    #[test]
    fn piecewise_and_identifiers() {
        let math = piecewise(ci("a") - ci("b"), gt(ci("a"), ci("b")), cn(0.0));
        assert_eq!(math.identifiers(), vec!["a", "b", "a", "b"]);

        let mut model = SbmlModel::new("test", "test");
        model.parameters.push(Parameter::variable("x", "x", None));
        model.assign("x", math);
        let xml = model.to_xml().unwrap();
        assert!(xml.contains("<piecewise>"));
        assert!(xml.contains("<otherwise>"));
        assert!(xml.contains("<gt/>"));
        assert!(xml.contains("assignmentRule variable=\"x\""));
    }

    #[test]
    fn documents_and_archive_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sbml(&Parameters::default(), dir.path()).unwrap();
        let files: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            files,
            vec![
                "empagliflozin_body_flat.xml",
                "empagliflozin_intestine.xml",
                "empagliflozin_liver.xml",
                "empagliflozin_kidney.xml",
                OMEX_FILE
            ]
        );
        for path in &paths {
            assert!(std::fs::metadata(path).unwrap().len() > 0);
        }

        let flat = std::fs::read_to_string(&paths[0]).unwrap();
        let counts = element_counts(&flat, &["species", "reaction"]);
        // all amounts of the state vector except the dose depots, plus glucose
        assert_eq!(counts[0], super::super::state::NSTATES - 2 + 1);
        assert!(counts[1] > 40);
    }
}
