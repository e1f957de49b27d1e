use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use eyre::{Result, WrapErr};

use super::body::Derived;
use super::observables::Observable;
use super::parameters::Parameters;
use super::sbml;
use super::state::STATES;

/// Writes a description of the model into `dir`
///
/// - `parameters.tsv`: identifier, value, unit and description of every parameter
/// - `states.tsv`: identifier, unit and description of every state
/// - `derived.json`: volumes and flows derived from the parameters
/// - `empagliflozin_body.md`: the same information as Markdown
/// - `empagliflozin_body_flat.xml` and the intestine, liver and kidney submodels as SBML,
///   bundled with a manifest into `empagliflozin.omex`
pub fn write_model_report(parameters: &Parameters, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("Could not create {}", dir.display()))?;

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(dir.join("parameters.tsv"))?;
    writer.write_record(["id", "value", "unit", "name"])?;
    for info in Parameters::INFO {
        let value = parameters.get(info.id).unwrap_or(f64::NAN);
        writer.write_record([info.id, value.to_string().as_str(), info.unit, info.name])?;
    }
    writer.flush()?;

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(dir.join("states.tsv"))?;
    writer.write_record(["index", "id", "unit", "name"])?;
    for (index, info) in STATES.iter().enumerate() {
        writer.write_record([index.to_string().as_str(), info.id, info.unit, info.name])?;
    }
    writer.flush()?;

    let derived = Derived::new(parameters);
    fs::write(dir.join("derived.json"), serde_json::to_string_pretty(&derived)?)?;
    let md = markdown(parameters).wrap_err("Could not render the model description")?;
    fs::write(dir.join("empagliflozin_body.md"), md)?;
    sbml::write_sbml(parameters, dir)?;

    tracing::debug!("Model report written to {}", dir.display());
    Ok(())
}

fn markdown(parameters: &Parameters) -> Result<String, fmt::Error> {
    let mut md = String::new();
    writeln!(md, "# empagliflozin_body\n")?;
    writeln!(md, "## Parameters\n")?;
    writeln!(md, "| id | value | unit | name |\n|---|---|---|---|")?;
    for info in Parameters::INFO {
        let value = parameters.get(info.id).unwrap_or(f64::NAN);
        writeln!(md, "| `{}` | {} | {} | {} |", info.id, value, info.unit, info.name)?;
    }
    writeln!(md, "\n## States\n")?;
    writeln!(md, "| id | unit | name |\n|---|---|---|")?;
    for info in STATES.iter() {
        writeln!(md, "| `{}` | {} | {} |", info.id, info.unit, info.name)?;
    }
    writeln!(md, "\n## Observables\n")?;
    writeln!(md, "| id | unit |\n|---|---|")?;
    for observable in Observable::ALL {
        writeln!(md, "| `{}` | {} |", observable.id(), observable.unit())?;
    }
    Ok(md)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_lists_everything() {
        let md = markdown(&Parameters::default()).unwrap();
        assert!(md.contains("| `KI__RTG_E50` |"));
        assert!(md.contains("| `Xre_emp` |"));
        assert!(md.contains("| `[Cve_emptot]` |"));
    }

    #[test]
    fn report_includes_sbml_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("model");
        write_model_report(&Parameters::default(), &model_dir).unwrap();
        for file in [
            "parameters.tsv",
            "states.tsv",
            "derived.json",
            "empagliflozin_body.md",
            "empagliflozin_body_flat.xml",
            "empagliflozin_intestine.xml",
            "empagliflozin_liver.xml",
            "empagliflozin_kidney.xml",
            sbml::OMEX_FILE,
        ] {
            let len = fs::metadata(model_dir.join(file)).unwrap().len();
            assert!(len > 0, "{file} is empty");
        }
        let flat = fs::read_to_string(model_dir.join("empagliflozin_body_flat.xml")).unwrap();
        assert!(flat.contains("<species id=\"KI__glc_urine\""));
        assert!(flat.contains("<reaction id=\"LI__EMP2EG\""));
    }
}
