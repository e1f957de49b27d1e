use std::fs;
use std::path::Path;

use empagliflozin::experiments::dose_dependency::DoseDependency;
use empagliflozin::prelude::*;
use eyre::Result;

fn settings(results: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.results = results.to_path_buf();
    settings.config.log_level = "warn".to_string();
    settings
}

fn non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[test]
fn study_writes_all_outputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut settings = settings(dir.path());
    settings.config.experiments = vec!["Ayoub2017".to_string()];

    let summary = entrypoints::run(settings)?;
    assert_eq!(summary.experiments, vec!["Ayoub2017"]);

    let root = dir.path();
    for file in [
        "settings.json",
        "model/parameters.tsv",
        "model/states.tsv",
        "Ayoub2017/Ayoub2017_po_emp25.tsv",
        "Ayoub2017/Ayoub2017_Fig6.html",
        "Ayoub2017/Ayoub2017.json",
        "_figures/Ayoub2017_Fig6.html",
        "empagliflozin_fit_parameters.tsv",
        "empagliflozin_fit_mappings.tsv",
    ] {
        assert!(non_empty(&root.join(file)), "{file}");
    }

    // header and 501 time points
    let table = fs::read_to_string(root.join("Ayoub2017/Ayoub2017_po_emp25.tsv"))?;
    assert_eq!(table.lines().count(), 502);
    assert!(table.starts_with("time\t"));

    let description: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("Ayoub2017/Ayoub2017.json"))?)?;
    assert_eq!(description["sid"], "Ayoub2017");
    assert_eq!(description["figures"][0], "Fig6");
    assert_eq!(
        description["fit_mappings"][0]["key"],
        "fm_Cve_emp_po_emp25"
    );

    let mappings = fs::read_to_string(root.join("empagliflozin_fit_mappings.tsv"))?;
    assert_eq!(mappings.lines().count(), 2);
    Ok(())
}

#[test]
fn unknown_analysis_lists_valid_analyses() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.config.analysis = Some("everything".to_string());

    let err = entrypoints::run(settings).unwrap_err();
    let message = err.to_string();
    for group in GROUPS {
        assert!(message.contains(group), "{message}");
    }
    // nothing is written for an invalid selection
    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn experiment_output_in_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let experiment = DoseDependency {
        doses: vec![0.0, 25.0],
        glucoses: vec![7.0],
    };
    let simulator = Simulator::default();
    let output = entrypoints::run_experiment(&simulator, &experiment, dir.path())?;

    assert_eq!(output.tables.len(), 3);
    assert_eq!(output.figures.len(), 4);
    for path in output.tables.iter().chain(output.figures.iter()) {
        assert!(non_empty(path), "{}", path.display());
    }
    assert!(dir.path().join("DoseDependency_emp_dose_25.tsv").exists());
    assert!(dir.path().join("DoseDependency_Fig_glucose_dependency_pd.html").exists());
    Ok(())
}
