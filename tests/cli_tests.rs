use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use empagliflozin::prelude::*;

fn empagliflozin(args: &[&str], results: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_empagliflozin"))
        .args(args)
        .arg("--results")
        .arg(results)
        .args(["--log-level", "warn"])
        .output()
        .expect("failed to run empagliflozin")
}

fn non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[test]
fn experiment_run_writes_results() {
    let dir = tempfile::tempdir().unwrap();
    let output = empagliflozin(&["--experiment", "Ayoub2017"], dir.path());
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    for file in [
        "settings.json",
        "Ayoub2017/Ayoub2017_po_emp25.tsv",
        "Ayoub2017/Ayoub2017.json",
        "_figures/Ayoub2017_Fig6.html",
        "model/empagliflozin_body_flat.xml",
        "model/empagliflozin.omex",
    ] {
        assert!(non_empty(&dir.path().join(file)), "{file}");
    }
}

#[test]
fn unknown_analysis_fails_with_groups() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    let output = empagliflozin(&["--analysis", "everything"], &results);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("everything"), "{stderr}");
    for group in GROUPS {
        assert!(stderr.contains(group), "{group} missing in {stderr}");
    }
    assert!(!results.exists());
}

#[test]
fn model_flag_writes_sbml_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = empagliflozin(&["--model"], dir.path());
    assert!(output.status.success());

    for file in [
        "empagliflozin_body_flat.xml",
        "empagliflozin_intestine.xml",
        "empagliflozin_liver.xml",
        "empagliflozin_kidney.xml",
        "empagliflozin.omex",
        "parameters.tsv",
    ] {
        assert!(non_empty(&dir.path().join("model").join(file)), "{file}");
    }
    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn list_prints_groups_and_experiments() {
    let dir = tempfile::tempdir().unwrap();
    let output = empagliflozin(&["--list"], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in GROUPS.iter().chain(EXPERIMENTS.iter()) {
        assert!(stdout.contains(name), "{name}");
    }
}
