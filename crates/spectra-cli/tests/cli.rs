//! Argument parsing through to a finished run.

use std::fs;

use clap::Parser;
use spectra_cli::cli::Cli;
use spectra_cli::settings::curate_config_from_cli;
use spectra_core::{AUDIT_LOG_FILE, render_unmatched, run};
use spectra_fits::{ImageHdu, write_fits};
use tempfile::TempDir;

fn spectrum(path: &std::path::Path, signal: &[f64]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_fits(
        path,
        &[
            ImageHdu::new("DATA", signal.to_vec()),
            ImageHdu::new("ERR", vec![1.0; signal.len()]),
        ],
    )
    .unwrap();
}

#[test]
fn run_from_arguments() {
    let dir = TempDir::new().unwrap();
    let search = dir.path().join("reductions");
    let output = dir.path().join("curated");
    spectrum(&search.join("v1/000042_1D.fits"), &[1.0, 2.0]);
    spectrum(&search.join("v2/000042_1D.fits"), &[4.0, 8.0]);
    spectrum(&search.join("v2/000042_2D.fits"), &[1.0]);
    fs::write(dir.path().join("targets.txt"), "# ID\n42\n43\n5\n").unwrap();

    let cli = Cli::try_parse_from([
        "select-spectra".to_string(),
        "--ids".to_string(),
        dir.path().join("targets.txt").display().to_string(),
        "--parent-folder".to_string(),
        search.display().to_string(),
        "--output-folder".to_string(),
        output.display().to_string(),
        "--suffixes".to_string(),
        "_1D.fits".to_string(),
    ])
    .unwrap();
    let report = run(&curate_config_from_cli(&cli).unwrap()).unwrap();

    let mut names: Vec<String> = fs::read_dir(&output)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["000042_1D.fits", "000042_2D.fits", AUDIT_LOG_FILE]);
    assert_eq!(
        fs::read(output.join("000042_1D.fits")).unwrap(),
        fs::read(search.join("v2/000042_1D.fits")).unwrap()
    );

    insta::assert_snapshot!(render_unmatched(&report), @r"
    No file found for ID 000043 with any of the provided suffixes.
    No file found for ID 000005 with any of the provided suffixes.
    ");
}

#[test]
fn dry_run_from_arguments() {
    let dir = TempDir::new().unwrap();
    let search = dir.path().join("reductions");
    let output = dir.path().join("curated");
    spectrum(&search.join("000042_1D.fits"), &[1.0, 2.0]);

    let cli = Cli::try_parse_from([
        "select-spectra".to_string(),
        "--ids".to_string(),
        "42".to_string(),
        "--parent-folder".to_string(),
        search.display().to_string(),
        "--output-folder".to_string(),
        output.display().to_string(),
        "--suffixes".to_string(),
        "_1D.fits".to_string(),
        "--dry-run".to_string(),
    ])
    .unwrap();
    let report = run(&curate_config_from_cli(&cli).unwrap()).unwrap();
    assert_eq!(report.copied_count(), 1);
    assert!(!output.exists());
}
