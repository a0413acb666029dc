//! select-spectra CLI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use spectra_cli::cli::Cli;
use spectra_cli::logging::init_logging;
use spectra_cli::settings::{curate_config_from_cli, log_config_from_cli};
use spectra_cli::summary::print_summary;
use spectra_core::{RunReport, run};
use tracing::info;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match execute(&cli) {
        Ok(report) => {
            print_summary(&report);
            if report.has_failures() { 1 } else { 0 }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn execute(cli: &Cli) -> Result<RunReport> {
    let config = curate_config_from_cli(cli)?;
    let report = run(&config).context("curation run failed")?;
    if let Some(path) = &cli.report_json {
        write_report(path, &report)?;
    }
    Ok(report)
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = report.to_json().context("serialize run report")?;
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    info!(path = %path.display(), "wrote run report");
    Ok(())
}
