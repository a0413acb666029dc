//! Turning parsed arguments into run and logging configuration.
//!
//! Precedence: command-line flags, then the `--config` file, then defaults.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::ColorChoice;
use spectra_core::{CompanionRule, CompanionTable, ConfigFile, CurateConfig, SuffixPolicy};
use tracing::level_filters::LevelFilter;

use crate::cli::{Cli, LogFormatArg, LogLevelArg};
use crate::logging::{LogConfig, LogFormat};

/// Build the curation configuration.
pub fn curate_config_from_cli(cli: &Cli) -> Result<CurateConfig> {
    let mut config = CurateConfig::new(cli.ids.clone(), &cli.parent_folder, &cli.output_folder);

    if let Some(path) = &cli.config {
        let file = ConfigFile::load(path)?;
        config = config
            .apply_file(&file)
            .with_context(|| format!("apply config file {}", path.display()))?;
    }

    if !cli.suffixes.is_empty() {
        config.suffixes.clone_from(&cli.suffixes);
    }
    if let Some(signal) = &cli.signal_hdu {
        config.scoring.signal.clone_from(signal);
    }
    if let Some(uncertainty) = &cli.uncertainty_hdu {
        config.scoring.uncertainty.clone_from(uncertainty);
    }

    if cli.no_companions {
        config.companions = CompanionTable::empty();
    } else if !cli.companions.is_empty() {
        let rules = cli
            .companions
            .iter()
            .map(|rule| CompanionRule::parse(rule))
            .collect::<spectra_core::Result<Vec<_>>>()
            .context("parse --companion")?;
        config.companions = CompanionTable::new(rules);
    }

    if cli.first_match {
        config.suffix_policy = SuffixPolicy::FirstMatch;
    }
    config.dry_run = cli.dry_run;
    Ok(config)
}

/// Build logging configuration from CLI flags with consistent precedence.
///
/// `RUST_LOG` is honoured only when neither `-v`/`-q` nor `--log-level` is given.
#[must_use]
pub fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file.clone_from(&cli.log_file);
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![
            "select-spectra",
            "--parent-folder",
            "reductions",
            "--output-folder",
            "curated",
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_only() {
        let cli = parse(&["--ids", "42", "43", "--suffixes", "_1D.fits", "_x1d.fits"]);
        let config = curate_config_from_cli(&cli).unwrap();
        assert_eq!(config.identifiers, vec!["42", "43"]);
        assert_eq!(config.suffixes, vec!["_1D.fits", "_x1d.fits"]);
        assert_eq!(config.companions, CompanionTable::default());
        assert_eq!(config.suffix_policy, SuffixPolicy::All);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_legacy_ids_spelling() {
        let cli = parse(&["--IDs", "42", "--suffixes", "_1D.fits"]);
        assert_eq!(cli.ids, vec!["42"]);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("select.toml");
        fs::write(
            &path,
            "suffixes = [\"_x1d.fits\"]\nfirst_match = true\n\n[scoring]\nsignal = \"FLUX\"\n",
        )
        .unwrap();
        let config_arg = path.display().to_string();

        let from_file =
            curate_config_from_cli(&parse(&["--ids", "1", "--config", &config_arg])).unwrap();
        assert_eq!(from_file.suffixes, vec!["_x1d.fits"]);
        assert_eq!(from_file.suffix_policy, SuffixPolicy::FirstMatch);
        assert_eq!(from_file.scoring.signal, "FLUX");

        let overridden = curate_config_from_cli(&parse(&[
            "--ids",
            "1",
            "--config",
            &config_arg,
            "--suffixes",
            "_1D.fits",
            "--signal-hdu",
            "SCI",
        ]))
        .unwrap();
        assert_eq!(overridden.suffixes, vec!["_1D.fits"]);
        assert_eq!(overridden.scoring.signal, "SCI");
        assert_eq!(overridden.scoring.uncertainty, "ERR");
    }

    #[test]
    fn test_companion_flags() {
        let cli = parse(&[
            "--ids",
            "1",
            "--suffixes",
            "_1D.fits",
            "--companion",
            "_1D.fits=_2D.fits,_1D.png",
            "--companion",
            "_x1d.fits=_s2d.fits",
        ]);
        let config = curate_config_from_cli(&cli).unwrap();
        assert_eq!(config.companions.rules().len(), 2);
        assert_eq!(
            config.companions.companions_for(Path::new("a_x1d.fits")),
            vec![PathBuf::from("a_s2d.fits")]
        );

        let none = parse(&["--ids", "1", "--suffixes", "_1D.fits", "--no-companions"]);
        assert!(curate_config_from_cli(&none).unwrap().companions.rules().is_empty());

        let bad = parse(&["--ids", "1", "--suffixes", "_1D.fits", "--companion", "_1D.fits"]);
        assert!(curate_config_from_cli(&bad).is_err());
    }

    #[test]
    fn test_companion_conflicts_with_no_companions() {
        let result = Cli::try_parse_from([
            "select-spectra",
            "--ids",
            "1",
            "--parent-folder",
            "a",
            "--output-folder",
            "b",
            "--companion",
            "_1D.fits=_2D.fits",
            "--no-companions",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = parse(&["--ids", "1", "--config", "/nonexistent/select.toml"]);
        assert!(curate_config_from_cli(&cli).is_err());
    }

    #[test]
    fn test_log_level_precedence() {
        let default = log_config_from_cli(&parse(&["--ids", "1"]));
        assert_eq!(default.level_filter, LevelFilter::INFO);
        assert!(default.use_env_filter);

        let verbose = log_config_from_cli(&parse(&["--ids", "1", "-v"]));
        assert_eq!(verbose.level_filter, LevelFilter::DEBUG);
        assert!(!verbose.use_env_filter);

        let explicit =
            log_config_from_cli(&parse(&["--ids", "1", "-v", "--log-level", "error"]));
        assert_eq!(explicit.level_filter, LevelFilter::ERROR);

        let json = log_config_from_cli(&parse(&[
            "--ids",
            "1",
            "--log-format",
            "json",
            "--log-file",
            "run.log",
        ]));
        assert_eq!(json.format, LogFormat::Json);
        assert!(!json.with_ansi);
    }
}
