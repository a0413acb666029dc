//! CLI argument definitions for select-spectra.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "select-spectra",
    version,
    about = "Keep the best spectrum per object identifier",
    long_about = "Search a directory tree for <ID><SUFFIX> files, score every candidate by\n\
                  its signal-to-uncertainty ratio and copy the best one per identifier\n\
                  and suffix into an output folder, logging each copy to copy_log.txt."
)]
pub struct Cli {
    /// Identifiers to look for, or a single file with one identifier per line.
    #[arg(
        long = "ids",
        alias = "IDs",
        value_name = "ID|FILE",
        num_args = 1..,
        required = true
    )]
    pub ids: Vec<String>,

    /// Directory searched recursively for candidate files.
    #[arg(long = "parent-folder", value_name = "DIR")]
    pub parent_folder: PathBuf,

    /// Directory the selected files are copied into (created if absent).
    #[arg(long = "output-folder", value_name = "DIR")]
    pub output_folder: PathBuf,

    /// File-name suffixes in priority order; glob wildcards are allowed.
    #[arg(long = "suffixes", value_name = "SUFFIX", num_args = 1..)]
    pub suffixes: Vec<String>,

    /// TOML file with suffixes, scoring and companion settings.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Extension holding the signal array (default: DATA).
    #[arg(long = "signal-hdu", value_name = "EXTNAME")]
    pub signal_hdu: Option<String>,

    /// Extension holding the uncertainty array (default: ERR).
    #[arg(long = "uncertainty-hdu", value_name = "EXTNAME")]
    pub uncertainty_hdu: Option<String>,

    /// Companion rule; repeat to build a table replacing the default `_1D.fits=_2D.fits`.
    #[arg(
        long = "companion",
        value_name = "PRIMARY=COMPANION[,COMPANION...]",
        conflicts_with = "no_companions"
    )]
    pub companions: Vec<String>,

    /// Never copy companion files.
    #[arg(long = "no-companions")]
    pub no_companions: bool,

    /// Stop at the first suffix that yields a copy.
    #[arg(long = "first-match")]
    pub first_match: bool,

    /// Select and report without copying or logging anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the run report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
