//! Error types and the failure policy for a curation run.
//!
//! Every failure maps to a [`FailurePolicy`] through [`CurateError::policy`],
//! which decides whether the run stops, the current identifier stops, or the
//! failure is recorded as a warning and processing continues.

use std::path::PathBuf;

use serde::Serialize;
use spectra_fits::FitsError;
use thiserror::Error;

/// How far a failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop before (or instead of) doing any further work.
    AbortRun,
    /// Skip the remaining suffixes of the current identifier.
    AbortIdentifier,
    /// Log a warning and continue.
    Recover,
}

/// Errors raised while curating a collection.
#[derive(Debug, Error)]
pub enum CurateError {
    /// Identifier file named on the command line could not be read.
    #[error("failed to read identifier file {path}")]
    IdentifierFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to look for.
    #[error("no identifiers given")]
    NoIdentifiers,

    /// No suffixes configured.
    #[error("no suffixes given")]
    NoSuffixes,

    /// Search root is missing or not a directory.
    #[error("search root {path} is not a directory")]
    SearchRoot { path: PathBuf },

    /// Output directory could not be created.
    #[error("failed to create output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Suffix does not form a valid file-name pattern.
    #[error("invalid file name pattern {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Config file could not be read.
    #[error("failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this tool.
    #[error("invalid config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Companion rule could not be parsed.
    #[error("invalid companion rule {rule:?}: {message}")]
    CompanionRule { rule: String, message: String },

    /// Audit log could not be opened or appended to.
    #[error("failed to write audit log {path}")]
    AuditLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A winning file (or companion) could not be copied into the output.
    #[error("failed to copy {from} to {to}: {reason}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        reason: std::io::Error,
    },

    /// A candidate could not be scored.
    #[error("failed to score {path}: {reason}")]
    Score { path: PathBuf, reason: ScoreError },

    /// A companion implied by a winning file does not exist.
    #[error("companion file {companion} of {primary} does not exist")]
    CompanionMissing { primary: PathBuf, companion: PathBuf },
}

impl CurateError {
    /// Failure policy for this error.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        match self {
            Self::Score { .. } | Self::CompanionMissing { .. } => FailurePolicy::Recover,
            Self::Copy { .. } => FailurePolicy::AbortIdentifier,
            Self::IdentifierFile { .. }
            | Self::NoIdentifiers
            | Self::NoSuffixes
            | Self::SearchRoot { .. }
            | Self::OutputDir { .. }
            | Self::InvalidPattern { .. }
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::CompanionRule { .. }
            | Self::AuditLog { .. } => FailurePolicy::AbortRun,
        }
    }
}

/// Reasons a candidate has no quality score.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// File could not be opened or an array could not be read.
    #[error(transparent)]
    Fits(#[from] FitsError),

    /// Signal and uncertainty arrays differ in length.
    #[error("signal has {signal} samples but uncertainty has {uncertainty}")]
    LengthMismatch { signal: usize, uncertainty: usize },

    /// Signal and uncertainty arrays have different axes.
    #[error("signal has shape {signal:?} but uncertainty has shape {uncertainty:?}")]
    ShapeMismatch {
        signal: Vec<usize>,
        uncertainty: Vec<usize>,
    },

    /// No sample has positive signal.
    #[error("no samples with positive signal")]
    NoPositiveSignal,

    /// Median and peak do not combine to a number.
    #[error("combined score is undefined (median {median}, peak {peak})")]
    Undefined { median: f64, peak: f64 },
}

/// Result type alias for curation operations.
pub type Result<T> = std::result::Result<T, CurateError>;
