//! Run report and end-of-run reporting of unmatched identifiers.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::audit::AuditRecord;
use crate::error::{CurateError, FailurePolicy};
use crate::identifier::Identifier;
use crate::materialize::FailedCopy;
use crate::score::QualityScore;

/// What happened for one identifier and suffix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuffixStatus {
    /// A winner was copied (or would have been, in a dry run).
    Copied(SelectedFile),
    /// No candidate could be scored.
    NoCandidate,
    /// The winner could not be copied.
    Failed { winner: PathBuf, error: String },
}

/// A copied winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFile {
    /// Winner and its destination.
    pub record: AuditRecord,
    /// Winner's score.
    pub score: QualityScore,
    /// Companion copies.
    pub companions: Vec<AuditRecord>,
    /// Companions that were implied but absent.
    pub missing_companions: Vec<PathBuf>,
    /// Companions whose copy failed; any entry aborts the identifier.
    pub failed_companions: Vec<FailedCopy>,
}

/// Result of one suffix for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuffixOutcome {
    /// Suffix as configured.
    pub suffix: String,
    /// Files found for `<identifier><suffix>`.
    pub candidates: usize,
    /// Candidates dropped because they could not be scored.
    pub excluded: usize,
    /// Outcome.
    #[serde(flatten)]
    pub status: SuffixStatus,
}

/// All suffix outcomes for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierReport {
    /// Canonical identifier.
    pub identifier: Identifier,
    /// Outcomes in suffix order; suffixes skipped after a failure are absent.
    pub outcomes: Vec<SuffixOutcome>,
}

impl IdentifierReport {
    /// Empty report for an identifier.
    #[must_use]
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            outcomes: Vec::new(),
        }
    }

    /// Whether any suffix produced a copy.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.copies().next().is_some()
    }

    /// Whether a copy (of a winner or a companion) failed for this identifier.
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.outcomes.iter().any(|outcome| match &outcome.status {
            SuffixStatus::Failed { .. } => true,
            SuffixStatus::Copied(selected) => !selected.failed_companions.is_empty(),
            SuffixStatus::NoCandidate => false,
        })
    }

    /// Copied winners.
    pub fn copies(&self) -> impl Iterator<Item = &SelectedFile> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            SuffixStatus::Copied(selected) => Some(selected),
            _ => None,
        })
    }
}

/// A recovered failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunWarning {
    /// Identifier being processed.
    pub identifier: Identifier,
    /// Failure description.
    pub message: String,
}

/// Everything a run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Output directory.
    pub output_dir: PathBuf,
    /// Whether copies were skipped.
    pub dry_run: bool,
    /// Per-identifier results in input order.
    pub identifiers: Vec<IdentifierReport>,
    /// Recovered failures in the order they occurred.
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    /// Empty report.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run,
            identifiers: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a recovered failure.
    pub fn warn(&mut self, identifier: &Identifier, error: &CurateError) {
        debug_assert_eq!(error.policy(), FailurePolicy::Recover);
        self.warnings.push(RunWarning {
            identifier: identifier.clone(),
            message: error.to_string(),
        });
    }

    /// Identifiers for which nothing was copied.
    #[must_use]
    pub fn unmatched(&self) -> Vec<&Identifier> {
        self.identifiers
            .iter()
            .filter(|report| !report.is_matched())
            .map(|report| &report.identifier)
            .collect()
    }

    /// Identifiers whose processing was aborted by a copy failure.
    #[must_use]
    pub fn failed(&self) -> Vec<&Identifier> {
        self.identifiers
            .iter()
            .filter(|report| report.has_failure())
            .map(|report| &report.identifier)
            .collect()
    }

    /// Whether any identifier failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.identifiers.iter().any(IdentifierReport::has_failure)
    }

    /// Number of primary copies.
    #[must_use]
    pub fn copied_count(&self) -> usize {
        self.identifiers
            .iter()
            .map(|report| report.copies().count())
            .sum()
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Message for an identifier nothing was found for.
#[must_use]
pub fn unmatched_message(identifier: &Identifier) -> String {
    format!("No file found for ID {identifier} with any of the provided suffixes.")
}

/// Log a warning for every unmatched identifier.
pub fn report_unmatched(report: &RunReport) {
    for identifier in report.unmatched() {
        warn!(identifier = %identifier, "{}", unmatched_message(identifier));
    }
}

/// Unmatched identifiers, one message per line.
#[must_use]
pub fn render_unmatched(report: &RunReport) -> String {
    let mut out = String::new();
    for identifier in report.unmatched() {
        let _ = writeln!(out, "{}", unmatched_message(identifier));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copied(source: &str) -> SuffixOutcome {
        SuffixOutcome {
            suffix: "_1D.fits".to_string(),
            candidates: 1,
            excluded: 0,
            status: SuffixStatus::Copied(SelectedFile {
                record: AuditRecord {
                    source: PathBuf::from(source),
                    destination: PathBuf::from("/out/x"),
                },
                score: QualityScore::new(4.0, 9.0).unwrap(),
                companions: Vec::new(),
                missing_companions: Vec::new(),
                failed_companions: Vec::new(),
            }),
        }
    }

    fn none(suffix: &str) -> SuffixOutcome {
        SuffixOutcome {
            suffix: suffix.to_string(),
            candidates: 0,
            excluded: 0,
            status: SuffixStatus::NoCandidate,
        }
    }

    fn sample_report() -> RunReport {
        let mut report = RunReport::new("/out", false);
        let mut a = IdentifierReport::new(Identifier::canonical("1"));
        a.outcomes.push(none("_x1d.fits"));
        a.outcomes.push(copied("/s/000001_1D.fits"));
        let mut b = IdentifierReport::new(Identifier::canonical("2"));
        b.outcomes.push(none("_x1d.fits"));
        b.outcomes.push(none("_1D.fits"));
        let mut c = IdentifierReport::new(Identifier::canonical("1234567"));
        c.outcomes.push(SuffixOutcome {
            suffix: "_1D.fits".to_string(),
            candidates: 2,
            excluded: 0,
            status: SuffixStatus::Failed {
                winner: PathBuf::from("/s/1234567_1D.fits"),
                error: "permission denied".to_string(),
            },
        });
        report.identifiers = vec![a, b, c];
        report
    }

    #[test]
    fn test_unmatched_and_failed() {
        let report = sample_report();
        let unmatched: Vec<&str> = report.unmatched().iter().map(|id| id.as_str()).collect();
        assert_eq!(unmatched, vec!["000002", "1234567"]);
        let failed: Vec<&str> = report.failed().iter().map(|id| id.as_str()).collect();
        assert_eq!(failed, vec!["1234567"]);
        assert!(report.has_failures());
        assert_eq!(report.copied_count(), 1);
    }

    #[test]
    fn test_failed_companion_is_matched_and_failed() {
        let mut outcome = copied("/s/000009_1D.fits");
        if let SuffixStatus::Copied(selected) = &mut outcome.status {
            selected.failed_companions.push(FailedCopy {
                source: PathBuf::from("/s/000009_2D.fits"),
                error: "is a directory".to_string(),
            });
        }
        let mut report = RunReport::new("/out", false);
        let mut partial = IdentifierReport::new(Identifier::canonical("9"));
        partial.outcomes.push(outcome);
        report.identifiers.push(partial);

        assert!(report.unmatched().is_empty());
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.copied_count(), 1);
    }

    #[test]
    fn test_render_unmatched() {
        insta::assert_snapshot!(render_unmatched(&sample_report()), @r"
        No file found for ID 000002 with any of the provided suffixes.
        No file found for ID 1234567 with any of the provided suffixes.
        ");
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&sample_report().to_json().unwrap()).unwrap();
        let first = &json["identifiers"][0];
        assert_eq!(first["identifier"], "000001");
        assert_eq!(first["outcomes"][0]["status"], "no_candidate");
        assert_eq!(first["outcomes"][1]["status"], "copied");
        assert_eq!(first["outcomes"][1]["score"]["median"], 4.0);
        assert_eq!(json["identifiers"][2]["outcomes"][0]["status"], "failed");
    }
}
