//! Curation run: identifiers × suffixes through scoring, selection and copy.

use std::fs;
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn};

use crate::audit::AuditLog;
use crate::config::{CurateConfig, SuffixPolicy};
use crate::error::{CurateError, FailurePolicy, Result};
use crate::identifier::{Identifier, resolve_identifiers};
use crate::index::{FileIndex, validate_suffixes};
use crate::materialize::Materializer;
use crate::report::{
    IdentifierReport, RunReport, SelectedFile, SuffixOutcome, SuffixStatus, report_unmatched,
};
use crate::score::score_file;
use crate::select::{ScoredCandidate, select_best};

/// Run a curation.
///
/// Configuration failures (unreadable identifier file, bad pattern, missing
/// search root, uncreatable output directory, unopenable audit log) return
/// `Err` before anything is copied. Everything after that is recorded in the
/// report; only an audit log write failure still aborts the run.
pub fn run(config: &CurateConfig) -> Result<RunReport> {
    let start = Instant::now();
    let identifiers = resolve_identifiers(&config.identifiers)?;
    validate_suffixes(&config.suffixes)?;
    let index = FileIndex::build(&config.search_root, Some(&config.output_dir))?;

    let mut materializer = if config.dry_run {
        info!(output_dir = %config.output_dir.display(), "dry run, nothing will be copied");
        Materializer::dry_run(&config.output_dir, config.companions.clone())
    } else {
        fs::create_dir_all(&config.output_dir).map_err(|source| CurateError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;
        let audit = AuditLog::open(&config.output_dir)?;
        Materializer::new(&config.output_dir, config.companions.clone(), audit)
    };

    let mut report = RunReport::new(&config.output_dir, config.dry_run);
    for identifier in identifiers {
        let identifier_report =
            curate_identifier(identifier, config, &index, &mut materializer, &mut report)?;
        report.identifiers.push(identifier_report);
    }

    report_unmatched(&report);
    info!(
        identifiers = report.identifiers.len(),
        copied = report.copied_count(),
        unmatched = report.unmatched().len(),
        warnings = report.warnings.len(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(report)
}

fn curate_identifier(
    identifier: Identifier,
    config: &CurateConfig,
    index: &FileIndex,
    materializer: &mut Materializer,
    report: &mut RunReport,
) -> Result<IdentifierReport> {
    let span = info_span!("identifier", identifier = %identifier);
    let _guard = span.enter();
    let mut result = IdentifierReport::new(identifier);

    for suffix in &config.suffixes {
        let outcome =
            curate_suffix(&result.identifier, suffix, config, index, materializer, report)?;
        let stop = match &outcome.status {
            SuffixStatus::Copied(selected) => {
                !selected.failed_companions.is_empty()
                    || config.suffix_policy == SuffixPolicy::FirstMatch
            }
            SuffixStatus::Failed { .. } => true,
            SuffixStatus::NoCandidate => false,
        };
        result.outcomes.push(outcome);
        if stop {
            break;
        }
    }
    Ok(result)
}

fn curate_suffix(
    identifier: &Identifier,
    suffix: &str,
    config: &CurateConfig,
    index: &FileIndex,
    materializer: &mut Materializer,
    report: &mut RunReport,
) -> Result<SuffixOutcome> {
    let span = info_span!("suffix", suffix = %suffix);
    let _guard = span.enter();

    let candidates = index.candidates(identifier, suffix)?;
    debug!(candidates = candidates.len(), "candidates found");

    let mut scored = Vec::with_capacity(candidates.len());
    for path in &candidates {
        match score_file(path, &config.scoring) {
            Ok(score) => {
                info!(
                    candidate = %path.display(),
                    median = score.median,
                    peak = score.peak,
                    combined = score.combined,
                    "scored candidate"
                );
                scored.push(ScoredCandidate {
                    path: path.clone(),
                    score,
                });
            }
            Err(reason) => {
                let failure = CurateError::Score {
                    path: path.clone(),
                    reason,
                };
                warn!(%failure, "candidate excluded");
                report.warn(identifier, &failure);
            }
        }
    }
    let excluded = candidates.len() - scored.len();

    let Some(winner) = select_best(scored) else {
        debug!("no candidate");
        return Ok(SuffixOutcome {
            suffix: suffix.to_string(),
            candidates: candidates.len(),
            excluded,
            status: SuffixStatus::NoCandidate,
        });
    };
    info!(
        winner = %winner.path.display(),
        combined = winner.score.combined,
        "selected winner"
    );

    let status = match materializer.materialize(&winner.path) {
        Ok(done) => {
            for companion in &done.missing_companions {
                let missing = CurateError::CompanionMissing {
                    primary: winner.path.clone(),
                    companion: companion.clone(),
                };
                warn!(%missing, "companion skipped");
                report.warn(identifier, &missing);
            }
            for failed in &done.failed_companions {
                error!(
                    companion = %failed.source.display(),
                    error = %failed.error,
                    "companion copy failed, skipping remaining suffixes"
                );
            }
            SuffixStatus::Copied(SelectedFile {
                record: done.primary,
                score: winner.score,
                companions: done.companions,
                missing_companions: done.missing_companions,
                failed_companions: done.failed_companions,
            })
        }
        Err(failure) if failure.policy() == FailurePolicy::AbortIdentifier => {
            error!(%failure, "copy failed, skipping remaining suffixes");
            SuffixStatus::Failed {
                winner: winner.path.clone(),
                error: failure.to_string(),
            }
        }
        Err(failure) => return Err(failure),
    };

    Ok(SuffixOutcome {
        suffix: suffix.to_string(),
        candidates: candidates.len(),
        excluded,
        status,
    })
}
