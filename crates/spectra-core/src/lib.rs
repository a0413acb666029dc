//! Best-spectrum curation.
//!
//! Given a set of object identifiers, a search root and a list of file-name
//! suffixes, find every `<identifier><suffix>` file under the root, score
//! each one by its signal-to-uncertainty ratio, and copy the best one (plus
//! any companion files) into an output directory with a provenance log.
//!
//! ```no_run
//! use spectra_core::{CurateConfig, run};
//!
//! let config = CurateConfig::new(vec!["ids.txt".to_string()], "reductions", "curated")
//!     .with_suffixes(["_prism_1D.fits", "_1D.fits"]);
//! let report = run(&config)?;
//! for id in report.unmatched() {
//!     println!("nothing for {id}");
//! }
//! # Ok::<(), spectra_core::CurateError>(())
//! ```

pub mod audit;
pub mod companion;
pub mod config;
mod error;
pub mod identifier;
pub mod index;
pub mod materialize;
mod pipeline;
pub mod report;
pub mod score;
pub mod select;

pub use audit::{AUDIT_LOG_FILE, AuditLog, AuditRecord};
pub use companion::{Companion, CompanionRule, CompanionTable};
pub use config::{ConfigFile, CurateConfig, SuffixPolicy};
pub use error::{CurateError, FailurePolicy, Result, ScoreError};
pub use identifier::{Identifier, resolve_identifiers};
pub use index::{FileIndex, FilePattern};
pub use materialize::{FailedCopy, Materialized, Materializer};
pub use pipeline::run;
pub use report::{
    IdentifierReport, RunReport, RunWarning, SelectedFile, SuffixOutcome, SuffixStatus,
    render_unmatched, unmatched_message,
};
pub use score::{QualityScore, ScoringConfig, score_arrays, score_file};
pub use select::{ScoredCandidate, SelectionResult, select_best};
