//! Copying winners (and their companions) into the output directory.
//!
//! Each copy is written to a temporary file in the output directory and then
//! renamed over the destination, so an interrupted run never leaves a
//! destination missing or half-written.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::audit::{AuditLog, AuditRecord};
use crate::companion::CompanionTable;
use crate::error::{CurateError, FailurePolicy, Result};

/// A copy that failed after the winner itself was copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCopy {
    /// File that could not be copied.
    pub source: PathBuf,
    /// Failure description.
    pub error: String,
}

/// What one materialization did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Materialized {
    /// The winning file's copy.
    pub primary: AuditRecord,
    /// Companion copies, in rule order.
    pub companions: Vec<AuditRecord>,
    /// Companions implied by a rule but absent on disk.
    pub missing_companions: Vec<PathBuf>,
    /// Companions present on disk whose copy failed.
    pub failed_companions: Vec<FailedCopy>,
}

/// Copies winners into the output directory and records provenance.
#[derive(Debug)]
pub struct Materializer {
    output_dir: PathBuf,
    companions: CompanionTable,
    audit: Option<AuditLog>,
}

impl Materializer {
    /// Materializer that copies and appends to `audit`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, companions: CompanionTable, audit: AuditLog) -> Self {
        Self {
            output_dir: output_dir.into(),
            companions,
            audit: Some(audit),
        }
    }

    /// Materializer that only reports what it would copy.
    #[must_use]
    pub fn dry_run(output_dir: impl Into<PathBuf>, companions: CompanionTable) -> Self {
        Self {
            output_dir: output_dir.into(),
            companions,
            audit: None,
        }
    }

    /// Whether copies are actually performed.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.audit.is_none()
    }

    /// Destination path for a source file: same base name, output directory.
    #[must_use]
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        match source.file_name() {
            Some(name) => self.output_dir.join(name),
            None => self.output_dir.clone(),
        }
    }

    /// Copy `winner` and any companions its name implies.
    ///
    /// A failed write of the winner is a [`CurateError::Copy`]. Once the
    /// winner is in place, missing companions and failed companion writes are
    /// reported in the result so the winner's copy is never lost; only an
    /// audit log failure still returns an error.
    pub fn materialize(&mut self, winner: &Path) -> Result<Materialized> {
        let primary = self.copy_one(winner)?;

        let mut companions = Vec::new();
        let mut missing_companions = Vec::new();
        let mut failed_companions = Vec::new();
        for companion in self.companions.companions_for(winner) {
            if !companion.is_file() {
                debug!(companion = %companion.display(), "companion absent");
                missing_companions.push(companion);
                continue;
            }
            match self.copy_one(&companion) {
                Ok(record) => companions.push(record),
                Err(failure) if failure.policy() == FailurePolicy::AbortIdentifier => {
                    failed_companions.push(FailedCopy {
                        source: companion,
                        error: failure.to_string(),
                    });
                }
                Err(failure) => return Err(failure),
            }
        }

        Ok(Materialized {
            primary,
            companions,
            missing_companions,
            failed_companions,
        })
    }

    fn copy_one(&mut self, source: &Path) -> Result<AuditRecord> {
        let destination = self.destination_for(source);
        let record = AuditRecord {
            source: source.to_path_buf(),
            destination,
        };
        let Some(audit) = self.audit.as_mut() else {
            info!(source = %record.source.display(), destination = %record.destination.display(), "would copy");
            return Ok(record);
        };

        replace_file(source, &self.output_dir, &record.destination).map_err(|reason| {
            CurateError::Copy {
                from: record.source.clone(),
                to: record.destination.clone(),
                reason,
            }
        })?;
        audit.append(&record)?;
        info!(source = %record.source.display(), destination = %record.destination.display(), "copied");
        Ok(record)
    }
}

/// Copy `source` to `destination` through a temporary file in `dir`.
///
/// Permissions and modification time follow the source.
pub fn replace_file(source: &Path, dir: &Path, destination: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let metadata = input.metadata()?;

    let mut temp = NamedTempFile::new_in(dir)?;
    io::copy(&mut input, temp.as_file_mut())?;
    if let Ok(modified) = metadata.modified() {
        temp.as_file().set_modified(modified)?;
    }
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), metadata.permissions())?;
    temp.persist(destination).map_err(|error| error.error)?;
    Ok(())
}
