//! Append-only provenance log.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CurateError, Result};

/// Log file name inside the output directory.
pub const AUDIT_LOG_FILE: &str = "copy_log.txt";

/// One successful copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    /// Where the file came from.
    pub source: PathBuf,
    /// Where it was written.
    pub destination: PathBuf,
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            self.source.display(),
            self.destination.display()
        )
    }
}

/// Handle on `copy_log.txt`, opened for appending.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    /// Open (creating if needed) the log in `output_dir`.
    pub fn open(output_dir: &Path) -> Result<Self> {
        let path = output_dir.join(AUDIT_LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| CurateError::AuditLog {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    /// Append one record and flush it.
    pub fn append(&mut self, record: &AuditRecord) -> Result<()> {
        let line = format!("{record}\n");
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|source| CurateError::AuditLog {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(n: usize) -> AuditRecord {
        AuditRecord {
            source: PathBuf::from(format!("/search/run{n}/000042_1D.fits")),
            destination: PathBuf::from("/out/000042_1D.fits"),
        }
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            record(1).to_string(),
            "/search/run1/000042_1D.fits --> /out/000042_1D.fits"
        );
    }

    #[test]
    fn test_log_accumulates_across_opens() {
        let dir = TempDir::new().unwrap();
        {
            let mut log = AuditLog::open(dir.path()).unwrap();
            log.append(&record(1)).unwrap();
        }
        {
            let mut log = AuditLog::open(dir.path()).unwrap();
            log.append(&record(2)).unwrap();
        }
        let text = fs::read_to_string(dir.path().join(AUDIT_LOG_FILE)).unwrap();
        assert_eq!(
            text,
            "/search/run1/000042_1D.fits --> /out/000042_1D.fits\n\
             /search/run2/000042_1D.fits --> /out/000042_1D.fits\n"
        );
    }
}
