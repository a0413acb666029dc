//! Object identifiers and how they are read from the command line.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CurateError, Result};

/// Identifiers shorter than this are left-padded with `0`.
pub const MIN_IDENTIFIER_WIDTH: usize = 6;

/// Canonical object identifier.
///
/// Canonicalization pads to [`MIN_IDENTIFIER_WIDTH`] characters; longer
/// identifiers pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Canonicalize a raw identifier token.
    #[must_use]
    pub fn canonical(raw: &str) -> Self {
        Self(format!("{raw:0>width$}", width = MIN_IDENTIFIER_WIDTH))
    }

    /// Canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve command-line identifier arguments into canonical identifiers.
///
/// A single argument naming an existing file is read as an identifier file;
/// anything else is taken as a literal list. Order and duplicates are kept.
pub fn resolve_identifiers(inputs: &[String]) -> Result<Vec<Identifier>> {
    let raw = match inputs {
        [single] if Path::new(single).is_file() => {
            let path = Path::new(single);
            let ids = read_identifier_file(path)?;
            info!(path = %path.display(), count = ids.len(), "read identifier file");
            ids
        }
        _ => inputs.to_vec(),
    };
    if raw.is_empty() {
        return Err(CurateError::NoIdentifiers);
    }
    let identifiers: Vec<Identifier> = raw.iter().map(|id| Identifier::canonical(id)).collect();
    debug!(count = identifiers.len(), "resolved identifiers");
    Ok(identifiers)
}

/// Read identifier tokens from a file.
pub fn read_identifier_file(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| CurateError::IdentifierFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_identifier_lines(&text))
}

/// First whitespace-separated token of every line not starting with `#`.
///
/// Blank lines are skipped.
#[must_use]
pub fn parse_identifier_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_canonical_padding() {
        assert_eq!(Identifier::canonical("42").as_str(), "000042");
        assert_eq!(Identifier::canonical("123456").as_str(), "123456");
        assert_eq!(Identifier::canonical("123456789").as_str(), "123456789");
        assert_eq!(Identifier::canonical("").as_str(), "000000");
    }

    #[test]
    fn test_parse_identifier_lines() {
        let text = "# ID  z\n42 1.5\n\n  7 0.3\n#skipped\n123456789\n";
        assert_eq!(parse_identifier_lines(text), vec!["42", "7", "123456789"]);
    }

    #[test]
    fn test_resolve_inline_list_keeps_order_and_duplicates() {
        let inputs = vec!["5".to_string(), "1234567".to_string(), "5".to_string()];
        let ids = resolve_identifiers(&inputs).unwrap();
        let ids: Vec<&str> = ids.iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["000005", "1234567", "000005"]);
    }

    #[test]
    fn test_resolve_single_file_argument() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "# header\n3 x\n4567890 y\n").unwrap();
        let ids = resolve_identifiers(&[path.display().to_string()]).unwrap();
        let ids: Vec<&str> = ids.iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["000003", "4567890"]);
    }

    #[test]
    fn test_single_non_file_argument_is_literal() {
        let ids = resolve_identifiers(&["does-not-exist.txt".to_string()]).unwrap();
        assert_eq!(ids[0].as_str(), "does-not-exist.txt");
    }

    #[test]
    fn test_empty_identifier_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.txt");
        fs::write(&path, "# nothing here\n").unwrap();
        let err = resolve_identifiers(&[path.display().to_string()]).unwrap_err();
        assert!(matches!(err, CurateError::NoIdentifiers));
    }

    #[test]
    fn test_unreadable_identifier_file() {
        let dir = TempDir::new().unwrap();
        let err = read_identifier_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, CurateError::IdentifierFile { .. }));
    }

    proptest! {
        #[test]
        fn short_identifiers_are_zero_padded(raw in "[A-Za-z0-9]{0,5}") {
            let id = Identifier::canonical(&raw);
            prop_assert_eq!(id.as_str().chars().count(), MIN_IDENTIFIER_WIDTH);
            prop_assert!(id.as_str().ends_with(raw.as_str()));
            let pad = MIN_IDENTIFIER_WIDTH - raw.chars().count();
            prop_assert!(id.as_str()[..pad].chars().all(|c| c == '0'));
        }

        #[test]
        fn long_identifiers_are_unchanged(raw in "[A-Za-z0-9_-]{6,16}") {
            let id = Identifier::canonical(&raw);
            prop_assert_eq!(id.as_str(), raw.as_str());
        }
    }
}
