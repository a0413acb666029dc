//! Search-root file index.
//!
//! The search root is walked once; every identifier × suffix lookup is then
//! answered from the index in discovery order. Entries are visited sorted by
//! file name within each directory so discovery order is stable across runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CurateError, Result};
use crate::identifier::Identifier;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// File-name pattern `<identifier><suffix>`.
#[derive(Debug, Clone)]
pub enum FilePattern {
    /// Literal file name, answered by exact lookup.
    Exact(String),
    /// Wildcard pattern matched against every indexed file name.
    Glob { text: String, matcher: GlobMatcher },
}

impl FilePattern {
    /// Build the pattern for an identifier and suffix.
    ///
    /// Only the suffix may carry wildcards; the identifier always matches
    /// literally.
    pub fn new(identifier: &Identifier, suffix: &str) -> Result<Self> {
        if !suffix.contains(GLOB_META) {
            return Ok(Self::Exact(format!("{identifier}{suffix}")));
        }
        let text = format!("{identifier}{suffix}");
        let matcher = Glob::new(&format!("{}{suffix}", globset::escape(identifier.as_str())))
            .map_err(|source| CurateError::InvalidPattern {
                pattern: text.clone(),
                source,
            })?
            .compile_matcher();
        Ok(Self::Glob { text, matcher })
    }

    /// Parse a bare file-name pattern.
    pub fn parse(text: &str) -> Result<Self> {
        if !text.contains(GLOB_META) {
            return Ok(Self::Exact(text.to_string()));
        }
        let matcher = Glob::new(text)
            .map_err(|source| CurateError::InvalidPattern {
                pattern: text.to_string(),
                source,
            })?
            .compile_matcher();
        Ok(Self::Glob {
            text: text.to_string(),
            matcher,
        })
    }

    /// Pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(text) | Self::Glob { text, .. } => text,
        }
    }

    /// Whether a bare file name matches.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(text) => text == name,
            Self::Glob { matcher, .. } => matcher.is_match(name),
        }
    }
}

/// Check that every suffix forms a valid pattern.
pub fn validate_suffixes(suffixes: &[String]) -> Result<()> {
    if suffixes.is_empty() {
        return Err(CurateError::NoSuffixes);
    }
    for suffix in suffixes {
        FilePattern::parse(suffix)?;
    }
    Ok(())
}

/// One indexed file.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Bare file name.
    pub name: String,
    /// Path as reached from the search root.
    pub path: PathBuf,
}

/// Index of every file under a search root, keyed by file name.
#[derive(Debug, Default)]
pub struct FileIndex {
    entries: Vec<IndexEntry>,
    by_name: HashMap<String, Vec<usize>>,
}

impl FileIndex {
    /// Walk `root` and index every regular file.
    ///
    /// The `exclude` directory (typically the output directory) is pruned
    /// from the walk, as are hidden entries. Unreadable entries are logged
    /// and skipped.
    pub fn build(root: &Path, exclude: Option<&Path>) -> Result<Self> {
        if !root.is_dir() {
            return Err(CurateError::SearchRoot {
                path: root.to_path_buf(),
            });
        }
        info!(root = %root.display(), "indexing search root");

        let excluded = exclude.and_then(|dir| fs::canonicalize(dir).ok());
        let mut index = Self::default();
        let mut skipped = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| keep_entry(entry, excluded.as_deref()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    skipped += 1;
                    warn!(%error, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                skipped += 1;
                debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };
            index.push(name.to_string(), entry.path().to_path_buf());
        }

        info!(
            root = %root.display(),
            file_count = index.len(),
            skipped,
            "index complete"
        );
        Ok(index)
    }

    fn push(&mut self, name: String, path: PathBuf) {
        let position = self.entries.len();
        self.by_name.entry(name.clone()).or_default().push(position);
        self.entries.push(IndexEntry { name, path });
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths whose file name matches `pattern`, in discovery order.
    #[must_use]
    pub fn find(&self, pattern: &FilePattern) -> Vec<&Path> {
        match pattern {
            FilePattern::Exact(name) => self
                .by_name
                .get(name)
                .map(|positions| {
                    positions
                        .iter()
                        .map(|pos| self.entries[*pos].path.as_path())
                        .collect()
                })
                .unwrap_or_default(),
            FilePattern::Glob { .. } => self
                .entries
                .iter()
                .filter(|entry| pattern.matches(&entry.name))
                .map(|entry| entry.path.as_path())
                .collect(),
        }
    }

    /// Candidate files for an identifier and suffix, in discovery order.
    pub fn candidates(&self, identifier: &Identifier, suffix: &str) -> Result<Vec<PathBuf>> {
        let pattern = FilePattern::new(identifier, suffix)?;
        Ok(self
            .find(&pattern)
            .into_iter()
            .map(Path::to_path_buf)
            .collect())
    }
}

fn keep_entry(entry: &DirEntry, excluded: Option<&Path>) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
    {
        return false;
    }
    match excluded {
        Some(excluded) if entry.file_type().is_dir() => fs::canonicalize(entry.path())
            .map(|path| path != excluded)
            .unwrap_or(true),
        _ => true,
    }
}
