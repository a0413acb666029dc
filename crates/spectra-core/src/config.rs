//! Run configuration and the optional TOML config file.
//!
//! Values are layered: built-in defaults, then the config file, then
//! whatever the caller sets explicitly afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::companion::{Companion, CompanionRule, CompanionTable};
use crate::error::{CurateError, Result};
use crate::score::ScoringConfig;

/// Which suffixes are materialized for an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixPolicy {
    /// Try every suffix; copy a winner for each one that has candidates.
    #[default]
    All,
    /// Stop after the first suffix that produced a copy.
    FirstMatch,
}

/// Everything a curation run needs.
#[derive(Debug, Clone)]
pub struct CurateConfig {
    /// Raw identifier arguments: a literal list or a single identifier file.
    pub identifiers: Vec<String>,
    /// Directory searched recursively for candidates.
    pub search_root: PathBuf,
    /// Directory the winners are copied into.
    pub output_dir: PathBuf,
    /// Suffixes in priority order.
    pub suffixes: Vec<String>,
    /// Array names read from each candidate.
    pub scoring: ScoringConfig,
    /// Companion rules.
    pub companions: CompanionTable,
    /// Suffix iteration policy.
    pub suffix_policy: SuffixPolicy,
    /// Select without copying.
    pub dry_run: bool,
}

impl CurateConfig {
    /// Configuration with defaults for everything but the locations.
    pub fn new(
        identifiers: Vec<String>,
        search_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identifiers,
            search_root: search_root.into(),
            output_dir: output_dir.into(),
            suffixes: Vec::new(),
            scoring: ScoringConfig::default(),
            companions: CompanionTable::default(),
            suffix_policy: SuffixPolicy::default(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    #[must_use]
    pub fn with_companions(mut self, companions: CompanionTable) -> Self {
        self.companions = companions;
        self
    }

    #[must_use]
    pub fn with_suffix_policy(mut self, policy: SuffixPolicy) -> Self {
        self.suffix_policy = policy;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Overlay the values present in a config file.
    pub fn apply_file(mut self, file: &ConfigFile) -> Result<Self> {
        if let Some(suffixes) = &file.suffixes {
            self.suffixes.clone_from(suffixes);
        }
        if let Some(scoring) = &file.scoring {
            if let Some(signal) = &scoring.signal {
                self.scoring.signal.clone_from(signal);
            }
            if let Some(uncertainty) = &scoring.uncertainty {
                self.scoring.uncertainty.clone_from(uncertainty);
            }
        }
        if let Some(table) = file.companion_table()? {
            self.companions = table;
        }
        if let Some(first_match) = file.first_match {
            self.suffix_policy = if first_match {
                SuffixPolicy::FirstMatch
            } else {
                SuffixPolicy::All
            };
        }
        Ok(self)
    }
}

/// `[scoring]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringSection {
    pub signal: Option<String>,
    pub uncertainty: Option<String>,
}

/// One `[[companions]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanionEntry {
    pub primary: String,
    #[serde(default)]
    pub companions: Vec<String>,
}

/// Contents of a config file.
///
/// ```toml
/// suffixes = ["_prism_1D.fits", "_*_1D.fits"]
/// first_match = true
///
/// [scoring]
/// signal = "DATA"
/// uncertainty = "ERR"
///
/// [[companions]]
/// primary = "_1D.fits"
/// companions = ["_2D.fits"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub suffixes: Option<Vec<String>>,
    pub scoring: Option<ScoringSection>,
    pub companions: Option<Vec<CompanionEntry>>,
    pub first_match: Option<bool>,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CurateError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::parse(&text).map_err(|source| CurateError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config file");
        Ok(file)
    }

    /// Parse config text.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Companion table from `[[companions]]`, if the file has any entries key.
    ///
    /// An empty list disables companions.
    pub fn companion_table(&self) -> Result<Option<CompanionTable>> {
        let Some(entries) = &self.companions else {
            return Ok(None);
        };
        let rules = entries
            .iter()
            .map(|entry| {
                CompanionRule::new(
                    entry.primary.clone(),
                    Companion::from_list(entry.companions.clone()),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(CompanionTable::new(rules)))
    }
}
