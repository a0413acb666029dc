//! Companion-file rules.
//!
//! A winning file may imply further files that travel with it, e.g. a 1D
//! spectrum `000042_1D.fits` and its 2D counterpart `000042_2D.fits`. Rules
//! are substring substitutions on the file name, checked in table order; the
//! first rule whose primary substring occurs in the name decides.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CurateError, Result};

/// Companions implied by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Companion {
    /// The rule matches but implies nothing.
    None,
    /// One companion substring.
    Single(String),
    /// Several companion substrings, copied in order.
    Multi(Vec<String>),
}

impl Companion {
    /// Build from a list: empty, one, or several substrings.
    #[must_use]
    pub fn from_list(mut substitutes: Vec<String>) -> Self {
        match substitutes.len() {
            0 => Self::None,
            1 => Self::Single(substitutes.remove(0)),
            _ => Self::Multi(substitutes),
        }
    }

    /// Substitutes in copy order.
    #[must_use]
    pub fn substitutes(&self) -> &[String] {
        match self {
            Self::None => &[],
            Self::Single(one) => std::slice::from_ref(one),
            Self::Multi(many) => many,
        }
    }
}

/// Primary substring and what it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionRule {
    /// Substring of the winning file name that triggers the rule.
    pub primary: String,
    /// Substring(s) replacing `primary` to name the companion(s).
    pub companion: Companion,
}

impl CompanionRule {
    /// Create a rule; the primary substring must not be empty.
    pub fn new(primary: impl Into<String>, companion: Companion) -> Result<Self> {
        let primary = primary.into();
        if primary.is_empty() {
            return Err(CurateError::CompanionRule {
                rule: primary,
                message: "primary substring is empty".to_string(),
            });
        }
        Ok(Self { primary, companion })
    }

    /// Parse `PRIMARY=COMPANION[,COMPANION...]`; `PRIMARY=` implies nothing.
    pub fn parse(text: &str) -> Result<Self> {
        let Some((primary, companions)) = text.split_once('=') else {
            return Err(CurateError::CompanionRule {
                rule: text.to_string(),
                message: "expected PRIMARY=COMPANION".to_string(),
            });
        };
        let substitutes = companions
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(primary.trim(), Companion::from_list(substitutes)).map_err(|_| {
            CurateError::CompanionRule {
                rule: text.to_string(),
                message: "primary substring is empty".to_string(),
            }
        })
    }

    /// Companion paths for `path`, if this rule applies to its file name.
    #[must_use]
    pub fn apply(&self, path: &Path) -> Option<Vec<PathBuf>> {
        let name = path.file_name()?.to_str()?;
        let at = name.rfind(&self.primary)?;
        let head = &name[..at];
        let tail = &name[at + self.primary.len()..];
        Some(
            self.companion
                .substitutes()
                .iter()
                .map(|substitute| path.with_file_name(format!("{head}{substitute}{tail}")))
                .collect(),
        )
    }
}

/// Ordered companion rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionTable {
    rules: Vec<CompanionRule>,
}

impl Default for CompanionTable {
    /// `_1D.fits` spectra travel with their `_2D.fits` counterpart.
    fn default() -> Self {
        Self {
            rules: vec![CompanionRule {
                primary: "_1D.fits".to_string(),
                companion: Companion::Single("_2D.fits".to_string()),
            }],
        }
    }
}

impl CompanionTable {
    /// Table with the given rules.
    #[must_use]
    pub fn new(rules: Vec<CompanionRule>) -> Self {
        Self { rules }
    }

    /// Table with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules in match order.
    #[must_use]
    pub fn rules(&self) -> &[CompanionRule] {
        &self.rules
    }

    /// Companion paths for a winning file; empty when no rule applies.
    #[must_use]
    pub fn companions_for(&self, path: &Path) -> Vec<PathBuf> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(path))
            .unwrap_or_default()
    }
}
