//! Static SID knowledge: exact and pattern tables bundled together
//!
//! A `KnowledgeBase` is built once at startup and shared read-only
//! (typically behind an `Arc`) by every classification run.

pub mod exact;
pub mod pattern;

pub use exact::ExactMatchTable;
pub use pattern::{
    PatternEntry, PatternTable, RegexMatcher, SidMatcher, SubstringMatcher,
    WELL_KNOWN_PATTERNS_NAME, WELL_KNOWN_PATTERNS_VERSION,
};

use crate::config::{KnowledgeBaseConfig, PatternPlacement};
use crate::error::Result;

/// Immutable pair of lookup tables consulted by the classifier
#[derive(Debug)]
pub struct KnowledgeBase {
    exact: ExactMatchTable,
    patterns: PatternTable,
}

impl KnowledgeBase {
    /// Assemble a knowledge base from prepared tables
    pub fn new(exact: ExactMatchTable, patterns: PatternTable) -> Self {
        Self { exact, patterns }
    }

    /// Built-in well-known SIDs and SID families
    pub fn well_known() -> Self {
        Self::new(ExactMatchTable::well_known(), PatternTable::well_known())
    }

    /// Build a knowledge base from configuration
    ///
    /// Configured exact entries override built-in ones. Configured patterns
    /// keep their relative order and are placed before or after the
    /// built-in families according to `pattern_placement`.
    pub fn from_config(config: &KnowledgeBaseConfig) -> Result<Self> {
        let (mut exact, builtin) = if config.include_well_known {
            (ExactMatchTable::well_known(), PatternTable::well_known())
        } else {
            (
                ExactMatchTable::new(),
                PatternTable::new(config.table_name.clone(), config.table_version),
            )
        };

        for (sid, label) in &config.exact {
            if let Some(previous) = exact.insert(sid.clone(), label.clone()) {
                tracing::warn!(
                    sid = %sid,
                    builtin = %previous,
                    configured = %label,
                    "Configured SID label overrides built-in entry"
                );
            }
        }

        let mut configured = Vec::with_capacity(config.patterns.len());
        for rule in &config.patterns {
            configured.push(PatternEntry::regex(&rule.pattern, rule.label.clone())?);
        }

        let mut patterns = PatternTable::new(config.table_name.clone(), config.table_version);
        match config.pattern_placement {
            PatternPlacement::Prepend => {
                for entry in configured {
                    patterns.push(entry);
                }
                for entry in builtin.into_entries() {
                    patterns.push(entry);
                }
            }
            PatternPlacement::Append => {
                for entry in builtin.into_entries() {
                    patterns.push(entry);
                }
                for entry in configured {
                    patterns.push(entry);
                }
            }
        }

        tracing::debug!(
            exact = exact.len(),
            patterns = patterns.len(),
            table = %patterns.name(),
            version = patterns.version(),
            "Knowledge base built from config"
        );

        Ok(Self::new(exact, patterns))
    }

    pub fn exact(&self) -> &ExactMatchTable {
        &self.exact
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::well_known()
    }
}
