//! Knowledge-base configuration
//!
//! Lets deployments extend or replace the built-in SID knowledge without
//! code changes. Loaded from JSON; every field has a default so an empty
//! object (or a missing file) yields the built-in behavior.

use crate::error::{Result, SidError};
use crate::knowledge::{WELL_KNOWN_PATTERNS_NAME, WELL_KNOWN_PATTERNS_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default prefix for labels derived from the account directory
pub const DEFAULT_ACCOUNT_LABEL_PREFIX: &str = "User: ";

/// Where configured patterns go relative to the built-in families
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternPlacement {
    /// Configured patterns are tried before the built-in families
    Prepend,
    /// Configured patterns are tried after the built-in families
    #[default]
    Append,
}

/// A configured SID family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRule {
    /// Regular expression searched anywhere in the SID string
    pub pattern: String,

    /// Label assigned on a match
    pub label: String,
}

/// Knowledge-base and classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseConfig {
    /// Start from the built-in well-known tables
    #[serde(default = "default_include_well_known")]
    pub include_well_known: bool,

    /// Prefix for account-derived labels (e.g., "User: alice")
    #[serde(default = "default_account_label_prefix")]
    pub account_label_prefix: String,

    /// Name reported by the resulting pattern table
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Version reported by the resulting pattern table
    #[serde(default = "default_table_version")]
    pub table_version: u32,

    /// Extra exact entries; these override built-in labels
    #[serde(default)]
    pub exact: BTreeMap<String, String>,

    /// Extra SID families, in priority order
    #[serde(default)]
    pub patterns: Vec<PatternRule>,

    /// Placement of `patterns` relative to the built-in families
    #[serde(default)]
    pub pattern_placement: PatternPlacement,
}

fn default_include_well_known() -> bool {
    true
}

fn default_account_label_prefix() -> String {
    DEFAULT_ACCOUNT_LABEL_PREFIX.to_string()
}

fn default_table_name() -> String {
    WELL_KNOWN_PATTERNS_NAME.to_string()
}

fn default_table_version() -> u32 {
    WELL_KNOWN_PATTERNS_VERSION
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            include_well_known: default_include_well_known(),
            account_label_prefix: default_account_label_prefix(),
            table_name: default_table_name(),
            table_version: default_table_version(),
            exact: BTreeMap::new(),
            patterns: Vec::new(),
            pattern_placement: PatternPlacement::default(),
        }
    }
}

impl KnowledgeBaseConfig {
    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No SID config file, using defaults");
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|e| {
            SidError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&json).map_err(|e| {
            SidError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %path.display(),
            exact = config.exact.len(),
            patterns = config.patterns.len(),
            "SID config loaded"
        );
        Ok(config)
    }
}
