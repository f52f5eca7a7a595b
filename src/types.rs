//! Core classification types for the a3s-sid system
//!
//! All serializable types use camelCase JSON for renderer compatibility.

use serde::{Deserialize, Serialize};

/// A local account as reported by an external user-directory provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Relative identifier of the account (final SID sub-authority)
    pub rid: u32,

    /// Account name (e.g., "alice", "Administrator")
    pub name: String,
}

impl AccountRecord {
    /// Create a new account record
    pub fn new(rid: u32, name: impl Into<String>) -> Self {
        Self {
            rid,
            name: name.into(),
        }
    }
}

/// Which precedence step produced a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum MatchSource {
    /// The SID is a key of the exact-match table
    Exact,
    /// The SID matched the pattern table entry at `index`
    Pattern { index: usize },
    /// Neither table matched; the label comes from the account directory
    Account,
    /// Nothing matched and the RID is not a known account
    Unmatched,
}

impl MatchSource {
    /// Short name used in logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Pattern { .. } => "pattern",
            Self::Account => "account",
            Self::Unmatched => "unmatched",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern { index } => write!(f, "pattern[{}]", index),
            other => f.write_str(other.kind()),
        }
    }
}

/// Label for a single SID together with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Human-readable label; empty when nothing is known about the SID
    pub label: String,

    /// Step that produced the label
    pub source: MatchSource,
}

impl Classification {
    /// Whether any knowledge was found for the SID
    pub fn is_labelled(&self) -> bool {
        !self.label.is_empty()
    }
}

/// One classified (owner, SID) pair from a classification run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult<E> {
    /// Token owner the SID was taken from
    pub owner: E,

    /// SID string exactly as supplied by the token source
    pub sid: String,

    /// Resolved label (possibly empty)
    pub label: String,

    /// Step that produced the label
    pub source: MatchSource,
}
