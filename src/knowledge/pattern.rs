//! Ordered pattern-match table for SID families
//!
//! Families such as "any domain SID ending in RID 512" cannot be listed
//! exactly, so they are matched structurally. Entries are tried front to
//! back and the first hit wins. The order is part of the table's behavior:
//! reordering can change the label of a SID that satisfies several entries.

use crate::error::{Result, SidError};
use regex::Regex;

/// Name of the built-in pattern table
pub const WELL_KNOWN_PATTERNS_NAME: &str = "well-known";

/// Version of the built-in pattern table; bump when entries or order change
pub const WELL_KNOWN_PATTERNS_VERSION: u32 = 1;

/// Built-in SID families in priority order
///
/// The domain RID families precede the logon-session family, so
/// `S-1-5-5-0-500` is an Administrator hit, not a Logon Session.
const WELL_KNOWN_PATTERNS: &[(&str, &str)] = &[
    (r"S-1-5-[0-9-]+-500", "Administrator"),
    (r"S-1-5-[0-9-]+-501", "Guest"),
    (r"S-1-5-[0-9-]+-502", "KRBTGT"),
    (r"S-1-5-[0-9-]+-512", "Domain Admins"),
    (r"S-1-5-[0-9-]+-513", "Domain Users"),
    (r"S-1-5-[0-9-]+-514", "Domain Guests"),
    (r"S-1-5-[0-9-]+-515", "Domain Computers"),
    (r"S-1-5-[0-9-]+-516", "Domain Controllers"),
    (r"S-1-5-[0-9-]+-517", "Cert Publishers"),
    (r"S-1-5-[0-9-]+-520", "Group Policy Creator Owners"),
    (r"S-1-5-[0-9-]+-533", "RAS and IAS Servers"),
    (r"S-1-5-5-[0-9]+-[0-9]+", "Logon Session"),
    (r"S-1-5-21-[0-9-]+-518", "Schema Admins"),
    (r"S-1-5-21-[0-9-]+-519", "Enterprise Admins"),
    (r"S-1-5-21-[0-9-]+-553", "RAS Servers"),
];

/// Capability to test whether a SID string belongs to a family
///
/// A hit anywhere in the candidate counts; matchers are not anchored to
/// the full string.
pub trait SidMatcher: Send + Sync + std::fmt::Debug {
    /// Check whether the candidate SID string matches
    fn matches(&self, candidate: &str) -> bool;

    /// Source text of the pattern, for display and diagnostics
    fn pattern(&self) -> &str;
}

/// Regular-expression matcher (unanchored search)
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compile a pattern; `label` is only used for the error message
    pub fn new(pattern: &str, label: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| SidError::InvalidPattern {
            label: label.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl SidMatcher for RegexMatcher {
    fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Literal substring matcher
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    needle: String,
}

impl SubstringMatcher {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl SidMatcher for SubstringMatcher {
    fn matches(&self, candidate: &str) -> bool {
        candidate.contains(self.needle.as_str())
    }

    fn pattern(&self) -> &str {
        &self.needle
    }
}

/// One SID family and the label it resolves to
#[derive(Debug)]
pub struct PatternEntry {
    matcher: Box<dyn SidMatcher>,
    label: String,
}

impl PatternEntry {
    pub fn new(matcher: impl SidMatcher + 'static, label: impl Into<String>) -> Self {
        Self {
            matcher: Box::new(matcher),
            label: label.into(),
        }
    }

    /// Build a regex-backed entry
    pub fn regex(pattern: &str, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let matcher = RegexMatcher::new(pattern, &label)?;
        Ok(Self::new(matcher, label))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.matcher.matches(candidate)
    }
}

/// Named, versioned, ordered list of SID families
#[derive(Debug)]
pub struct PatternTable {
    name: String,
    version: u32,
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    /// Create an empty table
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            entries: Vec::new(),
        }
    }

    /// Table holding the built-in SID families in their documented order
    pub fn well_known() -> Self {
        let mut table = Self::new(WELL_KNOWN_PATTERNS_NAME, WELL_KNOWN_PATTERNS_VERSION);
        for (pattern, label) in WELL_KNOWN_PATTERNS {
            // The built-in patterns are literals; a failure here is a bug in the table.
            match PatternEntry::regex(pattern, *label) {
                Ok(entry) => table.push(entry),
                Err(e) => tracing::error!(pattern, error = %e, "Built-in SID pattern rejected"),
            }
        }
        table
    }

    /// Append an entry at the lowest priority
    pub fn push(&mut self, entry: PatternEntry) {
        self.entries.push(entry);
    }

    /// Insert an entry at the given priority position
    ///
    /// Positions past the end append.
    pub fn insert(&mut self, index: usize, entry: PatternEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Find the first entry matching the SID, returning its position and label
    pub fn first_match(&self, sid: &str) -> Option<(usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.matches(sid))
            .map(|(index, entry)| (index, entry.label()))
    }

    /// Label of the first matching entry
    pub fn find(&self, sid: &str) -> Option<&str> {
        self.first_match(sid).map(|(_, label)| label)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Entries in priority order
    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    /// Consume the table, yielding its entries in priority order
    pub fn into_entries(self) -> Vec<PatternEntry> {
        self.entries
    }

    /// Labels in priority order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(PatternEntry::label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
