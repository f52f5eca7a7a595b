//! Owner filter: restrict a run to selected processes
//!
//! An empty filter admits every owner. With both pids and a name pattern
//! set, an owner must satisfy both.

use crate::error::{Result, SidError};
use crate::token::TokenOwner;
use regex::{Regex, RegexBuilder};

/// Selection of token owners by pid and image name
#[derive(Debug, Clone, Default)]
pub struct OwnerFilter {
    pids: Vec<u32>,
    name_pattern: Option<Regex>,
}

impl OwnerFilter {
    /// Filter that admits every owner
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given process ids
    pub fn with_pids(mut self, pids: impl IntoIterator<Item = u32>) -> Self {
        self.pids.extend(pids);
        self
    }

    /// Restrict to image names matching a case-insensitive regex
    pub fn with_name_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SidError::InvalidPattern {
                label: "process name filter".to_string(),
                reason: e.to_string(),
            })?;
        self.name_pattern = Some(regex);
        Ok(self)
    }

    /// Whether the filter admits everything
    pub fn is_empty(&self) -> bool {
        self.pids.is_empty() && self.name_pattern.is_none()
    }

    /// Check an owner against the filter
    pub fn matches<E: TokenOwner + ?Sized>(&self, owner: &E) -> bool {
        if !self.pids.is_empty() && !self.pids.contains(&owner.pid()) {
            return false;
        }
        match &self.name_pattern {
            Some(regex) => regex.is_match(owner.image_name()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ProcessRef;

    #[test]
    fn test_empty_filter_admits_all() {
        let filter = OwnerFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&ProcessRef::new(4, "System")));
    }

    #[test]
    fn test_pid_filter() {
        let filter = OwnerFilter::new().with_pids([4, 640]);
        assert!(!filter.is_empty());
        assert!(filter.matches(&ProcessRef::new(640, "lsass.exe")));
        assert!(!filter.matches(&ProcessRef::new(1200, "svchost.exe")));
    }

    #[test]
    fn test_name_filter_case_insensitive() {
        let filter = OwnerFilter::new().with_name_pattern("^LSASS").unwrap();
        assert!(filter.matches(&ProcessRef::new(640, "lsass.exe")));
        assert!(!filter.matches(&ProcessRef::new(1200, "svchost.exe")));
    }

    #[test]
    fn test_combined_filter_requires_both() {
        let filter = OwnerFilter::new()
            .with_pids([640])
            .with_name_pattern("svchost")
            .unwrap();
        assert!(!filter.matches(&ProcessRef::new(640, "lsass.exe")));
        assert!(!filter.matches(&ProcessRef::new(1200, "svchost.exe")));
        assert!(filter.matches(&ProcessRef::new(640, "svchost.exe")));
    }

    #[test]
    fn test_invalid_name_pattern() {
        let err = OwnerFilter::new().with_name_pattern("(").unwrap_err();
        assert!(err.to_string().contains("process name filter"));
    }
}
