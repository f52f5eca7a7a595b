//! SID classifier: merges account knowledge with the static tables
//!
//! Precedence, lowest to highest:
//!
//! 1. Account default: `"<prefix><name>"` when the RID is a known account
//! 2. Pattern table: first matching SID family
//! 3. Exact table: complete SID string
//!
//! A table hit replaces the account default outright. Classification never
//! fails; unknown SIDs get an empty or account-derived label.

use crate::config::{KnowledgeBaseConfig, DEFAULT_ACCOUNT_LABEL_PREFIX};
use crate::directory::AccountDirectory;
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::types::{Classification, MatchSource};
use std::sync::Arc;

/// Stateless SID classifier over a shared knowledge base
#[derive(Debug, Clone)]
pub struct SidClassifier {
    knowledge: Arc<KnowledgeBase>,
    account_label_prefix: String,
}

impl SidClassifier {
    /// Create a classifier with the default account label prefix
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            knowledge,
            account_label_prefix: DEFAULT_ACCOUNT_LABEL_PREFIX.to_string(),
        }
    }

    /// Classifier over the built-in well-known tables
    pub fn well_known() -> Self {
        Self::new(Arc::new(KnowledgeBase::well_known()))
    }

    /// Build knowledge base and classifier from configuration
    pub fn from_config(config: &KnowledgeBaseConfig) -> Result<Self> {
        let knowledge = KnowledgeBase::from_config(config)?;
        Ok(Self::new(Arc::new(knowledge)).with_account_label_prefix(&config.account_label_prefix))
    }

    /// Override the prefix used for account-derived labels
    pub fn with_account_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.account_label_prefix = prefix.into();
        self
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn account_label_prefix(&self) -> &str {
        &self.account_label_prefix
    }

    /// Label for one SID
    pub fn classify(&self, sid: &str, rid: Option<u32>, directory: &AccountDirectory) -> String {
        self.classify_detailed(sid, rid, directory).label
    }

    /// Label for one SID together with the step that produced it
    pub fn classify_detailed(
        &self,
        sid: &str,
        rid: Option<u32>,
        directory: &AccountDirectory,
    ) -> Classification {
        let mut classification = match self.account_label(rid, directory) {
            Some(label) => Classification {
                label,
                source: MatchSource::Account,
            },
            None => Classification {
                label: String::new(),
                source: MatchSource::Unmatched,
            },
        };

        if let Some(label) = self.knowledge.exact().lookup(sid) {
            classification = Classification {
                label: label.to_string(),
                source: MatchSource::Exact,
            };
        } else if let Some((index, label)) = self.knowledge.patterns().first_match(sid) {
            classification = Classification {
                label: label.to_string(),
                source: MatchSource::Pattern { index },
            };
        }

        classification
    }

    fn account_label(&self, rid: Option<u32>, directory: &AccountDirectory) -> Option<String> {
        let name = directory.get(rid?)?;
        if name.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.account_label_prefix, name))
    }
}

impl Default for SidClassifier {
    fn default() -> Self {
        Self::well_known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{ExactMatchTable, PatternEntry, PatternTable, SubstringMatcher};

    fn alice_directory() -> AccountDirectory {
        vec![(1001u32, "alice"), (500u32, "root")].into_iter().collect()
    }

    #[test]
    fn test_exact_match_regardless_of_directory() {
        let classifier = SidClassifier::well_known();
        let empty = AccountDirectory::new();
        let dir = alice_directory();

        assert_eq!(classifier.classify("S-1-5-18", Some(18), &empty), "Local System");
        assert_eq!(classifier.classify("S-1-5-18", Some(1001), &dir), "Local System");
        assert_eq!(classifier.classify("S-1-5-18", None, &dir), "Local System");
    }

    #[test]
    fn test_exact_match_replaces_account_default() {
        let classifier = SidClassifier::well_known();
        let dir: AccountDirectory = vec![(544u32, "local-admin")].into_iter().collect();

        let result = classifier.classify_detailed("S-1-5-32-544", Some(544), &dir);
        assert_eq!(result.label, "Administrators");
        assert_eq!(result.source, MatchSource::Exact);
        assert!(!result.label.contains("local-admin"));
    }

    #[test]
    fn test_pattern_match_replaces_account_default() {
        let classifier = SidClassifier::well_known();
        let dir = alice_directory();

        let result = classifier.classify_detailed("S-1-5-21-7-8-9-500", Some(500), &dir);
        assert_eq!(result.label, "Administrator");
        assert_eq!(result.source, MatchSource::Pattern { index: 0 });
    }

    #[test]
    fn test_nth_pattern() {
        let classifier = SidClassifier::well_known();
        let result =
            classifier.classify_detailed("S-1-5-21-4-5-6-513", Some(513), &AccountDirectory::new());
        assert_eq!(result.label, "Domain Users");
        assert_eq!(result.source, MatchSource::Pattern { index: 4 });
    }

    #[test]
    fn test_overlapping_patterns_take_earlier() {
        let mut patterns = PatternTable::new("overlap", 1);
        patterns.push(PatternEntry::new(SubstringMatcher::new("-21-"), "Domain"));
        patterns.push(PatternEntry::new(SubstringMatcher::new("-1001"), "Specific"));
        let kb = KnowledgeBase::new(ExactMatchTable::new(), patterns);
        let classifier = SidClassifier::new(Arc::new(kb));

        let dir = AccountDirectory::new();
        assert_eq!(classifier.classify("S-1-5-21-1-2-3-1001", None, &dir), "Domain");
        assert_eq!(classifier.classify("S-1-5-80-1001", None, &dir), "Specific");
    }

    #[test]
    fn test_account_fallback() {
        let classifier = SidClassifier::well_known();
        let result =
            classifier.classify_detailed("S-1-5-21-111-222-1001", Some(1001), &alice_directory());
        assert_eq!(result.label, "User: alice");
        assert_eq!(result.source, MatchSource::Account);
    }

    #[test]
    fn test_unmatched_is_empty() {
        let classifier = SidClassifier::well_known();
        let result =
            classifier.classify_detailed("S-1-5-21-111-222-1002", Some(1002), &alice_directory());
        assert_eq!(result.label, "");
        assert_eq!(result.source, MatchSource::Unmatched);
    }

    #[test]
    fn test_missing_rid_is_empty() {
        let classifier = SidClassifier::well_known();
        assert_eq!(
            classifier.classify("S-1-5-21-111-222-1001", None, &alice_directory()),
            ""
        );
    }

    #[test]
    fn test_empty_account_name_gives_no_default() {
        let classifier = SidClassifier::well_known();
        let dir: AccountDirectory = vec![(1003u32, "")].into_iter().collect();
        assert_eq!(classifier.classify("S-1-5-21-1-2-3-1003", Some(1003), &dir), "");
    }

    #[test]
    fn test_malformed_input_never_fails() {
        let classifier = SidClassifier::well_known();
        let dir = alice_directory();
        assert_eq!(classifier.classify("", None, &dir), "");
        assert_eq!(classifier.classify("not-a-sid", Some(7), &dir), "");
        assert_eq!(classifier.classify("S-1-", Some(1001), &dir), "User: alice");
    }

    #[test]
    fn test_idempotent() {
        let classifier = SidClassifier::well_known();
        let dir = alice_directory();
        for sid in ["S-1-5-18", "S-1-5-21-4-5-6-513", "S-1-5-21-111-222-1001", ""] {
            let first = classifier.classify_detailed(sid, Some(1001), &dir);
            let second = classifier.classify_detailed(sid, Some(1001), &dir);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_custom_prefix() {
        let classifier = SidClassifier::well_known().with_account_label_prefix("Account: ");
        assert_eq!(classifier.account_label_prefix(), "Account: ");
        assert_eq!(
            classifier.classify("S-1-5-21-111-222-1001", Some(1001), &alice_directory()),
            "Account: alice"
        );
    }

    #[test]
    fn test_from_config() {
        let config = KnowledgeBaseConfig::from_json_str(
            r#"{"accountLabelPrefix": "Acct ", "exact": {"S-1-5-21-1-2-3-1105": "svc_backup"}}"#,
        )
        .unwrap();
        let classifier = SidClassifier::from_config(&config).unwrap();
        let dir = alice_directory();
        assert_eq!(classifier.classify("S-1-5-21-1-2-3-1105", Some(1105), &dir), "svc_backup");
        assert_eq!(classifier.classify("S-1-5-21-9-9-9-1001", Some(1001), &dir), "Acct alice");
        assert_eq!(classifier.classify("S-1-5-18", None, &dir), "Local System");
    }

    #[test]
    fn test_shared_across_threads() {
        let classifier = SidClassifier::well_known();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let classifier = classifier.clone();
                std::thread::spawn(move || {
                    let dir: AccountDirectory =
                        vec![(1000u32 + i, format!("user{}", i))].into_iter().collect();
                    classifier.classify("S-1-5-21-1-2-3-9999", Some(1000 + i), &dir)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("User: user{}", i));
        }
    }
}
