//! Account directory: RID to account name, built once per run
//!
//! Accounts come from an external user-directory provider behind the
//! `AccountProvider` trait. The directory keeps only what the classifier
//! needs: the RID and the account name.

use crate::error::Result;
use crate::types::AccountRecord;
use std::collections::HashMap;

/// Source of local account records (e.g., a SAM hive reader)
pub trait AccountProvider: Send + Sync {
    /// Enumerate all accounts known to the provider
    fn accounts(&self) -> Result<Vec<AccountRecord>>;

    /// Provider name (e.g., "sam", "memory")
    fn name(&self) -> &str;
}

/// In-memory account provider for testing and pre-extracted data
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountProvider {
    records: Vec<AccountRecord>,
}

impl MemoryAccountProvider {
    pub fn new(records: Vec<AccountRecord>) -> Self {
        Self { records }
    }

    /// Add an account
    pub fn with_account(mut self, rid: u32, name: impl Into<String>) -> Self {
        self.records.push(AccountRecord::new(rid, name));
        self
    }
}

impl AccountProvider for MemoryAccountProvider {
    fn accounts(&self) -> Result<Vec<AccountRecord>> {
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Read-only RID → account name mapping for one classification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDirectory {
    names: HashMap<u32, String>,
}

impl AccountDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from account records
    ///
    /// If a RID appears more than once the last record wins.
    pub fn from_records(records: impl IntoIterator<Item = AccountRecord>) -> Self {
        let mut names = HashMap::new();
        for record in records {
            if let Some(previous) = names.insert(record.rid, record.name) {
                tracing::debug!(
                    rid = record.rid,
                    replaced = %previous,
                    "Duplicate RID in account records, keeping last"
                );
            }
        }
        tracing::debug!(accounts = names.len(), "Account directory built");
        Self { names }
    }

    /// Build a directory by enumerating a provider
    pub fn from_provider(provider: &dyn AccountProvider) -> Result<Self> {
        let records = provider.accounts()?;
        tracing::debug!(
            provider = provider.name(),
            records = records.len(),
            "Accounts enumerated"
        );
        Ok(Self::from_records(records))
    }

    /// Account name for a RID
    pub fn get(&self, rid: u32) -> Option<&str> {
        self.names.get(&rid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<AccountRecord> for AccountDirectory {
    fn from_iter<T: IntoIterator<Item = AccountRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

impl<N: Into<String>> FromIterator<(u32, N)> for AccountDirectory {
    fn from_iter<T: IntoIterator<Item = (u32, N)>>(iter: T) -> Self {
        Self::from_records(
            iter.into_iter()
                .map(|(rid, name)| AccountRecord::new(rid, name)),
        )
    }
}
