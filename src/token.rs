//! Token source seam: owners and the SIDs found in their access tokens
//!
//! Walking token structures in a memory image belongs to an external
//! enumerator. It hands over, per owner, the principal and group SIDs as
//! strings with the RID already extracted.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One SID entry from an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSid {
    /// SID string exactly as extracted (e.g., "S-1-5-18")
    pub sid: String,

    /// Final sub-authority of the SID, when the extractor could read it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<u32>,
}

impl TokenSid {
    /// Create an entry with an explicit RID
    pub fn new(sid: impl Into<String>, rid: u32) -> Self {
        Self {
            sid: sid.into(),
            rid: Some(rid),
        }
    }

    /// Create an entry whose RID is derived from the SID string
    ///
    /// The RID stays `None` when the string has no numeric sub-authority.
    pub fn from_sid_string(sid: impl Into<String>) -> Self {
        let sid = sid.into();
        let rid = parse_rid(&sid);
        Self { sid, rid }
    }
}

/// Extract the RID (last sub-authority) from a textual `S-1-...` SID
///
/// Needs at least one sub-authority after the identifier authority.
pub fn parse_rid(sid: &str) -> Option<u32> {
    let mut parts = sid.split('-');
    if !parts.next()?.eq_ignore_ascii_case("s") {
        return None;
    }
    let _revision: u8 = parts.next()?.parse().ok()?;
    let _authority: u64 = parts.next()?.parse().ok()?;

    let mut rid = None;
    for part in parts {
        rid = Some(part.parse::<u32>().ok()?);
    }
    rid
}

/// Entity that owns an access token (usually a process)
pub trait TokenOwner {
    /// Process identifier
    fn pid(&self) -> u32;

    /// Image name (e.g., "lsass.exe")
    fn image_name(&self) -> &str;
}

/// Lightweight process reference used as the default token owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRef {
    pub pid: u32,
    pub name: String,
}

impl ProcessRef {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

impl TokenOwner for ProcessRef {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn image_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ProcessRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.pid)
    }
}

/// An owner together with its token's principal and group SIDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTokens<E> {
    pub owner: E,
    pub sids: Vec<TokenSid>,
}

impl<E> OwnerTokens<E> {
    pub fn new(owner: E, sids: Vec<TokenSid>) -> Self {
        Self { owner, sids }
    }
}

impl<E> From<OwnerTokens<E>> for (E, Vec<TokenSid>) {
    fn from(tokens: OwnerTokens<E>) -> Self {
        (tokens.owner, tokens.sids)
    }
}

/// External token enumerator
///
/// Owners are yielded lazily in the enumerator's own order. Failures to
/// read the image are the enumerator's to report.
pub trait TokenSource {
    type Owner: Clone;

    /// Iterate owners and their token SIDs
    fn tokens(&self) -> Result<Box<dyn Iterator<Item = OwnerTokens<Self::Owner>> + '_>>;

    /// Source name (e.g., "memory", "image")
    fn name(&self) -> &str;
}

/// In-memory token source for testing and pre-extracted data
#[derive(Debug, Clone)]
pub struct MemoryTokenSource<E = ProcessRef> {
    owners: Vec<OwnerTokens<E>>,
}

impl<E> Default for MemoryTokenSource<E> {
    fn default() -> Self {
        Self { owners: Vec::new() }
    }
}

impl<E: Clone> MemoryTokenSource<E> {
    pub fn new(owners: Vec<OwnerTokens<E>>) -> Self {
        Self { owners }
    }

    /// Add an owner with its token SIDs
    pub fn with_owner(mut self, owner: E, sids: Vec<TokenSid>) -> Self {
        self.owners.push(OwnerTokens::new(owner, sids));
        self
    }
}

impl<E: Clone> TokenSource for MemoryTokenSource<E> {
    type Owner = E;

    fn tokens(&self) -> Result<Box<dyn Iterator<Item = OwnerTokens<E>> + '_>> {
        Ok(Box::new(self.owners.iter().cloned()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
