//! # a3s-sid
//!
//! Classify the SIDs found in process access tokens into human-readable labels.
//!
//! ## Overview
//!
//! `a3s-sid` combines a per-run account directory (RID → account name) with a
//! static knowledge base of well-known SIDs to annotate who or what owns a
//! token, without consulting the live system an image was taken from.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_sid::{AccountDirectory, ClassificationRun, SidClassifier, TokenSid};
//!
//! let directory: AccountDirectory = vec![(1001u32, "alice")].into_iter().collect();
//! let run = ClassificationRun::new(SidClassifier::well_known(), directory);
//!
//! let owners = vec![(
//!     "explorer.exe",
//!     vec![
//!         TokenSid::new("S-1-5-18", 18),
//!         TokenSid::new("S-1-5-21-111-222-1001", 1001),
//!     ],
//! )];
//!
//! for result in run.classify(owners) {
//!     println!("{} {} {}", result.owner, result.sid, result.label);
//! }
//! ```
//!
//! ## Precedence
//!
//! - **Account default**: `"User: <name>"` when the RID is a known account
//! - **Pattern table**: first matching SID family, in table order
//! - **Exact table**: complete SID string; always wins
//!
//! ## Architecture
//!
//! - **KnowledgeBase**: immutable exact + pattern tables, shared via `Arc`
//! - **SidClassifier**: pure precedence logic over a knowledge base
//! - **AccountProvider** / **TokenSource** traits: seams to external extractors
//! - **ClassificationRun**: lazy, order-preserving result stream

pub mod classifier;
pub mod config;
pub mod directory;
pub mod error;
pub mod filter;
pub mod knowledge;
pub mod report;
pub mod run;
pub mod token;
pub mod types;

// Re-export core types
pub use classifier::SidClassifier;
pub use config::{KnowledgeBaseConfig, PatternPlacement, PatternRule, DEFAULT_ACCOUNT_LABEL_PREFIX};
pub use directory::{AccountDirectory, AccountProvider, MemoryAccountProvider};
pub use error::{Result, SidError};
pub use filter::OwnerFilter;
pub use knowledge::{
    ExactMatchTable, KnowledgeBase, PatternEntry, PatternTable, RegexMatcher, SidMatcher,
    SubstringMatcher,
};
pub use report::ReportRow;
pub use run::{ClassificationRun, Classifications, RunSummary};
pub use token::{parse_rid, MemoryTokenSource, OwnerTokens, ProcessRef, TokenOwner, TokenSid, TokenSource};
pub use types::{AccountRecord, Classification, ClassificationResult, MatchSource};
