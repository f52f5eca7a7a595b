//! Classification run: one account directory, many token owners
//!
//! A run pairs a classifier with the account directory built for it and
//! turns a stream of (owner, token SIDs) into a lazy stream of results.
//! Nothing is cached: iterating again means asking the token source again.

use crate::classifier::SidClassifier;
use crate::directory::{AccountDirectory, AccountProvider};
use crate::error::Result;
use crate::filter::OwnerFilter;
use crate::token::{TokenOwner, TokenSid, TokenSource};
use crate::types::{ClassificationResult, MatchSource};
use serde::{Deserialize, Serialize};

/// Per-run counters, updated as results are produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Identifier of the run (run-<uuid>)
    pub run_id: String,

    /// Owners pulled from the token source
    pub owners: u64,

    /// SIDs classified
    pub sids: u64,

    /// Labels from the exact-match table
    pub exact: u64,

    /// Labels from the pattern table
    pub pattern: u64,

    /// Labels from the account directory
    pub account: u64,

    /// SIDs left unlabelled
    pub unmatched: u64,
}

impl RunSummary {
    fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, source: MatchSource) {
        self.sids += 1;
        match source {
            MatchSource::Exact => self.exact += 1,
            MatchSource::Pattern { .. } => self.pattern += 1,
            MatchSource::Account => self.account += 1,
            MatchSource::Unmatched => self.unmatched += 1,
        }
    }

    /// SIDs that received a non-empty label
    pub fn labelled(&self) -> u64 {
        self.sids - self.unmatched
    }
}

/// A classifier bound to the account directory of one run
#[derive(Debug)]
pub struct ClassificationRun {
    id: String,
    classifier: SidClassifier,
    directory: AccountDirectory,
}

impl ClassificationRun {
    /// Start a run with a prepared directory
    pub fn new(classifier: SidClassifier, directory: AccountDirectory) -> Self {
        let id = format!("run-{}", uuid::Uuid::new_v4());
        tracing::info!(
            run_id = %id,
            accounts = directory.len(),
            exact = classifier.knowledge().exact().len(),
            patterns = classifier.knowledge().patterns().len(),
            pattern_table = %classifier.knowledge().patterns().name(),
            pattern_version = classifier.knowledge().patterns().version(),
            "Classification run started"
        );
        Self {
            id,
            classifier,
            directory,
        }
    }

    /// Start a run, enumerating accounts from a provider
    pub fn from_provider(
        classifier: SidClassifier,
        provider: &dyn AccountProvider,
    ) -> Result<Self> {
        let directory = AccountDirectory::from_provider(provider)?;
        Ok(Self::new(classifier, directory))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn classifier(&self) -> &SidClassifier {
        &self.classifier
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    /// Classify every (owner, SID) pair, lazily and in input order
    pub fn classify<I, E, S>(&self, owners: I) -> Classifications<'_, I::IntoIter, E, S>
    where
        I: IntoIterator<Item = (E, S)>,
        E: Clone,
        S: IntoIterator<Item = TokenSid>,
    {
        Classifications {
            run: self,
            owners: owners.into_iter(),
            current: None,
            summary: RunSummary::new(&self.id),
            finished: false,
        }
    }

    /// Like [`classify`](Self::classify), skipping owners the filter rejects
    pub fn classify_filtered<'a, I, E, S>(
        &'a self,
        owners: I,
        filter: &'a OwnerFilter,
    ) -> Classifications<'a, impl Iterator<Item = (E, S)> + 'a, E, S>
    where
        I: IntoIterator<Item = (E, S)>,
        I::IntoIter: 'a,
        E: Clone + TokenOwner + 'a,
        S: IntoIterator<Item = TokenSid> + 'a,
    {
        let owners = owners
            .into_iter()
            .filter(move |(owner, _)| filter.matches(owner));
        self.classify(owners)
    }

    /// Classify everything a token source yields
    pub fn run_source<'a, T>(
        &'a self,
        source: &'a T,
    ) -> Result<
        Classifications<'a, impl Iterator<Item = (T::Owner, Vec<TokenSid>)> + 'a, T::Owner, Vec<TokenSid>>,
    >
    where
        T: TokenSource,
        T::Owner: 'a,
    {
        tracing::debug!(run_id = %self.id, source = source.name(), "Reading token source");
        let owners = source.tokens()?.map(|tokens| (tokens.owner, tokens.sids));
        Ok(self.classify(owners))
    }
}

/// Lazy stream of classification results for one run
pub struct Classifications<'a, O, E, S>
where
    O: Iterator<Item = (E, S)>,
    S: IntoIterator<Item = TokenSid>,
{
    run: &'a ClassificationRun,
    owners: O,
    current: Option<(E, S::IntoIter)>,
    summary: RunSummary,
    finished: bool,
}

impl<'a, O, E, S> Classifications<'a, O, E, S>
where
    O: Iterator<Item = (E, S)>,
    S: IntoIterator<Item = TokenSid>,
{
    /// Counters for the results produced so far
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

impl<'a, O, E, S> Iterator for Classifications<'a, O, E, S>
where
    O: Iterator<Item = (E, S)>,
    E: Clone,
    S: IntoIterator<Item = TokenSid>,
{
    type Item = ClassificationResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((owner, sids)) = &mut self.current {
                if let Some(token) = sids.next() {
                    let classification = self.run.classifier.classify_detailed(
                        &token.sid,
                        token.rid,
                        &self.run.directory,
                    );
                    self.summary.record(classification.source);
                    return Some(ClassificationResult {
                        owner: owner.clone(),
                        sid: token.sid,
                        label: classification.label,
                        source: classification.source,
                    });
                }
                self.current = None;
            }

            match self.owners.next() {
                Some((owner, sids)) => {
                    self.summary.owners += 1;
                    self.current = Some((owner, sids.into_iter()));
                }
                None => {
                    if !self.finished {
                        self.finished = true;
                        tracing::info!(
                            run_id = %self.summary.run_id,
                            owners = self.summary.owners,
                            sids = self.summary.sids,
                            exact = self.summary.exact,
                            pattern = self.summary.pattern,
                            account = self.summary.account,
                            unmatched = self.summary.unmatched,
                            "Classification run completed"
                        );
                    }
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryAccountProvider;
    use crate::token::{MemoryTokenSource, ProcessRef};

    fn alice_run() -> ClassificationRun {
        let directory: AccountDirectory = vec![(1001u32, "alice")].into_iter().collect();
        ClassificationRun::new(SidClassifier::well_known(), directory)
    }

    #[test]
    fn test_run_id_format() {
        let run = alice_run();
        assert!(run.id().starts_with("run-"));
        assert_ne!(run.id(), alice_run().id());
    }

    #[test]
    fn test_classify_preserves_order() {
        let run = alice_run();
        let owners = vec![
            (
                "A",
                vec![
                    TokenSid::new("S-1-5-18", 18),
                    TokenSid::new("S-1-5-21-111-222-1001", 1001),
                ],
            ),
            ("B", vec![TokenSid::new("S-1-5-32-544", 544)]),
        ];

        let results: Vec<_> = run.classify(owners).collect();
        let triples: Vec<(&str, &str, &str)> = results
            .iter()
            .map(|r| (r.owner, r.sid.as_str(), r.label.as_str()))
            .collect();
        assert_eq!(
            triples,
            vec![
                ("A", "S-1-5-18", "Local System"),
                ("A", "S-1-5-21-111-222-1001", "User: alice"),
                ("B", "S-1-5-32-544", "Administrators"),
            ]
        );
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        let run = ClassificationRun::new(SidClassifier::well_known(), AccountDirectory::new());
        let owners: Vec<(&str, Vec<TokenSid>)> = vec![];
        assert_eq!(run.classify(owners).count(), 0);

        let no_sids = vec![("A", Vec::<TokenSid>::new()), ("B", Vec::new())];
        let mut results = run.classify(no_sids);
        assert!(results.next().is_none());
        assert_eq!(results.summary().owners, 2);
        assert_eq!(results.summary().sids, 0);
    }

    #[test]
    fn test_results_are_lazy() {
        let run = alice_run();
        let mut pulled = 0;
        let owners = (0..1_000_000u32).map(|i| {
            pulled += 1;
            (i, vec![TokenSid::new("S-1-5-18", 18)])
        });

        let first: Vec<_> = run.classify(owners).take(3).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_summary_counts() {
        let run = alice_run();
        let owners = vec![(
            "A",
            vec![
                TokenSid::new("S-1-5-18", 18),
                TokenSid::new("S-1-5-21-4-5-6-513", 513),
                TokenSid::new("S-1-5-21-111-222-1001", 1001),
                TokenSid::new("S-1-5-21-111-222-1002", 1002),
            ],
        )];

        let mut results = run.classify(owners);
        let sources: Vec<MatchSource> = results.by_ref().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![
                MatchSource::Exact,
                MatchSource::Pattern { index: 4 },
                MatchSource::Account,
                MatchSource::Unmatched,
            ]
        );

        let summary = results.summary();
        assert_eq!(summary.run_id, run.id());
        assert_eq!(summary.owners, 1);
        assert_eq!(summary.sids, 4);
        assert_eq!(summary.exact, 1);
        assert_eq!(summary.pattern, 1);
        assert_eq!(summary.account, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.labelled(), 3);
    }

    #[test]
    fn test_classify_filtered() {
        let run = alice_run();
        let filter = OwnerFilter::new().with_pids([640]);
        let owners = vec![
            (ProcessRef::new(4, "System"), vec![TokenSid::new("S-1-5-18", 18)]),
            (
                ProcessRef::new(640, "lsass.exe"),
                vec![TokenSid::new("S-1-5-18", 18), TokenSid::new("S-1-1-0", 0)],
            ),
        ];

        let results: Vec<_> = run.classify_filtered(owners, &filter).collect();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.owner.pid == 640));
        assert_eq!(results[1].label, "Everyone");
    }

    #[test]
    fn test_run_source_and_provider() {
        let accounts = MemoryAccountProvider::default().with_account(1001, "alice");
        let run = ClassificationRun::from_provider(SidClassifier::well_known(), &accounts).unwrap();
        assert_eq!(run.directory().get(1001), Some("alice"));

        let source = MemoryTokenSource::default().with_owner(
            ProcessRef::new(2112, "explorer.exe"),
            vec![TokenSid::from_sid_string("S-1-5-21-111-222-1001")],
        );

        let results: Vec<_> = run.run_source(&source).unwrap().collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].owner.name, "explorer.exe");
        assert_eq!(results[0].label, "User: alice");

        // Re-issuing the upstream iteration restarts the sequence
        let again: Vec<_> = run.run_source(&source).unwrap().collect();
        assert_eq!(again, results);
    }
}
