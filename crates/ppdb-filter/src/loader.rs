use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use ppdb_db::{LoadMode, PpdbFile, Vocabulary};
use ppdb_rules::{Rejector, RuleSet, Verdict};
use ppdb_types::TransformationRecord;
use tracing::{debug, info};

use crate::trie::TransformationTrie;

/// Counters gathered while building a trie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub records: usize,
    pub trivial: usize,
    pub out_of_vocabulary: usize,
    /// Accepted pairs with a side that normalized to nothing.
    pub empty: usize,
    pub inserted: usize,
    pub duplicates: usize,
}

impl LoadStats {
    pub fn rejected(&self) -> usize {
        self.trivial + self.out_of_vocabulary
    }
}

/// Build a trie from records that cannot fail.
pub fn build_trie<I, F>(records: I, rejector: &Rejector<F>) -> (TransformationTrie, LoadStats)
where
    I: IntoIterator<Item = TransformationRecord>,
    F: Fn(&str) -> bool,
{
    match try_build_trie(records.into_iter().map(Ok::<_, Infallible>), rejector) {
        Ok(built) => built,
        Err(never) => match never {},
    }
}

/// Build a trie from a fallible record stream, stopping at the first error.
///
/// The rejection policy sees each record as read; only surviving pairs are
/// normalized and inserted under their target tokens.
pub fn try_build_trie<I, E, F>(
    records: I,
    rejector: &Rejector<F>,
) -> Result<(TransformationTrie, LoadStats), E>
where
    I: IntoIterator<Item = Result<TransformationRecord, E>>,
    F: Fn(&str) -> bool,
{
    let rules = rejector.rules();
    let mut trie = TransformationTrie::new();
    let mut stats = LoadStats::default();

    for record in records {
        let record = record?;
        stats.records += 1;

        match rejector.verdict(&record.source, &record.target) {
            Verdict::Accept => {}
            Verdict::Trivial => {
                stats.trivial += 1;
                continue;
            }
            Verdict::OutOfVocabulary => {
                stats.out_of_vocabulary += 1;
                continue;
            }
        }

        let source = rules.normalize(&record.source);
        let target = rules.normalize(&record.target);
        if source.is_empty() || target.is_empty() {
            debug!(
                "dropping '{}' -> '{}': empty after normalization",
                record.target, record.source
            );
            stats.empty += 1;
            continue;
        }

        if trie.insert(target.tokens(), source) {
            stats.inserted += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    Ok((trie, stats))
}

/// Holds the most recently built trie so repeated loads can be skipped.
#[derive(Debug, Default)]
pub struct ParaphraseStore {
    trie: Option<Arc<TransformationTrie>>,
}

impl ParaphraseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.trie.is_some()
    }

    pub fn trie(&self) -> Option<Arc<TransformationTrie>> {
        self.trie.clone()
    }

    /// Return the cached trie, or run `build` when empty or `force` is set.
    pub fn load_with<B>(&mut self, force: bool, build: B) -> Result<Arc<TransformationTrie>>
    where
        B: FnOnce() -> Result<TransformationTrie>,
    {
        if !force && let Some(trie) = &self.trie {
            debug!("trie already loaded; reusing {} rules", trie.rule_count());
            return Ok(Arc::clone(trie));
        }
        let trie = Arc::new(build()?);
        self.trie = Some(Arc::clone(&trie));
        Ok(trie)
    }

    /// Filter a PPDB file against `vocabulary` and cache the resulting trie.
    pub fn load_ppdb(
        &mut self,
        path: impl AsRef<Path>,
        vocabulary: &Vocabulary,
        mode: LoadMode,
        force: bool,
    ) -> Result<Arc<TransformationTrie>> {
        let path = path.as_ref();
        self.load_with(force, || {
            let start = Instant::now();
            let ppdb = PpdbFile::open_with_mode(path, mode)?;
            let rejector = Rejector::new(RuleSet::PORTUGUESE, |word: &str| {
                vocabulary.contains(word)
            });
            let (trie, stats) = try_build_trie(ppdb.records(), &rejector)
                .with_context(|| format!("building trie from {}", path.display()))?;
            info!(
                "read {} records from {}: {} trivial, {} out of vocabulary, {} empty, {} duplicates",
                stats.records,
                path.display(),
                stats.trivial,
                stats.out_of_vocabulary,
                stats.empty,
                stats.duplicates
            );
            info!(
                "trie built in {} ms: {} rules, {} nodes",
                start.elapsed().as_millis(),
                stats.inserted,
                trie.node_count()
            );
            Ok(trie)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppdb_types::{Expression, expr};

    fn record(source: &str, target: &str) -> TransformationRecord {
        TransformationRecord {
            label: "[X]".to_string(),
            source: Expression::from_phrase(source),
            target: Expression::from_phrase(target),
        }
    }

    fn accept_all() -> Rejector<impl Fn(&str) -> bool> {
        Rejector::new(RuleSet::PORTUGUESE, |_: &str| true)
    }

    #[test]
    fn inserts_accepted_pair_under_target_path() {
        let (trie, stats) = build_trie([record("grande", "big")], &accept_all());
        let sources = trie.get(&["big"]).expect("big indexed");
        assert!(sources.contains(&expr!["grande"]));
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.rejected(), 0);
    }

    #[test]
    fn normalizes_both_sides_before_insert() {
        let (trie, _) = build_trie(
            [record("the poder legislativo", "this legislatura")],
            &accept_all(),
        );
        let sources = trie.get(&["legislatura"]).expect("normalized target");
        assert!(sources.contains(&expr!["poder", "legislativo"]));
    }

    #[test]
    fn policy_sees_unnormalized_last_tokens() {
        // The trailing comma is what the policy compares: a lone comma on
        // both sides is trivial, so the pair never reaches normalization.
        let (trie, stats) = build_trie([record("casa ,", "lar ,")], &accept_all());
        assert!(trie.is_empty());
        assert_eq!(stats.trivial, 1);
    }

    #[test]
    fn counts_each_rejection_reason() {
        let rejector = Rejector::new(RuleSet::PORTUGUESE, |word: &str| {
            ["casa", "casas", "lar", "moradia"].contains(&word)
        });
        let (trie, stats) = build_trie(
            [
                record("casa", "casas"),
                record("casa", "vivenda"),
                record("lar", "moradia"),
                record("lar", "moradia"),
            ],
            &rejector,
        );
        assert_eq!(stats.records, 4);
        assert_eq!(stats.trivial, 1);
        assert_eq!(stats.out_of_vocabulary, 1);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(trie.rule_count(), 1);
    }

    #[test]
    fn drops_pairs_that_normalize_to_nothing() {
        let (trie, stats) = build_trie([record("casa", "of the")], &accept_all());
        assert!(trie.is_empty());
        assert_eq!(stats.empty, 1);
    }

    #[test]
    fn stops_at_first_reader_error() {
        let records: Vec<Result<TransformationRecord, String>> = vec![
            Ok(record("grande", "big")),
            Err("line 2: malformed".to_string()),
            Ok(record("pequeno", "small")),
        ];
        let err = try_build_trie(records, &accept_all()).unwrap_err();
        assert_eq!(err, "line 2: malformed");
    }

    #[test]
    fn store_reuses_trie_unless_forced() {
        let mut store = ParaphraseStore::new();
        assert!(!store.is_loaded());

        let first = store
            .load_with(false, || Ok(build_trie([record("grande", "big")], &accept_all()).0))
            .unwrap();
        let reused = store
            .load_with(false, || panic!("must not rebuild"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &reused));

        let rebuilt = store
            .load_with(true, || Ok(TransformationTrie::new()))
            .unwrap();
        assert!(rebuilt.is_empty());
        assert!(store.trie().unwrap().is_empty());
    }

    #[test]
    fn failed_build_keeps_previous_trie() {
        let mut store = ParaphraseStore::new();
        store
            .load_with(false, || Ok(build_trie([record("grande", "big")], &accept_all()).0))
            .unwrap();
        assert!(store.load_with(true, || anyhow::bail!("boom")).is_err());
        assert!(store.trie().unwrap().get(&["big"]).is_some());
    }
}
