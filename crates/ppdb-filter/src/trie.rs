use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ppdb_types::Expression;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// One level of the trie: sources accepted for the path ending here, plus
/// children keyed by the next target token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieNode {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    sources: BTreeSet<Expression>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, TrieNode>,
}

impl TrieNode {
    pub fn sources(&self) -> &BTreeSet<Expression> {
        &self.sources
    }

    pub fn children(&self) -> &BTreeMap<String, TrieNode> {
        &self.children
    }

    pub fn child(&self, token: &str) -> Option<&TrieNode> {
        self.children.get(token)
    }
}

/// Paraphrase rules keyed token-by-token along the target expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformationTrie {
    root: BTreeMap<String, TrieNode>,
}

/// A span of a token sequence that is a known target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    pub start: usize,
    pub end: usize,
    pub sources: &'a BTreeSet<Expression>,
}

#[derive(Debug, Error)]
pub enum TrieError {
    #[error("failed to access trie file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid trie json: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransformationTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source` as a paraphrase of `target`.
    ///
    /// Returns false when the pair was already present or `target` is empty.
    pub fn insert<S: AsRef<str>>(&mut self, target: &[S], source: Expression) -> bool {
        let Some((first, rest)) = target.split_first() else {
            return false;
        };
        let mut node = self.root.entry(first.as_ref().to_string()).or_default();
        for token in rest {
            node = node.children.entry(token.as_ref().to_string()).or_default();
        }
        node.sources.insert(source)
    }

    /// Node at the end of `path`, if every token exists.
    pub fn node<S: AsRef<str>>(&self, path: &[S]) -> Option<&TrieNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(first.as_ref())?;
        for token in rest {
            node = node.children.get(token.as_ref())?;
        }
        Some(node)
    }

    /// Sources accepted for exactly `target`.
    pub fn get<S: AsRef<str>>(&self, target: &[S]) -> Option<&BTreeSet<Expression>> {
        self.node(target)
            .map(|node| &node.sources)
            .filter(|sources| !sources.is_empty())
    }

    /// Longest prefix of `tokens` that is a known target, as `(len, sources)`.
    pub fn longest_match<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Option<(usize, &BTreeSet<Expression>)> {
        self.walk(tokens)
            .enumerate()
            .filter(|(_, node)| !node.sources.is_empty())
            .last()
            .map(|(depth, node)| (depth + 1, &node.sources))
    }

    /// Every span of `tokens` that is a known target, ordered by start then end.
    pub fn find_matches<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Match<'_>> {
        (0..tokens.len())
            .flat_map(|start| {
                self.walk(&tokens[start..])
                    .enumerate()
                    .filter(|(_, node)| !node.sources.is_empty())
                    .map(move |(depth, node)| Match {
                        start,
                        end: start + depth + 1,
                        sources: &node.sources,
                    })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn node_count(&self) -> usize {
        count_nodes(&self.root)
    }

    /// Number of `(target, source)` pairs stored.
    pub fn rule_count(&self) -> usize {
        count_rules(&self.root)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TrieError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        info!("wrote {} rules to {}", self.rule_count(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrieError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let trie: Self = serde_json::from_reader(reader)?;
        info!("read {} rules from {}", trie.rule_count(), path.display());
        Ok(trie)
    }

    fn walk<'a, S: AsRef<str>>(&'a self, tokens: &[S]) -> impl Iterator<Item = &'a TrieNode> {
        let mut level = &self.root;
        tokens.iter().map_while(move |token| {
            let node = level.get(token.as_ref())?;
            level = &node.children;
            Some(node)
        })
    }
}

fn count_nodes(level: &BTreeMap<String, TrieNode>) -> usize {
    level
        .values()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

fn count_rules(level: &BTreeMap<String, TrieNode>) -> usize {
    level
        .values()
        .map(|node| node.sources.len() + count_rules(&node.children))
        .sum()
}
