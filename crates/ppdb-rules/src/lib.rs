//! Rule-based filtering of trivial PPDB paraphrases.
//!
//! Portuguese PPDB is full of pairs that only differ by gender/number
//! inflection (`casa`/`casas`, `menino`/`menina`) or by a heading
//! preposition (`de casa`/`casa`). This crate decides which pairs to drop and
//! how to tidy each expression before it is indexed.
//!
//! # How it works
//! 1. [`RuleSet::normalize`] strips leading articles/commas and one trailing
//!    comma from an expression.
//! 2. [`RuleSet::is_trivial`] compares two expressions after dropping
//!    prepositions at either end and crude suffix stripping.
//! 3. [`not_in_vocabulary`] checks every hyphen-separated part of a token
//!    against a caller-provided membership predicate.
//! 4. [`Rejector`] combines the two checks on the last token of each side.
//!
//! The crate is decoupled from any particular vocabulary loader; membership is
//! a closure, typically delegating to `ppdb_db::Vocabulary::contains`.
//!
//! # Example
//! ```
//! use ppdb_rules::{Rejector, RuleSet, Verdict};
//! use ppdb_types::expr;
//!
//! let rules = RuleSet::PORTUGUESE;
//! assert!(rules.is_trivial(&["de", "casa"], &["casa"]));
//!
//! let known = ["casa", "lar"];
//! let rejector = Rejector::new(rules, |word: &str| known.contains(&word));
//! assert_eq!(
//!     rejector.verdict(&expr!["casa"], &expr!["lar"]),
//!     Verdict::Accept
//! );
//! ```

mod classify;
mod normalize;
mod policy;

pub use policy::{Rejector, Verdict, not_in_vocabulary};

/// Static word lists and suffix rules driving normalization and
/// classification.
///
/// Tables are plain slices so another language can supply its own set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RuleSet {
    /// Leading tokens dropped by the normalizer.
    pub articles: &'static [&'static str],
    /// Prepositions dropped from either end before classification.
    pub prepositions: &'static [&'static str],
    /// Two-letter inflection suffixes, checked first.
    pub plural_suffixes: &'static [&'static str],
    /// Final letters dropped when no plural suffix matched.
    pub final_letters: &'static [char],
    /// `(first, second)` final letters tolerated as equal, in that order only.
    pub alternation: (char, char),
}

impl RuleSet {
    pub const PORTUGUESE: RuleSet = RuleSet {
        articles: &["the", "of", "that", "this", "as"],
        prepositions: &["de", "da", "do", "das", "dos", "em", "no", "na", "nos", "nas"],
        plural_suffixes: &["os", "as"],
        final_letters: &['a', 'o', 's'],
        alternation: ('l', 'i'),
    };

    pub fn is_article(&self, token: &str) -> bool {
        self.articles.contains(&token)
    }

    pub fn is_preposition(&self, token: &str) -> bool {
        self.prepositions.contains(&token)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::PORTUGUESE
    }
}

/// [`RuleSet::is_trivial`] with the Portuguese tables.
pub fn is_trivial_paraphrase<A: AsRef<str>, B: AsRef<str>>(exp1: &[A], exp2: &[B]) -> bool {
    RuleSet::PORTUGUESE.is_trivial(exp1, exp2)
}
