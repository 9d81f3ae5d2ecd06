use crate::RuleSet;

/// Hyphen separating compound parts, as in `well-known`.
const COMPOUND_SEPARATOR: char = '-';

/// Return true if any hyphen-separated part of either token is unknown.
///
/// `contains` typically delegates to `ppdb_db::Vocabulary::contains`.
pub fn not_in_vocabulary<F>(token1: &str, token2: &str, contains: F) -> bool
where
    F: Fn(&str) -> bool,
{
    [token1, token2]
        .into_iter()
        .any(|token| token.split(COMPOUND_SEPARATOR).any(|part| !contains(part)))
}

/// Why a pair was kept or dropped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Verdict {
    Accept,
    /// The pair differs only by inflection or a preposition.
    Trivial,
    /// Some part of a token is missing from the vocabulary.
    OutOfVocabulary,
}

impl Verdict {
    pub fn is_rejected(self) -> bool {
        !matches!(self, Verdict::Accept)
    }
}

/// Combines the triviality and vocabulary checks; a pair is dropped when
/// either one fires.
///
/// Only the last token of each side is consulted.
pub struct Rejector<F> {
    rules: RuleSet,
    contains: F,
}

impl<F> Rejector<F>
where
    F: Fn(&str) -> bool,
{
    pub fn new(rules: RuleSet, contains: F) -> Self {
        Self { rules, contains }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify a `(source, target)` pair; empty sides are trivial.
    pub fn verdict<A, B>(&self, source: &A, target: &B) -> Verdict
    where
        A: AsRef<[String]> + ?Sized,
        B: AsRef<[String]> + ?Sized,
    {
        let (Some(last1), Some(last2)) = (source.as_ref().last(), target.as_ref().last()) else {
            return Verdict::Trivial;
        };

        if self.rules.is_trivial(&[last1], &[last2]) {
            Verdict::Trivial
        } else if not_in_vocabulary(last1, last2, &self.contains) {
            Verdict::OutOfVocabulary
        } else {
            Verdict::Accept
        }
    }

    pub fn reject<A, B>(&self, source: &A, target: &B) -> bool
    where
        A: AsRef<[String]> + ?Sized,
        B: AsRef<[String]> + ?Sized,
    {
        self.verdict(source, target).is_rejected()
    }
}
