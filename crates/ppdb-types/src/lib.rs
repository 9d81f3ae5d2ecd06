//! Shared value types for PPDB paraphrase filtering.
//!
//! A PPDB rule pairs two phrases; each phrase is an [`Expression`], an ordered
//! sequence of lowercase tokens. A [`TransformationRecord`] carries one rule as
//! read from the database: the `target` can be paraphrased as the `source`.
//!
//! Nothing here does I/O; loaders and the trie builder share these types.
//! Enable the `serde` feature to persist expressions; an [`Expression`]
//! serializes as a bare list of tokens.
//!
//! ```rust
//! use ppdb_types::{Expression, expr};
//!
//! let e = Expression::from_phrase("The Books ,");
//! assert_eq!(e, expr!["the", "books", ","]);
//! assert_eq!(e.last(), Some(","));
//! assert_eq!(e.to_string(), "the books ,");
//! ```

use std::fmt;

/// Token used by PPDB for a standalone comma.
pub const COMMA: &str = ",";

/// Build an [`Expression`] from string literals.
#[macro_export]
macro_rules! expr {
    [$($token:expr),* $(,)?] => {
        $crate::Expression::new(vec![$(String::from($token)),*])
    };
}

/// Ordered sequence of lowercase tokens forming one side of a rule.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Expression(Vec<String>);

impl Expression {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    /// Split a phrase on whitespace and lowercase every token.
    pub fn from_phrase(phrase: &str) -> Self {
        Self(phrase.split_whitespace().map(str::to_lowercase).collect())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl AsRef<[String]> for Expression {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

impl<'a> FromIterator<&'a str> for Expression {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl FromIterator<String> for Expression {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

/// One PPDB rule: `target` can be paraphrased as `source`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransformationRecord {
    /// Syntactic label from the first PPDB field, e.g. `[NN]`.
    pub label: String,
    pub source: Expression,
    pub target: Expression,
}
