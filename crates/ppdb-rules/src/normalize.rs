use ppdb_types::{COMMA, Expression};

use crate::RuleSet;

impl RuleSet {
    /// Strip leading articles/commas and a single trailing comma.
    ///
    /// Single-token input is returned as-is. When the leading strip consumes
    /// everything, the empty slice is returned without looking for a trailing
    /// comma.
    pub fn strip_articles_and_commas<'a, S: AsRef<str>>(&self, tokens: &'a [S]) -> &'a [S] {
        if tokens.len() <= 1 {
            return tokens;
        }

        let mut rest = tokens;
        while let Some((first, tail)) = rest.split_first() {
            let first = first.as_ref();
            if !(self.is_article(first) || first == COMMA) {
                break;
            }
            rest = tail;
            if rest.is_empty() {
                return rest;
            }
        }

        match rest.split_last() {
            Some((last, init)) if last.as_ref() == COMMA => init,
            _ => rest,
        }
    }

    /// Owned form of [`RuleSet::strip_articles_and_commas`].
    pub fn normalize(&self, expression: &Expression) -> Expression {
        self.strip_articles_and_commas(expression.tokens())
            .iter()
            .map(String::as_str)
            .collect()
    }
}
