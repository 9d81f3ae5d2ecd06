use ppdb_types::COMMA;

use crate::RuleSet;

impl RuleSet {
    /// Decide whether two expressions differ only by inflection or by a
    /// preposition at either end.
    ///
    /// The steps run in a fixed order and several short-circuit:
    /// 1. drop a leading preposition from each side;
    /// 2. either side empty: trivial;
    /// 3. drop a trailing preposition from each side;
    /// 4. different lengths: not trivial;
    /// 5. either side is a lone comma: trivial;
    /// 6. otherwise every position must match after [`RuleSet::strip_suffix`].
    pub fn is_trivial<A: AsRef<str>, B: AsRef<str>>(&self, exp1: &[A], exp2: &[B]) -> bool {
        let exp1 = self.drop_leading_preposition(exp1);
        let exp2 = self.drop_leading_preposition(exp2);
        if exp1.is_empty() || exp2.is_empty() {
            return true;
        }

        let exp1 = self.drop_trailing_preposition(exp1);
        let exp2 = self.drop_trailing_preposition(exp2);
        if exp1.len() != exp2.len() {
            return false;
        }

        if is_lone_comma(exp1) || is_lone_comma(exp2) {
            return true;
        }

        exp1.iter()
            .zip(exp2)
            .all(|(w1, w2)| self.same_stem(w1.as_ref(), w2.as_ref()))
    }

    /// Crude gender/number stripping: `os`/`as` first, then one final letter.
    pub fn strip_suffix<'a>(&self, word: &'a str) -> &'a str {
        for suffix in self.plural_suffixes {
            if let Some(stem) = word.strip_suffix(suffix) {
                return stem;
            }
        }
        match word.chars().next_back() {
            Some(last) if self.final_letters.contains(&last) => {
                &word[..word.len() - last.len_utf8()]
            }
            _ => word,
        }
    }

    fn same_stem(&self, w1: &str, w2: &str) -> bool {
        let w1 = self.strip_suffix(w1);
        let w2 = self.strip_suffix(w2);
        match (w1.is_empty(), w2.is_empty()) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => w1 == w2 || self.alternates(w1, w2),
        }
    }

    // Directional: only `w1` ending in the first letter and `w2` in the second.
    fn alternates(&self, w1: &str, w2: &str) -> bool {
        let (from, to) = self.alternation;
        matches!(
            (w1.strip_suffix(from), w2.strip_suffix(to)),
            (Some(a), Some(b)) if a == b
        )
    }

    fn drop_leading_preposition<'a, S: AsRef<str>>(&self, exp: &'a [S]) -> &'a [S] {
        match exp.split_first() {
            Some((first, rest)) if self.is_preposition(first.as_ref()) => rest,
            _ => exp,
        }
    }

    fn drop_trailing_preposition<'a, S: AsRef<str>>(&self, exp: &'a [S]) -> &'a [S] {
        match exp.split_last() {
            Some((last, init)) if self.is_preposition(last.as_ref()) => init,
            _ => exp,
        }
    }
}

fn is_lone_comma<S: AsRef<str>>(exp: &[S]) -> bool {
    matches!(exp, [only] if only.as_ref() == COMMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_trivial_paraphrase;

    const RULES: RuleSet = RuleSet::PORTUGUESE;

    #[test]
    fn plural_suffix_is_trivial() {
        assert!(is_trivial_paraphrase(&["the", "books"], &["the", "book"]));
        assert!(is_trivial_paraphrase(&["casas"], &["casa"]));
        assert!(is_trivial_paraphrase(&["meninos"], &["menina"]));
    }

    #[test]
    fn heading_preposition_is_trivial() {
        assert!(is_trivial_paraphrase(&["de", "casa"], &["casa"]));
        assert!(is_trivial_paraphrase(&["casa"], &["nas", "casas"]));
    }

    #[test]
    fn trailing_preposition_is_dropped() {
        assert!(is_trivial_paraphrase(&["perto", "de"], &["perto"]));
        assert!(!is_trivial_paraphrase(&["perto", "de"], &["longe"]));
    }

    #[test]
    fn empty_after_leading_strip_is_trivial() {
        assert!(is_trivial_paraphrase(&["de"], &["casa", "grande"]));
        assert!(is_trivial_paraphrase(&["casa"], &["em"]));
    }

    #[test]
    fn empty_after_trailing_strip_compares_lengths() {
        assert!(!is_trivial_paraphrase(&["de", "do"], &["casa"]));
        assert!(is_trivial_paraphrase(&["de", "do"], &["em", "no"]));
    }

    #[test]
    fn length_check_precedes_comma_check() {
        assert!(is_trivial_paraphrase(&[","], &["x"]));
        assert!(is_trivial_paraphrase(&["x"], &[","]));
        assert!(!is_trivial_paraphrase(&[","], &["x", "y"]));
    }

    #[test]
    fn asymmetric_empty_stem_is_not_trivial() {
        // "a" strips to nothing while "x" keeps a stem.
        assert!(!is_trivial_paraphrase(&["a"], &["x"]));
        assert!(is_trivial_paraphrase(&["os"], &["as"]));
        assert!(is_trivial_paraphrase(&["o"], &["s"]));
    }

    #[test]
    fn l_i_alternation_is_directional() {
        assert!(is_trivial_paraphrase(&["mil"], &["mii"]));
        assert!(is_trivial_paraphrase(&["legal"], &["legai"]));
        assert!(!is_trivial_paraphrase(&["mii"], &["mil"]));
        assert!(!is_trivial_paraphrase(&["mil"], &["mai"]));
    }

    #[test]
    fn different_words_are_not_trivial() {
        assert!(!is_trivial_paraphrase(&["poder"], &["legislatura"]));
        assert!(!is_trivial_paraphrase(&["casa", "grande"], &["casa", "pequena"]));
    }

    #[test]
    fn symmetric_without_alternation() {
        let pairs: [(&[&str], &[&str]); 5] = [
            (&["the", "books"], &["the", "book"]),
            (&["de", "casa"], &["casa"]),
            (&["a"], &["x"]),
            (&["poder"], &["legislatura"]),
            (&[","], &["x", "y"]),
        ];
        for (a, b) in pairs {
            assert_eq!(RULES.is_trivial(a, b), RULES.is_trivial(b, a), "{a:?} {b:?}");
        }
    }

    #[test]
    fn strip_suffix_prefers_two_letter_suffix() {
        assert_eq!(RULES.strip_suffix("casas"), "cas");
        assert_eq!(RULES.strip_suffix("livros"), "livr");
        assert_eq!(RULES.strip_suffix("livro"), "livr");
        assert_eq!(RULES.strip_suffix("books"), "book");
        assert_eq!(RULES.strip_suffix("mil"), "mil");
        assert_eq!(RULES.strip_suffix("s"), "");
        assert_eq!(RULES.strip_suffix("ação"), "açã");
        assert_eq!(RULES.strip_suffix(""), "");
    }
}
