use ppdb_db::Vocabulary;
use ppdb_rules::{Rejector, RuleSet, Verdict, not_in_vocabulary};
use ppdb_types::expr;

fn load_vocab(contents: &str) -> Vocabulary {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cmudict.tsv");
    std::fs::write(&path, contents).unwrap();
    Vocabulary::load(&path).expect("load vocabulary")
}

#[test]
fn filters_against_loaded_vocabulary() {
    let vocab = load_vocab("KNOWN\tN OW1 N\nwell\tW EH1 L\n");
    let contains = |word: &str| vocab.contains(word);

    assert!(not_in_vocabulary("unknownword", "known", contains));
    assert!(!not_in_vocabulary("well-known", "known", contains));
}

#[test]
fn rejector_uses_vocabulary_membership() {
    let vocab = load_vocab("big\nlarge\ncasa\n");
    let rejector = Rejector::new(RuleSet::PORTUGUESE, |word: &str| vocab.contains(word));

    assert_eq!(rejector.verdict(&expr!["big"], &expr!["large"]), Verdict::Accept);
    assert_eq!(
        rejector.verdict(&expr!["big"], &expr!["huge"]),
        Verdict::OutOfVocabulary
    );
    assert_eq!(rejector.verdict(&expr!["casa"], &expr!["casas"]), Verdict::Trivial);
}
