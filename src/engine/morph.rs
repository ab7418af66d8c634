use std::collections::HashSet;

use crate::tokenizer::Tokenizer;

/// Non-particle morphemes of `expected` whose surface form never appears in
/// `actual`, distinct and in `expected` order.
pub fn missing_morphemes(tokenizer: &dyn Tokenizer, expected: &str, actual: &str) -> Vec<String> {
    let present: HashSet<String> = if actual.is_empty() {
        HashSet::new()
    } else {
        tokenizer
            .tokenize(actual)
            .into_iter()
            .map(|m| m.form)
            .collect()
    };

    let mut seen = HashSet::new();
    tokenizer
        .tokenize(expected)
        .into_iter()
        .filter(|m| !m.is_particle() && !present.contains(&m.form))
        .filter(|m| seen.insert(m.form.clone()))
        .map(|m| m.form)
        .collect()
}

/// Dictionary search term for a word: its first morpheme, so inflected or
/// particle-marked forms still hit the headword.
pub fn lookup_term(tokenizer: &dyn Tokenizer, word: &str) -> String {
    tokenizer
        .tokenize(word)
        .into_iter()
        .next()
        .map(|m| m.form)
        .unwrap_or_else(|| word.to_string())
}
