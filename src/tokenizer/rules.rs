use crate::engine::normalize::IGNORED_PUNCTUATION;
use crate::tokenizer::{Morpheme, Tokenizer};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Coda {
    /// Attaches only after a syllable with a final consonant (이, 을, 은 ...).
    Required,
    /// Attaches only after an open syllable (가, 를, 는 ...).
    Forbidden,
    /// Open syllable or final ㄹ (로).
    OpenOrRieul,
    Any,
}

/// Longest first so that 에서 wins over 서 and 으로 over 로.
const PARTICLES: &[(&str, &str, Coda)] = &[
    ("에게서", "JKB", Coda::Any),
    ("께서", "JKS", Coda::Any),
    ("에서", "JKB", Coda::Any),
    ("에게", "JKB", Coda::Any),
    ("한테", "JKB", Coda::Any),
    ("으로", "JKB", Coda::Required),
    ("부터", "JX", Coda::Any),
    ("까지", "JX", Coda::Any),
    ("처럼", "JKB", Coda::Any),
    ("보다", "JKB", Coda::Any),
    ("이랑", "JC", Coda::Required),
    ("이", "JKS", Coda::Required),
    ("가", "JKS", Coda::Forbidden),
    ("을", "JKO", Coda::Required),
    ("를", "JKO", Coda::Forbidden),
    ("은", "JX", Coda::Required),
    ("는", "JX", Coda::Forbidden),
    ("과", "JC", Coda::Required),
    ("와", "JC", Coda::Forbidden),
    ("랑", "JC", Coda::Forbidden),
    ("로", "JKB", Coda::OpenOrRieul),
    ("에", "JKB", Coda::Any),
    ("의", "JKG", Coda::Any),
    ("도", "JX", Coda::Any),
    ("만", "JX", Coda::Any),
];

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;
const RIEUL_CODA: u32 = 8;

/// Final consonant index of a precomposed syllable (0 = none).
fn coda_of(ch: char) -> Option<u32> {
    let code = ch as u32;
    (HANGUL_BASE..=HANGUL_LAST)
        .contains(&code)
        .then(|| (code - HANGUL_BASE) % 28)
}

fn coda_agrees(stem_last: char, coda: Coda) -> bool {
    let Some(index) = coda_of(stem_last) else {
        return false;
    };
    match coda {
        Coda::Required => index != 0,
        Coda::Forbidden => index == 0,
        Coda::OpenOrRieul => index == 0 || index == RIEUL_CODA,
        Coda::Any => true,
    }
}

/// Dictionary-free Korean tokenizer: splits on whitespace and peels one
/// trailing particle off each word.
///
/// Single-syllable particles are only split from words of three or more
/// syllables, which keeps nouns like 사과 or 나이 intact at the cost of
/// missing short pronoun forms (나는).
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleTokenizer;

impl RuleTokenizer {
    fn split_word(word: &str) -> Vec<Morpheme> {
        let chars: Vec<char> = word.chars().collect();
        for &(particle, tag, coda) in PARTICLES {
            let Some(stem) = word.strip_suffix(particle) else {
                continue;
            };
            let particle_len = particle.chars().count();
            let stem_len = chars.len() - particle_len;
            let long_enough = if particle_len == 1 {
                chars.len() >= 3
            } else {
                stem_len >= 1
            };
            if !long_enough {
                continue;
            }
            let Some(last) = stem.chars().last() else {
                continue;
            };
            if coda_agrees(last, coda) {
                return vec![Morpheme::new(stem, "NNG"), Morpheme::new(particle, tag)];
            }
        }
        vec![Morpheme::new(word, "NNG")]
    }
}

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Morpheme> {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c| IGNORED_PUNCTUATION.contains(&c)))
            .filter(|w| !w.is_empty())
            .flat_map(Self::split_word)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(text: &str) -> Vec<(String, String)> {
        RuleTokenizer
            .tokenize(text)
            .into_iter()
            .map(|m| (m.form, m.tag))
            .collect()
    }

    fn pair(form: &str, tag: &str) -> (String, String) {
        (form.to_string(), tag.to_string())
    }

    #[test]
    fn splits_case_markers() {
        assert_eq!(
            forms("학교에서 친구를 만났다."),
            vec![
                pair("학교", "NNG"),
                pair("에서", "JKB"),
                pair("친구", "NNG"),
                pair("를", "JKO"),
                pair("만났다", "NNG"),
            ]
        );
    }

    #[test]
    fn keeps_two_syllable_nouns_whole() {
        assert_eq!(forms("사과 맛있다"), vec![pair("사과", "NNG"), pair("맛있다", "NNG")]);
    }

    #[test]
    fn respects_final_consonant_agreement() {
        // 을 needs a final consonant; 바다 ends open so 바다을 is left alone
        assert_eq!(forms("바다을"), vec![pair("바다을", "NNG")]);
        assert_eq!(forms("선생님을"), vec![pair("선생님", "NNG"), pair("을", "JKO")]);
        assert_eq!(forms("서울로"), vec![pair("서울", "NNG"), pair("로", "JKB")]);
    }

    #[test]
    fn drops_punctuation_only_words() {
        assert!(forms("... !").is_empty());
    }
}
