use icu_normalizer::ComposingNormalizerBorrowed;

/// Characters ignored when comparing answers.
pub const IGNORED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '-', '…'];

/// Strip comparison-irrelevant punctuation, compose to NFC and trim.
///
/// Punctuation is removed before composition so that a second pass can never
/// compose jamo that were separated by a removed character.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect();
    let composed = ComposingNormalizerBorrowed::new_nfc().normalize(&stripped);
    composed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_sentence_punctuation() {
        assert_eq!(normalize("안녕하세요."), "안녕하세요");
        assert_eq!(normalize("  뭐라고요?! "), "뭐라고요");
        assert_eq!(normalize("\"그래\"…"), "그래");
    }

    #[test]
    fn keeps_inner_whitespace() {
        assert_eq!(normalize(" 사과, 맛있다 "), "사과 맛있다");
    }

    #[test]
    fn composes_decomposed_hangul() {
        // U+1100 U+1161 is the conjoining-jamo spelling of 가
        assert_eq!(normalize("\u{1100}\u{1161}"), "가");
    }

    #[test]
    fn idempotent_over_mixed_inputs() {
        let samples = [
            "",
            "...",
            " - ",
            "안녕하세요.",
            "\u{1100}.\u{1161}",
            "it's a test -- really?",
            "  끝…  ",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
