use serde::{Deserialize, Serialize};

use crate::engine::diff::{SpanKind, render_diff, write_span};
use crate::engine::morph::missing_morphemes;
use crate::engine::normalize::normalize;
use crate::tokenizer::Tokenizer;

/// Words handed to the dictionary after a wrong answer.
pub const MAX_WRONG_WORDS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseMode {
    /// Retype only the hidden words.
    #[default]
    Blank,
    /// Retype the whole segment.
    Full,
}

impl ExerciseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseMode::Blank => "blank",
            ExerciseMode::Full => "full",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blank" | "easy" => Some(ExerciseMode::Blank),
            "full" | "hard" => Some(ExerciseMode::Full),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ExerciseMode::Blank => ExerciseMode::Full,
            ExerciseMode::Full => ExerciseMode::Blank,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    /// Inline diff markup, empty when the answer is correct.
    pub diff_markup: String,
    /// At most [`MAX_WRONG_WORDS`] distinct words, first occurrence first.
    pub wrong_words: Vec<String>,
}

pub struct Evaluator<'t> {
    tokenizer: &'t dyn Tokenizer,
}

impl<'t> Evaluator<'t> {
    pub fn new(tokenizer: &'t dyn Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn evaluate(
        &self,
        mode: ExerciseMode,
        expected_sentence: &str,
        blank_answers: &[String],
        input: &str,
    ) -> Evaluation {
        match mode {
            ExerciseMode::Full => evaluate_full(expected_sentence, input),
            ExerciseMode::Blank => self.evaluate_blanks(blank_answers, input),
        }
    }

    /// Order- and length-sensitive: surplus words make the answer wrong.
    pub fn evaluate_blanks(&self, answers: &[String], input: &str) -> Evaluation {
        let typed: Vec<String> = input.split_whitespace().map(normalize).collect();
        let expected: Vec<String> = answers.iter().map(|a| normalize(a)).collect();

        if typed == expected {
            return Evaluation {
                correct: true,
                ..Evaluation::default()
            };
        }

        let mut slots = Vec::with_capacity(expected.len());
        let mut wrong = Vec::new();
        for (i, want) in expected.iter().enumerate() {
            let got = typed.get(i).map(String::as_str).unwrap_or("");
            if want == got {
                let mut slot = String::new();
                write_span(&mut slot, SpanKind::Unchanged, want);
                slots.push(slot);
            } else {
                slots.push(render_diff(got, want));
                let missing = missing_morphemes(self.tokenizer, want, got);
                if !missing.is_empty() {
                    wrong.extend(missing);
                } else if !want.is_empty() {
                    wrong.push(want.clone());
                }
            }
        }

        Evaluation {
            correct: false,
            diff_markup: slots.join(" "),
            wrong_words: first_distinct(wrong, MAX_WRONG_WORDS),
        }
    }
}

/// Punctuation- and edge-whitespace-insensitive comparison of the whole line.
pub fn evaluate_full(expected: &str, input: &str) -> Evaluation {
    if normalize(input) == normalize(expected) {
        Evaluation {
            correct: true,
            ..Evaluation::default()
        }
    } else {
        Evaluation {
            correct: false,
            diff_markup: render_diff(input, expected),
            wrong_words: Vec::new(),
        }
    }
}

fn first_distinct(words: Vec<String>, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(limit);
    for word in words {
        if out.len() == limit {
            break;
        }
        if !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Morpheme;
    use crate::tokenizer::rules::RuleTokenizer;

    fn answers(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn full_mode_ignores_punctuation() {
        let eval = evaluate_full("안녕하세요.", "안녕하세요");
        assert!(eval.correct);
        assert!(eval.diff_markup.is_empty());
    }

    #[test]
    fn full_mode_mismatch_diffs_raw_strings() {
        let eval = evaluate_full("저는 학생이에요.", "저는 학생이예요");
        assert!(!eval.correct);
        assert_eq!(eval.diff_markup, "저는 학생이<del>예</del><ins>에</ins>요<ins>.</ins>");
        assert!(eval.wrong_words.is_empty());
    }

    #[test]
    fn blank_mode_exact_sequence_is_correct() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let eval = evaluator.evaluate_blanks(&answers(&["사과", "맛있다"]), " 사과  맛있다. ");
        assert!(eval.correct);
    }

    #[test]
    fn blank_mode_reports_wrong_word() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let eval = evaluator.evaluate_blanks(&answers(&["사과", "맛있다"]), "사과 맛없다");
        assert!(!eval.correct);
        assert_eq!(eval.wrong_words, vec!["맛있다"]);
        assert_eq!(
            eval.diff_markup,
            "<eq>사과</eq> 맛<del>없</del><ins>있</ins>다"
        );
    }

    #[test]
    fn punctuation_only_blank_has_no_lookup_word() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let eval = evaluator.evaluate_blanks(&answers(&["안녕", "..."]), "안녕 뭐");
        assert!(!eval.correct);
        assert!(eval.wrong_words.is_empty());
        assert!(!eval.diff_markup.is_empty());
    }

    #[test]
    fn blank_mode_order_matters() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let eval = evaluator.evaluate_blanks(&answers(&["사과", "맛있다"]), "맛있다 사과");
        assert!(!eval.correct);
        assert_eq!(eval.wrong_words, vec!["사과", "맛있다"]);
    }

    #[test]
    fn blank_mode_extra_words_are_wrong_but_not_rendered() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let eval = evaluator.evaluate_blanks(&answers(&["사과"]), "사과 하나");
        assert!(!eval.correct);
        assert_eq!(eval.diff_markup, "<eq>사과</eq>");
        assert!(eval.wrong_words.is_empty());
    }

    #[test]
    fn blank_mode_short_answer_compares_against_empty() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let eval = evaluator.evaluate_blanks(&answers(&["학교에서", "친구를"]), "학교에서");
        assert!(!eval.correct);
        assert_eq!(eval.diff_markup, "<eq>학교에서</eq> <ins>친구를</ins>");
        assert_eq!(eval.wrong_words, vec!["친구"]);
    }

    struct Syllables;

    impl Tokenizer for Syllables {
        fn tokenize(&self, text: &str) -> Vec<Morpheme> {
            text.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| Morpheme::new(c.to_string(), "NNG"))
                .collect()
        }
    }

    #[test]
    fn wrong_words_capped_and_distinct() {
        let evaluator = Evaluator::new(&Syllables);
        let eval = evaluator.evaluate_blanks(&answers(&["가나", "나다라", "마바"]), "");
        assert_eq!(eval.wrong_words, vec!["가", "나", "다"]);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let evaluator = Evaluator::new(&RuleTokenizer);
        let first = evaluator.evaluate(ExerciseMode::Full, "좋아요!", &[], "조아요");
        let second = evaluator.evaluate(ExerciseMode::Full, "좋아요!", &[], "조아요");
        assert_eq!(first, second);
    }

    #[test]
    fn mode_names() {
        assert_eq!(ExerciseMode::from_name("easy"), Some(ExerciseMode::Blank));
        assert_eq!(ExerciseMode::from_name("full"), Some(ExerciseMode::Full));
        assert_eq!(ExerciseMode::from_name("medium"), None);
        assert_eq!(ExerciseMode::Blank.toggled(), ExerciseMode::Full);
    }
}
