use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::evaluate::{Evaluation, ExerciseMode};
use crate::provider::{DictionaryEntry, Segment};

pub const CORRECT_MARK: &str = "✓";
pub const WRONG_MARK: &str = "✗";
const EMPTY_CELL: &str = "-";

/// One submitted answer. Never mutated after it is appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub date: NaiveDate,
    pub video_title: String,
    /// `m:ss` of the segment start.
    pub timestamp: String,
    pub original_text: String,
    pub user_input: String,
    pub mode: ExerciseMode,
    pub correct: bool,
    pub blank_words: Vec<String>,
    pub wrong_words: Vec<String>,
    pub diff_markup: String,
}

impl AttemptRecord {
    pub fn new(
        date: NaiveDate,
        video_title: &str,
        segment: &Segment,
        mode: ExerciseMode,
        user_input: &str,
        blank_words: &[String],
        evaluation: &Evaluation,
    ) -> Self {
        Self {
            date,
            video_title: video_title.to_string(),
            timestamp: segment.timestamp_label(),
            original_text: segment.text.clone(),
            user_input: user_input.to_string(),
            mode,
            correct: evaluation.correct,
            blank_words: match mode {
                ExerciseMode::Blank => blank_words.to_vec(),
                ExerciseMode::Full => Vec::new(),
            },
            wrong_words: evaluation.wrong_words.clone(),
            diff_markup: if evaluation.correct {
                String::new()
            } else {
                evaluation.diff_markup.clone()
            },
        }
    }

    pub fn mark(&self) -> &'static str {
        if self.correct { CORRECT_MARK } else { WRONG_MARK }
    }

    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn blank_words_cell(&self) -> String {
        join_cell(&self.blank_words)
    }

    pub fn wrong_words_cell(&self) -> String {
        join_cell(&self.wrong_words)
    }
}

fn join_cell(words: &[String]) -> String {
    if words.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        words.join(", ")
    }
}

/// Append-only list of attempts for the running program.
#[derive(Clone, Debug, Default)]
pub struct AttemptLedger {
    records: Vec<AttemptRecord>,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: AttemptRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.correct).count()
    }

    /// Percentage of correct attempts, 0 when nothing was submitted.
    pub fn accuracy(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.correct_count() as f64 / self.records.len() as f64 * 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub definition: String,
    /// Translated definition; empty when studying in Korean.
    pub translation: String,
    pub context: String,
    pub date: NaiveDate,
}

impl VocabularyEntry {
    pub fn from_lookup(entry: &DictionaryEntry, context: &str, lang: &str, date: NaiveDate) -> Self {
        let translation = if lang == "ko" {
            String::new()
        } else {
            entry.translated_definition.clone()
        };
        Self {
            word: entry.headword.clone(),
            definition: entry.definition.clone(),
            translation,
            context: context.to_string(),
            date,
        }
    }

    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Clone, Debug, Default)]
pub struct VocabularyBook {
    entries: Vec<VocabularyEntry>,
}

impl VocabularyBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the same word and definition is already saved.
    pub fn add(&mut self, entry: VocabularyEntry) -> bool {
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.word == entry.word && e.definition == entry.definition);
        if duplicate {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn record(correct: bool) -> AttemptRecord {
        let evaluation = Evaluation {
            correct,
            diff_markup: if correct { String::new() } else { "<del>x</del>".into() },
            wrong_words: if correct { vec![] } else { vec!["맛있".into()] },
        };
        AttemptRecord::new(
            date(),
            "브이로그",
            &Segment::new("사과가 맛있다", 75.2, 2.0),
            ExerciseMode::Blank,
            "사과 맛없다",
            &["사과".to_string(), "맛있다".to_string()],
            &evaluation,
        )
    }

    #[test]
    fn record_cells() {
        let wrong = record(false);
        assert_eq!(wrong.timestamp, "1:15");
        assert_eq!(wrong.mark(), WRONG_MARK);
        assert_eq!(wrong.date_label(), "2024-05-17");
        assert_eq!(wrong.blank_words_cell(), "사과, 맛있다");
        assert_eq!(wrong.wrong_words_cell(), "맛있");

        let right = record(true);
        assert_eq!(right.mark(), CORRECT_MARK);
        assert_eq!(right.wrong_words_cell(), "-");
        assert!(right.diff_markup.is_empty());
    }

    #[test]
    fn full_mode_records_no_blank_words() {
        let r = AttemptRecord::new(
            date(),
            "v",
            &Segment::new("안녕하세요", 0.0, 1.0),
            ExerciseMode::Full,
            "안녕하세요",
            &["무시".to_string()],
            &Evaluation {
                correct: true,
                ..Default::default()
            },
        );
        assert!(r.blank_words.is_empty());
        assert_eq!(r.blank_words_cell(), "-");
    }

    #[test]
    fn ledger_accuracy() {
        let mut ledger = AttemptLedger::new();
        assert_eq!(ledger.accuracy(), 0.0);
        ledger.append(record(true));
        ledger.append(record(false));
        ledger.append(record(true));
        ledger.append(record(true));
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.correct_count(), 3);
        assert!((ledger.accuracy() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vocabulary_rejects_duplicates_and_clears() {
        let lookup = DictionaryEntry {
            headword: "사과".into(),
            definition: "사과나무의 열매.".into(),
            translated_word: "apple".into(),
            translated_definition: "The fruit of an apple tree.".into(),
        };
        let mut book = VocabularyBook::new();
        assert!(book.add(VocabularyEntry::from_lookup(&lookup, "사과가 맛있다", "en", date())));
        assert!(!book.add(VocabularyEntry::from_lookup(&lookup, "다른 문장", "en", date())));
        assert_eq!(book.len(), 1);
        assert_eq!(book.entries()[0].translation, "The fruit of an apple tree.");

        let korean = VocabularyEntry::from_lookup(&lookup, "", "ko", date());
        assert!(korean.translation.is_empty());

        book.clear();
        assert!(book.is_empty());
    }
}
