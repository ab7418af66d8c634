use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::session::ledger::{AttemptRecord, VocabularyEntry};

pub const HISTORY_FILE: &str = "dictation_history.csv";
pub const VOCABULARY_FILE: &str = "vocabulary.csv";

const HISTORY_HEADER: [&str; 8] = [
    "date",
    "video_title",
    "timestamp",
    "original_text",
    "user_input",
    "is_correct",
    "blank_words",
    "wrong_words",
];
const VOCABULARY_HEADER: [&str; 5] = ["word", "definition", "translation", "context", "date"];

pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn export_history(&self, records: &[AttemptRecord]) -> Result<PathBuf> {
        let rows = records.iter().map(|r| {
            vec![
                r.date_label(),
                r.video_title.clone(),
                r.timestamp.clone(),
                r.original_text.clone(),
                r.user_input.clone(),
                r.mark().to_string(),
                r.blank_words_cell(),
                r.wrong_words_cell(),
            ]
        });
        self.write(HISTORY_FILE, &HISTORY_HEADER, rows)
    }

    pub fn export_vocabulary(&self, entries: &[VocabularyEntry]) -> Result<PathBuf> {
        let rows = entries.iter().map(|e| {
            vec![
                e.word.clone(),
                e.definition.clone(),
                e.translation.clone(),
                e.context.clone(),
                e.date_label(),
            ]
        });
        self.write(VOCABULARY_FILE, &VOCABULARY_HEADER, rows)
    }

    fn write(
        &self,
        name: &str,
        header: &[&str],
        rows: impl Iterator<Item = Vec<String>>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.dir.join(name);
        let tmp_path = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path)
            .with_context(|| format!("opening {}", tmp_path.display()))?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &path)?;
        log::info!("exported {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::engine::evaluate::{Evaluation, ExerciseMode};
    use crate::provider::{DictionaryEntry, Segment};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn history_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("out"));
        let record = AttemptRecord::new(
            date(),
            "먹방, 2편",
            &Segment::new("사과가 맛있다", 61.0, 2.0),
            ExerciseMode::Blank,
            "사과 맛없다",
            &["사과".to_string(), "맛있다".to_string()],
            &Evaluation {
                correct: false,
                diff_markup: "맛<del>없</del><ins>있</ins>다".into(),
                wrong_words: vec!["맛있".into()],
            },
        );

        let path = exporter.export_history(&[record]).unwrap();
        assert_eq!(path.file_name().unwrap(), HISTORY_FILE);
        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("date,video_title,timestamp,original_text,user_input,is_correct,blank_words,wrong_words")
        );
        assert_eq!(
            lines.next(),
            Some("2024-05-17,\"먹방, 2편\",1:01,사과가 맛있다,사과 맛없다,✗,\"사과, 맛있다\",맛있")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn vocabulary_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let entry = VocabularyEntry::from_lookup(
            &DictionaryEntry {
                headword: "사과".into(),
                definition: "사과나무의 열매.".into(),
                translated_word: "apple".into(),
                translated_definition: "apple fruit".into(),
            },
            "사과가 맛있다",
            "en",
            date(),
        );

        let path = exporter.export_vocabulary(&[entry]).unwrap();
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().clone();
        assert_eq!(header.iter().collect::<Vec<_>>(), VOCABULARY_HEADER);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "사과");
        assert_eq!(&rows[0][2], "apple fruit");
        assert_eq!(&rows[0][4], "2024-05-17");
    }

    #[test]
    fn empty_export_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let path = exporter.export_history(&[]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap().lines().count(), 1);
        assert!(!dir.path().join("dictation_history.csv.tmp").exists());
    }
}
