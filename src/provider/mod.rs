pub mod http;
pub mod krdict;
pub mod transcript;
pub mod youtube;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::morph::lookup_term;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("{0} is not configured")]
    MissingApiKey(&'static str),
    #[error("no Korean subtitles for this video")]
    NoSubtitles,
    #[error("built without network support")]
    Disabled,
}

/// One timed subtitle line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whole-second playback window with a one second margin on each side.
    pub fn clip_range(&self) -> (u64, u64) {
        let start = (self.start - 1.0).max(0.0) as u64;
        let end = (self.end() + 1.0).max(0.0) as u64;
        (start, end)
    }

    /// `m:ss` of the segment start.
    pub fn timestamp_label(&self) -> String {
        let secs = self.start.max(0.0) as u64;
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail_url: String,
    /// Display form (`m:ss`, `h:mm:ss` or `N/A`).
    pub duration: String,
    /// `YYYY-MM-DD`
    pub published: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub headword: String,
    pub definition: String,
    pub translated_word: String,
    pub translated_definition: String,
}

pub trait VideoSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoSummary>, ProviderError>;
}

pub trait SubtitleSource {
    fn fetch_korean(&self, video_id: &str) -> Result<Vec<Segment>, ProviderError>;
}

pub trait DictionarySource {
    fn lookup(
        &self,
        word: &str,
        lang: &str,
        max_results: usize,
    ) -> Result<Vec<DictionaryEntry>, ProviderError>;
}

/// Dictionary lookups are supplementary: failures come back as no results.
pub fn lookup_definitions(
    dictionary: &dyn DictionarySource,
    tokenizer: &dyn Tokenizer,
    word: &str,
    lang: &str,
    max_results: usize,
) -> Vec<DictionaryEntry> {
    let term = lookup_term(tokenizer, word);
    match dictionary.lookup(&term, lang, max_results) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("dictionary lookup for {term:?} failed: {err}");
            Vec::new()
        }
    }
}
