use std::path::Path;
use std::time::Duration;

use chrono::Local;
use rust_i18n::t;

use crate::config::{Config, MAX_BLANKS_RANGE, SEARCH_RESULTS_RANGE};
use crate::engine::evaluate::{Evaluator, ExerciseMode, MAX_WRONG_WORDS};
use crate::provider::krdict::Krdict;
use crate::provider::transcript::YouTubeCaptions;
use crate::provider::youtube::YouTubeSearch;
use crate::provider::{
    DictionaryEntry, DictionarySource, ProviderError, SubtitleSource, VideoSearch, VideoSummary,
    lookup_definitions,
};
use crate::session::ledger::{AttemptLedger, VocabularyBook, VocabularyEntry};
use crate::session::navigator::PlaybackRequest;
use crate::session::study::StudySession;
use crate::store::csv_export::CsvExporter;
use crate::tokenizer::{self, Tokenizer};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Results per dictionary lookup.
const LOOKUP_RESULTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Search,
    Study,
    Complete,
    History,
    Vocabulary,
    Settings,
}

/// Which text field receives keys on the study screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyFocus {
    Answer,
    Lookup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    Theme,
    Language,
    Mode,
    Shuffle,
    MaxBlanks,
    SearchResults,
    YoutubeKey,
    KrdictKey,
    ExportDir,
}

impl SettingsField {
    pub const ALL: [SettingsField; 9] = [
        SettingsField::Theme,
        SettingsField::Language,
        SettingsField::Mode,
        SettingsField::Shuffle,
        SettingsField::MaxBlanks,
        SettingsField::SearchResults,
        SettingsField::YoutubeKey,
        SettingsField::KrdictKey,
        SettingsField::ExportDir,
    ];

    /// Edited through a text field rather than cycled.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            SettingsField::YoutubeKey | SettingsField::KrdictKey | SettingsField::ExportDir
        )
    }

    pub fn label(self) -> String {
        let label = match self {
            SettingsField::Theme => t!("settings.theme"),
            SettingsField::Language => t!("settings.language"),
            SettingsField::Mode => t!("settings.mode"),
            SettingsField::Shuffle => t!("settings.shuffle"),
            SettingsField::MaxBlanks => t!("settings.max_blanks"),
            SettingsField::SearchResults => t!("settings.search_results"),
            SettingsField::YoutubeKey => t!("settings.youtube_key"),
            SettingsField::KrdictKey => t!("settings.krdict_key"),
            SettingsField::ExportDir => t!("settings.export_dir"),
        };
        label.to_string()
    }
}

pub fn mode_label(mode: ExerciseMode) -> String {
    match mode {
        ExerciseMode::Blank => t!("mode.blank").to_string(),
        ExerciseMode::Full => t!("mode.full").to_string(),
    }
}

/// Capabilities that reach outside the process.
pub struct Providers {
    pub search: Box<dyn VideoSearch>,
    pub subtitles: Box<dyn SubtitleSource>,
    pub dictionary: Box<dyn DictionarySource>,
}

impl Providers {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search: Box::new(YouTubeSearch::new(config.youtube_key())),
            subtitles: Box::new(YouTubeCaptions::new()),
            dictionary: Box::new(dictionary_from_config(config)),
        }
    }
}

fn dictionary_from_config(config: &Config) -> Krdict {
    Krdict::new(
        config.krdict_key(),
        Duration::from_secs(config.dictionary_timeout_secs),
    )
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub should_quit: bool,
    pub status: Option<StatusMessage>,

    pub search_input: LineInput,
    pub last_query: String,
    pub search_results: Vec<VideoSummary>,
    pub search_selected: usize,

    pub session: Option<StudySession>,
    pub study_focus: StudyFocus,
    pub answer_input: LineInput,
    pub lookup_input: LineInput,
    pub dictionary_results: Vec<DictionaryEntry>,
    pub dictionary_selected: usize,
    pub playback: Option<PlaybackRequest>,

    pub ledger: AttemptLedger,
    pub vocabulary: VocabularyBook,
    pub history_selected: usize,
    pub vocabulary_selected: usize,
    pub vocabulary_confirm_clear: bool,

    pub settings_selected: usize,
    pub settings_editing: Option<LineInput>,

    previous_screen: AppScreen,
    providers: Providers,
    tokenizer: Box<dyn Tokenizer>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let providers = Providers::from_config(&config);
        let tokenizer = tokenizer::from_config(config.tokenizer_dictionary.as_deref().map(Path::new));
        Self::with_providers(config, providers, tokenizer)
    }

    pub fn with_providers(config: Config, providers: Providers, tokenizer: Box<dyn Tokenizer>) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(theme));
        rust_i18n::set_locale(&config.ui_lang);

        Self {
            screen: AppScreen::Search,
            config,
            theme,
            should_quit: false,
            status: None,
            search_input: LineInput::default(),
            last_query: String::new(),
            search_results: Vec::new(),
            search_selected: 0,
            session: None,
            study_focus: StudyFocus::Answer,
            answer_input: LineInput::default(),
            lookup_input: LineInput::default(),
            dictionary_results: Vec::new(),
            dictionary_selected: 0,
            playback: None,
            ledger: AttemptLedger::new(),
            vocabulary: VocabularyBook::new(),
            history_selected: 0,
            vocabulary_selected: 0,
            vocabulary_confirm_clear: false,
            settings_selected: 0,
            settings_editing: None,
            previous_screen: AppScreen::Search,
            providers,
            tokenizer,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn provider_error(&mut self, err: &ProviderError) {
        let text = match err {
            ProviderError::NoSubtitles => t!("status.no_subtitles").to_string(),
            ProviderError::MissingApiKey(name) => t!("status.missing_key", name = name).to_string(),
            ProviderError::Disabled => t!("status.network_disabled").to_string(),
            other => t!("status.request_failed", error = other.to_string()).to_string(),
        };
        self.set_status(StatusKind::Error, text);
    }

    // --- navigation between screens ---

    pub fn go_to(&mut self, screen: AppScreen) {
        if self.screen != screen {
            self.previous_screen = self.screen;
        }
        self.screen = screen;
        self.vocabulary_confirm_clear = false;
    }

    /// History, Vocabulary and Settings return where they were opened from.
    pub fn go_back(&mut self) {
        let target = match self.previous_screen {
            AppScreen::History | AppScreen::Vocabulary | AppScreen::Settings => AppScreen::Search,
            AppScreen::Study if self.session.is_none() => AppScreen::Search,
            other => other,
        };
        self.screen = target;
        self.previous_screen = AppScreen::Search;
        self.vocabulary_confirm_clear = false;
    }

    // --- search ---

    pub fn run_search(&mut self) {
        let query = self.search_input.value().trim().to_string();
        if query.is_empty() {
            self.set_status(StatusKind::Info, t!("status.empty_query"));
            return;
        }
        log::info!("searching videos for {query:?}");
        match self.providers.search.search(&query, self.config.search_results) {
            Ok(results) => {
                let text = if results.is_empty() {
                    t!("status.no_results").to_string()
                } else {
                    t!("status.results", count = results.len()).to_string()
                };
                self.search_results = results;
                self.search_selected = 0;
                self.last_query = query;
                self.set_status(StatusKind::Info, text);
            }
            Err(err) => {
                log::warn!("video search failed: {err}");
                self.provider_error(&err);
            }
        }
    }

    /// Enter on the search screen: a new query searches, an unchanged one
    /// opens the highlighted video.
    pub fn search_enter(&mut self) {
        let query = self.search_input.value().trim();
        if !self.search_results.is_empty() && query == self.last_query {
            self.select_video(self.search_selected);
        } else {
            self.run_search();
        }
    }

    pub fn search_select_next(&mut self) {
        if !self.search_results.is_empty() {
            self.search_selected = (self.search_selected + 1).min(self.search_results.len() - 1);
        }
    }

    pub fn search_select_prev(&mut self) {
        self.search_selected = self.search_selected.saturating_sub(1);
    }

    pub fn select_video(&mut self, index: usize) {
        let Some(video) = self.search_results.get(index).cloned() else {
            return;
        };
        match self.providers.subtitles.fetch_korean(&video.id) {
            Ok(segments) if !segments.is_empty() => {
                log::info!(
                    "studying {} ({}) with {} segments",
                    video.title,
                    video.id,
                    segments.len()
                );
                self.start_session(StudySession::from_entropy(video, segments, self.config.shuffle));
            }
            Ok(_) => self.provider_error(&ProviderError::NoSubtitles),
            Err(err) => {
                log::warn!("subtitles for {} failed: {err}", video.id);
                self.provider_error(&err);
            }
        }
    }

    pub fn start_session(&mut self, session: StudySession) {
        self.session = Some(session);
        self.playback = None;
        self.reset_segment_view();
        self.status = None;
        self.go_to(AppScreen::Study);
    }

    // --- study ---

    fn reset_segment_view(&mut self) {
        self.answer_input.clear();
        self.lookup_input.clear();
        self.study_focus = StudyFocus::Answer;
        self.dictionary_results.clear();
        self.dictionary_selected = 0;
        if let Some(previous) = self.session.as_ref().and_then(|s| s.current_feedback()) {
            self.answer_input.set(&previous.user_input);
        }
    }

    /// Rebuilds the playback line after navigation. Consumes the autoplay
    /// flag, so call once per frame before drawing.
    pub fn refresh_playback(&mut self) {
        let Some(session) = self.session.as_mut() else {
            self.playback = None;
            return;
        };
        if session.navigator().autoplay() || self.playback.is_none() || session.is_complete() {
            self.playback = session.playback();
            session.take_autoplay();
        }
    }

    pub fn open_playback(&mut self) {
        let Some(url) = self.playback.as_ref().map(|p| p.url.clone()) else {
            return;
        };
        if let Err(err) = open::that(&url) {
            log::warn!("could not open {url}: {err}");
            self.set_status(StatusKind::Error, t!("status.open_failed", error = err.to_string()));
        }
    }

    /// Blanks for the current segment, generating them on first view.
    pub fn prepare_blanks(&mut self) {
        if self.config.exercise_mode == ExerciseMode::Blank {
            let max_blanks = self.config.max_blanks;
            if let Some(session) = self.session.as_mut() {
                session.blanks(max_blanks);
            }
        }
    }

    pub fn submit_answer(&mut self) {
        let mode = self.config.exercise_mode;
        let input = self.answer_input.value().to_string();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let evaluator = Evaluator::new(self.tokenizer.as_ref());
        let Some(evaluation) = session
            .submit(mode, self.config.max_blanks, &input, &evaluator, &mut self.ledger)
            .cloned()
        else {
            return;
        };

        self.dictionary_results.clear();
        self.dictionary_selected = 0;
        if evaluation.correct {
            self.set_status(StatusKind::Success, t!("status.correct"));
            return;
        }
        self.set_status(StatusKind::Error, t!("status.incorrect"));
        if mode == ExerciseMode::Blank {
            for word in evaluation.wrong_words.iter().take(MAX_WRONG_WORDS) {
                let entries = lookup_definitions(
                    self.providers.dictionary.as_ref(),
                    self.tokenizer.as_ref(),
                    word,
                    &self.config.ui_lang,
                    LOOKUP_RESULTS,
                );
                self.dictionary_results.extend(entries);
            }
        }
    }

    pub fn lookup_manual(&mut self) {
        let word = self.lookup_input.value().trim().to_string();
        if word.is_empty() {
            return;
        }
        self.dictionary_results = lookup_definitions(
            self.providers.dictionary.as_ref(),
            self.tokenizer.as_ref(),
            &word,
            &self.config.ui_lang,
            LOOKUP_RESULTS,
        );
        self.dictionary_selected = 0;
        if self.dictionary_results.is_empty() {
            self.set_status(StatusKind::Info, t!("status.no_definitions", word = word));
        }
    }

    pub fn dictionary_select_next(&mut self) {
        if !self.dictionary_results.is_empty() {
            self.dictionary_selected =
                (self.dictionary_selected + 1).min(self.dictionary_results.len() - 1);
        }
    }

    pub fn dictionary_select_prev(&mut self) {
        self.dictionary_selected = self.dictionary_selected.saturating_sub(1);
    }

    pub fn save_selected_word(&mut self) {
        let Some(entry) = self.dictionary_results.get(self.dictionary_selected) else {
            return;
        };
        let context = self
            .session
            .as_ref()
            .and_then(|s| s.current_segment())
            .map(|s| s.text.clone())
            .unwrap_or_default();
        let vocab = VocabularyEntry::from_lookup(
            entry,
            &context,
            &self.config.ui_lang,
            Local::now().date_naive(),
        );
        let word = vocab.word.clone();
        if self.vocabulary.add(vocab) {
            self.set_status(StatusKind::Success, t!("status.word_saved", word = word));
        } else {
            self.set_status(StatusKind::Info, t!("status.word_exists", word = word));
        }
    }

    pub fn toggle_study_focus(&mut self) {
        self.study_focus = match self.study_focus {
            StudyFocus::Answer => StudyFocus::Lookup,
            StudyFocus::Lookup => StudyFocus::Answer,
        };
    }

    pub fn toggle_mode(&mut self) {
        self.config.exercise_mode = self.config.exercise_mode.toggled();
        self.answer_input.clear();
    }

    pub fn next_segment(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.next() {
            let complete = session.is_complete();
            self.reset_segment_view();
            self.status = None;
            if complete {
                self.go_to(AppScreen::Complete);
            }
        }
    }

    pub fn prev_segment(&mut self) {
        if self.session.as_mut().is_some_and(|s| s.prev()) {
            self.reset_segment_view();
            self.status = None;
        }
    }

    pub fn replay_segment(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.replay();
        }
    }

    pub fn restart_session(&mut self) {
        if self.session.as_mut().is_some_and(|s| s.restart()) {
            self.reset_segment_view();
            self.status = None;
            self.go_to(AppScreen::Study);
        }
    }

    pub fn leave_session(&mut self) {
        self.session = None;
        self.playback = None;
        self.dictionary_results.clear();
        self.go_to(AppScreen::Search);
    }

    // --- history & vocabulary ---

    pub fn history_select_next(&mut self) {
        if !self.ledger.is_empty() {
            self.history_selected = (self.history_selected + 1).min(self.ledger.len() - 1);
        }
    }

    pub fn history_select_prev(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    pub fn vocabulary_select_next(&mut self) {
        if !self.vocabulary.is_empty() {
            self.vocabulary_selected =
                (self.vocabulary_selected + 1).min(self.vocabulary.len() - 1);
        }
    }

    pub fn vocabulary_select_prev(&mut self) {
        self.vocabulary_selected = self.vocabulary_selected.saturating_sub(1);
    }

    pub fn clear_vocabulary(&mut self) {
        self.vocabulary.clear();
        self.vocabulary_selected = 0;
        self.vocabulary_confirm_clear = false;
        self.set_status(StatusKind::Info, t!("status.vocabulary_cleared"));
    }

    fn exporter(&self) -> CsvExporter {
        CsvExporter::new(&self.config.export_dir)
    }

    pub fn export_history(&mut self) {
        if self.ledger.is_empty() {
            self.set_status(StatusKind::Info, t!("status.nothing_to_export"));
            return;
        }
        let result = self.exporter().export_history(self.ledger.records());
        self.report_export(result);
    }

    pub fn export_vocabulary(&mut self) {
        if self.vocabulary.is_empty() {
            self.set_status(StatusKind::Info, t!("status.nothing_to_export"));
            return;
        }
        let result = self.exporter().export_vocabulary(self.vocabulary.entries());
        self.report_export(result);
    }

    fn report_export(&mut self, result: anyhow::Result<std::path::PathBuf>) {
        match result {
            Ok(path) => {
                let path = path.display().to_string();
                self.set_status(StatusKind::Success, t!("status.exported", path = path));
            }
            Err(err) => {
                log::warn!("export failed: {err:#}");
                self.set_status(StatusKind::Error, t!("status.export_failed", error = format!("{err:#}")));
            }
        }
    }

    // --- settings ---

    pub fn selected_setting(&self) -> SettingsField {
        SettingsField::ALL[self.settings_selected.min(SettingsField::ALL.len() - 1)]
    }

    pub fn settings_select_next(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SettingsField::ALL.len() - 1);
    }

    pub fn settings_select_prev(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn setting_value(&self, field: SettingsField) -> String {
        let key_state = |key: &Option<String>| {
            if key.as_deref().is_some_and(|k| !k.is_empty()) {
                t!("settings.key_set").to_string()
            } else {
                t!("settings.key_unset").to_string()
            }
        };
        match field {
            SettingsField::Theme => self.config.theme.clone(),
            SettingsField::Language => self.config.ui_lang.clone(),
            SettingsField::Mode => mode_label(self.config.exercise_mode),
            SettingsField::Shuffle => {
                let value = if self.config.shuffle { t!("settings.on") } else { t!("settings.off") };
                value.to_string()
            }
            SettingsField::MaxBlanks => self.config.max_blanks.to_string(),
            SettingsField::SearchResults => self.config.search_results.to_string(),
            SettingsField::YoutubeKey => key_state(&self.config.youtube_key()),
            SettingsField::KrdictKey => key_state(&self.config.krdict_key()),
            SettingsField::ExportDir => self.config.export_dir.clone(),
        }
    }

    /// Enter on a settings row: text fields open an editor, the rest cycle.
    pub fn settings_activate(&mut self) {
        let field = self.selected_setting();
        if field.is_text() {
            let current = match field {
                SettingsField::YoutubeKey => self.config.youtube_api_key.clone().unwrap_or_default(),
                SettingsField::KrdictKey => self.config.krdict_api_key.clone().unwrap_or_default(),
                _ => self.config.export_dir.clone(),
            };
            self.settings_editing = Some(LineInput::new(&current));
        } else {
            self.settings_cycle(true);
        }
    }

    pub fn settings_commit_edit(&mut self) {
        let Some(mut input) = self.settings_editing.take() else {
            return;
        };
        let value = input.take().trim().to_string();
        let key = (!value.is_empty()).then(|| value.clone());
        match self.selected_setting() {
            SettingsField::YoutubeKey => {
                self.config.youtube_api_key = key;
                self.providers.search = Box::new(YouTubeSearch::new(self.config.youtube_key()));
            }
            SettingsField::KrdictKey => {
                self.config.krdict_api_key = key;
                self.providers.dictionary = Box::new(dictionary_from_config(&self.config));
            }
            SettingsField::ExportDir => {
                self.config.export_dir = value;
                self.config.validate();
            }
            _ => {}
        }
    }

    pub fn settings_cancel_edit(&mut self) {
        self.settings_editing = None;
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.selected_setting() {
            SettingsField::Theme => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let pos = themes.iter().position(|t| *t == self.config.theme).unwrap_or(0);
                let next = cycle_index(pos, themes.len(), forward);
                self.config.theme = themes[next].clone();
                if let Some(theme) = Theme::load(&self.config.theme) {
                    self.theme = Box::leak(Box::new(theme));
                }
            }
            SettingsField::Language => {
                self.config.cycle_lang(forward);
                rust_i18n::set_locale(&self.config.ui_lang);
            }
            SettingsField::Mode => self.config.exercise_mode = self.config.exercise_mode.toggled(),
            SettingsField::Shuffle => self.config.shuffle = !self.config.shuffle,
            SettingsField::MaxBlanks => {
                self.config.max_blanks = step(self.config.max_blanks, MAX_BLANKS_RANGE, forward);
            }
            SettingsField::SearchResults => {
                self.config.search_results =
                    step(self.config.search_results, SEARCH_RESULTS_RANGE, forward);
            }
            SettingsField::YoutubeKey | SettingsField::KrdictKey | SettingsField::ExportDir => {}
        }
    }

    pub fn save_settings(&mut self) {
        self.config.validate();
        if let Err(err) = self.config.save() {
            log::warn!("saving config failed: {err:#}");
            self.set_status(StatusKind::Error, t!("status.config_save_failed", error = err.to_string()));
        }
    }
}

fn cycle_index(pos: usize, len: usize, forward: bool) -> usize {
    if forward { (pos + 1) % len } else { (pos + len - 1) % len }
}

fn step(value: usize, (min, max): (usize, usize), forward: bool) -> usize {
    if forward {
        if value >= max { min } else { value + 1 }
    } else if value <= min {
        max
    } else {
        value - 1
    }
}
