use std::cell::RefCell;
use std::rc::Rc;

use ktube::app::{App, AppScreen, Providers, StatusKind};
use ktube::config::Config;
use ktube::engine::evaluate::ExerciseMode;
use ktube::provider::{
    DictionaryEntry, DictionarySource, ProviderError, Segment, SubtitleSource, VideoSearch,
    VideoSummary,
};
use ktube::tokenizer::rules::RuleTokenizer;
use rust_i18n::t;

rust_i18n::i18n!("locales", fallback = "en");

struct FakeSearch;

impl VideoSearch for FakeSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoSummary>, ProviderError> {
        let videos = (1..=3)
            .map(|i| VideoSummary {
                id: format!("vid{i}"),
                title: format!("{query} 브이로그 {i}"),
                channel: "채널".to_string(),
                thumbnail_url: String::new(),
                duration: "3:05".to_string(),
                published: "2024-05-17".to_string(),
            })
            .take(max_results)
            .collect();
        Ok(videos)
    }
}

struct FakeSubtitles;

impl SubtitleSource for FakeSubtitles {
    fn fetch_korean(&self, video_id: &str) -> Result<Vec<Segment>, ProviderError> {
        match video_id {
            "vid1" => Ok(vec![
                Segment::new("사과가 맛있다", 1.0, 2.0),
                Segment::new("안녕하세요 여러분", 3.5, 2.0),
            ]),
            "vid2" => Err(ProviderError::NoSubtitles),
            _ => Err(ProviderError::Timeout),
        }
    }
}

#[derive(Clone, Default)]
struct FakeDictionary {
    queries: Rc<RefCell<Vec<String>>>,
}

impl DictionarySource for FakeDictionary {
    fn lookup(
        &self,
        word: &str,
        _lang: &str,
        _max_results: usize,
    ) -> Result<Vec<DictionaryEntry>, ProviderError> {
        self.queries.borrow_mut().push(word.to_string());
        Ok(vec![DictionaryEntry {
            headword: word.to_string(),
            definition: format!("{word}의 뜻"),
            translated_word: "word".to_string(),
            translated_definition: "meaning".to_string(),
        }])
    }
}

fn app_with(config: Config, dictionary: FakeDictionary) -> App {
    let providers = Providers {
        search: Box::new(FakeSearch),
        subtitles: Box::new(FakeSubtitles),
        dictionary: Box::new(dictionary),
    };
    App::with_providers(config, providers, Box::new(RuleTokenizer))
}

fn config(mode: ExerciseMode) -> Config {
    let mut config = Config::default();
    config.exercise_mode = mode;
    config.max_blanks = 2;
    config.shuffle = false;
    config
}

fn open_first_video(app: &mut App) {
    app.search_input.set("먹방");
    app.search_enter();
    assert_eq!(app.search_results.len(), 3);
    app.search_enter();
    assert_eq!(app.screen, AppScreen::Study);
}

#[test]
fn full_mode_correct_answer_is_recorded_once() {
    let mut app = app_with(config(ExerciseMode::Full), FakeDictionary::default());
    open_first_video(&mut app);

    app.answer_input.set("사과가 맛있다!");
    app.submit_answer();
    assert_eq!(app.ledger.len(), 1);
    assert!(app.ledger.records()[0].correct);
    assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Success));

    // Redrawing does not submit again.
    for _ in 0..3 {
        app.prepare_blanks();
        app.refresh_playback();
    }
    assert_eq!(app.ledger.len(), 1);
}

#[test]
fn blank_mistake_looks_up_wrong_words() {
    let dictionary = FakeDictionary::default();
    let queries = dictionary.queries.clone();
    let mut app = app_with(config(ExerciseMode::Blank), dictionary);
    open_first_video(&mut app);

    app.prepare_blanks();
    app.answer_input.set("사과가 맛없다");
    app.submit_answer();

    let record = &app.ledger.records()[0];
    assert!(!record.correct);
    assert_eq!(record.blank_words, vec!["사과가", "맛있다"]);
    assert!(record.wrong_words.contains(&"맛있다".to_string()));
    assert!(queries.borrow().contains(&"맛있다".to_string()));
    assert!(!app.dictionary_results.is_empty());

    app.save_selected_word();
    app.save_selected_word();
    assert_eq!(app.vocabulary.len(), 1);
    assert_eq!(app.vocabulary.entries()[0].context, "사과가 맛있다");
    assert_eq!(app.vocabulary.entries()[0].translation, "meaning");
}

#[test]
fn navigation_reaches_complete_and_restarts() {
    let mut app = app_with(config(ExerciseMode::Full), FakeDictionary::default());
    open_first_video(&mut app);

    app.refresh_playback();
    assert!(app.playback.as_ref().is_some_and(|p| p.url.contains("vid1")));

    app.next_segment();
    app.refresh_playback();
    assert!(app.playback.as_ref().is_some_and(|p| p.autoplay && p.start == 2));

    app.next_segment();
    assert_eq!(app.screen, AppScreen::Complete);

    app.restart_session();
    assert_eq!(app.screen, AppScreen::Study);
    assert_eq!(app.session.as_ref().and_then(|s| s.current_index()), Some(0));
}

#[test]
fn previous_answer_is_restored_when_returning() {
    let mut app = app_with(config(ExerciseMode::Full), FakeDictionary::default());
    open_first_video(&mut app);

    app.answer_input.set("사과 맛있다");
    app.submit_answer();
    app.next_segment();
    assert!(app.answer_input.is_empty());
    app.prev_segment();
    assert_eq!(app.answer_input.value(), "사과 맛있다");
}

#[test]
fn missing_subtitles_keep_search_screen() {
    let mut app = app_with(config(ExerciseMode::Full), FakeDictionary::default());
    app.search_input.set("먹방");
    app.run_search();
    app.select_video(1);
    assert_eq!(app.screen, AppScreen::Search);
    assert!(app.session.is_none());
    let no_subtitles = app.status.clone().unwrap();
    assert_eq!(no_subtitles.kind, StatusKind::Error);
    assert_eq!(no_subtitles.text, t!("status.no_subtitles"));

    app.select_video(2);
    assert_eq!(app.screen, AppScreen::Search);
    let timeout = app.status.clone().unwrap();
    assert_eq!(timeout.kind, StatusKind::Error);
    assert_ne!(timeout.text, no_subtitles.text);
    assert!(timeout.text.contains("timed out"));
}

#[test]
fn exports_write_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(ExerciseMode::Full);
    cfg.export_dir = dir.path().to_string_lossy().to_string();
    let mut app = app_with(cfg, FakeDictionary::default());

    app.export_history();
    assert!(!dir.path().join("dictation_history.csv").exists());

    open_first_video(&mut app);
    app.answer_input.set("틀림");
    app.submit_answer();
    app.export_history();
    assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Success));

    let content = std::fs::read_to_string(dir.path().join("dictation_history.csv")).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("✗"));
}

#[test]
fn clearing_vocabulary_empties_the_book() {
    let mut app = app_with(config(ExerciseMode::Blank), FakeDictionary::default());
    open_first_video(&mut app);
    app.lookup_input.set("학교에서");
    app.lookup_manual();
    app.save_selected_word();
    assert_eq!(app.vocabulary.len(), 1);
    assert_eq!(app.vocabulary.entries()[0].word, "학교");

    app.go_to(AppScreen::Vocabulary);
    app.clear_vocabulary();
    assert!(app.vocabulary.is_empty());
}
