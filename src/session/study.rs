use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::engine::blanks::{BlankCache, BlankState};
use crate::engine::evaluate::{Evaluation, Evaluator, ExerciseMode};
use crate::provider::{Segment, VideoSummary};
use crate::session::ledger::{AttemptLedger, AttemptRecord};
use crate::session::navigator::{Navigator, PlaybackRequest};

/// Last submitted answer for a segment, kept across navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckState {
    pub mode: ExerciseMode,
    pub user_input: String,
    pub evaluation: Evaluation,
}

/// Everything tied to the video currently being studied.
pub struct StudySession {
    video: VideoSummary,
    segments: Vec<Segment>,
    navigator: Navigator,
    blanks: BlankCache,
    checks: HashMap<usize, CheckState>,
    rng: SmallRng,
}

impl StudySession {
    pub fn new(video: VideoSummary, mut segments: Vec<Segment>, shuffle: bool, mut rng: SmallRng) -> Self {
        if shuffle {
            segments.shuffle(&mut rng);
        }
        let navigator = Navigator::new(segments.len());
        Self {
            video,
            segments,
            navigator,
            blanks: BlankCache::default(),
            checks: HashMap::new(),
            rng,
        }
    }

    pub fn from_entropy(video: VideoSummary, segments: Vec<Segment>, shuffle: bool) -> Self {
        Self::new(video, segments, shuffle, SmallRng::from_entropy())
    }

    pub fn video(&self) -> &VideoSummary {
        &self.video
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn is_complete(&self) -> bool {
        self.navigator.is_complete()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.navigator.current()
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.navigator.current().and_then(|i| self.segments.get(i))
    }

    /// Blanks for the active segment, generated once per visit.
    pub fn blanks(&mut self, max_blanks: usize) -> Option<&BlankState> {
        let index = self.navigator.current()?;
        let segment = self.segments.get(index)?;
        Some(
            self.blanks
                .get_or_generate(index, &segment.text, max_blanks, &mut self.rng),
        )
    }

    /// Blanks already generated for the active segment.
    pub fn peek_blanks(&self) -> Option<&BlankState> {
        self.navigator.current().and_then(|i| self.blanks.peek(i))
    }

    pub fn playback(&self) -> Option<PlaybackRequest> {
        self.current_segment()
            .map(|segment| PlaybackRequest::for_segment(&self.video.id, segment, &self.navigator))
    }

    pub fn take_autoplay(&mut self) -> bool {
        self.navigator.take_autoplay()
    }

    /// Grade `input` against the active segment and append exactly one
    /// record to `ledger`.
    pub fn submit(
        &mut self,
        mode: ExerciseMode,
        max_blanks: usize,
        input: &str,
        evaluator: &Evaluator<'_>,
        ledger: &mut AttemptLedger,
    ) -> Option<&Evaluation> {
        self.submit_on(Local::now().date_naive(), mode, max_blanks, input, evaluator, ledger)
    }

    pub fn submit_on(
        &mut self,
        date: NaiveDate,
        mode: ExerciseMode,
        max_blanks: usize,
        input: &str,
        evaluator: &Evaluator<'_>,
        ledger: &mut AttemptLedger,
    ) -> Option<&Evaluation> {
        let index = self.navigator.current()?;
        let segment = self.segments.get(index)?;
        let answers = match mode {
            ExerciseMode::Blank => self
                .blanks
                .get_or_generate(index, &segment.text, max_blanks, &mut self.rng)
                .answers
                .clone(),
            ExerciseMode::Full => Vec::new(),
        };

        let evaluation = evaluator.evaluate(mode, &segment.text, &answers, input);
        log::info!(
            "segment {} ({}) submitted in {} mode: {}",
            index + 1,
            segment.timestamp_label(),
            mode.as_str(),
            if evaluation.correct { "correct" } else { "incorrect" }
        );
        ledger.append(AttemptRecord::new(
            date,
            &self.video.title,
            segment,
            mode,
            input,
            &answers,
            &evaluation,
        ));
        self.checks.insert(
            index,
            CheckState {
                mode,
                user_input: input.to_string(),
                evaluation,
            },
        );
        self.checks.get(&index).map(|check| &check.evaluation)
    }

    /// Stored result for redrawing; never touches the ledger.
    pub fn feedback(&self, index: usize) -> Option<&CheckState> {
        self.checks.get(&index)
    }

    pub fn current_feedback(&self) -> Option<&CheckState> {
        self.navigator.current().and_then(|i| self.feedback(i))
    }

    pub fn prev(&mut self) -> bool {
        let moved = self.navigator.prev();
        if moved {
            self.blanks.invalidate();
        }
        moved
    }

    pub fn next(&mut self) -> bool {
        let moved = self.navigator.next();
        if moved {
            self.blanks.invalidate();
        }
        moved
    }

    pub fn replay(&mut self) {
        self.navigator.replay();
    }

    pub fn restart(&mut self) -> bool {
        let moved = self.navigator.restart();
        if moved {
            self.blanks.invalidate();
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::rules::RuleTokenizer;

    fn session(shuffle: bool) -> StudySession {
        let video = VideoSummary {
            id: "vid".into(),
            title: "한국어 수업".into(),
            ..Default::default()
        };
        let segments = vec![
            Segment::new("안녕하세요 여러분", 0.0, 2.0),
            Segment::new("사과가 정말 맛있다", 2.0, 3.0),
            Segment::new("오늘은 날씨가 좋네요", 5.0, 2.5),
        ];
        StudySession::new(video, segments, shuffle, SmallRng::seed_from_u64(7))
    }

    #[test]
    fn feedback_does_not_touch_ledger() {
        let tokenizer = RuleTokenizer;
        let evaluator = Evaluator::new(&tokenizer);
        let mut ledger = AttemptLedger::new();
        let mut s = session(false);

        let correct = s
            .submit(ExerciseMode::Full, 2, "안녕하세요 여러분.", &evaluator, &mut ledger)
            .map(|e| e.correct);
        assert_eq!(correct, Some(true));
        assert_eq!(ledger.len(), 1);

        for _ in 0..5 {
            assert!(s.feedback(0).is_some());
            assert!(s.current_feedback().is_some());
        }
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn each_submit_appends_one_record() {
        let tokenizer = RuleTokenizer;
        let evaluator = Evaluator::new(&tokenizer);
        let mut ledger = AttemptLedger::new();
        let mut s = session(false);

        s.submit(ExerciseMode::Full, 2, "틀린 답", &evaluator, &mut ledger);
        s.submit(ExerciseMode::Full, 2, "안녕하세요 여러분", &evaluator, &mut ledger);
        assert_eq!(ledger.len(), 2);
        assert!(!ledger.records()[0].correct);
        assert!(ledger.records()[1].correct);
        assert_eq!(s.feedback(0).map(|c| c.user_input.as_str()), Some("안녕하세요 여러분"));
    }

    #[test]
    fn blank_submit_uses_displayed_blanks() {
        let tokenizer = RuleTokenizer;
        let evaluator = Evaluator::new(&tokenizer);
        let mut ledger = AttemptLedger::new();
        let mut s = session(false);

        let answers = s.blanks(2).map(|b| b.answers.clone()).unwrap_or_default();
        assert_eq!(answers.len(), 2);
        let evaluation = s
            .submit(ExerciseMode::Blank, 2, &answers.join(" "), &evaluator, &mut ledger)
            .cloned();
        assert_eq!(evaluation.map(|e| e.correct), Some(true));
        assert_eq!(ledger.records()[0].blank_words, answers);
    }

    #[test]
    fn blanks_are_stable_until_index_changes() {
        let mut s = session(false);
        s.next();
        let first = s.blanks(1).cloned();
        let again = s.blanks(1).cloned();
        assert_eq!(first, again);
        assert_eq!(first.map(|b| b.segment_index), Some(1));

        s.prev();
        assert_eq!(s.blanks(1).map(|b| b.segment_index), Some(0));
    }

    #[test]
    fn feedback_survives_navigation() {
        let tokenizer = RuleTokenizer;
        let evaluator = Evaluator::new(&tokenizer);
        let mut ledger = AttemptLedger::new();
        let mut s = session(false);

        s.submit(ExerciseMode::Full, 2, "안녕", &evaluator, &mut ledger);
        s.next();
        assert!(s.current_feedback().is_none());
        s.prev();
        assert_eq!(s.current_feedback().map(|c| c.user_input.as_str()), Some("안녕"));
    }

    #[test]
    fn complete_session_has_no_segment() {
        let tokenizer = RuleTokenizer;
        let evaluator = Evaluator::new(&tokenizer);
        let mut ledger = AttemptLedger::new();
        let mut s = session(false);
        while s.next() {}
        assert!(s.is_complete());
        assert!(s.current_segment().is_none());
        assert!(s.blanks(2).is_none());
        assert!(s.submit(ExerciseMode::Full, 2, "x", &evaluator, &mut ledger).is_none());
        assert!(ledger.is_empty());
        assert!(s.restart());
        assert_eq!(s.current_index(), Some(0));
    }

    #[test]
    fn shuffle_keeps_all_segments() {
        let s = session(true);
        let mut texts: Vec<&str> = s.segments().iter().map(|seg| seg.text.as_str()).collect();
        texts.sort_unstable();
        assert_eq!(texts.len(), 3);
        assert!(texts.contains(&"사과가 정말 맛있다"));
    }
}
