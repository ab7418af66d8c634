use crate::provider::Segment;

const EMBED_BASE: &str = "https://www.youtube.com/embed";

/// Position within a video's segment list. `index == len` is the terminal
/// (completed) state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigator {
    index: usize,
    len: usize,
    autoplay: bool,
    replay_count: u32,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len,
            autoplay: false,
            replay_count: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn replay_count(&self) -> u32 {
        self.replay_count
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.len
    }

    /// Active segment index, `None` once complete.
    pub fn current(&self) -> Option<usize> {
        (!self.is_complete()).then_some(self.index)
    }

    /// Returns whether the index moved.
    pub fn prev(&mut self) -> bool {
        if self.index == 0 || self.is_complete() {
            return false;
        }
        self.index -= 1;
        self.queue_playback();
        true
    }

    pub fn next(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.index += 1;
        self.queue_playback();
        true
    }

    pub fn replay(&mut self) {
        if !self.is_complete() {
            self.queue_playback();
        }
    }

    pub fn restart(&mut self) -> bool {
        if !self.is_complete() || self.len == 0 {
            return false;
        }
        self.index = 0;
        self.queue_playback();
        true
    }

    /// Consumes the autoplay flag; it applies to one render only.
    pub fn take_autoplay(&mut self) -> bool {
        std::mem::take(&mut self.autoplay)
    }

    fn queue_playback(&mut self) {
        self.autoplay = true;
        self.replay_count = self.replay_count.wrapping_add(1);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub url: String,
    pub start: u64,
    pub end: u64,
    pub autoplay: bool,
}

impl PlaybackRequest {
    pub fn for_segment(video_id: &str, segment: &Segment, navigator: &Navigator) -> Self {
        let (start, end) = segment.clip_range();
        let autoplay = navigator.autoplay();
        let url = format!(
            "{EMBED_BASE}/{video_id}?start={start}&end={end}&autoplay={}&cc_load_policy=3&iv_load_policy=3&rel=0&modestbranding=1&cb={}",
            u8::from(autoplay),
            navigator.replay_count()
        );
        Self {
            url,
            start,
            end,
            autoplay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_from_last_reaches_terminal() {
        let mut nav = Navigator::new(3);
        assert!(nav.next());
        assert!(nav.next());
        assert_eq!(nav.current(), Some(2));
        assert!(nav.next());
        assert!(nav.is_complete());
        assert_eq!(nav.index(), 3);
        assert_eq!(nav.current(), None);
        assert!(!nav.next());
        assert_eq!(nav.index(), 3);
    }

    #[test]
    fn prev_is_noop_at_start() {
        let mut nav = Navigator::new(2);
        assert!(!nav.prev());
        assert_eq!(nav.index(), 0);
        assert!(!nav.take_autoplay());
        assert_eq!(nav.replay_count(), 0);
    }

    #[test]
    fn restart_only_from_terminal() {
        let mut nav = Navigator::new(2);
        nav.next();
        assert!(!nav.restart());
        assert_eq!(nav.index(), 1);
        nav.next();
        assert!(nav.restart());
        assert_eq!(nav.index(), 0);
        assert!(!nav.is_complete());
    }

    #[test]
    fn autoplay_is_consumed_once() {
        let mut nav = Navigator::new(2);
        nav.replay();
        assert_eq!(nav.index(), 0);
        assert_eq!(nav.replay_count(), 1);
        assert!(nav.take_autoplay());
        assert!(!nav.take_autoplay());
        nav.next();
        assert_eq!(nav.replay_count(), 2);
        assert!(nav.autoplay());
    }

    #[test]
    fn empty_video_is_complete() {
        let mut nav = Navigator::new(0);
        assert!(nav.is_complete());
        assert!(!nav.restart());
    }

    #[test]
    fn embed_url_uses_clip_range() {
        let mut nav = Navigator::new(4);
        nav.replay();
        let segment = Segment::new("안녕하세요", 0.4, 2.0);
        let request = PlaybackRequest::for_segment("abc123", &segment, &nav);
        assert_eq!(request.start, 0);
        assert_eq!(request.end, 3);
        assert_eq!(
            request.url,
            "https://www.youtube.com/embed/abc123?start=0&end=3&autoplay=1&cc_load_policy=3&iv_load_policy=3&rel=0&modestbranding=1&cb=1"
        );
    }
}
