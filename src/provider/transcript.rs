use std::sync::LazyLock;
use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::provider::http::{self, DEFAULT_TIMEOUT};
use crate::provider::{ProviderError, Segment, SubtitleSource};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const KOREAN: &str = "ko";

static INNERTUBE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("key pattern is valid")
});
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Decode HTML character references, leaving the text untouched if it
/// contains something that is not a valid reference.
pub fn unescape_html(text: &str) -> String {
    quick_xml::escape::unescape(text)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| text.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// Auto-generated (ASR) track.
    pub generated: bool,
}

#[derive(Deserialize)]
struct PlayerResponse {
    captions: Option<Captions>,
}

#[derive(Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TrackList>,
}

#[derive(Deserialize)]
struct TrackList {
    #[serde(rename = "captionTracks", default)]
    tracks: Vec<RawTrack>,
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

pub fn extract_innertube_key(watch_html: &str) -> Option<String> {
    INNERTUBE_KEY
        .captures(watch_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Caption tracks listed in an innertube player response. A video without a
/// caption section has no subtitles at all.
pub fn parse_caption_tracks(body: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
    let response: PlayerResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    let tracks = response
        .captions
        .and_then(|c| c.renderer)
        .map(|r| r.tracks)
        .unwrap_or_default();
    Ok(tracks
        .into_iter()
        .map(|t| CaptionTrack {
            base_url: t.base_url.replace("&fmt=srv3", ""),
            language_code: t.language_code,
            generated: t.kind.as_deref() == Some("asr"),
        })
        .collect())
}

/// Manually created Korean track first, auto-generated as a fallback.
pub fn select_korean(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let korean = || tracks.iter().filter(|t| t.language_code == KOREAN);
    korean()
        .find(|t| !t.generated)
        .or_else(|| korean().find(|t| t.generated))
}

fn timing(element: &BytesStart<'_>) -> (f64, f64) {
    let mut start = 0.0;
    let mut duration = 0.0;
    for attr in element.attributes().flatten() {
        let value = attr
            .unescape_value()
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok());
        match (attr.key.as_ref(), value) {
            (b"start", Some(v)) => start = v,
            (b"dur", Some(v)) => duration = v,
            _ => {}
        }
    }
    (start, duration)
}

fn clean_line(raw: &str) -> String {
    let decoded = unescape_html(raw);
    let stripped = MARKUP_TAG.replace_all(&decoded, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a timed-text document (`<transcript><text start dur>..</text>`).
/// Lines that are empty after cleanup are dropped.
pub fn parse_timed_text(xml: &str) -> Result<Vec<Segment>, ProviderError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut segments = Vec::new();
    let mut current: Option<(f64, f64, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let (start, duration) = timing(e);
                current = Some((start, duration, String::new()));
            }
            Ok(Event::Text(e)) => {
                if let Some((_, _, ref mut text)) = current {
                    let chunk = e
                        .unescape()
                        .map_err(|err| ProviderError::Malformed(err.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                if let Some((start, duration, raw)) = current.take() {
                    let line = clean_line(&raw);
                    if !line.is_empty() {
                        segments.push(Segment::new(line, start, duration));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ProviderError::Malformed(format!("timed text: {err}"))),
            _ => {}
        }
    }

    Ok(segments)
}

/// Korean subtitles through the same endpoints the YouTube web player uses.
pub struct YouTubeCaptions {
    timeout: Duration,
}

impl YouTubeCaptions {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
        let html = http::get_text(WATCH_URL, &[("v", video_id)], self.timeout)?;
        let key = extract_innertube_key(&html)
            .ok_or_else(|| ProviderError::Malformed("watch page has no player key".into()))?;
        let body = json!({
            "context": {"client": {"clientName": "ANDROID", "clientVersion": "20.10.38"}},
            "videoId": video_id,
        });
        let response = http::post_json(&format!("{PLAYER_URL}?key={key}"), &body, self.timeout)?;
        parse_caption_tracks(&response)
    }
}

impl Default for YouTubeCaptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleSource for YouTubeCaptions {
    fn fetch_korean(&self, video_id: &str) -> Result<Vec<Segment>, ProviderError> {
        let tracks = self.caption_tracks(video_id)?;
        let track = select_korean(&tracks).ok_or(ProviderError::NoSubtitles)?;
        log::debug!(
            "using {} Korean track for {video_id}",
            if track.generated { "generated" } else { "manual" }
        );
        let xml = http::get_text(&track.base_url, &[], self.timeout)?;
        let segments = parse_timed_text(&xml)?;
        if segments.is_empty() {
            return Err(ProviderError::NoSubtitles);
        }
        log::info!("fetched {} segments for {video_id}", segments.len());
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(code: &str, generated: bool) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?lang={code}&asr={generated}"),
            language_code: code.to_string(),
            generated,
        }
    }

    #[test]
    fn prefers_manual_korean_track() {
        let tracks = vec![track("en", false), track("ko", true), track("ko", false)];
        let chosen = select_korean(&tracks).unwrap();
        assert!(!chosen.generated);
        assert_eq!(chosen.language_code, "ko");
    }

    #[test]
    fn falls_back_to_generated_korean() {
        let tracks = vec![track("en", false), track("ko", true)];
        assert!(select_korean(&tracks).unwrap().generated);
        assert!(select_korean(&[track("ja", false)]).is_none());
    }

    #[test]
    fn parses_player_response() {
        let body = r#"{
            "playabilityStatus": {"status": "OK"},
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://www.youtube.com/api/timedtext?v=x&lang=ko&fmt=srv3", "languageCode": "ko", "kind": "asr"},
                {"baseUrl": "https://www.youtube.com/api/timedtext?v=x&lang=en", "languageCode": "en"}
            ]}}
        }"#;
        let tracks = parse_caption_tracks(body).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=x&lang=ko");
        assert!(tracks[0].generated);
        assert!(!tracks[1].generated);
    }

    #[test]
    fn no_caption_section_means_no_tracks() {
        let tracks = parse_caption_tracks(r#"{"playabilityStatus": {"status": "OK"}}"#).unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn finds_innertube_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY":"AIzaSyA-test_key1","X":1});</script>"#;
        assert_eq!(extract_innertube_key(html).as_deref(), Some("AIzaSyA-test_key1"));
        assert_eq!(extract_innertube_key("<html></html>"), None);
    }

    #[test]
    fn parses_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.5" dur="2.1">안녕하세요</text>
            <text start="2.6" dur="1.9">오늘은 &amp;#39;날씨&amp;#39;가
좋네요</text>
            <text start="4.5" dur="1"></text>
            <text start="5.5" dur="2">&lt;i&gt;[음악]&lt;/i&gt;</text>
        </transcript>"#;
        let segments = parse_timed_text(xml).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new("안녕하세요", 0.5, 2.1),
                Segment::new("오늘은 '날씨'가 좋네요", 2.6, 1.9),
                Segment::new("[음악]", 5.5, 2.0),
            ]
        );
    }

    #[test]
    fn broken_timed_text_is_malformed() {
        let result = parse_timed_text("<transcript><text start=\"1\">열린</transcript>");
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }
}
