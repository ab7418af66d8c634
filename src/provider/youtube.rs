use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::provider::http::{self, DEFAULT_TIMEOUT};
use crate::provider::transcript::unescape_html;
use crate::provider::{ProviderError, VideoSearch, VideoSummary};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

pub const DURATION_UNAVAILABLE: &str = "N/A";

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
});

/// `PT1H2M3S` -> `1:02:03`, `PT5M30S` -> `5:30`; anything else -> `N/A`.
pub fn format_iso_duration(raw: &str) -> String {
    let Some(caps) = ISO_DURATION.captures(raw) else {
        return DURATION_UNAVAILABLE.to_string();
    };
    let field = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let (Some(h), Some(m), Some(s)) = (field(1), field(2), field(3)) else {
        return DURATION_UNAVAILABLE.to_string();
    };
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

/// Search results without durations (filled in from a second request).
pub fn parse_search_response(body: &str) -> Result<Vec<VideoSummary>, ProviderError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    Ok(response
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id?;
            let snippet = item.snippet;
            let thumbnail_url = ["high", "medium", "default"]
                .iter()
                .find_map(|size| snippet.thumbnails.get(*size))
                .map(|t| t.url.clone())
                .unwrap_or_default();
            Some(VideoSummary {
                id,
                title: unescape_html(&snippet.title),
                channel: unescape_html(&snippet.channel_title),
                thumbnail_url,
                duration: DURATION_UNAVAILABLE.to_string(),
                published: snippet.published_at.chars().take(10).collect(),
            })
        })
        .collect())
}

/// Video id -> display duration.
pub fn parse_durations(body: &str) -> Result<HashMap<String, String>, ProviderError> {
    let response: VideosResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    Ok(response
        .items
        .into_iter()
        .map(|item| (item.id, format_iso_duration(&item.content_details.duration)))
        .collect())
}

/// YouTube Data API v3 search.
pub struct YouTubeSearch {
    api_key: Option<String>,
    timeout: Duration,
}

impl YouTubeSearch {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl VideoSearch for YouTubeSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoSummary>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("youtube_api_key"))?;
        let max = max_results.to_string();
        let body = http::get_text(
            SEARCH_URL,
            &[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", max.as_str()),
                ("q", query),
                ("key", key),
            ],
            self.timeout,
        )?;
        let mut videos = parse_search_response(&body)?;
        if videos.is_empty() {
            return Ok(videos);
        }

        let ids = videos
            .iter()
            .map(|v| v.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let durations = http::get_text(
            VIDEOS_URL,
            &[("part", "contentDetails"), ("id", ids.as_str()), ("key", key)],
            self.timeout,
        )
        .and_then(|body| parse_durations(&body));
        match durations {
            Ok(durations) => {
                for video in &mut videos {
                    if let Some(d) = durations.get(&video.id) {
                        video.duration = d.clone();
                    }
                }
            }
            Err(err) => log::warn!("could not fetch video durations: {err}"),
        }
        log::info!("search {query:?} returned {} videos", videos.len());
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(format_iso_duration("PT5M30S"), "5:30");
        assert_eq!(format_iso_duration("PT1H"), "1:00:00");
        assert_eq!(format_iso_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_iso_duration("PT45S"), "0:45");
        assert_eq!(format_iso_duration("PT12M"), "12:00");
    }

    #[test]
    fn unparseable_duration_is_unavailable() {
        assert_eq!(format_iso_duration(""), "N/A");
        assert_eq!(format_iso_duration("P0D"), "N/A");
        assert_eq!(format_iso_duration("five minutes"), "N/A");
        assert_eq!(format_iso_duration("PT99999999999999999999999S"), "N/A");
    }

    #[test]
    fn parses_search_items() {
        let body = r#"{
            "items": [
                {
                    "id": {"kind": "youtube#video", "videoId": "abc123"},
                    "snippet": {
                        "title": "오늘의 한국어 &amp; 문화",
                        "channelTitle": "Talk &#39;Korean&#39;",
                        "publishedAt": "2024-03-01T12:00:00Z",
                        "thumbnails": {
                            "default": {"url": "https://i.ytimg.com/vi/abc123/default.jpg"},
                            "high": {"url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg"}
                        }
                    }
                },
                {
                    "id": {"kind": "youtube#channel", "channelId": "UCxyz"},
                    "snippet": {"title": "channel"}
                }
            ]
        }"#;
        let videos = parse_search_response(body).unwrap();
        assert_eq!(videos.len(), 1);
        let v = &videos[0];
        assert_eq!(v.id, "abc123");
        assert_eq!(v.title, "오늘의 한국어 & 문화");
        assert_eq!(v.channel, "Talk 'Korean'");
        assert_eq!(v.published, "2024-03-01");
        assert_eq!(v.thumbnail_url, "https://i.ytimg.com/vi/abc123/hqdefault.jpg");
        assert_eq!(v.duration, "N/A");
    }

    #[test]
    fn empty_search_body() {
        assert!(parse_search_response("{}").unwrap().is_empty());
        assert!(matches!(
            parse_search_response("<html>"),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn parses_durations() {
        let body = r#"{"items": [
            {"id": "a", "contentDetails": {"duration": "PT3M7S"}},
            {"id": "b", "contentDetails": {"duration": "P0D"}}
        ]}"#;
        let durations = parse_durations(body).unwrap();
        assert_eq!(durations["a"], "3:07");
        assert_eq!(durations["b"], "N/A");
    }

    #[test]
    fn search_without_key_fails_fast() {
        let search = YouTubeSearch::new(Some("  ".to_string()));
        assert!(matches!(
            search.search("한국어", 5),
            Err(ProviderError::MissingApiKey(_))
        ));
    }
}
