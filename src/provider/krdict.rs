use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::provider::http;
use crate::provider::{DictionaryEntry, DictionarySource, ProviderError};

const SEARCH_URL: &str = "https://krdict.korean.go.kr/api/search";

/// krdict `trans_lang` codes for the UI languages we translate into.
pub fn trans_lang_code(lang: &str) -> Option<&'static str> {
    match lang {
        "en" => Some("1"),
        "ja" => Some("2"),
        "fr" => Some("3"),
        "es" => Some("4"),
        "ar" => Some("5"),
        "mn" => Some("6"),
        "vi" => Some("7"),
        "th" => Some("8"),
        "id" => Some("9"),
        "ru" => Some("10"),
        "zh" => Some("11"),
        _ => None,
    }
}

#[derive(Default)]
struct PartialEntry {
    headword: Option<String>,
    senses_seen: usize,
    entry: DictionaryEntry,
    has_sense: bool,
}

/// Parse a krdict search response, keeping the first sense of each item.
pub fn parse_search_xml(
    xml: &str,
    query: &str,
    max_results: usize,
) -> Result<Vec<DictionaryEntry>, ProviderError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut item: Option<PartialEntry> = None;
    let mut translation_seen = false;
    let mut error_message: Option<String> = None;
    let mut results = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "item" => item = Some(PartialEntry::default()),
                    "sense" => {
                        if let Some(ref mut partial) = item {
                            partial.senses_seen += 1;
                            translation_seen = false;
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                match name.as_str() {
                    "item" => {
                        if let Some(partial) = item.take().filter(|p| p.has_sense) {
                            let mut entry = partial.entry;
                            entry.headword = partial.headword.unwrap_or_else(|| query.to_string());
                            results.push(entry);
                        }
                    }
                    "translation" => translation_seen = true,
                    _ => {}
                }
            }
            Ok(event @ (Event::Text(_) | Event::CData(_))) => {
                let text = match event {
                    Event::Text(e) => e
                        .unescape()
                        .map_err(|err| ProviderError::Malformed(err.to_string()))?
                        .to_string(),
                    Event::CData(e) => String::from_utf8_lossy(&e.into_inner()).to_string(),
                    _ => continue,
                };
                let current = path.last().map(String::as_str).unwrap_or("");
                let parent = path
                    .len()
                    .checked_sub(2)
                    .map(|i| path[i].as_str())
                    .unwrap_or("");

                if current == "message" && parent == "error" {
                    error_message = Some(text);
                    continue;
                }
                let Some(ref mut partial) = item else {
                    continue;
                };
                let in_first_sense = partial.senses_seen == 1 && path.iter().any(|p| p == "sense");
                match current {
                    "word" if parent == "item" => partial.headword = Some(text),
                    "definition" if in_first_sense => {
                        partial.entry.definition = text;
                        partial.has_sense = true;
                    }
                    "trans_word" if in_first_sense && !translation_seen => {
                        partial.entry.translated_word = text;
                    }
                    "trans_dfn" if in_first_sense && !translation_seen => {
                        partial.entry.translated_definition = text;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ProviderError::Malformed(format!("krdict: {err}"))),
            _ => {}
        }
    }

    if let Some(message) = error_message {
        return Err(ProviderError::Malformed(format!("krdict: {message}")));
    }
    results.truncate(max_results);
    Ok(results)
}

/// Korean Basic Dictionary (krdict.korean.go.kr) open API.
pub struct Krdict {
    api_key: Option<String>,
    timeout: Duration,
}

impl Krdict {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
        }
    }
}

impl DictionarySource for Krdict {
    fn lookup(
        &self,
        word: &str,
        lang: &str,
        max_results: usize,
    ) -> Result<Vec<DictionaryEntry>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("krdict_api_key"))?;
        let mut query = vec![("key", key), ("q", word)];
        if let Some(code) = trans_lang_code(lang) {
            query.push(("translated", "y"));
            query.push(("trans_lang", code));
        }
        let xml = http::get_text(SEARCH_URL, &query, self.timeout)?;
        parse_search_xml(&xml, word, max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<channel>
  <title>한국어 기초사전 개발 지원(Open API) - 사전 검색</title>
  <total>2</total>
  <item>
    <target_code>12345</target_code>
    <word>사과</word>
    <pos>명사</pos>
    <sense>
      <sense_order>1</sense_order>
      <definition>사과나무의 열매.</definition>
      <translation>
        <trans_lang>영어</trans_lang>
        <trans_word><![CDATA[apple]]></trans_word>
        <trans_dfn>The fruit of an apple tree.</trans_dfn>
      </translation>
    </sense>
    <sense>
      <sense_order>2</sense_order>
      <definition>두 번째 뜻.</definition>
    </sense>
  </item>
  <item>
    <target_code>67890</target_code>
    <word>사과</word>
    <sense>
      <sense_order>1</sense_order>
      <definition>자기의 잘못을 인정하고 용서를 빎.</definition>
      <translation>
        <trans_lang>영어</trans_lang>
        <trans_word>apology</trans_word>
        <trans_dfn>The act of admitting one&apos;s fault.</trans_dfn>
      </translation>
    </sense>
  </item>
  <item>
    <word>뜻없음</word>
  </item>
</channel>"#;

    #[test]
    fn keeps_first_sense_per_item() {
        let entries = parse_search_xml(RESPONSE, "사과", 3).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].headword, "사과");
        assert_eq!(entries[0].translated_word, "apple");
        assert_eq!(entries[0].definition, "사과나무의 열매.");
        assert_eq!(entries[0].translated_definition, "The fruit of an apple tree.");
        assert_eq!(entries[1].definition, "자기의 잘못을 인정하고 용서를 빎.");
        assert_eq!(entries[1].translated_word, "apology");
        assert_eq!(entries[1].translated_definition, "The act of admitting one's fault.");
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_search_xml(RESPONSE, "사과", 1).unwrap().len(), 1);
    }

    #[test]
    fn empty_channel_has_no_entries() {
        let xml = "<channel><total>0</total></channel>";
        assert!(parse_search_xml(xml, "없는말", 3).unwrap().is_empty());
    }

    #[test]
    fn api_error_is_reported() {
        let xml = "<error><error_code>020</error_code><message>등록되지 않은 인증 키입니다.</message></error>";
        let err = parse_search_xml(xml, "사과", 3).unwrap_err();
        assert!(err.to_string().contains("등록되지 않은 인증 키"));
    }

    #[test]
    fn translation_languages() {
        assert_eq!(trans_lang_code("en"), Some("1"));
        assert_eq!(trans_lang_code("zh"), Some("11"));
        assert_eq!(trans_lang_code("ko"), None);
    }

    #[test]
    fn lookup_without_key_fails() {
        let dict = Krdict::new(None, Duration::from_secs(5));
        assert!(matches!(
            dict.lookup("사과", "en", 3),
            Err(ProviderError::MissingApiKey(_))
        ));
    }
}
