use std::time::Duration;

use crate::provider::ProviderError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("ktube/", env!("CARGO_PKG_VERSION"));
const ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en;q=0.8";

#[cfg(feature = "network")]
fn client(timeout: Duration) -> Result<reqwest::blocking::Client, ProviderError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

#[cfg(feature = "network")]
fn from_reqwest(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if let Some(status) = err.status() {
        ProviderError::Status(status.as_u16())
    } else {
        ProviderError::Network(err.to_string())
    }
}

#[cfg(feature = "network")]
fn read_body(response: reqwest::blocking::Response) -> Result<String, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }
    response.text().map_err(from_reqwest)
}

/// Single blocking GET, no retries.
#[cfg(feature = "network")]
pub fn get_text(
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<String, ProviderError> {
    log::debug!("GET {url}");
    let response = client(timeout)?
        .get(url)
        .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
        .query(query)
        .send()
        .map_err(from_reqwest)?;
    read_body(response)
}

/// Single blocking JSON POST, no retries.
#[cfg(feature = "network")]
pub fn post_json(
    url: &str,
    body: &serde_json::Value,
    timeout: Duration,
) -> Result<String, ProviderError> {
    log::debug!("POST {url}");
    let response = client(timeout)?
        .post(url)
        .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
        .json(body)
        .send()
        .map_err(from_reqwest)?;
    read_body(response)
}

#[cfg(not(feature = "network"))]
pub fn get_text(
    _url: &str,
    _query: &[(&str, &str)],
    _timeout: Duration,
) -> Result<String, ProviderError> {
    let _ = (USER_AGENT, ACCEPT_LANGUAGE);
    Err(ProviderError::Disabled)
}

#[cfg(not(feature = "network"))]
pub fn post_json(
    _url: &str,
    _body: &serde_json::Value,
    _timeout: Duration,
) -> Result<String, ProviderError> {
    Err(ProviderError::Disabled)
}
