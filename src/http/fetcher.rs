use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::errors::FetchError;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_USER_AGENT: &str = "finboard/0.1";

/// Source of JSON documents. The HTTP implementation is the only production
/// one; tests plug in scripted fetchers.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Plain GET against arbitrary endpoints. No auth, no retries.
#[derive(Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    timeout_ms: u64,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            timeout_ms: config.timeout_ms,
        })
    }

    fn map_reqwest(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_ms)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let url = validate_url(url)?;
        log_debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.map_reqwest(err))?;

        let status = resp.status();
        if !status.is_success() {
            log_warn!("GET {} returned {}", url, status);
            return Err(FetchError::Status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status").to_string(),
            ));
        }

        let body = resp.text().await.map_err(|err| self.map_reqwest(err))?;
        parse_body(&body)
    }
}

pub fn parse_body(body: &str) -> Result<Value, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Rejects empty input and anything that is not an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyUrl);
    }

    let url = Url::parse(trimmed).map_err(|err| FetchError::InvalidUrl(format!("{trimmed}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!(
            "{trimmed}: unsupported scheme '{other}'"
        ))),
    }
}
