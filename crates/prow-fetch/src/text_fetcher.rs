use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

const FETCH_USER_AGENT: &str = "prow-notify";
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Error)]
/// Enumerates the ways a remote text document can fail to load.
pub enum FetchError {
    #[error("failed to create http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("fetch failed for {url}: request timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
    #[error("fetch failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetch failed for {url}: status {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("fetch failed for {url}: response body is not valid UTF-8")]
    Decode {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("fetch failed for {url}: indirection document is empty")]
    EmptyIndirection { url: String },
    #[error("log url template must contain exactly one `%s` placeholder: {template}")]
    InvalidTemplate { template: String },
}

impl FetchError {
    /// URL of the request that failed, when the failure is tied to one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Timeout { url, .. }
            | Self::Transport { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Decode { url, .. }
            | Self::EmptyIndirection { url } => Some(url),
            Self::Client(_) | Self::InvalidTemplate { .. } => None,
        }
    }
}

#[async_trait]
/// Trait contract for retrieving a remote document as text.
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Clone)]
/// Plain HTTP GET fetcher with a bounded per-request timeout.
pub struct HttpTextFetcher {
    http: reqwest::Client,
    request_timeout_ms: u64,
}

impl HttpTextFetcher {
    pub fn new(request_timeout_ms: u64) -> Result<Self, FetchError> {
        let request_timeout_ms = request_timeout_ms.max(1);
        let http = reqwest::Client::builder()
            .user_agent(FETCH_USER_AGENT)
            .timeout(Duration::from_millis(request_timeout_ms))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            http,
            request_timeout_ms,
        })
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.request_timeout_ms,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl TextFetcher for HttpTextFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!(url, "fetching remote text");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| self.transport_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(url, source))?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;
        tracing::info!(url, bytes = text.len(), "fetched remote text");
        Ok(text)
    }
}

/// Caps `value` at `max_chars` characters, marking the cut with `...`.
fn truncate_for_error(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
