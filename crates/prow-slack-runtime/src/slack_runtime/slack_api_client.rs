//! Slack Web API client helpers used by thread lookup and posting flows.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::slack_text_helpers::truncate_for_error;

const SLACK_USER_AGENT: &str = "prow-notify";
const ERROR_BODY_MAX_CHARS: usize = 800;
const THREAD_BROADCAST_SUBTYPE: &str = "thread_broadcast";

#[derive(Debug, Error)]
/// Failure of a single Slack Web API call.
pub enum SlackApiError {
    #[error("failed to create slack api client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("slack api {operation} timed out")]
    Timeout { operation: &'static str },
    #[error("slack api {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("slack api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode slack {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("slack {operation} failed: {error}")]
    Api {
        operation: &'static str,
        error: String,
    },
}

impl SlackApiError {
    /// Slack error code from a `"ok": false` acknowledgment.
    pub fn api_error(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SlackHistoryResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<SlackHistoryMessage>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackChatMessageResponse {
    ok: bool,
    ts: Option<String>,
    channel: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One top-level entry of `conversations.history`.
pub struct SlackHistoryMessage {
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl SlackHistoryMessage {
    /// Whether this entry anchors its own thread (or can anchor one).
    pub fn is_thread_root(&self) -> bool {
        if self.subtype.as_deref() == Some(THREAD_BROADCAST_SUBTYPE) {
            return false;
        }
        self.thread_ts
            .as_deref()
            .map_or(true, |thread_ts| thread_ts == self.ts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Acknowledged `chat.postMessage` result.
pub struct SlackPostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Clone)]
/// Bearer-authenticated Slack Web API client with a bounded request timeout.
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackApiClient {
    pub fn new(
        api_base: String,
        bot_token: String,
        request_timeout_ms: u64,
    ) -> Result<Self, SlackApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(SLACK_USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .map_err(SlackApiError::Client)?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
        })
    }

    pub async fn conversation_history(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<SlackHistoryMessage>, SlackApiError> {
        let limit = limit.max(1).to_string();
        let response: SlackHistoryResponse = self
            .request_json(
                "conversations.history",
                self.http
                    .get(format!("{}/conversations.history", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .query(&[("channel", channel), ("limit", limit.as_str())]),
            )
            .await?;

        if !response.ok {
            return Err(SlackApiError::Api {
                operation: "conversations.history",
                error: response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(response.messages)
    }

    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<SlackPostedMessage, SlackApiError> {
        let mut payload = json!({
            "channel": channel,
            "text": text,
            "unfurl_links": false,
            "unfurl_media": false,
        });
        if let Some(thread_ts) = thread_ts.map(str::trim).filter(|value| !value.is_empty()) {
            payload["thread_ts"] = Value::String(thread_ts.to_string());
        }

        let response: SlackChatMessageResponse = self
            .request_json(
                "chat.postMessage",
                self.http
                    .post(format!("{}/chat.postMessage", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .json(&payload),
            )
            .await?;

        if !response.ok {
            return Err(SlackApiError::Api {
                operation: "chat.postMessage",
                error: response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(SlackPostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts: response
                .ts
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| SlackApiError::Api {
                    operation: "chat.postMessage",
                    error: "response missing ts".to_string(),
                })?,
        })
    }

    async fn request_json<T>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SlackApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|source| {
            if source.is_timeout() {
                SlackApiError::Timeout { operation }
            } else {
                SlackApiError::Transport { operation, source }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackApiError::HttpStatus {
                operation,
                status: status.as_u16(),
                body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| SlackApiError::Decode { operation, source })
    }
}
