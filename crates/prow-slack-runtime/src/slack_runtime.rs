//! Thread resolution and message delivery against the Slack Web API.

use chrono::NaiveDate;
use thiserror::Error;

mod slack_api_client;
mod slack_notifier;
mod slack_text_helpers;
mod slack_thread_resolver;

pub use slack_api_client::{
    SlackApiClient, SlackApiError, SlackHistoryMessage, SlackPostedMessage,
};
pub use slack_notifier::{NotificationMessage, SlackNotifier, SLACK_MESSAGE_MAX_CHARS};
pub use slack_text_helpers::truncate_for_slack;
pub use slack_thread_resolver::{
    resolve_today_thread, slack_ts_date, SlackThreadResolver, ThreadHandle,
};

/// Default number of top-level channel messages scanned for today's thread.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error)]
/// Enumerates failures of the resolve-and-post protocol.
pub enum SlackRuntimeError {
    #[error("no thread found for {date} in channel {channel_id} (scanned {scanned} messages)")]
    ThreadNotFound {
        channel_id: String,
        date: NaiveDate,
        scanned: usize,
    },
    #[error("failed to read channel history: {0}")]
    HistoryFailed(#[source] SlackApiError),
    #[error("slack delivery failed: {0}")]
    DeliveryFailed(#[source] SlackApiError),
}
