//! Posting of composed summaries with acknowledgment checks.

use super::slack_api_client::{SlackApiClient, SlackPostedMessage};
use super::slack_text_helpers::truncate_for_slack;
use super::SlackRuntimeError;

/// Upper bound on posted text, below Slack's 40k character message limit.
pub const SLACK_MESSAGE_MAX_CHARS: usize = 39_000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outbound payload for one notification.
pub struct NotificationMessage {
    pub channel_id: String,
    pub text: String,
    pub thread_ts: Option<String>,
}

#[derive(Clone)]
pub struct SlackNotifier {
    client: SlackApiClient,
    max_message_chars: usize,
}

impl SlackNotifier {
    pub fn new(client: SlackApiClient, max_message_chars: usize) -> Self {
        Self {
            client,
            max_message_chars: max_message_chars.max(1),
        }
    }

    /// Posts `message`, nested under its thread anchor when one is set.
    ///
    /// Transport errors, non-success statuses, and `"ok": false` bodies all
    /// surface as [`SlackRuntimeError::DeliveryFailed`]. Nothing is retried.
    pub async fn notify(
        &self,
        message: &NotificationMessage,
    ) -> Result<SlackPostedMessage, SlackRuntimeError> {
        let text = truncate_for_slack(&message.text, self.max_message_chars);
        let posted = self
            .client
            .post_message(&message.channel_id, &text, message.thread_ts.as_deref())
            .await
            .map_err(SlackRuntimeError::DeliveryFailed)?;
        tracing::info!(
            channel = %posted.channel,
            ts = %posted.ts,
            threaded = message.thread_ts.is_some(),
            "posted notification"
        );
        Ok(posted)
    }
}
