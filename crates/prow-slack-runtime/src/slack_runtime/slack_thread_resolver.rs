//! Lookup of the day's notification thread in a channel.

use chrono::{DateTime, NaiveDate};

use super::slack_api_client::{SlackApiClient, SlackHistoryMessage};
use super::SlackRuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Existing conversation thread anchored by its root message timestamp.
pub struct ThreadHandle {
    pub channel_id: String,
    pub thread_ts: String,
}

/// UTC calendar date of a Slack message timestamp such as `"1697443200.000100"`.
pub fn slack_ts_date(ts: &str) -> Option<NaiveDate> {
    let seconds = ts.trim().split('.').next()?.parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0).map(|instant| instant.date_naive())
}

/// Picks the most recent thread root created on `today` (UTC).
///
/// `messages` must be in the newest-first order returned by
/// `conversations.history`; the first matching root wins.
pub fn resolve_today_thread(
    channel_id: &str,
    messages: &[SlackHistoryMessage],
    today: NaiveDate,
) -> Result<ThreadHandle, SlackRuntimeError> {
    for message in messages {
        if !message.is_thread_root() {
            continue;
        }
        let Some(created_on) = slack_ts_date(&message.ts) else {
            tracing::warn!(ts = %message.ts, "skipping history entry with unparsable ts");
            continue;
        };
        if created_on == today {
            return Ok(ThreadHandle {
                channel_id: channel_id.to_string(),
                thread_ts: message.ts.clone(),
            });
        }
    }

    Err(SlackRuntimeError::ThreadNotFound {
        channel_id: channel_id.to_string(),
        date: today,
        scanned: messages.len(),
    })
}

#[derive(Clone)]
/// Resolves today's thread from live channel history.
pub struct SlackThreadResolver {
    client: SlackApiClient,
    history_limit: usize,
}

impl SlackThreadResolver {
    pub fn new(client: SlackApiClient, history_limit: usize) -> Self {
        Self {
            client,
            history_limit: history_limit.max(1),
        }
    }

    pub async fn resolve(
        &self,
        channel_id: &str,
        today: NaiveDate,
    ) -> Result<ThreadHandle, SlackRuntimeError> {
        let mut messages = self
            .client
            .conversation_history(channel_id, self.history_limit)
            .await
            .map_err(SlackRuntimeError::HistoryFailed)?;
        messages.truncate(self.history_limit);

        let handle = resolve_today_thread(channel_id, &messages, today)?;
        tracing::info!(
            channel_id,
            thread_ts = %handle.thread_ts,
            scanned = messages.len(),
            "resolved today's thread"
        );
        Ok(handle)
    }
}
