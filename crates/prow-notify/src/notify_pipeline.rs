//! Sequential fetch → extract → resolve → post pipeline.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use prow_fetch::{resolve_log_url, TextFetcher};
use prow_log_digest::{extract_result, ExtractionResult, JobOutcome};
use prow_slack_runtime::{NotificationMessage, SlackApiClient, SlackNotifier, SlackThreadResolver};

use crate::pipeline_config::{
    DeliveryConfig, DryRunFormat, PipelineConfig, PipelineMode, PostMode,
};

#[derive(Debug, Clone)]
/// Terminal state of a successful run.
pub enum PipelineOutcome {
    Posted {
        channel: String,
        ts: String,
        thread_ts: Option<String>,
    },
    NothingToReport {
        outcome: JobOutcome,
    },
    DryRun {
        format: DryRunFormat,
        result: ExtractionResult,
    },
}

impl PipelineOutcome {
    /// Human-readable status printed to stdout on exit 0.
    pub fn status_line(&self) -> Result<String> {
        Ok(match self {
            Self::Posted {
                channel,
                ts,
                thread_ts: Some(thread_ts),
            } => format!("posted summary to {channel} in thread {thread_ts} (ts={ts})"),
            Self::Posted {
                channel,
                ts,
                thread_ts: None,
            } => format!("posted summary to {channel} (ts={ts})"),
            Self::NothingToReport { outcome } => format!(
                "no reportable result, nothing sent (outcome={})",
                outcome.as_str()
            ),
            Self::DryRun {
                format: DryRunFormat::Json,
                result,
            } => serde_json::to_string_pretty(result)
                .context("failed to serialize extraction result")?,
            Self::DryRun {
                format: DryRunFormat::Text,
                result,
            } if result.message.is_empty() => {
                "no job state marker found in console log".to_string()
            }
            Self::DryRun {
                format: DryRunFormat::Text,
                result,
            } => result.message.trim_end_matches('\n').to_string(),
        })
    }
}

/// Runs one notification pass. Any fetch, thread resolution, or delivery
/// failure aborts the remaining steps.
pub async fn run_notify_pipeline(
    config: &PipelineConfig,
    fetcher: &dyn TextFetcher,
    today: NaiveDate,
) -> Result<PipelineOutcome> {
    let log_url = resolve_log_url(fetcher, &config.indirection_url, &config.log_url_template)
        .await
        .context("failed to resolve console log url")?;
    let raw_log = fetcher
        .fetch_text(&log_url)
        .await
        .context("failed to fetch console log")?;

    let result = extract_result(&raw_log, &config.extraction_policy);
    tracing::info!(
        outcome = result.outcome.as_str(),
        reportable = result.reportable,
        summary = ?result.summary_status,
        "extracted console log result"
    );

    let delivery = match &config.mode {
        PipelineMode::DryRun(format) => {
            return Ok(PipelineOutcome::DryRun {
                format: *format,
                result,
            })
        }
        PipelineMode::Deliver(delivery) => delivery,
    };

    if !result.reportable {
        return Ok(PipelineOutcome::NothingToReport {
            outcome: result.outcome,
        });
    }

    let text = result.message_within(delivery.max_message_chars);
    deliver(config, delivery, text, today).await
}

async fn deliver(
    config: &PipelineConfig,
    delivery: &DeliveryConfig,
    text: String,
    today: NaiveDate,
) -> Result<PipelineOutcome> {
    let client = SlackApiClient::new(
        delivery.api_base.clone(),
        delivery.bot_token.clone(),
        config.request_timeout_ms,
    )?;

    let thread_ts = match delivery.post_mode {
        PostMode::TodayThread => {
            let resolver = SlackThreadResolver::new(client.clone(), delivery.history_limit);
            let handle = resolver.resolve(&delivery.channel_id, today).await?;
            Some(handle.thread_ts)
        }
        PostMode::TopLevel => None,
    };

    let notifier = SlackNotifier::new(client, delivery.max_message_chars);
    let posted = notifier
        .notify(&NotificationMessage {
            channel_id: delivery.channel_id.clone(),
            text,
            thread_ts: thread_ts.clone(),
        })
        .await?;

    Ok(PipelineOutcome::Posted {
        channel: posted.channel,
        ts: posted.ts,
        thread_ts,
    })
}
