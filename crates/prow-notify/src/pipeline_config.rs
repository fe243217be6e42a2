//! Explicit run configuration built from CLI/environment inputs.

use anyhow::{bail, Context, Result};
use prow_cli::{Cli, CliDryRunFormat, CliPostMode};
use prow_fetch::format_log_url;
use prow_log_digest::ExtractionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostMode {
    /// Reply in the thread whose root was created today (UTC).
    TodayThread,
    TopLevel,
}

impl From<CliPostMode> for PostMode {
    fn from(value: CliPostMode) -> Self {
        match value {
            CliPostMode::Thread => PostMode::TodayThread,
            CliPostMode::Channel => PostMode::TopLevel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunFormat {
    Text,
    Json,
}

impl From<CliDryRunFormat> for DryRunFormat {
    fn from(value: CliDryRunFormat) -> Self {
        match value {
            CliDryRunFormat::Text => DryRunFormat::Text,
            CliDryRunFormat::Json => DryRunFormat::Json,
        }
    }
}

#[derive(Clone)]
/// Slack delivery settings for a run that posts.
pub struct DeliveryConfig {
    pub api_base: String,
    pub bot_token: String,
    pub channel_id: String,
    pub post_mode: PostMode,
    pub history_limit: usize,
    pub max_message_chars: usize,
}

impl std::fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("post_mode", &self.post_mode)
            .field("history_limit", &self.history_limit)
            .field("max_message_chars", &self.max_message_chars)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum PipelineMode {
    DryRun(DryRunFormat),
    Deliver(DeliveryConfig),
}

#[derive(Debug, Clone)]
/// Everything one pipeline run needs; the pipeline never reads the environment.
pub struct PipelineConfig {
    pub indirection_url: String,
    pub log_url_template: String,
    pub request_timeout_ms: u64,
    pub extraction_policy: ExtractionPolicy,
    pub mode: PipelineMode,
}

fn resolve_non_empty_cli_value(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl PipelineConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let indirection_url = cli.indirection_url.trim();
        if indirection_url.is_empty() {
            bail!("--indirection-url cannot be empty");
        }
        let log_url_template = cli.log_url_template.trim();
        format_log_url(log_url_template, "0").context("invalid --log-url-template")?;

        let mode = if cli.dry_run {
            PipelineMode::DryRun(cli.dry_run_format.into())
        } else {
            let Some(bot_token) = resolve_non_empty_cli_value(cli.slack_bot_token.as_deref())
            else {
                bail!("--slack-bot-token is required unless --dry-run is set");
            };
            let Some(channel_id) = resolve_non_empty_cli_value(cli.slack_channel_id.as_deref())
            else {
                bail!("--slack-channel-id is required unless --dry-run is set");
            };
            if cli.slack_api_base.trim().is_empty() {
                bail!("--slack-api-base cannot be empty");
            }
            PipelineMode::Deliver(DeliveryConfig {
                api_base: cli.slack_api_base.trim().to_string(),
                bot_token,
                channel_id,
                post_mode: cli.post_mode.into(),
                history_limit: cli.history_limit,
                max_message_chars: cli.max_message_chars,
            })
        };

        Ok(Self {
            indirection_url: indirection_url.to_string(),
            log_url_template: log_url_template.to_string(),
            request_timeout_ms: cli.request_timeout_ms,
            extraction_policy: ExtractionPolicy {
                report_on_success: cli.report_on_success,
                strip_control_sequences: cli.strip_control_sequences,
                require_summary_on_failure: cli.require_summary_on_failure,
            },
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use prow_cli::Cli;

    use super::{DryRunFormat, PipelineConfig, PipelineMode, PostMode};

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec![
            "prow-notify",
            "--indirection-url",
            "https://prow.example/latest-build.txt",
            "--log-url-template",
            "https://prow.example/logs/%s/build-log.txt",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).expect("cli parses")
    }

    #[test]
    fn functional_from_cli_builds_delivery_config() {
        let config = PipelineConfig::from_cli(&cli(&[
            "--slack-bot-token",
            " xoxb-test ",
            "--slack-channel-id",
            "C1",
            "--report-on-success",
        ]))
        .expect("config");
        assert!(config.extraction_policy.report_on_success);
        assert!(config.extraction_policy.strip_control_sequences);
        match config.mode {
            PipelineMode::Deliver(delivery) => {
                assert_eq!(delivery.bot_token, "xoxb-test");
                assert_eq!(delivery.channel_id, "C1");
                assert_eq!(delivery.post_mode, PostMode::TodayThread);
                assert_eq!(delivery.history_limit, 100);
                assert!(!format!("{delivery:?}").contains("xoxb-test"));
            }
            PipelineMode::DryRun(_) => panic!("expected delivery mode"),
        }
    }

    #[test]
    fn functional_from_cli_dry_run_needs_no_slack_credentials() {
        let config = PipelineConfig::from_cli(&cli(&["--dry-run", "--dry-run-format", "json"]))
            .expect("config");
        assert!(matches!(
            config.mode,
            PipelineMode::DryRun(DryRunFormat::Json)
        ));
    }

    #[test]
    fn regression_from_cli_requires_token_and_channel_when_posting() {
        let error = PipelineConfig::from_cli(&cli(&["--slack-channel-id", "C1"]))
            .expect_err("token required");
        assert!(error.to_string().contains("--slack-bot-token"));

        let error = PipelineConfig::from_cli(&cli(&["--slack-bot-token", "xoxb-test"]))
            .expect_err("channel required");
        assert!(error.to_string().contains("--slack-channel-id"));
    }

    #[test]
    fn regression_from_cli_rejects_template_without_placeholder() {
        let cli = Cli::try_parse_from([
            "prow-notify",
            "--indirection-url",
            "https://prow.example/latest-build.txt",
            "--log-url-template",
            "https://prow.example/logs/build-log.txt",
            "--dry-run",
        ])
        .expect("cli parses");
        let error = PipelineConfig::from_cli(&cli).expect_err("template invalid");
        assert!(error.to_string().contains("--log-url-template"));
    }
}
