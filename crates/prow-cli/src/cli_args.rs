use clap::{ArgAction, Parser};

use crate::{CliDryRunFormat, CliPostMode};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "prow-notify",
    about = "Summarize a Prow CI console log and post it to today's Slack thread",
    version
)]
pub struct Cli {
    #[arg(
        long = "indirection-url",
        env = "PROW_NOTIFY_INDIRECTION_URL",
        help = "URL of the document holding the build identifier (for example latest-build.txt)"
    )]
    pub indirection_url: String,

    #[arg(
        long = "log-url-template",
        env = "PROW_NOTIFY_LOG_URL_TEMPLATE",
        help = "Console log URL with one %s placeholder replaced by the indirection document body"
    )]
    pub log_url_template: String,

    #[arg(
        long = "slack-bot-token",
        env = "PROW_NOTIFY_SLACK_BOT_TOKEN",
        hide_env_values = true,
        help = "Slack bot token for Web API (xoxb-...)"
    )]
    pub slack_bot_token: Option<String>,

    #[arg(
        long = "slack-channel-id",
        env = "PROW_NOTIFY_SLACK_CHANNEL_ID",
        help = "Slack channel that receives the summary"
    )]
    pub slack_channel_id: Option<String>,

    #[arg(
        long = "slack-api-base",
        env = "PROW_NOTIFY_SLACK_API_BASE",
        default_value = "https://slack.com/api",
        help = "Slack Web API base URL"
    )]
    pub slack_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "PROW_NOTIFY_REQUEST_TIMEOUT_MS",
        default_value_t = 15_000,
        value_parser = parse_positive_u64,
        help = "Timeout applied to every HTTP request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "history-limit",
        env = "PROW_NOTIFY_HISTORY_LIMIT",
        default_value_t = 100,
        value_parser = parse_positive_usize,
        help = "Number of recent top-level channel messages scanned for today's thread"
    )]
    pub history_limit: usize,

    #[arg(
        long = "post-mode",
        env = "PROW_NOTIFY_POST_MODE",
        value_enum,
        default_value_t = CliPostMode::Thread,
        help = "Reply in today's thread or post a top-level channel message"
    )]
    pub post_mode: CliPostMode,

    #[arg(
        long = "max-message-chars",
        env = "PROW_NOTIFY_MAX_MESSAGE_CHARS",
        default_value_t = 39_000,
        value_parser = parse_positive_usize,
        help = "Posted text is truncated beyond this many characters"
    )]
    pub max_message_chars: usize,

    #[arg(
        long = "report-on-success",
        env = "PROW_NOTIFY_REPORT_ON_SUCCESS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Also post when the job state is 'succeeded'"
    )]
    pub report_on_success: bool,

    #[arg(
        long = "strip-control-sequences",
        env = "PROW_NOTIFY_STRIP_CONTROL_SEQUENCES",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Remove terminal color/control sequences from the failure summary"
    )]
    pub strip_control_sequences: bool,

    #[arg(
        long = "require-summary-on-failure",
        env = "PROW_NOTIFY_REQUIRE_SUMMARY_ON_FAILURE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Skip failed runs whose log has no failure summary instead of posting a placeholder"
    )]
    pub require_summary_on_failure: bool,

    #[arg(
        long = "dry-run",
        env = "PROW_NOTIFY_DRY_RUN",
        default_value_t = false,
        help = "Print the extracted summary instead of posting it"
    )]
    pub dry_run: bool,

    #[arg(
        long = "dry-run-format",
        env = "PROW_NOTIFY_DRY_RUN_FORMAT",
        value_enum,
        default_value_t = CliDryRunFormat::Text,
        requires = "dry_run",
        help = "Print the message text or the full extraction result as JSON"
    )]
    pub dry_run_format: CliDryRunFormat,
}
