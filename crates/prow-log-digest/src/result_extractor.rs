//! Job outcome extraction and notification text composition.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::control_sequences::strip_control_sequences;

const JOB_STATE_PATTERN: &str = r"Reporting job state '(\w+)'";
const FAILURE_SUMMARY_PATTERN: &str = r"(?s)Summarizing.*?Test Suite Failed";
const DURATION_PATTERN: &str = r"Ran for ([0-9hms]+)";
const TRUNCATION_MARKER: &str = "...";

/// Text posted in place of a failure summary when the log has no summary region.
pub const MISSING_SUMMARY_PLACEHOLDER: &str = "Infrastructure setup issues or failures unrelated to tests were found. No report of test failures was produced.";

fn job_state_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(JOB_STATE_PATTERN).expect("job state pattern compiles"))
}

fn failure_summary_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(FAILURE_SUMMARY_PATTERN).expect("failure summary pattern compiles")
    })
}

fn duration_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(DURATION_PATTERN).expect("duration pattern compiles"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Final job state reported by the CI run.
pub enum JobOutcome {
    Succeeded,
    Failed,
    Unknown,
}

impl JobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    fn from_state(state: &str) -> Self {
        match state {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How the failure summary of a run was obtained.
pub enum SummaryStatus {
    /// The run did not fail, so no summary applies.
    NotApplicable,
    Found,
    /// No summary region; the placeholder text stands in for it.
    Placeholder,
    /// No summary region and the policy requires one; the run is not reported.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Behavioral switches for extraction.
pub struct ExtractionPolicy {
    /// Notify on `succeeded` runs as well as failures.
    pub report_on_success: bool,
    /// Remove terminal control sequences from the failure summary.
    pub strip_control_sequences: bool,
    /// Suppress failure notifications that have no summary region instead of
    /// posting [`MISSING_SUMMARY_PLACEHOLDER`].
    pub require_summary_on_failure: bool,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            report_on_success: false,
            strip_control_sequences: true,
            require_summary_on_failure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Everything derived from one console log.
pub struct ExtractionResult {
    pub outcome: JobOutcome,
    /// Raw word captured from the job state marker, if any.
    pub state: Option<String>,
    pub failure_summary: Option<String>,
    pub summary_status: SummaryStatus,
    pub duration: Option<String>,
    pub reportable: bool,
    /// Composed notification text; empty when the log has no job state marker.
    pub message: String,
}

impl ExtractionResult {
    /// Composed message capped at `max_chars` characters.
    ///
    /// Only the failure summary is shortened; the state and duration lines are
    /// always kept whole at the end, even when they alone exceed `max_chars`.
    pub fn message_within(&self, max_chars: usize) -> String {
        if self.message.chars().count() <= max_chars {
            return self.message.clone();
        }
        let (Some(summary), Some(state)) = (self.failure_summary.as_deref(), self.state.as_deref())
        else {
            return self.message.clone();
        };
        let tail_chars = compose_message(None, state, self.duration.as_deref())
            .chars()
            .count();
        let summary_budget =
            max_chars.saturating_sub(tail_chars + TRUNCATION_MARKER.len() + 1);
        let mut shortened = summary.chars().take(summary_budget).collect::<String>();
        shortened.push_str(TRUNCATION_MARKER);
        tracing::debug!(
            summary_chars = summary.chars().count(),
            summary_budget,
            "shortened failure summary to fit message limit"
        );
        compose_message(Some(&shortened), state, self.duration.as_deref())
    }
}

/// Derives an [`ExtractionResult`] from raw console log text.
///
/// Never fails: a log without markers yields an unknown, non-reportable result.
pub fn extract_result(raw_log: &str, policy: &ExtractionPolicy) -> ExtractionResult {
    let duration = duration_regex()
        .captures(raw_log)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string());

    let Some(state) = job_state_regex()
        .captures(raw_log)
        .and_then(|captures| captures.get(1))
        .map(|state| state.as_str().trim().to_string())
    else {
        tracing::debug!("console log has no job state marker");
        return ExtractionResult {
            outcome: JobOutcome::Unknown,
            state: None,
            failure_summary: None,
            summary_status: SummaryStatus::NotApplicable,
            duration,
            reportable: false,
            message: String::new(),
        };
    };

    let outcome = JobOutcome::from_state(&state);
    let (failure_summary, summary_status, reportable) = match outcome {
        JobOutcome::Failed => match failure_summary_regex().find(raw_log) {
            Some(region) => {
                let summary = if policy.strip_control_sequences {
                    strip_control_sequences(region.as_str())
                } else {
                    region.as_str().to_string()
                };
                (Some(summary), SummaryStatus::Found, true)
            }
            None if policy.require_summary_on_failure => (None, SummaryStatus::Missing, false),
            None => (
                Some(MISSING_SUMMARY_PLACEHOLDER.to_string()),
                SummaryStatus::Placeholder,
                true,
            ),
        },
        JobOutcome::Succeeded => (None, SummaryStatus::NotApplicable, policy.report_on_success),
        JobOutcome::Unknown => (None, SummaryStatus::NotApplicable, false),
    };

    let message = compose_message(failure_summary.as_deref(), &state, duration.as_deref());
    tracing::debug!(
        outcome = outcome.as_str(),
        reportable,
        has_duration = duration.is_some(),
        "extracted job result"
    );

    ExtractionResult {
        outcome,
        state: Some(state),
        failure_summary,
        summary_status,
        duration,
        reportable,
        message,
    }
}

fn compose_message(failure_summary: Option<&str>, state: &str, duration: Option<&str>) -> String {
    let mut message = String::new();
    if let Some(summary) = failure_summary {
        message.push_str(summary);
        message.push('\n');
    }
    message.push_str(&format!("Reporting job state: {state}\n"));
    if let Some(duration) = duration {
        message.push_str(&format!("Ran for {duration}\n"));
    }
    message
}
