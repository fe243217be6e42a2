use chrono::NaiveDate;
use httpmock::prelude::*;
use prow_fetch::{FetchError, HttpTextFetcher};
use prow_log_digest::{ExtractionPolicy, JobOutcome, MISSING_SUMMARY_PLACEHOLDER};
use prow_notify::{
    run_notify_pipeline, DeliveryConfig, PipelineConfig, PipelineMode, PipelineOutcome, PostMode,
};
use prow_slack_runtime::{SlackApiError, SlackRuntimeError};
use serde_json::json;

const TODAY_TS: &str = "1792143000.000200";
const YESTERDAY_TS: &str = "1792108799.000100";

struct PipelineHarness {
    server: MockServer,
}

impl PipelineHarness {
    fn start(log: &str) -> Self {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gcs/periodic-e2e/latest-build.txt");
            then.status(200).body("1846289012345");
        });
        let log = log.to_string();
        server.mock(move |when, then| {
            when.method(GET)
                .path("/gcs/periodic-e2e/1846289012345/build-log.txt");
            then.status(200).body(log);
        });
        Self { server }
    }

    fn config(&self, policy: ExtractionPolicy) -> PipelineConfig {
        PipelineConfig {
            indirection_url: self.server.url("/gcs/periodic-e2e/latest-build.txt"),
            log_url_template: self.server.url("/gcs/periodic-e2e/%s/build-log.txt"),
            request_timeout_ms: 2_000,
            extraction_policy: policy,
            mode: PipelineMode::Deliver(DeliveryConfig {
                api_base: self.server.url("/slack/api"),
                bot_token: "xoxb-test".to_string(),
                channel_id: "CNIGHTLY".to_string(),
                post_mode: PostMode::TodayThread,
                history_limit: 100,
                max_message_chars: 39_000,
            }),
        }
    }

    fn mock_history(&self, timestamps: &[&str]) {
        let messages = timestamps
            .iter()
            .map(|ts| json!({ "ts": ts, "text": "Nightly e2e results" }))
            .collect::<Vec<_>>();
        self.server.mock(|when, then| {
            when.method(GET)
                .path("/slack/api/conversations.history")
                .query_param("channel", "CNIGHTLY")
                .query_param("limit", "100");
            then.status(200)
                .json_body(json!({ "ok": true, "messages": messages }));
        });
    }

    async fn run(&self, policy: ExtractionPolicy) -> anyhow::Result<PipelineOutcome> {
        let fetcher = HttpTextFetcher::new(2_000).expect("fetcher");
        run_notify_pipeline(&self.config(policy), &fetcher, today()).await
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

#[tokio::test]
async fn integration_failed_run_with_summary_is_posted_into_today_thread() {
    let harness = PipelineHarness::start(
        "+ make e2e\n\
         Summarizing 1 Failure:\n\
         \x1b[38;5;9m[FAIL]\x1b[0m [sig-apps] rollout completes\n\
         Test Suite Failed\n\
         Reporting job state 'failed'\n\
         Ran for 1h2m\n",
    );
    harness.mock_history(&[YESTERDAY_TS, TODAY_TS]);
    let post = harness.server.mock(|when, then| {
        when.method(POST)
            .path("/slack/api/chat.postMessage")
            .json_body_includes(json!({
                "channel": "CNIGHTLY",
                "thread_ts": TODAY_TS,
                "text": "Summarizing 1 Failure:\n[FAIL] [sig-apps] rollout completes\nTest Suite Failed\nReporting job state: failed\nRan for 1h2m\n"
            }).to_string());
        then.status(200)
            .json_body(json!({ "ok": true, "channel": "CNIGHTLY", "ts": "1792150000.000100" }));
    });

    let outcome = harness
        .run(ExtractionPolicy::default())
        .await
        .expect("pipeline succeeds");

    post.assert();
    match outcome {
        PipelineOutcome::Posted {
            channel,
            ts,
            thread_ts,
        } => {
            assert_eq!(channel, "CNIGHTLY");
            assert_eq!(ts, "1792150000.000100");
            assert_eq!(thread_ts.as_deref(), Some(TODAY_TS));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn regression_oversized_summary_is_shortened_before_state_and_duration() {
    let failures = (0..900)
        .map(|index| format!("  [FAIL] [sig-storage] volume {index} never became ready\n"))
        .collect::<String>();
    let harness = PipelineHarness::start(&format!(
        "Summarizing 900 Failures:\n{failures}Test Suite Failed\n\
         Reporting job state 'failed'\nRan for 1h2m\n"
    ));
    harness.mock_history(&[TODAY_TS]);
    let post = harness.server.mock(|when, then| {
        when.method(POST)
            .path("/slack/api/chat.postMessage")
            .body_includes(r#""text":"Summarizing 900 Failures:"#)
            .body_includes(r#"...\nReporting job state: failed\nRan for 1h2m\n""#);
        then.status(200)
            .json_body(json!({ "ok": true, "channel": "CNIGHTLY", "ts": "1792150000.000300" }));
    });

    harness
        .run(ExtractionPolicy::default())
        .await
        .expect("pipeline succeeds");

    post.assert();
}

#[tokio::test]
async fn integration_failed_run_without_summary_posts_placeholder() {
    let harness = PipelineHarness::start("Reporting job state 'failed'\nRan for 4m\n");
    harness.mock_history(&[TODAY_TS]);
    let post = harness.server.mock(|when, then| {
        when.method(POST)
            .path("/slack/api/chat.postMessage")
            .body_includes(MISSING_SUMMARY_PLACEHOLDER);
        then.status(200)
            .json_body(json!({ "ok": true, "channel": "CNIGHTLY", "ts": "1.1" }));
    });

    harness
        .run(ExtractionPolicy::default())
        .await
        .expect("pipeline succeeds");
    post.assert();
}

#[tokio::test]
async fn integration_failed_run_without_summary_is_suppressed_when_required() {
    let harness = PipelineHarness::start("Reporting job state 'failed'\nRan for 4m\n");
    let slack = harness.server.mock(|when, then| {
        when.path_includes("/slack/api/");
        then.status(500);
    });

    let outcome = harness
        .run(ExtractionPolicy {
            require_summary_on_failure: true,
            ..ExtractionPolicy::default()
        })
        .await
        .expect("pipeline succeeds");

    assert_eq!(slack.calls(), 0);
    assert!(matches!(
        outcome,
        PipelineOutcome::NothingToReport {
            outcome: JobOutcome::Failed
        }
    ));
}

#[tokio::test]
async fn integration_log_without_markers_sends_nothing() {
    let harness = PipelineHarness::start("+ make e2e\nerror: cluster provisioning timed out\n");
    let slack = harness.server.mock(|when, then| {
        when.path_includes("/slack/api/");
        then.status(500);
    });

    let outcome = harness
        .run(ExtractionPolicy {
            report_on_success: true,
            ..ExtractionPolicy::default()
        })
        .await
        .expect("pipeline succeeds");

    assert_eq!(slack.calls(), 0);
    assert!(matches!(
        outcome,
        PipelineOutcome::NothingToReport {
            outcome: JobOutcome::Unknown
        }
    ));
}

#[tokio::test]
async fn integration_stale_thread_history_fails_without_posting() {
    let harness = PipelineHarness::start("Reporting job state 'failed'\n");
    harness.mock_history(&[YESTERDAY_TS]);
    let post = harness.server.mock(|when, then| {
        when.method(POST).path("/slack/api/chat.postMessage");
        then.status(200)
            .json_body(json!({ "ok": true, "channel": "CNIGHTLY", "ts": "1.1" }));
    });

    let error = harness
        .run(ExtractionPolicy::default())
        .await
        .expect_err("no thread today");

    assert_eq!(post.calls(), 0);
    assert!(matches!(
        error.downcast_ref::<SlackRuntimeError>(),
        Some(SlackRuntimeError::ThreadNotFound { .. })
    ));
}

#[tokio::test]
async fn integration_not_ok_acknowledgment_is_delivery_failure() {
    let harness = PipelineHarness::start("Reporting job state 'failed'\n");
    harness.mock_history(&[TODAY_TS]);
    harness.server.mock(|when, then| {
        when.method(POST).path("/slack/api/chat.postMessage");
        then.status(200)
            .json_body(json!({ "ok": false, "error": "channel_not_found" }));
    });

    let error = harness
        .run(ExtractionPolicy::default())
        .await
        .expect_err("not ok must fail");

    match error.downcast_ref::<SlackRuntimeError>() {
        Some(SlackRuntimeError::DeliveryFailed(SlackApiError::Api { error, .. })) => {
            assert_eq!(error, "channel_not_found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn integration_unreachable_indirection_host_aborts_run() {
    let harness = PipelineHarness::start("unused");
    let mut config = harness.config(ExtractionPolicy::default());
    config.indirection_url = "http://127.0.0.1:1/latest-build.txt".to_string();

    let fetcher = HttpTextFetcher::new(2_000).expect("fetcher");
    let error = run_notify_pipeline(&config, &fetcher, today())
        .await
        .expect_err("unreachable host must fail");

    let fetch_error = error.downcast_ref::<FetchError>().expect("fetch error");
    assert_eq!(
        fetch_error.url(),
        Some("http://127.0.0.1:1/latest-build.txt")
    );
}
