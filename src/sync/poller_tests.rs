//! Tests for `JobPoller` and `PollOptions`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::test_fixtures::{MockClient, RecordingSleeper, json_response, url};
use super::{ErrorKind, JobPoller, PollOptions, SyncError, TaskSyncStatus, interpret_status};
use crate::time::InstantSleeper;
use crate::transport::HttpError;

const STATUS: &str = "https://automation.example.com/api/task-sync/status";

fn poller(client: Arc<MockClient>) -> JobPoller<Arc<MockClient>, InstantSleeper> {
    JobPoller::new(client, Some(url(STATUS))).with_sleeper(InstantSleeper)
}

mod options {
    use super::*;

    #[test]
    fn defaults() {
        let options = PollOptions::default();

        assert_eq!(options.attempts, 12);
        assert_eq!(options.interval, Duration::from_millis(5000));
        assert_eq!(options.worst_case_latency(), Duration::from_millis(3000 + 11 * 5000));
    }

    #[test]
    fn first_delay_is_fixed() {
        let options = PollOptions::new().with_interval(Duration::from_millis(100));

        assert_eq!(options.delay_before(0), Duration::from_millis(3000));
        assert_eq!(options.delay_before(1), Duration::from_millis(100));
        assert_eq!(options.delay_before(7), Duration::from_millis(100));
    }

    #[test]
    fn batch_scaling_never_shrinks() {
        assert_eq!(PollOptions::new().scaled_for_batch(4).attempts, 12);
        assert_eq!(PollOptions::new().scaled_for_batch(20).attempts, 30);
        assert_eq!(PollOptions::new().scaled_for_batch(21).attempts, 32);
    }

    #[test]
    #[should_panic(expected = "attempts must be at least 1")]
    fn zero_attempts_panics() {
        let _ = PollOptions::new().with_attempts(0);
    }
}

mod status_url {
    use super::*;

    #[test]
    fn appends_job_id_as_one_segment() {
        let poller = poller(Arc::new(MockClient::new(vec![])));

        assert_eq!(
            poller.status_url("j-1").unwrap().as_str(),
            "https://automation.example.com/api/task-sync/status/j-1"
        );
    }

    #[test]
    fn percent_encodes_job_id() {
        let poller = poller(Arc::new(MockClient::new(vec![])));

        assert_eq!(
            poller.status_url("a/b c").unwrap().as_str(),
            "https://automation.example.com/api/task-sync/status/a%2Fb%20c"
        );
    }

    #[test]
    fn tolerates_trailing_slash() {
        let poller = JobPoller::new(
            Arc::new(MockClient::new(vec![])),
            Some(url("https://automation.example.com/status/")),
        );

        assert_eq!(
            poller.status_url("j-1").unwrap().as_str(),
            "https://automation.example.com/status/j-1"
        );
    }

    #[test]
    fn blank_job_id_is_config_error() {
        let poller = poller(Arc::new(MockClient::new(vec![])));

        assert_eq!(poller.status_url("  ").unwrap_err().kind(), ErrorKind::Config);
    }
}

mod poll {
    use super::*;

    #[tokio::test]
    async fn running_then_success() {
        let client = Arc::new(MockClient::replying(vec![
            json_response(200, &json!({ "status": "running" })),
            json_response(
                200,
                &json!({ "status": "success", "results": [{ "recordId": "r1", "status": "success" }] }),
            ),
        ]));
        let sleeper = RecordingSleeper::default();
        let poller = JobPoller::new(Arc::clone(&client), Some(url(STATUS))).with_sleeper(&sleeper);

        let response = poller.poll("j-1", PollOptions::new()).await.unwrap();

        assert_eq!(response.status, TaskSyncStatus::Success);
        assert_eq!(response.job_id.as_deref(), Some("j-1"));
        assert_eq!(response.results.len(), 1);
        assert_eq!(client.calls(), 2);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(3000), Duration::from_millis(5000)]
        );
        let requests = client.captured_requests();
        assert!(requests.iter().all(|r| r.method == http::Method::GET));
        assert_eq!(requests[0].url.as_str(), format!("{STATUS}/j-1"));
    }

    #[tokio::test]
    async fn exhausted_attempts_time_out() {
        let responses = (0..12)
            .map(|_| json_response(200, &json!({ "status": "pending" })))
            .collect();
        let client = Arc::new(MockClient::replying(responses));

        let err = poller(Arc::clone(&client))
            .poll("j-1", PollOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Timeout { ref job_id, attempts: 12 } if job_id == "j-1"));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(client.calls(), 12);
    }

    #[tokio::test]
    async fn missing_or_unknown_status_keeps_polling() {
        let client = Arc::new(MockClient::replying(vec![
            json_response(200, &json!({})),
            json_response(200, &json!({ "status": "queued" })),
            json_response(200, &json!({ "status": "Partial" })),
        ]));

        let response = poller(Arc::clone(&client))
            .poll("j-1", PollOptions::new().with_attempts(5))
            .await
            .unwrap();

        assert_eq!(response.status, TaskSyncStatus::Partial);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn not_found_stops_immediately() {
        let client = Arc::new(MockClient::replying(vec![json_response(
            404,
            &json!({ "message": "no such job" }),
        )]));

        let err = poller(Arc::clone(&client))
            .poll("j-404", PollOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::NotFound { ref job_id } if job_id == "j-404"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn server_error_stops_immediately() {
        let client = Arc::new(MockClient::replying(vec![json_response(
            503,
            &json!({ "detail": "maintenance" }),
        )]));

        let err = poller(Arc::clone(&client))
            .poll("j-1", PollOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Remote { ref message, .. } if message == "maintenance"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_not_retried() {
        let client = Arc::new(MockClient::new(vec![Err(HttpError::Timeout)]));

        let err = poller(Arc::clone(&client))
            .poll("j-1", PollOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn missing_endpoint_fails_before_any_request() {
        let client = Arc::new(MockClient::new(vec![]));
        let poller = JobPoller::new(Arc::clone(&client), None).with_sleeper(InstantSleeper);

        let err = poller.poll("j-1", PollOptions::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(client.calls(), 0);
    }
}

mod interpret {
    use super::*;

    #[test]
    fn terminal_status_carries_timestamps() {
        let response = interpret_status(
            "j-1",
            &json_response(
                200,
                &json!({ "status": "error", "createdAt": 1, "updatedAt": 2, "completedAt": 3 }),
            ),
        )
        .unwrap()
        .unwrap();

        assert_eq!(response.status, TaskSyncStatus::Error);
        assert_eq!(
            (response.created_at, response.updated_at, response.completed_at),
            (Some(1), Some(2), Some(3))
        );
    }

    #[test]
    fn running_is_not_final() {
        let outcome =
            interpret_status("j-1", &json_response(200, &json!({ "status": "running" }))).unwrap();

        assert!(outcome.is_none());
    }
}
