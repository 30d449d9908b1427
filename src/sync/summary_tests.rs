//! Tests for `ResultAggregator`.

use serde_json::json;

use super::body::normalize_results;
use super::test_fixtures::entries;
use super::{
    Outcome, ResultAggregator, StatusCounts, TaskSyncResponse, TaskSyncResultEntry,
    TaskSyncStatus, effective_results,
};

fn result(id: &str, status: &str) -> TaskSyncResultEntry {
    TaskSyncResultEntry {
        record_id: Some(id.to_string()),
        status: Some(status.to_string()),
        ..TaskSyncResultEntry::default()
    }
}

fn failure(id: &str, message: &str) -> TaskSyncResultEntry {
    TaskSyncResultEntry {
        message: Some(message.to_string()),
        ..result(id, "error")
    }
}

fn response(status: TaskSyncStatus, results: Vec<TaskSyncResultEntry>) -> TaskSyncResponse {
    TaskSyncResponse {
        status,
        job_id: None,
        results,
        created_at: None,
        updated_at: None,
        completed_at: None,
    }
}

mod counts {
    use super::*;

    #[test]
    fn buckets_sum_to_total() {
        let results = vec![
            result("r1", "success"),
            result("r2", "accepted"),
            result("r3", "error"),
            result("r4", "running"),
        ];

        let counts = StatusCounts::tally(&results, 6);

        assert_eq!(
            counts,
            StatusCounts {
                success: 1,
                accepted: 1,
                failed: 1,
                pending: 3,
            }
        );
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn pending_never_goes_negative() {
        let results = vec![result("r1", "success"), result("r2", "success")];

        assert_eq!(StatusCounts::tally(&results, 1).pending, 0);
    }

    #[test]
    fn status_matching_ignores_case() {
        let results = vec![result("r1", "SUCCESS")];

        assert_eq!(StatusCounts::tally(&results, 1).success, 1);
    }
}

mod summarize {
    use super::*;

    #[test]
    fn all_succeeded() {
        let results = vec![result("r1", "success"), result("r2", "success")];

        let summary = ResultAggregator::new().summarize(&results, 2, 0);

        assert_eq!(summary.outcome, Outcome::Succeeded);
        assert_eq!(summary.message, "Sync succeeded for 2 tasks");
        assert!(summary.failure_digest.is_none());
    }

    #[test]
    fn accepted_entries_are_in_progress() {
        let results = vec![result("r1", "success"), result("r2", "accepted")];

        let summary = ResultAggregator::new().summarize(&results, 3, 2);

        assert_eq!(summary.outcome, Outcome::InProgress);
        assert_eq!(
            summary.message,
            "Submitted 3 tasks, 1 still executing upstream, 1 awaiting confirmation, skipped 2; \
             check the automation run log later for results"
        );
    }

    #[test]
    fn unreported_records_do_not_block_success() {
        let results = vec![
            result("r1", "success"),
            result("r2", "success"),
            result("r3", "success"),
        ];

        let summary = ResultAggregator::new().summarize(&results, 5, 0);

        assert_eq!(summary.outcome, Outcome::Succeeded);
        assert_eq!(summary.message, "Sync succeeded for 3 tasks");
        assert_eq!(summary.counts.pending, 2);
    }

    #[test]
    fn empty_results_are_all_pending() {
        let summary = ResultAggregator::new().summarize(&[], 4, 0);

        assert_eq!(summary.outcome, Outcome::InProgress);
        assert_eq!(summary.counts.pending, 4);
        assert_eq!(
            summary.message,
            "Submitted 4 tasks, 4 awaiting confirmation; check the automation run log later for results"
        );
    }

    #[test]
    fn failures_are_digested() {
        let results = vec![
            result("r1", "success"),
            failure("r2", "bad format"),
            result("r3", "accepted"),
        ];

        let summary = ResultAggregator::new().summarize(&results, 3, 1);

        assert_eq!(summary.outcome, Outcome::Failed);
        assert_eq!(summary.failure_digest.as_deref(), Some("r2:bad format"));
        assert_eq!(
            summary.to_string(),
            "Sync finished: 1 succeeded, 1 failed, 1 awaiting confirmation, 1 skipped. \
             Failures: r2:bad format"
        );
    }

    #[test]
    fn digest_is_truncated_with_count() {
        let results: Vec<_> = (1..=5).map(|i| failure(&format!("r{i}"), "boom")).collect();

        let summary = ResultAggregator::new().summarize(&results, 5, 0);

        assert_eq!(
            summary.failure_digest.as_deref(),
            Some("r1:boom; r2:boom; r3:boom; … (+2 more)")
        );
    }

    #[test]
    fn digest_limit_is_configurable() {
        let results = vec![failure("r1", "a"), failure("r2", "b")];

        let summary = ResultAggregator::new()
            .with_digest_limit(1)
            .summarize(&results, 2, 0);

        assert_eq!(summary.failure_digest.as_deref(), Some("r1:a; … (+1 more)"));
    }

    #[test]
    fn digest_names_anonymous_failures() {
        let anonymous = TaskSyncResultEntry {
            status: Some("error".to_string()),
            body: Some(json!({ "code": 3 })),
            ..TaskSyncResultEntry::default()
        };

        let summary = ResultAggregator::new().summarize(&[anonymous], 1, 0);

        assert_eq!(
            summary.failure_digest.as_deref(),
            Some(r#"unknown record:{"code":3}"#)
        );
    }
}

mod final_responses {
    use super::*;

    #[test]
    fn empty_success_synthesizes_one_entry_per_submission() {
        let batch = entries(3);

        let summary = ResultAggregator::new().summarize_response(
            &response(TaskSyncStatus::Success, vec![]),
            &batch,
            0,
        );

        assert_eq!(summary.outcome, Outcome::Succeeded);
        assert_eq!(summary.counts.success, 3);
        assert_eq!(summary.message, "Sync succeeded for 3 tasks");
    }

    #[test]
    fn empty_accepted_or_partial_is_not_synthesized() {
        let batch = entries(2);

        for status in [TaskSyncStatus::Accepted, TaskSyncStatus::Partial] {
            let summary =
                ResultAggregator::new().summarize_response(&response(status, vec![]), &batch, 0);

            assert_eq!(summary.outcome, Outcome::InProgress);
            assert_eq!(summary.counts.success, 0);
            assert_eq!(summary.counts.pending, 2);
        }
    }

    #[test]
    fn error_job_with_unlabelled_entry_counts_as_failure() {
        let batch = entries(5);
        let unlabelled = TaskSyncResultEntry {
            record_id: Some("r1".to_string()),
            message: Some("bad format".to_string()),
            ..TaskSyncResultEntry::default()
        };

        let summary = ResultAggregator::new().summarize_response(
            &response(TaskSyncStatus::Error, vec![unlabelled]),
            &batch,
            0,
        );

        assert_eq!(summary.outcome, Outcome::Failed);
        assert_eq!(summary.counts.failed, 1);
        assert_eq!(summary.counts.success, 0);
        assert!(summary.message.contains("r1:bad format"));
    }

    #[test]
    fn own_status_wins_over_job_status() {
        let resp = response(
            TaskSyncStatus::Error,
            vec![result("r1", "success"), failure("r2", "bad")],
        );

        let results = effective_results(&resp, &entries(2));

        assert!(results[0].has_status(TaskSyncStatus::Success));
        assert!(results[1].has_status(TaskSyncStatus::Error));
    }

    #[test]
    fn job_summary_synthesizes_from_expected_count() {
        let summary = ResultAggregator::new().summarize_job(
            &response(TaskSyncStatus::Success, vec![]),
            4,
            0,
        );

        assert_eq!(summary.outcome, Outcome::Succeeded);
        assert_eq!(summary.counts.success, 4);
    }

    #[test]
    fn job_summary_uses_itemized_results() {
        let summary = ResultAggregator::new().summarize_job(
            &response(TaskSyncStatus::Partial, vec![result("r1", "success"), failure("r2", "x")]),
            2,
            0,
        );

        assert_eq!(summary.outcome, Outcome::Failed);
        assert_eq!(summary.failure_digest.as_deref(), Some("r2:x"));
    }

    #[test]
    fn bare_status_body_counts_as_one_result() {
        let results = normalize_results(&json!({ "status": "success" }));

        let summary = ResultAggregator::new().summarize_response(
            &response(TaskSyncStatus::Success, results),
            &entries(5),
            0,
        );

        assert_eq!(summary.counts.success, 1);
        assert_eq!(summary.counts.pending, 4);
        assert_eq!(summary.message, "Sync succeeded for 1 tasks");
    }

    #[test]
    fn uncounted_job_reports_status_only() {
        let aggregator = ResultAggregator::new();

        let success = aggregator.summarize_uncounted(&response(TaskSyncStatus::Success, vec![]));
        let error = aggregator.summarize_uncounted(&response(TaskSyncStatus::Error, vec![]));
        let accepted = aggregator.summarize_uncounted(&response(TaskSyncStatus::Accepted, vec![]));

        assert_eq!(success.outcome, Outcome::Succeeded);
        assert_eq!(
            success.message,
            "Job finished with status success but reported no records; task count unknown"
        );
        assert_eq!(success.counts.total(), 0);
        assert_eq!(error.outcome, Outcome::Failed);
        assert_eq!(accepted.outcome, Outcome::InProgress);
    }

    #[test]
    fn partial_job_does_not_label_entries() {
        let unlabelled = TaskSyncResultEntry {
            record_id: Some("r1".to_string()),
            ..TaskSyncResultEntry::default()
        };
        let resp = response(TaskSyncStatus::Partial, vec![unlabelled]);

        let results = effective_results(&resp, &entries(1));

        assert!(results[0].status.is_none());
    }
}
