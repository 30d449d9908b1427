//! Initial batch submission to the trigger endpoint.

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::lookup::WebhookLookup;
use crate::transport::{HttpClient, HttpRequest, HttpResponse};

use super::body::{ParsedBody, normalize_results};
use super::{SyncError, TaskSyncEntry, TaskSyncResponse, TaskSyncStatus, WebhookResolver};

/// Message used when a failed submission carries no usable text.
const SUBMISSION_FAILED: &str = "submission failed";

/// Wire body of a submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPayload<'a> {
    webhook_url: &'a str,
    records: &'a [TaskSyncEntry],
}

/// Submits a whole batch of entries in one request.
///
/// The response is either immediate (the remote processed the batch
/// synchronously) or deferred (a 202 with a job id to poll with
/// [`JobPoller`](super::JobPoller)). No chunking happens here; batch size
/// limits are the caller's concern.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `L`: The webhook URL lookup behind the shared resolver
#[derive(Debug)]
pub struct BatchSubmitter<H, L> {
    client: H,
    resolver: Arc<WebhookResolver<L>>,
    trigger_endpoint: Option<Url>,
}

impl<H, L> BatchSubmitter<H, L> {
    /// Creates a submitter posting to `trigger_endpoint`.
    ///
    /// A missing endpoint is reported by [`submit`](Self::submit), not here.
    #[must_use]
    pub const fn new(
        client: H,
        resolver: Arc<WebhookResolver<L>>,
        trigger_endpoint: Option<Url>,
    ) -> Self {
        Self {
            client,
            resolver,
            trigger_endpoint,
        }
    }

    /// Returns the configured trigger endpoint.
    #[must_use]
    pub const fn trigger_endpoint(&self) -> Option<&Url> {
        self.trigger_endpoint.as_ref()
    }

    /// Returns the shared webhook resolver.
    #[must_use]
    pub const fn resolver(&self) -> &Arc<WebhookResolver<L>> {
        &self.resolver
    }
}

impl<H: HttpClient, L: WebhookLookup> BatchSubmitter<H, L> {
    /// Submits `entries` as one batch.
    ///
    /// # Errors
    ///
    /// - [`SyncError::EmptyBatch`] if `entries` is empty
    /// - [`SyncError::Config`] / [`SyncError::Resolve`] if the trigger endpoint
    ///   or the webhook URL is unavailable; no request is sent in that case
    /// - [`SyncError::Protocol`] if a 202 response lacks a job id
    /// - [`SyncError::Remote`] for non-2xx responses
    /// - [`SyncError::Http`] for transport failures
    pub async fn submit(&self, entries: &[TaskSyncEntry]) -> Result<TaskSyncResponse, SyncError> {
        if entries.is_empty() {
            return Err(SyncError::EmptyBatch);
        }
        let endpoint = self
            .trigger_endpoint
            .as_ref()
            .ok_or_else(|| SyncError::config("trigger endpoint is not configured"))?;
        let webhook_url = self.resolver.resolve().await?;

        let request = HttpRequest::post(endpoint.clone()).with_json(&SubmitPayload {
            webhook_url: &webhook_url,
            records: entries,
        })?;

        tracing::debug!(records = entries.len(), endpoint = %endpoint, "submitting batch");
        let response = self.client.request(request).await?;

        classify_submission(&response)
    }
}

/// Interprets the trigger endpoint's response.
///
/// - 202: deferred; the body must carry a `jobId`
/// - other 2xx: synchronous result, normalized from any accepted layout
/// - anything else: [`SyncError::Remote`]
///
/// # Errors
///
/// Returns [`SyncError::Protocol`] for a 202 without job id and
/// [`SyncError::Remote`] for non-2xx statuses.
pub fn classify_submission(response: &HttpResponse) -> Result<TaskSyncResponse, SyncError> {
    let body = ParsedBody::from_response(response);

    if response.status == http::StatusCode::ACCEPTED {
        let job_id = body.job_id().ok_or_else(|| {
            SyncError::Protocol("batch was accepted but no jobId was returned".to_string())
        })?;
        tracing::info!(job_id = %job_id, "batch accepted for deferred processing");

        return Ok(TaskSyncResponse {
            status: body.status().unwrap_or(TaskSyncStatus::Accepted),
            job_id: Some(job_id),
            results: Vec::new(),
            created_at: body.timestamp("createdAt"),
            updated_at: None,
            completed_at: None,
        });
    }

    if response.is_success() {
        return Ok(TaskSyncResponse {
            status: body.status().unwrap_or(TaskSyncStatus::Success),
            job_id: None,
            results: normalize_results(&body.data),
            created_at: body.timestamp("createdAt"),
            updated_at: body.timestamp("updatedAt"),
            completed_at: body.timestamp("completedAt"),
        });
    }

    Err(SyncError::Remote {
        status: response.status,
        message: body.remote_message(SUBMISSION_FAILED),
    })
}
