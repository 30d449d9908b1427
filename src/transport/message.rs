//! Request and response values exchanged with the automation endpoints.

use serde::Serialize;

use super::HttpError;

/// Outgoing call to the trigger or status endpoint.
///
/// Plain data; any [`HttpClient`] can send it, including the scripted
/// clients the sync tests use.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: http::Method,
    pub url: url::Url,
    pub headers: http::HeaderMap,
    /// Serialized payload, absent for status queries
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Builds a request without headers or body.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Status query.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    /// Batch submission.
    #[must_use]
    pub fn post(url: url::Url) -> Self {
        Self::new(http::Method::POST, url)
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Encodes `payload` as JSON and marks the body as `application/json`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `payload` cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, serde_json::Error> {
        let encoded = serde_json::to_vec(payload)?;
        Ok(self.with_body(encoded).with_header(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        ))
    }

    /// Appends a header; repeated names keep every value.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// Reply from an automation endpoint, body read to the end.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: http::StatusCode,
    pub headers: http::HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Any 2xx, including 202 for deferred jobs.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text. Invalid UTF-8 is replaced rather than rejected so a
    /// garbled error page still yields a message.
    #[must_use]
    pub fn body_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the automation endpoints.
///
/// The submitter and poller only see this trait; production uses
/// [`ReqwestClient`](super::ReqwestClient), tests plug in scripted replies.
pub trait HttpClient: Send + Sync {
    /// Performs one request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] only when no response arrived at all. Non-2xx
    /// replies come back as `Ok` and are classified by the caller.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for std::sync::Arc<T> {
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send {
        (**self).request(req)
    }
}
