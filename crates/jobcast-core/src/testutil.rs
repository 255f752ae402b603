//! Test utilities: a mock transport for dependency injection.
//!
//! Handwritten mock in place of a real HTTP server. Uses `Arc<Mutex<_>>`
//! for interior mutability so tests can assert on recorded calls after
//! handing clones to the code under test.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::traits::{HttpResponse, Payload, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One call observed by [`MockTransport`], in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Payload>,
}

impl RecordedCall {
    /// Look up a recorded header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mock transport with a queue of canned responses.
///
/// Each call pops the first queued response; when the queue is empty,
/// a plain 200 with a default HTML body is returned. Every call is
/// recorded regardless of outcome.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<Vec<Result<HttpResponse, AppError>>>>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    /// Always answer 200 with the given HTML body.
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(HttpResponse::new(200, html.as_bytes().to_vec()))])
    }

    /// Answer with the given status and body.
    pub fn with_status(status: u16, body: &str) -> Self {
        Self::with_responses(vec![Ok(HttpResponse::new(status, body.as_bytes().to_vec()))])
    }

    /// Fail the first call with the given error.
    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<HttpResponse, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs of all recorded calls, in order.
    pub fn call_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.url.clone())
            .collect()
    }

    fn record(&self, method: Method, url: &str, headers: &[(&str, &str)], body: Option<Payload>) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        });
    }

    fn next_response(&self) -> Result<HttpResponse, AppError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(HttpResponse::new(
                200,
                b"<html><body>default</body></html>".to_vec(),
            ))
        } else {
            responses.remove(0)
        }
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, extra_headers: &[(&str, &str)]) -> Result<HttpResponse, AppError> {
        self.record(Method::Get, url, extra_headers, None);
        self.next_response()
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<HttpResponse, AppError> {
        self.record(Method::Post, url, headers, Some(body));
        self.next_response()
    }
}
