use std::borrow::Cow;

use crate::error::AppError;

/// A response from the transport layer.
///
/// Non-2xx statuses are data, not errors: career pages routinely serve
/// useful markup on error pages, and the fetcher records the status code
/// for the caller to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Strict UTF-8 view of the body.
    pub fn text(&self) -> Result<&str, AppError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| AppError::DecodeError(format!("Body is not valid UTF-8: {e}")))
    }

    /// Lossy UTF-8 view of the body. Never fails; invalid sequences are
    /// replaced with U+FFFD.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, AppError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| AppError::DecodeError(format!("Body is not valid JSON: {e}")))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request body with its encoding made explicit.
///
/// The Content-Type header follows from the variant, so a caller cannot
/// send a form body labeled as JSON or vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl Payload {
    pub fn content_type(&self) -> &'static str {
        match self {
            Payload::Form(_) => "application/x-www-form-urlencoded",
            Payload::Json(_) => "application/json",
        }
    }
}

/// Blocking HTTP transport.
///
/// The seam between scraping/publish logic and real network I/O. The
/// concrete implementation lives in `jobcast-client` (`HttpSession`);
/// tests use `testutil::MockTransport`. All calls block until response
/// or timeout; there is no async variant.
pub trait Transport: Send + Sync + Clone {
    /// HTTP GET. `extra_headers` are merged over the transport's
    /// defaults, caller-supplied values winning.
    fn get(&self, url: &str, extra_headers: &[(&str, &str)]) -> Result<HttpResponse, AppError>;

    /// HTTP POST with an explicit body encoding.
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<HttpResponse, AppError>;

    /// GET plus JSON decoding of the body.
    ///
    /// Transport errors propagate; a non-JSON body is a `DecodeError`.
    /// The status code is not inspected: some endpoints put structured
    /// error detail in non-2xx bodies.
    fn get_json(&self, url: &str) -> Result<serde_json::Value, AppError> {
        self.get(url, &[])?.json()
    }
}
