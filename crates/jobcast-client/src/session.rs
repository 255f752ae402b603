use std::time::Duration;

use jobcast_core::error::AppError;
use jobcast_core::traits::{HttpResponse, Payload, Transport};
use reqwest::blocking::Client;

/// Career pages frequently gate on the User-Agent; a browser string gets
/// past the naive checks.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking HTTP session using reqwest.
///
/// Owns a reusable connection pool and cookie jar, shared across all
/// calls on the same instance. One session per fetcher or pipeline;
/// the session does no internal locking, so concurrent use from
/// multiple threads must be synchronized by the embedding application.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl HttpSession {
    pub fn new() -> Result<Self, AppError> {
        Self::build(DEFAULT_TIMEOUT, false)
    }

    /// Rebuild the session with a different per-call timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AppError> {
        Self::build(timeout, self.accept_invalid_certs)
    }

    /// Disable TLS certificate verification.
    ///
    /// Some career sites serve expired or self-signed certificates;
    /// only use this for targets the embedding scraper explicitly
    /// trusts.
    pub fn danger_accept_invalid_certs(self) -> Result<Self, AppError> {
        Self::build(self.timeout, true)
    }

    fn build(timeout: Duration, accept_invalid_certs: bool) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            accept_invalid_certs,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }

    fn read(&self, response: reqwest::blocking::Response) -> Result<HttpResponse, AppError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

impl Transport for HttpSession {
    fn get(&self, url: &str, extra_headers: &[(&str, &str)]) -> Result<HttpResponse, AppError> {
        let mut request = self.client.get(url);
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().map_err(|e| self.map_transport_error(e))?;
        self.read(response)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<HttpResponse, AppError> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let request = match body {
            Payload::Form(fields) => request.form(&fields),
            Payload::Json(value) => request.json(&value),
        };

        let response = request.send().map_err(|e| self.map_transport_error(e))?;
        self.read(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_defaults() {
        let session = HttpSession::new().unwrap();
        assert_eq!(session.timeout, Duration::from_secs(10));
        assert!(!session.accept_invalid_certs);
    }

    #[test]
    fn test_insecure_toggle_keeps_timeout() {
        let session = HttpSession::new()
            .unwrap()
            .with_timeout(Duration::from_secs(3))
            .unwrap()
            .danger_accept_invalid_certs()
            .unwrap();
        assert_eq!(session.timeout, Duration::from_secs(3));
        assert!(session.accept_invalid_certs);
    }

    #[test]
    fn test_timeout_rebuild_keeps_insecure_flag() {
        let session = HttpSession::new()
            .unwrap()
            .danger_accept_invalid_certs()
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(session.accept_invalid_certs);
    }
}
