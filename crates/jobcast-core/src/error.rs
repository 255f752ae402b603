use thiserror::Error;

/// Application-wide error types for jobcast.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (status line, protocol, or body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error (DNS, refused, reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Body could not be decoded as expected (non-JSON where JSON was
    /// expected, or non-UTF-8 text on the strict HTML path).
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A query was attempted before any document was loaded.
    #[error("no document loaded")]
    NoDocument,

    /// A fetch was attempted before any URL was set.
    #[error("no URL set")]
    NoUrl,

    /// Tag/attribute criteria could not be compiled into a selector.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// XPath expression could not be parsed or did not yield nodes.
    #[error("XPath error: {0}")]
    XPathError(String),

    /// XPath expression was valid but matched nothing.
    #[error("XPath matched no nodes: {0}")]
    XPathNoMatch(String),

    /// A record failed construction-time validation.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error originated in the transport layer
    /// (as opposed to decoding, querying, or validation).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }

    /// Returns true if this error means "the query found nothing",
    /// as opposed to the query being malformed.
    pub fn is_no_match(&self) -> bool {
        matches!(self, AppError::XPathNoMatch(_))
    }
}
