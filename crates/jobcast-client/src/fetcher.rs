use jobcast_core::error::AppError;
use jobcast_core::traits::Transport;
use scraper::Html;
use url::Url;

use crate::session::HttpSession;

/// Session-backed document fetcher.
///
/// Tracks a target URL, the most recently parsed document, and the last
/// HTTP status code. Generic over [`Transport`] for dependency injection
/// in tests; defaults to the real [`HttpSession`].
///
/// The HTML paths (`fetch_html`, `fetch_html_bytes`) are deliberately
/// lossy: any transport or parse failure is logged and yields `None`,
/// so a scraper keeps running across transient site failures. The JSON
/// path (`fetch_json`) is deliberately loud: JSON endpoints are assumed
/// internal/trusted, and failures there propagate to the caller.
pub struct DocumentFetcher<T: Transport = HttpSession> {
    transport: T,
    url: Option<Url>,
    document: Option<Html>,
    status: Option<u16>,
}

impl DocumentFetcher<HttpSession> {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self::with_transport(HttpSession::new()?))
    }
}

impl<T: Transport> DocumentFetcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            url: None,
            document: None,
            status: None,
        }
    }

    /// Point the fetcher at a URL and fetch it immediately.
    ///
    /// The previous document and status code are discarded before the
    /// fetch starts, so a failed load never leaves a stale document
    /// visible. An unparseable URL follows the lossy HTML policy:
    /// logged, `None`.
    pub fn load_url(&mut self, url: &str) -> Option<&Html> {
        self.document = None;
        self.status = None;

        match Url::parse(url) {
            Ok(parsed) => {
                self.url = Some(parsed);
                self.fetch_html()
            }
            Err(e) => {
                self.url = None;
                tracing::warn!(url, "Invalid URL: {e}");
                None
            }
        }
    }

    /// Re-fetch the current URL and parse the body as HTML (strict
    /// UTF-8). Failures are logged and yield `None`; the stored
    /// document keeps its prior state.
    pub fn fetch_html(&mut self) -> Option<&Html> {
        self.fetch_html_with_headers(&[])
    }

    pub fn fetch_html_with_headers(&mut self, extra_headers: &[(&str, &str)]) -> Option<&Html> {
        self.fetch(extra_headers, false)
    }

    /// Like [`fetch_html`](Self::fetch_html), but decodes the raw byte
    /// body lossily. For responses whose declared encoding the strict
    /// path mishandles.
    pub fn fetch_html_bytes(&mut self) -> Option<&Html> {
        self.fetch_html_bytes_with_headers(&[])
    }

    pub fn fetch_html_bytes_with_headers(
        &mut self,
        extra_headers: &[(&str, &str)],
    ) -> Option<&Html> {
        self.fetch(extra_headers, true)
    }

    /// Fetch the current URL and decode the body as JSON.
    ///
    /// Unlike the HTML paths, transport and decode errors propagate.
    /// The stored document and status code are untouched.
    pub fn fetch_json(&self) -> Result<serde_json::Value, AppError> {
        let url = self.url.as_ref().ok_or(AppError::NoUrl)?;
        self.transport.get_json(url.as_str())
    }

    /// Inject a document directly, bypassing the transport. The URL and
    /// status code are untouched. Useful for tests and for markup
    /// rendered by an external browser driver.
    pub fn set_html(&mut self, html: &str) {
        self.document = Some(Html::parse_document(html));
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_ref().map(Url::as_str)
    }

    pub fn document(&self) -> Option<&Html> {
        self.document.as_ref()
    }

    pub fn last_status(&self) -> Option<u16> {
        self.status
    }

    fn fetch(&mut self, extra_headers: &[(&str, &str)], lossy: bool) -> Option<&Html> {
        if let Err(e) = self.try_fetch(extra_headers, lossy) {
            let url = self.url.as_ref().map(Url::as_str).unwrap_or("<unset>");
            tracing::warn!(url, "HTML fetch failed: {e}");
            return None;
        }
        self.document.as_ref()
    }

    fn try_fetch(&mut self, extra_headers: &[(&str, &str)], lossy: bool) -> Result<(), AppError> {
        let url = self.url.as_ref().ok_or(AppError::NoUrl)?;
        let response = self.transport.get(url.as_str(), extra_headers)?;
        // Status is data even for error pages; recorded before decoding
        // so callers can inspect it when the body turns out unusable.
        self.status = Some(response.status);

        let document = if lossy {
            Html::parse_document(&response.text_lossy())
        } else {
            Html::parse_document(response.text()?)
        };
        self.document = Some(document);
        Ok(())
    }
}
