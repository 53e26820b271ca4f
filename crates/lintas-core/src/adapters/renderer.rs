//! Document renderer that hands out stable URLs.
//!
//! The actual PDF generation happens in a separate service; the core only
//! needs an opaque reference it can give back to the caller.

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::domain::{DocumentRef, DocumentRequest, LogisticsError, LogisticsResult};
use crate::ports::outbound::DocumentRenderer;

/// Builds `{base_url}/{kind}/{subject}.pdf` references.
#[derive(Debug, Clone)]
pub struct UrlDocumentRenderer {
    base_url: String,
}

impl UrlDocumentRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl DocumentRenderer for UrlDocumentRenderer {
    fn render(&self, request: &DocumentRequest) -> LogisticsResult<DocumentRef> {
        if self.base_url.is_empty() {
            return Err(LogisticsError::Renderer(
                "no document base URL configured".to_string(),
            ));
        }
        let reference = format!(
            "{}/{}/{}.pdf",
            self.base_url,
            request.kind(),
            request.subject()
        );
        debug!(%reference, "Document reference issued");
        Ok(DocumentRef {
            kind: request.kind().to_string(),
            reference,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}
