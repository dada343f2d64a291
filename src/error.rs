//! Error types for story-extractor.
//!
//! Every failure in the crate is an [`Error`]. Callers that persist or report
//! failures collapse it to the closed [`ErrorKind`] taxonomy with
//! [`Error::kind`], and to a user-facing [`FailureInfo`] with
//! [`Error::to_failure`].

use serde::{Deserialize, Serialize};

/// Closed set of failure kinds recorded on stories and returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidUrl,
    ExtractionFailed,
    ParseError,
    Timeout,
    RateLimited,
    NotFound,
    StorageError,
    ValidationError,
    Unknown,
}

impl ErrorKind {
    /// Whether a caller may re-submit automatically after this failure.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited)
    }

    /// Wire name of the kind (`INVALID_URL`, `TIMEOUT`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "INVALID_URL",
            Self::ExtractionFailed => "EXTRACTION_FAILED",
            Self::ParseError => "PARSE_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::RateLimited => "RATE_LIMITED",
            Self::NotFound => "NOT_FOUND",
            Self::StorageError => "STORAGE_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for fetch, extraction, storage and orchestration operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// URL failed the http/https scheme check or its domain does not resolve.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request or render did not finish within its deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The remote answered HTTP 429.
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// The remote answered with a 5xx status.
    #[error("Server error: HTTP {status} from {url}")]
    Server { status: u16, url: String },

    /// The remote answered with a non-retryable 4xx status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Connection-level failure (refused, reset, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Headless browser session failure.
    #[error("Browser render failed: {0}")]
    Browser(String),

    /// HTML or JSON parsing failed.
    #[error("Parsing failed: {0}")]
    ParseError(String),

    /// No extractable content was found in the document.
    #[error("No extractable content found")]
    NoContent,

    /// General extraction failure.
    #[error("Extraction failed: {0}")]
    ExtractionError(String),

    /// A referenced story or batch does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage collaborator failure.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Input or configuration rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The document-generation collaborator reported a terminal failure.
    #[error("Document generation failed: {0}")]
    GenerationFailed(String),

    /// The document-generation poll loop ran out of attempts.
    #[error("Document generation timed out after {0} polls")]
    GenerationTimedOut(u32),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Collapse this error to the caller-facing taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Timeout(_) | Self::GenerationTimedOut(_) => ErrorKind::Timeout,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::Server { .. }
            | Self::Http { .. }
            | Self::Network(_)
            | Self::Browser(_)
            | Self::NoContent
            | Self::ExtractionError(_)
            | Self::GenerationFailed(_) => ErrorKind::ExtractionFailed,
            Self::ParseError(_) => ErrorKind::ParseError,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::StorageError,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the fetcher should spend another attempt on this error.
    ///
    /// Wider than [`ErrorKind::is_retryable`]: 5xx responses and
    /// connection-level failures are worth another attempt even though a
    /// caller sees them as `EXTRACTION_FAILED` once attempts run out.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited(_) | Self::Server { .. } | Self::Network(_)
        )
    }

    /// User-visible failure record.
    #[must_use]
    pub fn to_failure(&self) -> FailureInfo {
        let kind = self.kind();
        FailureInfo {
            kind,
            message: self.to_string(),
            retryable: kind.is_retryable(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Failure as reported to callers: kind, human message and retry hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeout_and_rate_limit_are_retryable() {
        let retryable: Vec<ErrorKind> = [
            ErrorKind::InvalidUrl,
            ErrorKind::ExtractionFailed,
            ErrorKind::ParseError,
            ErrorKind::Timeout,
            ErrorKind::RateLimited,
            ErrorKind::NotFound,
            ErrorKind::StorageError,
            ErrorKind::ValidationError,
            ErrorKind::Unknown,
        ]
        .into_iter()
        .filter(|k| k.is_retryable())
        .collect();

        assert_eq!(retryable, vec![ErrorKind::Timeout, ErrorKind::RateLimited]);
    }

    #[test]
    fn server_errors_are_transient_but_not_caller_retryable() {
        let err = Error::Server { status: 503, url: "https://example.com".into() };
        assert!(err.is_transient());
        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
        assert!(!err.to_failure().retryable);
    }

    #[test]
    fn client_errors_are_terminal() {
        let err = Error::Http { status: 404, url: "https://example.com/missing".into() };
        assert!(!err.is_transient());
        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
    }

    #[test]
    fn failure_info_carries_message_and_flag() {
        let failure = Error::RateLimited("example.com".into()).to_failure();
        assert_eq!(failure.kind, ErrorKind::RateLimited);
        assert!(failure.retryable);
        assert!(failure.message.contains("example.com"));
    }

    #[test]
    fn kind_serializes_in_wire_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidUrl).unwrap();
        assert_eq!(json, "\"INVALID_URL\"");
        assert_eq!(ErrorKind::InvalidUrl.to_string(), "INVALID_URL");
    }
}
