//! Data source error types.

use thiserror::Error;

/// Longest slice of a response body kept in a `Status` error.
pub const BODY_EXCERPT_CHARS: usize = 160;

/// Errors from fetching prayer timings or the Hijri date.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// The request exceeded its time budget.
    #[error("request timed out after {0}s")]
    Timeout(u64),
}

impl SourceError {
    /// Builds a `Status` error, keeping only the start of the body.
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Payload(_) => false,
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Network(_) => "check the network connection; the next refresh will retry",
            Self::Status { status, .. } if *status < 500 => {
                "check the city, country and method settings"
            }
            Self::Status { .. } => "the prayer-time service is unavailable; the next refresh will retry",
            Self::Payload(_) => "the prayer-time service returned unexpected data",
            Self::Timeout(_) => "the service is slow; try a longer --timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_truncates_body() {
        let body = "x".repeat(500);
        let err = SourceError::status(502, &body);
        match &err {
            SourceError::Status { status, body } => {
                assert_eq!(*status, 502);
                assert_eq!(body.chars().count(), BODY_EXCERPT_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("request failed with status 502"));
    }

    #[test]
    fn test_status_truncates_on_char_boundary() {
        let body = "ر".repeat(200);
        let SourceError::Status { body, .. } = SourceError::status(400, &body) else {
            panic!("expected status error");
        };
        assert_eq!(body.chars().count(), BODY_EXCERPT_CHARS);
    }

    #[test]
    fn test_short_body_kept_whole() {
        let err = SourceError::status(404, "not found");
        assert_eq!(err.to_string(), "request failed with status 404: not found");
    }

    #[test]
    fn test_classification() {
        assert!(SourceError::Timeout(15).is_timeout());
        assert!(!SourceError::Network("x".into()).is_timeout());

        assert!(SourceError::Network("x".into()).is_transient());
        assert!(SourceError::Timeout(15).is_transient());
        assert!(SourceError::status(503, "").is_transient());
        assert!(SourceError::status(429, "").is_transient());
        assert!(!SourceError::status(400, "").is_transient());
        assert!(!SourceError::Payload("x".into()).is_transient());
    }

    #[test]
    fn test_suggestion() {
        assert!(SourceError::Timeout(15).suggestion().contains("--timeout"));
        assert!(SourceError::status(400, "").suggestion().contains("city"));
        assert!(SourceError::status(500, "").suggestion().contains("next refresh"));
    }
}
