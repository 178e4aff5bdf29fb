//! Error types for the Courier core library
//!
//! Request execution never fails past the client boundary: every outcome is
//! reported through a [`ResponseEnvelope`](crate::http::ResponseEnvelope).
//! These errors exist for callers that want to turn an envelope into a
//! `Result` and propagate failures with `?`.

use thiserror::Error;

/// Main error type for Courier operations
#[derive(Error, Debug)]
pub enum Error {
    /// The request was rejected before anything was sent
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// The request was sent but did not succeed
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        /// Status code of the normalized result, `0` when none was received
        status_code: Option<u16>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json {
            message: source.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Precondition {
            message: "(url) param is empty ".to_string(),
        };
        assert!(err.to_string().contains("(url) param is empty"));

        let err = Error::Http {
            message: "Connection refused".to_string(),
            status_code: Some(500),
        };
        assert_eq!(err.to_string(), "HTTP error: Connection refused");
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn test_json_error_conversion() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = source.into();
        assert!(matches!(err, Error::Json { .. }));
        assert_eq!(err.status_code(), None);
    }
}
