//! Error types for dnsrec
//!
//! Every failure surfaces as a single [`Error`] value. Argument problems are
//! raised before any network call; API failures abort the running
//! reconciliation without rollback.

use thiserror::Error;

/// Result type alias for dnsrec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected intent or argument (bad state, missing zone, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection-level failure talking to the zone API
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The zone API answered with a non-2xx status
    #[error("HTTP error {status}: {message}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Response body, for the operator
        message: String,
    },

    /// Any other zone API failure (unexpected response shape, decode errors)
    #[error("Other error occurred: {0}")]
    Unknown(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML rendering/parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: msg.into(),
        }
    }

    /// Create an unknown API error
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised before any network call was made
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::Config(_))
    }

    /// True for failures reported by the zone API
    pub fn is_api(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::Unknown(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::invalid_argument("state").is_precondition());
        assert!(Error::config("url").is_precondition());
        assert!(!Error::transport("refused").is_precondition());

        assert!(Error::transport("refused").is_api());
        assert!(Error::http_status(404, "gone").is_api());
        assert!(Error::unknown("garbled").is_api());
        assert!(!Error::invalid_argument("zone").is_api());
    }

    #[test]
    fn test_http_status_display() {
        let err = Error::http_status(503, "http://dns/zones: unavailable");
        assert_eq!(
            err.to_string(),
            "HTTP error 503: http://dns/zones: unavailable"
        );
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "boom"));
    }
}
