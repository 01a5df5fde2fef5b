//! Error types and handling for apsema
//!
//! Every fallible operation in the crate returns [`ApsError`]. The first four
//! variants form the fetch taxonomy (timeout, transport, parse, application);
//! the remaining ones cover the coordinator, configuration and local I/O.

use thiserror::Error;

/// Result type alias for apsema operations
pub type Result<T> = std::result::Result<T, ApsError>;

/// Main error type for apsema
#[derive(Debug, Error)]
pub enum ApsError {
    /// The request did not complete within the configured timeout
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Connection, DNS or HTTP status failures
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Malformed JSON or a response of unexpected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Well-formed vendor response carrying a non-zero `code`
    #[error("Application error: code {code}: {message}")]
    Application { code: i64, message: String },

    /// Latest-value accessor called on an empty sample series
    #[error("Empty sequence: {series} has no samples")]
    EmptySequence { series: &'static str },

    /// A poll cycle produced no usable sub-result
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    /// No successful cycle could be established at setup time
    #[error("Not ready: {message}")]
    NotReady { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization/deserialization of local files
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ApsError {
    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new application error from a vendor response code
    pub fn application<S: Into<String>>(code: i64, message: S) -> Self {
        Self::Application {
            code,
            message: message.into(),
        }
    }

    pub fn empty_sequence(series: &'static str) -> Self {
        Self::EmptySequence { series }
    }

    pub fn update_failed<S: Into<String>>(message: S) -> Self {
        Self::UpdateFailed {
            message: message.into(),
        }
    }

    pub fn not_ready<S: Into<String>>(message: S) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the fetch taxonomy (a failed API call)
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Transport { .. }
                | Self::Parse { .. }
                | Self::Application { .. }
        )
    }
}

impl From<std::io::Error> for ApsError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ApsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

// JSON only ever comes from the vendor API, so a JSON failure is a response shape problem
impl From<serde_json::Error> for ApsError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<reqwest::Error> for ApsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<chrono::ParseError> for ApsError {
    fn from(err: chrono::ParseError) -> Self {
        Self::validation("date", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ApsError::config("test config error");
        assert!(matches!(err, ApsError::Config { .. }));

        let err = ApsError::application(5001, "bad sid");
        assert!(matches!(err, ApsError::Application { code: 5001, .. }));

        let err = ApsError::validation("field", "test validation error");
        assert!(matches!(err, ApsError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = ApsError::application(2005, "request signature invalid");
        assert_eq!(
            err.to_string(),
            "Application error: code 2005: request signature invalid"
        );

        let err = ApsError::empty_sequence("power");
        assert_eq!(err.to_string(), "Empty sequence: power has no samples");
    }

    #[test]
    fn test_fetch_taxonomy() {
        assert!(ApsError::timeout("t").is_fetch_error());
        assert!(ApsError::transport("t").is_fetch_error());
        assert!(ApsError::parse("t").is_fetch_error());
        assert!(ApsError::application(1, "t").is_fetch_error());
        assert!(!ApsError::update_failed("t").is_fetch_error());
        assert!(!ApsError::config("t").is_fetch_error());
    }

    #[test]
    fn test_json_error_is_parse() {
        let err: ApsError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, ApsError::Parse { .. }));
    }
}
