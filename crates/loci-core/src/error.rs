//! Error types for the loci engine.

use thiserror::Error;

/// Result type alias using loci's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for loci operations.
///
/// None of these are fatal to a running session; every variant is
/// recoverable by retrying the user action that triggered it.
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any network call (moderation heuristics,
    /// coordinate ranges, illegal state transitions).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Remote content classifier rejected the text, or the classifier call
    /// failed and the gate closed. The message is the user-facing reason.
    #[error("Classification rejected: {0}")]
    Classification(String),

    /// Note backend insert/delete/load failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Geocoder call failed. Callers degrade to empty results rather than
    /// surfacing this to the user.
    #[error("Search provider error: {0}")]
    SearchProvider(String),

    /// Realtime sync channel lifecycle failure.
    #[error("Sync channel error: {0}")]
    Channel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("Note cannot be empty.".to_string());
        assert_eq!(err.to_string(), "Validation failed: Note cannot be empty.");
    }

    #[test]
    fn test_error_display_classification() {
        let err = Error::Classification("This note violates content policy.".to_string());
        assert_eq!(
            err.to_string(),
            "Classification rejected: This note violates content policy."
        );
    }

    #[test]
    fn test_error_display_persistence() {
        let err = Error::Persistence("insert returned 500".to_string());
        assert_eq!(err.to_string(), "Persistence error: insert returned 500");
    }

    #[test]
    fn test_error_display_search_provider() {
        let err = Error::SearchProvider("geocoder unreachable".to_string());
        assert_eq!(
            err.to_string(),
            "Search provider error: geocoder unreachable"
        );
    }

    #[test]
    fn test_error_display_channel() {
        let err = Error::Channel("task join failed".to_string());
        assert_eq!(err.to_string(), "Sync channel error: task join failed");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing base URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing base URL");
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        let result = get_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::Validation("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Validation"));
    }
}
