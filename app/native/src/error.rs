//! Error types for Edgehop.
//!
//! This module provides the unified error type returned by CLI commands and
//! service start-up. Subsystems keep their own narrower errors
//! ([`HostError`], [`ConfigError`], [`ServiceError`]) which convert into it.

use thiserror::Error;

use crate::config::ConfigError;
use crate::host::HostError;
use crate::service::ServiceError;

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum EdgeHopError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A host collaborator (displays, cursor, windows) failed.
    #[error("Host error: {0}")]
    Host(#[from] HostError),
    /// The background service failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The requested operation has no implementation on this platform.
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Another instance is already running.
    #[error("Another edgehop instance is already running")]
    AlreadyRunning,
}

impl From<serde_json::Error> for EdgeHopError {
    fn from(err: serde_json::Error) -> Self { Self::InvalidArguments(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_display() {
        let err = EdgeHopError::InvalidArguments("--force cannot be combined with --stdout".to_string());
        assert_eq!(err.to_string(), "--force cannot be combined with --stdout");
    }

    #[test]
    fn test_config_error_display() {
        let err: EdgeHopError = ConfigError::Invalid("pollIntervalMs must be > 0".into()).into();
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("pollIntervalMs"));
    }

    #[test]
    fn test_host_error_from_conversion() {
        let err: EdgeHopError = HostError::CursorUnavailable.into();
        assert!(matches!(err, EdgeHopError::Host(_)));
        assert!(err.to_string().contains("Host error"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: EdgeHopError = io_err.into();
        assert!(matches!(err, EdgeHopError::Io(_)));
    }

    #[test]
    fn test_already_running_display() {
        assert!(EdgeHopError::AlreadyRunning.to_string().contains("already running"));
    }
}
