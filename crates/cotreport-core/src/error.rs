//! Error types for the cotreport CoT forwarder.
//!
//! Transport errors never escape the forwarding session: they are matched on
//! as values and turned into a state transition plus a log line. The types
//! here exist so that those values carry enough context to be logged.

use thiserror::Error;

/// Result type alias using ReporterError as the error type.
pub type Result<T> = std::result::Result<T, ReporterError>;

/// Top-level error type for reporter operations.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Connection-related errors
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors outside the TAK connection (bus sockets, stdin)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the outbound TAK connection.
///
/// A `ConnectFailed`/`ConnectTimeout` keeps the session disconnected; any
/// write-side variant tears the connection down.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Failed to establish a connection
    #[error("Failed to connect to {addr}: {reason}")]
    ConnectFailed { addr: String, reason: String },

    /// Connection attempt did not complete in time
    #[error("Connection to {addr} timed out after {timeout_secs}s")]
    ConnectTimeout { addr: String, timeout_secs: u64 },

    /// A write to the socket failed
    #[error("Write failed: {reason}")]
    WriteFailed { reason: String },

    /// A write did not complete in time
    #[error("Write timed out after {timeout_secs}s")]
    WriteTimeout { timeout_secs: u64 },

    /// Connection was closed by the peer or locally
    #[error("Connection closed: {reason}")]
    ConnectionClosed { reason: String },
}

impl ConnectionError {
    /// Creates a connect failed error.
    pub fn connect_failed(addr: impl Into<String>, reason: impl ToString) -> Self {
        Self::ConnectFailed {
            addr: addr.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a write failed error.
    pub fn write_failed(reason: impl ToString) -> Self {
        Self::WriteFailed {
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error came from an elapsed timeout rather than the transport.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ConnectionError::ConnectTimeout { .. } | ConnectionError::WriteTimeout { .. }
        )
    }

    /// Returns true if the error happened while writing on an open connection.
    pub fn is_write_side(&self) -> bool {
        matches!(
            self,
            ConnectionError::WriteFailed { .. }
                | ConnectionError::WriteTimeout { .. }
                | ConnectionError::ConnectionClosed { .. }
        )
    }
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::connect_failed("10.0.0.1:8087", "Connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to connect to 10.0.0.1:8087: Connection refused"
        );
    }

    #[test]
    fn test_connection_error_classification() {
        let timeout = ConnectionError::WriteTimeout { timeout_secs: 10 };
        assert!(timeout.is_timeout());
        assert!(timeout.is_write_side());

        let refused = ConnectionError::connect_failed("host:1", "refused");
        assert!(!refused.is_timeout());
        assert!(!refused.is_write_side());

        let closed = ConnectionError::ConnectionClosed {
            reason: "reset".to_string(),
        };
        assert!(closed.is_write_side());
    }

    #[test]
    fn test_error_conversion() {
        let err: ReporterError = ConfigError::invalid_value("tak_port", "Port cannot be 0").into();
        assert!(matches!(err, ReporterError::Config(_)));
        assert!(err.to_string().contains("tak_port"));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: ReporterError = io.into();
        assert!(matches!(err, ReporterError::Io(_)));
    }
}
