//! Error types for the bridge client.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bridge client operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Missing or invalid connection parameters.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Operation not valid for the current lifecycle state.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Remote session create/delete rejected.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Remote cursor create/execute rejected.
    #[error("Query error: {message}")]
    Query { message: String },

    /// Remote fetch rejected.
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Network failure or timeout before the service answered.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Feature the remote protocol does not offer.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature { feature: String },

    /// Value cannot be represented as the requested type.
    #[error("Type coercion error: {message}")]
    TypeCoercion { message: String },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// Column not found.
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
        }
    }

    /// Create a type coercion error.
    pub fn type_coercion(message: impl Into<String>) -> Self {
        Self::TypeCoercion {
            message: message.into(),
        }
    }

    /// Whether this error reports a bad column index or name.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            Self::ColumnIndexOutOfBounds { .. } | Self::ColumnNotFound { .. }
        )
    }

    /// The server-supplied message for remote rejections.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Connection { message } | Self::Query { message } | Self::Fetch { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::fetch("cursor not found").to_string(),
            "Fetch error: cursor not found"
        );
        assert_eq!(
            Error::ColumnIndexOutOfBounds { index: 3, count: 2 }.to_string(),
            "Column index 3 out of bounds (columns: 2)"
        );
    }

    #[test]
    fn test_index_errors() {
        assert!(Error::ColumnNotFound { name: "x".into() }.is_index_error());
        assert!(!Error::invalid_state("closed").is_index_error());
    }

    #[test]
    fn test_server_message_preserved() {
        let err = Error::query("line 1:8: Column 'x' cannot be resolved");
        assert_eq!(
            err.server_message(),
            Some("line 1:8: Column 'x' cannot be resolved")
        );
        assert_eq!(Error::transport("timed out").server_message(), None);
    }
}
