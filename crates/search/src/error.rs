//! Error types for the search client.
//!
//! Errors are grouped by what the caller can do about them: transport
//! failures (the engine could not be reached), missing indices or documents,
//! requests the engine rejected, payloads that could not be (de)serialized,
//! and invalid connection configuration.
//!
//! Partial bulk failures and partial shard failures are not
//! errors. They are reported through [`BulkOutcome`](crate::types::BulkOutcome)
//! and the boolean result of refresh/flush respectively.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The engine could not be reached or did not answer in time.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The addressed index or document does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The engine answered with a non-success status.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A payload could not be encoded or a response could not be decoded.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The connection configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Returns true if this error reports a missing index or document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Returns true if this error is a connectivity or timeout failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Connectivity failures. Never retried by this crate.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("{operation} timed out")]
    Timeout {
        operation: &'static str,
        #[source]
        source: elasticsearch::Error,
    },

    /// The request could not be sent or its response could not be read.
    #[error("{operation} failed to reach the engine: {source}")]
    ConnectionFailed {
        operation: &'static str,
        #[source]
        source: elasticsearch::Error,
    },

    /// The transport itself could not be built.
    #[error("failed to build transport: {message}")]
    Build { message: String },
}

impl TransportError {
    /// Classifies an error returned by the transport layer.
    pub(crate) fn from_send(operation: &'static str, source: elasticsearch::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout { operation, source }
        } else {
            TransportError::ConnectionFailed { operation, source }
        }
    }
}

/// A lookup targeted something that does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// The index does not exist.
    #[error("index not found: {index}")]
    Index { index: String },

    /// The document does not exist in the index.
    #[error("document not found: {index}/{id}")]
    Document { index: String, id: String },
}

/// The engine rejected a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Non-success HTTP status with the engine's error type and reason.
    #[error("{operation} rejected with status {status} ({error_type}): {reason}")]
    Rejected {
        operation: &'static str,
        status: u16,
        error_type: String,
        reason: String,
    },
}

/// Encoding or decoding failures.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// A document or request body could not be encoded as JSON.
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A response body did not match the expected shape or result type.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A field required to interpret the response is absent.
    #[error("{operation} response is missing '{field}'")]
    MissingField {
        operation: &'static str,
        field: String,
    },
}

/// Invalid connection configuration or request target.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No node URL was configured.
    #[error("at least one node URL is required")]
    NoNodes,

    /// A node URL could not be parsed.
    #[error("invalid node URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The trust store could not be read or parsed.
    #[error("invalid trust store '{path}': {message}")]
    TrustStore { path: String, message: String },

    /// Mutually exclusive options were combined.
    #[error("conflicting options: {message}")]
    Conflict { message: String },

    /// An index name the engine would not treat as a single index. Rejected
    /// before any request is sent.
    #[error("{operation}: invalid index name '{index}': {reason}")]
    InvalidIndexName {
        operation: &'static str,
        index: String,
        reason: &'static str,
    },
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ClientError::from(NotFoundError::Document {
            index: "products".to_string(),
            id: "42".to_string(),
        });
        assert_eq!(err.to_string(), "document not found: products/42");
        assert!(err.is_not_found());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_engine_rejection_display() {
        let err = ClientError::from(EngineError::Rejected {
            operation: "create index",
            status: 400,
            error_type: "mapper_parsing_exception".to_string(),
            reason: "unknown type".to_string(),
        });
        assert!(err.to_string().contains("status 400"));
        assert!(err.to_string().contains("mapper_parsing_exception"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_config_error_display() {
        let err = ClientError::from(ConfigError::InvalidUrl {
            url: "::".to_string(),
            message: "relative URL without a base".to_string(),
        });
        assert!(err.to_string().starts_with("invalid node URL '::'"));
    }

    #[test]
    fn test_invalid_index_name_display() {
        let err = ClientError::from(ConfigError::InvalidIndexName {
            operation: "count",
            index: String::new(),
            reason: "index name is empty",
        });
        assert_eq!(err.to_string(), "count: invalid index name '': index name is empty");
        assert!(!err.is_not_found());
        assert!(!err.is_transport());
    }
}
