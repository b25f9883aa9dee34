//! Error types for the analysis service client.
//!
//! # Design
//! A single enum covers the whole request lifecycle so callers can match on
//! the stage that failed: options (`Configuration`), client construction
//! (`TransportInit`), the network round-trip (`Transport`), or the server's
//! answer (`ServerRejected`). Nothing here is retried internally.

use thiserror::Error;

/// Errors returned by the client, its session and its request builders.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request options are malformed or incomplete. Detected before any
    /// network I/O.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The HTTP client could not be created or configured.
    #[error("failed to initialize HTTP transport: {0}")]
    TransportInit(String),

    /// Connect, DNS, read, write or timeout failure, or use of a closed session.
    #[error("transport failure: {cause}")]
    Transport { cause: String },

    /// A well-formed request was answered with a non-2xx status.
    #[error("server rejected request with HTTP {status}: {body}")]
    ServerRejected { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A snapshot part could not be read from disk.
    #[error("failed to read snapshot part: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn transport(cause: impl ToString) -> Self {
        ClientError::Transport {
            cause: cause.to_string(),
        }
    }
}
