//! Error types for respcli
//!
//! Every failure the codec or the client can surface. Codec errors are
//! terminal for the reply being decoded: the stream is desynchronized
//! afterwards and the connection should be dropped.

use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Unified error type for respcli operations
#[derive(Debug, Error)]
pub enum ClientError {
    // -------------------------------------------------------------------------
    // Decoding Errors
    // -------------------------------------------------------------------------
    #[error("Truncated reply: {0}")]
    Truncated(String),

    #[error("Invalid length field: {0:?}")]
    LengthParse(String),

    #[error("Protocol format error: {0}")]
    ProtocolFormat(String),

    #[error("Unrecognized reply marker: 0x{0:02x}")]
    UnrecognizedMarker(u8),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// True for errors that leave the byte stream desynchronized
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ClientError::Truncated(_)
                | ClientError::LengthParse(_)
                | ClientError::ProtocolFormat(_)
                | ClientError::UnrecognizedMarker(_)
        )
    }
}
