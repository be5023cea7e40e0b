// ABOUTME: Modem error types covering transport failures, protocol violations and encoding limits
// ABOUTME: Keeps the raw modem response text so failed transactions can be diagnosed

use crate::codec::CodecError;
use crate::splitter::EncodingError;
use std::io;
use thiserror::Error;

/// A response from the modem that ends a transaction in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The modem sent something other than the prompt or a result line
    #[error("Unexpected response: {0:?}")]
    UnexpectedResponse(String),

    /// The modem explicitly reported `+CMS ERROR:`
    #[error("Device reported error: {0}")]
    DeviceReportedError(String),
}

impl ProtocolError {
    /// The raw response line that caused the failure
    pub fn response(&self) -> &str {
        match self {
            ProtocolError::UnexpectedResponse(text) | ProtocolError::DeviceReportedError(text) => {
                text
            }
        }
    }

    /// The numeric `+CMS ERROR` code, when the modem reported one
    pub fn cms_error_code(&self) -> Option<u16> {
        match self {
            ProtocolError::DeviceReportedError(text) => text
                .strip_prefix("+CMS ERROR:")
                .and_then(|code| code.trim().parse().ok()),
            ProtocolError::UnexpectedResponse(_) => None,
        }
    }
}

/// Comprehensive error type for modem operations
#[derive(Debug, Error)]
pub enum ModemError {
    /// I/O error on the modem link (write, read, timeout, closed stream)
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// The modem rejected or garbled the exchange
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The message could not be segmented
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// The message fields could not be encoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Transaction not in correct state for operation
    #[error("Invalid transaction state: {0}")]
    InvalidState(String),
}

/// Result type alias for modem operations
pub type ModemResult<T> = Result<T, ModemError>;
