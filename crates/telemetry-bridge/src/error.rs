//! Bridge Error Types

use thiserror::Error;

/// Errors that can occur on the controller link
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Could not bind the listening socket
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// Accepting the controller connection failed
    #[error("Failed to accept controller connection: {0}")]
    Accept(String),

    /// Socket I/O error
    #[error("Socket error: {0}")]
    Io(String),

    /// Peer closed the connection
    #[error("Controller closed the connection")]
    ConnectionClosed,

    /// No complete frame after the allowed number of short reads
    #[error("Incomplete frame: got {received} of {expected} bytes after {retries} retries")]
    IncompleteFrame {
        received: usize,
        expected: usize,
        retries: u32,
    },

    /// Bridge used after shutdown
    #[error("Bridge is not connected")]
    NotConnected,
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof => BridgeError::ConnectionClosed,
            _ => BridgeError::Io(err.to_string()),
        }
    }
}

impl BridgeError {
    /// Whether the link is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::ConnectionClosed
                | BridgeError::IncompleteFrame { .. }
                | BridgeError::NotConnected
        )
    }
}
