//! Unified error type for the Teeg server.

use teeg_protocol::ProtocolError;
use teeg_room::RoomError;
use teeg_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum TeegError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, not seated, id exhaustion, or a
    /// rules error raised inside a room).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A setting could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
