//! Error types for the mesh session core

use crate::media::capture::CaptureError;

/// Result type alias using the meshspace Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mesh session operations
///
/// None of these are fatal to the overall session: the policy at every
/// boundary is local recovery (drop the message or degrade the peer).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inbound signaling frame that could not be decoded
    #[error("Malformed signaling message: {0}")]
    MalformedMessage(String),

    /// Signaling addressed to a participant with no client record
    #[error("Unknown peer: {0}")]
    UnknownPeer(String),

    /// Peer negotiation handshake failed
    #[error("Negotiation failed: {0}")]
    NegotiationFailed(String),

    /// Signaling channel error
    #[error("Signaling error: {0}")]
    SignalingError(String),

    /// Peer transport connection error
    #[error("Peer connection error: {0}")]
    PeerConnectionError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Local media acquisition error
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is dropped per-message rather than per-peer
    pub fn is_droppable(&self) -> bool {
        matches!(self, Error::MalformedMessage(_) | Error::UnknownPeer(_))
    }

    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }

    /// Check if this error is a peer-related error
    pub fn is_peer_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownPeer(_) | Error::NegotiationFailed(_) | Error::PeerConnectionError(_)
        )
    }
}
