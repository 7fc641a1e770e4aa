//! Peer transport seam
//!
//! The actual media-plane connection (RTCPeerConnection or equivalent) lives
//! outside the core. The core drives it through [`PeerTransport`] and learns
//! about its progress through [`PeerEvent`]s pushed onto the session's event
//! queue.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::config::IceServer;
use crate::media::MediaStream;
use crate::signaling::{ParticipantId, SignalPayload};
use crate::{Error, Result};

/// Which end of a peer connection drives the initial offer
///
/// Fixed when the connection is created and never mutated afterwards.
/// The participant already in the session initiates toward each newcomer;
/// the newcomer responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// This end produces the initial offer
    Initiator,
    /// This end answers the remote offer
    Responder,
}

impl ConnectionRole {
    /// Glare tie-break for simultaneous offers.
    ///
    /// When both ends have offered at once, the end with the
    /// lexicographically smaller identity keeps the `Initiator` role and
    /// the other yields. Deterministic and antisymmetric, so both ends
    /// reach the same verdict without another round trip.
    pub fn initiates_on_tie(self_id: &ParticipantId, peer_id: &ParticipantId) -> bool {
        self_id < peer_id
    }

    /// True for the offering end
    pub fn is_initiator(&self) -> bool {
        matches!(self, ConnectionRole::Initiator)
    }
}

/// Asynchronous events reported by a peer transport
///
/// `Connected` and `Stream` are independent: media can arrive before or
/// after the connected notification, and handlers must not assume an order.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// Outbound negotiation payload to relay via the signaling server
    Signal(SignalPayload),

    /// The connection reached its connected state
    Connected,

    /// A combined remote media stream arrived
    Stream(MediaStream),

    /// A data-channel message arrived
    Data(Bytes),

    /// The transport failed terminally
    Error(String),
}

/// Handle for pushing transport events into the session's event queue
pub type PeerEventSender = mpsc::UnboundedSender<(ParticipantId, PeerEvent)>;

/// One media-plane connection to a remote participant (consumed interface)
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Begin negotiation. Only meaningful for the `Initiator` end; the
    /// first outbound payload arrives as a [`PeerEvent::Signal`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot start an offer.
    async fn start_negotiation(&self) -> Result<()>;

    /// Feed a relayed negotiation payload from the remote end.
    ///
    /// Accepted at any point in the connection's life, including
    /// renegotiation after it is already connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the payload.
    async fn signal(&self, payload: SignalPayload) -> Result<()>;

    /// Send a data-channel message.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is not open.
    async fn send(&self, data: Bytes) -> Result<()>;

    /// Swap the attached outbound stream without renegotiating from
    /// scratch. Capability hook for quality switching; transports that do
    /// not support it keep this default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PeerConnectionError`] unless overridden.
    async fn replace_stream(&self, _stream: MediaStream) -> Result<()> {
        Err(Error::PeerConnectionError(
            "Transport does not support stream replacement".to_string(),
        ))
    }

    /// Release the connection and everything attached to it. Idempotent.
    async fn close(&self);
}

/// Creates peer transports (consumed interface)
///
/// The ICE server list is the one delivered at introduction, passed through
/// unmodified for every connection in the session.
#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    /// Create a transport toward `peer_id`.
    ///
    /// # Arguments
    ///
    /// * `peer_id` - Remote participant identity
    /// * `role` - Which end offers first
    /// * `ice_servers` - Session ICE configuration
    /// * `local_stream` - Outbound stream to attach, if capture succeeded
    /// * `events` - Queue for the transport's async events
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying connection cannot be created.
    async fn create(
        &self,
        peer_id: &ParticipantId,
        role: ConnectionRole,
        ice_servers: &[IceServer],
        local_stream: Option<MediaStream>,
        events: PeerEventSender,
    ) -> Result<Box<dyn PeerTransport>>;
}
