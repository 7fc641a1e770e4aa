//! Peer connection lifecycle state machine
//!
//! Tracks one remote participant's connection from creation to teardown.
//! Transitions are driven by the session event loop; the machine itself is
//! single-owner state with no interior locking.
//!
//! ```text
//! Idle -> Negotiating -> Connected -> Closed
//!            |               |
//!            +--> Errored <--+         (inert; destroy still permitted)
//! ```

use tracing::{debug, error, info, warn};

use crate::peer::transport::{ConnectionRole, PeerTransport};
use crate::signaling::{ParticipantId, SignalPayload};
use crate::{Error, Result};

/// Lifecycle state of a peer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Created, negotiation not yet started
    Idle,
    /// Offer/answer exchange in progress
    Negotiating,
    /// Media plane established
    Connected,
    /// Torn down; terminal
    Closed,
    /// Failed terminally; inert until destroyed
    Errored,
}

impl PeerState {
    /// True while the connection has not terminated
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            PeerState::Idle | PeerState::Negotiating | PeerState::Connected
        )
    }

    /// True if relayed negotiation payloads should still be applied.
    /// Connected peers keep accepting them for renegotiation.
    pub fn accepts_signaling(&self) -> bool {
        self.is_live()
    }
}

/// State machine for one remote participant's connection
pub struct PeerLifecycle {
    peer_id: ParticipantId,
    role: ConnectionRole,
    state: PeerState,
    transport: Box<dyn PeerTransport>,
}

impl PeerLifecycle {
    /// Create a lifecycle in `Idle` with a fixed role
    pub fn new(
        peer_id: ParticipantId,
        role: ConnectionRole,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        debug!("Created {:?} lifecycle for peer {}", role, peer_id);
        Self {
            peer_id,
            role,
            state: PeerState::Idle,
            transport,
        }
    }

    /// Current state
    pub fn state(&self) -> PeerState {
        self.state
    }

    /// Negotiation role, fixed at construction
    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Remote participant identity
    pub fn peer_id(&self) -> &ParticipantId {
        &self.peer_id
    }

    fn set_state(&mut self, new_state: PeerState) {
        if self.state != new_state {
            info!(
                "Peer {} state: {:?} -> {:?}",
                self.peer_id, self.state, new_state
            );
            self.state = new_state;
        }
    }

    /// Start negotiation.
    ///
    /// Moves `Idle -> Negotiating`. For the `Initiator` end this asks the
    /// transport to produce the initial offer; the `Responder` end just
    /// starts waiting for one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegotiationFailed`] and moves to `Errored` if the
    /// transport cannot start. Calling from any state other than `Idle` is
    /// a no-op.
    pub async fn begin(&mut self) -> Result<()> {
        if self.state != PeerState::Idle {
            warn!(
                "Ignoring begin() for peer {} in state {:?}",
                self.peer_id, self.state
            );
            return Ok(());
        }

        self.set_state(PeerState::Negotiating);

        if self.role.is_initiator() {
            if let Err(e) = self.transport.start_negotiation().await {
                self.set_state(PeerState::Errored);
                return Err(Error::NegotiationFailed(format!(
                    "Failed to start negotiation with peer {}: {}",
                    self.peer_id, e
                )));
            }
        }

        Ok(())
    }

    /// Apply a relayed negotiation payload from the remote end.
    ///
    /// Accepted in every live state, including `Connected` for
    /// renegotiation. Payloads arriving after the connection terminated are
    /// logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the payload.
    pub async fn on_signal(&mut self, payload: SignalPayload) -> Result<()> {
        if !self.state.accepts_signaling() {
            warn!(
                "Dropping signal for peer {} in state {:?}",
                self.peer_id, self.state
            );
            return Ok(());
        }

        // A payload arriving while still Idle means the remote offered
        // before begin() ran; negotiation is effectively underway.
        if self.state == PeerState::Idle {
            self.set_state(PeerState::Negotiating);
        }

        self.transport.signal(payload).await
    }

    /// The transport reported its connected state
    pub fn on_connected(&mut self) {
        match self.state {
            PeerState::Negotiating => self.set_state(PeerState::Connected),
            PeerState::Connected => {}
            other => {
                warn!(
                    "Ignoring connected notification for peer {} in state {:?}",
                    self.peer_id, other
                );
            }
        }
    }

    /// The transport failed terminally
    pub fn on_error(&mut self, message: &str) {
        if self.state.is_live() {
            error!("Peer {} connection failed: {}", self.peer_id, message);
            self.set_state(PeerState::Errored);
        }
    }

    /// Send a data-channel message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PeerConnectionError`] unless the peer is connected.
    pub async fn send_data(&self, data: bytes::Bytes) -> Result<()> {
        if self.state != PeerState::Connected {
            return Err(Error::PeerConnectionError(format!(
                "Peer {} is not connected (state {:?})",
                self.peer_id, self.state
            )));
        }
        self.transport.send(data).await
    }

    /// Tear down the connection and release the transport. Idempotent and
    /// permitted from any state, including `Errored`.
    pub async fn destroy(&mut self) {
        if self.state == PeerState::Closed {
            return;
        }
        info!("Destroying connection to peer {}", self.peer_id);
        self.transport.close().await;
        self.set_state(PeerState::Closed);
    }
}
