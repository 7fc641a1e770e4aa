//! Signaling channel adapter
//!
//! Bridges the external signaling transport (an ordered, reliable frame
//! stream, typically a WebSocket) and the typed [`ServerEvent`] /
//! [`ClientMessage`] protocol. The adapter owns framing and decoding only;
//! what to do with each event is the session's business.

use async_trait::async_trait;
use tracing::debug;

use crate::signaling::protocol::{ClientMessage, ParticipantId, Position, ServerEvent, SignalPayload};
use crate::Result;

/// External signaling transport (consumed interface)
///
/// Implementations deliver frames in order and without loss while the
/// connection lives. `recv` returning `None` means the transport closed.
#[async_trait]
pub trait SignalingTransport: Send {
    /// Receive the next inbound frame, or `None` on close
    async fn recv(&mut self) -> Option<String>;

    /// Obtain a cloneable handle for sending outbound frames
    fn sender(&self) -> Box<dyn SignalingSender>;
}

/// Send half of the signaling transport
///
/// Separated from [`SignalingTransport`] so the session can send from
/// event-handling code while the receive future is pending.
#[async_trait]
pub trait SignalingSender: Send + Sync {
    /// Send one outbound frame
    async fn send(&self, frame: String) -> Result<()>;
}

/// Inbound half of the signaling channel
///
/// Wraps the transport's receive side and decodes frames into typed events.
pub struct SignalingChannel {
    transport: Box<dyn SignalingTransport>,
}

impl SignalingChannel {
    /// Wrap a transport
    pub fn new(transport: Box<dyn SignalingTransport>) -> Self {
        Self { transport }
    }

    /// Split off the outbound half
    pub fn outbound(&self) -> OutboundSignaling {
        OutboundSignaling {
            sender: self.transport.sender(),
        }
    }

    /// Receive and decode the next server event.
    ///
    /// Returns `None` when the transport has closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`](crate::Error::MalformedMessage)
    /// for a frame that does not decode. The channel itself stays usable;
    /// the caller decides whether to drop the frame or tear down.
    pub async fn next_event(&mut self) -> Option<Result<ServerEvent>> {
        let frame = self.transport.recv().await?;
        debug!("Received signaling frame ({} bytes)", frame.len());
        Some(ServerEvent::from_json(&frame))
    }
}

/// Outbound half of the signaling channel
pub struct OutboundSignaling {
    sender: Box<dyn SignalingSender>,
}

impl OutboundSignaling {
    /// Relay a negotiation payload to another participant.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the transport rejects the frame.
    pub async fn send_signal(&self, to: &ParticipantId, data: SignalPayload) -> Result<()> {
        let msg = ClientMessage::Signal {
            to: to.clone(),
            data,
        };
        self.sender.send(msg.to_json()?).await
    }

    /// Report local player movement to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the transport rejects the frame.
    pub async fn send_move(&self, position: Position) -> Result<()> {
        let msg = ClientMessage::Move { position };
        self.sender.send(msg.to_json()?).await
    }
}
