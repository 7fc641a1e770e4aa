//! Signaling wire protocol types
//!
//! JSON messages exchanged with the signaling server. Negotiation payloads
//! are opaque: the core relays them between the server and the peer
//! transport without ever inspecting their contents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::config::IceServer;

/// Server-issued participant identifier
///
/// Opaque to the core; the only operation beyond equality is the ordering
/// used for glare tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// View the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Position of a participant in the shared scene
///
/// Produced by the server, consumed only by the scene renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Position {
    /// Create a position from coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Opaque negotiation payload (SDP offer/answer or ICE candidate)
///
/// The core never parses this; it is carried verbatim between the
/// signaling server and the peer transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalPayload(pub serde_json::Value);

impl SignalPayload {
    /// Wrap a raw JSON value
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Access the raw JSON value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Events delivered by the signaling server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Session admission: our identity, the current roster, and the ICE
    /// configuration for every subsequent peer connection
    Introduction {
        /// Identity assigned to this client
        id: ParticipantId,
        /// Participants already in the session (may include our own id)
        peers: Vec<ParticipantId>,
        /// ICE servers for peer transports, fixed for the session
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ice_servers: Vec<IceServer>,
    },

    /// A new participant joined after us
    PeerJoined {
        /// Identity of the newcomer
        id: ParticipantId,
    },

    /// A participant left the session
    PeerLeft {
        /// Identity of the departed participant
        id: ParticipantId,
    },

    /// Negotiation payload relayed from another participant
    Signal {
        /// Sender identity
        from: ParticipantId,
        /// Opaque negotiation payload
        data: SignalPayload,
    },

    /// Periodic scene positions for all participants
    Positions {
        /// Position per participant id
        positions: HashMap<ParticipantId, Position>,
    },
}

/// Messages sent to the signaling server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Relay a negotiation payload to another participant
    Signal {
        /// Recipient identity
        to: ParticipantId,
        /// Opaque negotiation payload
        data: SignalPayload,
    },

    /// Report local player movement
    Move {
        /// New local position
        position: Position,
    },
}

impl ServerEvent {
    /// Parse an inbound frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`](crate::Error::MalformedMessage)
    /// when the frame is not a recognized event.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::MalformedMessage(format!("Invalid server event: {}", e)))
    }

    /// Encode the event as a JSON frame
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::Error::SerializationError(format!("Failed to serialize server event: {}", e))
        })
    }
}

impl ClientMessage {
    /// Encode the message as a JSON frame
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::Error::SerializationError(format!("Failed to serialize client message: {}", e))
        })
    }

    /// Parse an outbound frame (used by test harnesses)
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::MalformedMessage(format!("Invalid client message: {}", e)))
    }
}
