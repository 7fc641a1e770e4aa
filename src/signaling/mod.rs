//! Signaling plane: wire protocol and channel adapter

pub mod channel;
pub mod protocol;

pub use channel::{OutboundSignaling, SignalingChannel, SignalingSender, SignalingTransport};
pub use protocol::{ClientMessage, ParticipantId, Position, ServerEvent, SignalPayload};
