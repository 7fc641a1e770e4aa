//! Per-peer connection machinery: transport seam and lifecycle state machine

pub mod lifecycle;
pub mod transport;

pub use lifecycle::{PeerLifecycle, PeerState};
pub use transport::{
    ConnectionRole, PeerEvent, PeerEventSender, PeerTransport, PeerTransportFactory,
};
