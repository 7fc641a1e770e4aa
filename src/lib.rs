//! Peer-to-peer audio/video mesh for shared virtual spaces.
//!
//! Each participant holds a direct connection to every other participant;
//! a lightweight signaling server handles admission, roster changes, and
//! relaying opaque negotiation payloads. This crate is the session core:
//! it tracks the roster, drives each peer connection's lifecycle, and
//! routes inbound media to the presentation layer. The media plane itself,
//! capture devices, the scene renderer, and the signaling transport are
//! external collaborators behind traits.
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use meshspace::{MeshConfig, Session};
//! # async fn demo(
//! #     transport: Box<dyn meshspace::SignalingTransport>,
//! #     device: Arc<dyn meshspace::CaptureDevice>,
//! #     factory: Arc<dyn meshspace::PeerTransportFactory>,
//! #     renderer: Arc<dyn meshspace::SceneRenderer>,
//! #     sink: Arc<dyn meshspace::PresentationSink>,
//! # ) -> meshspace::Result<()> {
//! let (session, handle) = Session::new(
//!     MeshConfig::default(),
//!     transport,
//!     device,
//!     factory,
//!     renderer,
//!     sink,
//! )?;
//! // `handle.update_position(..)` feeds local movement while this runs
//! session.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;

pub use config::{default_constraint_profiles, IceServer, MeshConfig};
pub use error::{Error, Result};
pub use media::capture::{acquire, CaptureDevice, CaptureError, LocalMedia};
pub use media::router::{PresentationSink, TrackRouter};
pub use media::{
    AudioConstraints, MediaConstraintProfile, MediaStream, MediaTrack, TrackKind, VideoConstraints,
};
pub use peer::{
    ConnectionRole, PeerEvent, PeerLifecycle, PeerState, PeerTransport, PeerTransportFactory,
};
pub use session::{SceneRenderer, Session, SessionHandle, SessionManager, LOCAL_PRESENTATION_ID};
pub use signaling::{
    ClientMessage, ParticipantId, Position, ServerEvent, SignalPayload, SignalingChannel,
    SignalingSender, SignalingTransport,
};

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
