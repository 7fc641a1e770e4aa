//! Session driver
//!
//! Wires the signaling channel, the peer registry, and the external
//! collaborators together, then runs the single event loop that owns all
//! session state. Media acquisition completes before any signaling is
//! processed; everything after that is event-ordered.

pub mod manager;

pub use manager::{ClientRecord, SessionManager, LOCAL_PRESENTATION_ID};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::MeshConfig;
use crate::media::capture::{self, CaptureDevice};
use crate::media::router::PresentationSink;
use crate::peer::{PeerEvent, PeerTransportFactory};
use crate::signaling::{
    ParticipantId, Position, ServerEvent, SignalingChannel, SignalingTransport,
};
use crate::Result;

/// Shared 3D scene view (external collaborator)
#[async_trait]
pub trait SceneRenderer: Send + Sync {
    /// A participant entered the scene
    async fn add_participant(&self, id: &ParticipantId);

    /// A participant left the scene
    async fn remove_participant(&self, id: &ParticipantId);

    /// Fresh positions for all participants
    async fn update_positions(&self, positions: &HashMap<ParticipantId, Position>);
}

/// Handle for feeding local player movement into a running session
#[derive(Clone)]
pub struct SessionHandle {
    moves: mpsc::UnboundedSender<Position>,
}

impl SessionHandle {
    /// Report a new local position; relayed to the server as a move
    /// message. Silently ignored once the session has ended.
    pub fn update_position(&self, position: Position) {
        let _ = self.moves.send(position);
    }
}

/// One participant's session in a shared space
pub struct Session {
    config: MeshConfig,
    transport: Box<dyn SignalingTransport>,
    device: Arc<dyn CaptureDevice>,
    factory: Arc<dyn PeerTransportFactory>,
    renderer: Arc<dyn SceneRenderer>,
    sink: Arc<dyn PresentationSink>,
    moves_rx: mpsc::UnboundedReceiver<Position>,
}

impl Session {
    /// Assemble a session from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if
    /// the configuration fails validation.
    pub fn new(
        config: MeshConfig,
        transport: Box<dyn SignalingTransport>,
        device: Arc<dyn CaptureDevice>,
        factory: Arc<dyn PeerTransportFactory>,
        renderer: Arc<dyn SceneRenderer>,
        sink: Arc<dyn PresentationSink>,
    ) -> Result<(Self, SessionHandle)> {
        config.validate()?;
        let (moves_tx, moves_rx) = mpsc::unbounded_channel();
        Ok((
            Self {
                config,
                transport,
                device,
                factory,
                renderer,
                sink,
                moves_rx,
            },
            SessionHandle { moves: moves_tx },
        ))
    }

    /// Run the session to completion.
    ///
    /// Acquires local media first, shows the self-view, then processes
    /// signaling events, peer transport events, and local movement from a
    /// single loop until the signaling transport closes. Remaining peer
    /// connections are destroyed on the way out.
    ///
    /// # Errors
    ///
    /// Only setup can fail; once the loop is running every per-event error
    /// is logged and recovered locally.
    pub async fn run(self) -> Result<()> {
        let Session {
            config,
            transport,
            device,
            factory,
            renderer,
            sink,
            mut moves_rx,
        } = self;

        // Startup ordering barrier: capture settles before any roster or
        // signal event is handled.
        let media = capture::acquire(device.as_ref(), &config.constraint_profiles).await;

        let mut channel = SignalingChannel::new(transport);
        let outbound = channel.outbound();
        let move_outbound = channel.outbound();
        let (peer_tx, mut peer_rx) = mpsc::unbounded_channel::<(ParticipantId, PeerEvent)>();

        let mut manager = SessionManager::new(
            factory,
            renderer,
            sink,
            outbound,
            peer_tx,
            media,
            config.greeting.clone(),
        );
        manager.announce_local_view().await;

        loop {
            tokio::select! {
                event = channel.next_event() => match event {
                    None => break,
                    Some(Ok(event)) => dispatch(&mut manager, event).await,
                    Some(Err(e)) => warn!("Dropping malformed signaling frame: {}", e),
                },
                Some((peer_id, event)) = peer_rx.recv() => {
                    if let Err(e) = manager.handle_peer_event(&peer_id, event).await {
                        warn!("Peer event from {} not handled: {}", peer_id, e);
                    }
                },
                Some(position) = moves_rx.recv() => {
                    if let Err(e) = move_outbound.send_move(position).await {
                        warn!("Failed to send move update: {}", e);
                    }
                },
            }
        }

        info!("Signaling transport closed, ending session");
        manager.teardown().await;
        Ok(())
    }
}

async fn dispatch(manager: &mut SessionManager, event: ServerEvent) {
    match event {
        ServerEvent::Introduction {
            id,
            peers,
            ice_servers,
        } => {
            manager.on_introduction(id, peers, ice_servers).await;
        }
        ServerEvent::PeerJoined { id } => {
            manager.on_participant_joined(id).await;
        }
        ServerEvent::PeerLeft { id } => {
            manager.on_participant_left(id).await;
        }
        ServerEvent::Signal { from, data } => {
            if let Err(e) = manager.on_signal(&from, data).await {
                warn!("Dropping signal from {}: {}", from, e);
            }
        }
        ServerEvent::Positions { positions } => {
            manager.on_positions(positions).await;
        }
    }
}
