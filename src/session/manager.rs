//! Peer session manager
//!
//! Owns the client registry: one record per remote participant, created on
//! roster events and removed in a fixed order on departure. All methods run
//! on the session event loop, so the registry needs no locking.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::config::IceServer;
use crate::media::capture::LocalMedia;
use crate::media::router::{PresentationSink, TrackRouter};
use crate::media::MediaStream;
use crate::peer::{
    ConnectionRole, PeerEvent, PeerEventSender, PeerLifecycle, PeerState, PeerTransportFactory,
};
use crate::session::SceneRenderer;
use crate::signaling::{OutboundSignaling, ParticipantId, Position, SignalPayload};
use crate::{Error, Result};

/// Presentation id for the local self-view surface
pub const LOCAL_PRESENTATION_ID: &str = "local";

/// Registry entry for one remote participant
pub struct ClientRecord {
    lifecycle: PeerLifecycle,
    /// Outbound stream attached to this connection, if any
    attached_stream: Option<MediaStream>,
    /// Last position reported by the server, consumed by the renderer
    position: Position,
}

impl ClientRecord {
    /// Current lifecycle state
    pub fn state(&self) -> PeerState {
        self.lifecycle.state()
    }

    /// Negotiation role of this connection
    pub fn role(&self) -> ConnectionRole {
        self.lifecycle.role()
    }

    /// Stream attached at connection time, if capture succeeded
    pub fn attached_stream(&self) -> Option<&MediaStream> {
        self.attached_stream.as_ref()
    }
}

/// Registry of remote participants and the side effects of roster changes
pub struct SessionManager {
    self_id: Option<ParticipantId>,
    ice_servers: Vec<IceServer>,
    local_media: LocalMedia,
    clients: HashMap<ParticipantId, ClientRecord>,
    factory: Arc<dyn PeerTransportFactory>,
    renderer: Arc<dyn SceneRenderer>,
    sink: Arc<dyn PresentationSink>,
    router: TrackRouter,
    outbound: OutboundSignaling,
    peer_events: PeerEventSender,
    greeting: Option<String>,
}

impl SessionManager {
    /// Create a manager with no identity yet; `on_introduction` completes
    /// admission.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        factory: Arc<dyn PeerTransportFactory>,
        renderer: Arc<dyn SceneRenderer>,
        sink: Arc<dyn PresentationSink>,
        outbound: OutboundSignaling,
        peer_events: PeerEventSender,
        local_media: LocalMedia,
        greeting: Option<String>,
    ) -> Self {
        Self {
            self_id: None,
            ice_servers: Vec::new(),
            local_media,
            clients: HashMap::new(),
            factory,
            renderer,
            sink,
            router: TrackRouter::new(),
            outbound,
            peer_events,
            greeting,
        }
    }

    /// Identity assigned at introduction, if admitted
    pub fn self_id(&self) -> Option<&ParticipantId> {
        self.self_id.as_ref()
    }

    /// Number of registered remote participants
    pub fn participant_count(&self) -> usize {
        self.clients.len()
    }

    /// Whether a participant is registered
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.clients.contains_key(id)
    }

    /// Lifecycle state of a registered participant
    pub fn peer_state(&self, id: &ParticipantId) -> Option<PeerState> {
        self.clients.get(id).map(|r| r.state())
    }

    /// Show the local self-view on the presentation sink.
    ///
    /// With capture granted the highest-quality stream backs the surface;
    /// without it the surface appears in its placeholder state.
    pub async fn announce_local_view(&self) {
        let stream = if self.local_media.granted() {
            self.local_media.primary().cloned()
        } else {
            None
        };
        self.sink
            .upsert_video(&ParticipantId::from(LOCAL_PRESENTATION_ID), stream)
            .await;
    }

    /// Session admission: record identity and ICE configuration, then open
    /// an initiating connection toward every participant already present.
    pub async fn on_introduction(
        &mut self,
        id: ParticipantId,
        peers: Vec<ParticipantId>,
        ice_servers: Vec<IceServer>,
    ) {
        info!(
            "Introduced as {} with {} existing participant(s)",
            id,
            peers.len()
        );
        self.self_id = Some(id);
        self.ice_servers = ice_servers;

        for peer_id in peers {
            if Some(&peer_id) == self.self_id.as_ref() {
                continue;
            }
            self.add_peer(peer_id, ConnectionRole::Initiator).await;
        }
    }

    /// A newcomer joined; open a responding connection toward them.
    ///
    /// Self and already-known ids are guarded no-ops, so replayed roster
    /// events cannot produce duplicate connections.
    pub async fn on_participant_joined(&mut self, id: ParticipantId) {
        if Some(&id) == self.self_id.as_ref() {
            debug!("Ignoring join event for self");
            return;
        }
        if self.clients.contains_key(&id) {
            warn!("Ignoring duplicate join for peer {}", id);
            return;
        }
        info!("Peer {} joined", id);
        self.add_peer(id, ConnectionRole::Responder).await;
    }

    async fn add_peer(&mut self, peer_id: ParticipantId, role: ConnectionRole) {
        let attached_stream = self.local_media.primary().cloned();

        let transport = match self
            .factory
            .create(
                &peer_id,
                role,
                &self.ice_servers,
                attached_stream.clone(),
                self.peer_events.clone(),
            )
            .await
        {
            Ok(t) => t,
            Err(e) => {
                // Without a transport there is nothing to register; the
                // peer's eventual leave event is still a harmless no-op.
                error!("Failed to create transport for peer {}: {}", peer_id, e);
                return;
            }
        };

        let mut lifecycle = PeerLifecycle::new(peer_id.clone(), role, transport);
        if let Err(e) = lifecycle.begin().await {
            // The errored record stays listed until the peer leaves
            warn!("Negotiation start failed for peer {}: {}", peer_id, e);
        }

        self.clients.insert(
            peer_id.clone(),
            ClientRecord {
                lifecycle,
                attached_stream,
                position: Position::default(),
            },
        );
        self.renderer.add_participant(&peer_id).await;
    }

    /// A participant left. Teardown runs in a fixed order: scene first,
    /// then presentation surfaces, then the connection, then the record.
    pub async fn on_participant_left(&mut self, id: ParticipantId) {
        let Some(mut record) = self.clients.remove(&id) else {
            debug!("Ignoring leave event for unknown peer {}", id);
            return;
        };
        info!("Peer {} left", id);

        self.renderer.remove_participant(&id).await;
        self.sink.remove_presentation(&id).await;
        record.lifecycle.destroy().await;
    }

    /// Route a relayed negotiation payload to the addressed peer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPeer`] when no record exists for the sender;
    /// the payload is dropped, never buffered.
    pub async fn on_signal(&mut self, from: &ParticipantId, payload: SignalPayload) -> Result<()> {
        let Some(record) = self.clients.get_mut(from) else {
            return Err(Error::UnknownPeer(format!(
                "Signal from unregistered peer {}",
                from
            )));
        };
        record.lifecycle.on_signal(payload).await
    }

    /// Drive the lifecycle with a transport-reported event and perform its
    /// side effects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPeer`] for events from peers that were
    /// already removed; other errors come from the signaling send path.
    pub async fn handle_peer_event(
        &mut self,
        peer_id: &ParticipantId,
        event: PeerEvent,
    ) -> Result<()> {
        if !self.clients.contains_key(peer_id) {
            return Err(Error::UnknownPeer(format!(
                "Event from unregistered peer {}",
                peer_id
            )));
        }

        match event {
            PeerEvent::Signal(payload) => {
                self.outbound.send_signal(peer_id, payload).await?;
            }
            PeerEvent::Connected => {
                if let Some(record) = self.clients.get_mut(peer_id) {
                    record.lifecycle.on_connected();
                }
                self.send_greeting(peer_id).await;
            }
            PeerEvent::Stream(stream) => {
                debug!("Remote stream arrived from peer {}", peer_id);
                self.router.route(peer_id, &stream, self.sink.as_ref()).await;
            }
            PeerEvent::Data(data) => {
                debug!("Data from peer {} ({} bytes)", peer_id, data.len());
            }
            PeerEvent::Error(message) => {
                if let Some(record) = self.clients.get_mut(peer_id) {
                    record.lifecycle.on_error(&message);
                }
            }
        }
        Ok(())
    }

    async fn send_greeting(&self, peer_id: &ParticipantId) {
        let text = match (&self.greeting, &self.self_id) {
            (Some(text), _) => text.clone(),
            (None, Some(self_id)) => format!("hello from {}", self_id),
            (None, None) => return,
        };
        if let Some(record) = self.clients.get(peer_id) {
            if let Err(e) = record.lifecycle.send_data(Bytes::from(text)).await {
                warn!("Failed to greet peer {}: {}", peer_id, e);
            }
        }
    }

    /// Server-reported scene positions: remember each known peer's position
    /// and forward the full map to the renderer.
    pub async fn on_positions(&mut self, positions: HashMap<ParticipantId, Position>) {
        for (id, position) in &positions {
            if let Some(record) = self.clients.get_mut(id) {
                record.position = *position;
            }
        }
        self.renderer.update_positions(&positions).await;
    }

    /// Destroy every remaining connection, in no particular order. Used
    /// when the signaling transport closes.
    pub async fn teardown(&mut self) {
        let ids: Vec<ParticipantId> = self.clients.keys().cloned().collect();
        for id in ids {
            self.on_participant_left(id).await;
        }
    }
}
