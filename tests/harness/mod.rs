//! Mesh session test harness
//!
//! Mock implementations of every external collaborator, plus a shared
//! ordered call log so tests can assert cross-collaborator ordering
//! (scene teardown before presentation teardown before connection close).

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use meshspace::{
    CaptureDevice, CaptureError, ConnectionRole, IceServer, LocalMedia, MediaConstraintProfile,
    MediaStream, MediaTrack, ParticipantId, PeerTransport, PeerTransportFactory,
    Position, PresentationSink, Result, SceneRenderer, SessionManager, SignalingChannel,
    SignalingSender, SignalingTransport, SignalPayload, TrackKind,
};

/// Install a test tracing subscriber honoring `RUST_LOG`; repeated calls
/// are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ordered record of collaborator calls, shared across mocks
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Index of the first entry equal to `needle`
    pub fn index_of(&self, needle: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == needle)
    }
}

// ---------------------------------------------------------------------------
// Signaling transport
// ---------------------------------------------------------------------------

pub struct MockSignalingTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

/// Build a transport plus handles for injecting inbound frames and
/// inspecting outbound ones. Dropping the frame sender closes the
/// transport.
pub fn mock_signaling() -> (
    MockSignalingTransport,
    mpsc::UnboundedSender<String>,
    Arc<Mutex<Vec<String>>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    (
        MockSignalingTransport {
            inbound: rx,
            sent: sent.clone(),
        },
        tx,
        sent,
    )
}

#[async_trait]
impl SignalingTransport for MockSignalingTransport {
    async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    fn sender(&self) -> Box<dyn SignalingSender> {
        Box::new(MockSignalingSender {
            sent: self.sent.clone(),
        })
    }
}

struct MockSignalingSender {
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SignalingSender for MockSignalingSender {
    async fn send(&self, frame: String) -> Result<()> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Capture device
// ---------------------------------------------------------------------------

/// Device with a scripted outcome per capture attempt; attempts beyond the
/// script succeed with a combined audio+video stream.
#[derive(Default)]
pub struct MockDevice {
    script: Mutex<VecDeque<std::result::Result<(), CaptureError>>>,
}

impl MockDevice {
    pub fn granting() -> Self {
        Self::default()
    }

    pub fn scripted(outcomes: Vec<std::result::Result<(), CaptureError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl CaptureDevice for MockDevice {
    async fn request_capture(
        &self,
        _profile: &MediaConstraintProfile,
    ) -> std::result::Result<MediaStream, CaptureError> {
        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome.map(|_| combined_stream())
    }
}

/// A combined stream with one audio and one video track
pub fn combined_stream() -> MediaStream {
    MediaStream::new(vec![
        MediaTrack::new(TrackKind::Audio),
        MediaTrack::new(TrackKind::Video),
    ])
}

// ---------------------------------------------------------------------------
// Scene renderer and presentation sink
// ---------------------------------------------------------------------------

pub struct RecordingRenderer {
    log: CallLog,
    pub position_updates: Mutex<Vec<HashMap<ParticipantId, Position>>>,
}

impl RecordingRenderer {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            position_updates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SceneRenderer for RecordingRenderer {
    async fn add_participant(&self, id: &ParticipantId) {
        self.log.push(format!("renderer.add:{}", id));
    }

    async fn remove_participant(&self, id: &ParticipantId) {
        self.log.push(format!("renderer.remove:{}", id));
    }

    async fn update_positions(&self, positions: &HashMap<ParticipantId, Position>) {
        self.log.push("renderer.positions".to_string());
        self.position_updates.lock().unwrap().push(positions.clone());
    }
}

pub struct RecordingSink {
    log: CallLog,
    pub video: Mutex<Vec<(ParticipantId, Option<MediaStream>)>>,
    pub audio: Mutex<Vec<(ParticipantId, MediaStream)>>,
}

impl RecordingSink {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            video: Mutex::new(Vec::new()),
            audio: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PresentationSink for RecordingSink {
    async fn upsert_video(&self, id: &ParticipantId, stream: Option<MediaStream>) {
        self.log.push(format!("sink.video:{}", id));
        self.video.lock().unwrap().push((id.clone(), stream));
    }

    async fn upsert_audio(&self, id: &ParticipantId, stream: MediaStream) {
        self.log.push(format!("sink.audio:{}", id));
        self.audio.lock().unwrap().push((id.clone(), stream));
    }

    async fn remove_presentation(&self, id: &ParticipantId) {
        self.log.push(format!("sink.remove:{}", id));
    }
}

// ---------------------------------------------------------------------------
// Peer transports
// ---------------------------------------------------------------------------

pub struct CreatedPeer {
    pub id: ParticipantId,
    pub role: ConnectionRole,
    pub had_stream: bool,
    pub ice_server_count: usize,
}

pub struct MockTransportState {
    pub id: ParticipantId,
    log: CallLog,
    fail_start: bool,
    pub started: AtomicBool,
    pub signals: Mutex<Vec<SignalPayload>>,
    pub sent_data: Mutex<Vec<Bytes>>,
}

struct TransportHandle(Arc<MockTransportState>);

#[async_trait]
impl PeerTransport for TransportHandle {
    async fn start_negotiation(&self) -> Result<()> {
        self.0.log.push(format!("transport.start:{}", self.0.id));
        if self.0.fail_start {
            return Err(meshspace::Error::PeerConnectionError(
                "simulated start failure".to_string(),
            ));
        }
        self.0.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn signal(&self, payload: SignalPayload) -> Result<()> {
        self.0.log.push(format!("transport.signal:{}", self.0.id));
        self.0.signals.lock().unwrap().push(payload);
        Ok(())
    }

    async fn send(&self, data: Bytes) -> Result<()> {
        self.0.log.push(format!("transport.send:{}", self.0.id));
        self.0.sent_data.lock().unwrap().push(data);
        Ok(())
    }

    async fn close(&self) {
        self.0.log.push(format!("transport.close:{}", self.0.id));
    }
}

pub struct MockPeerFactory {
    log: CallLog,
    pub created: Mutex<Vec<CreatedPeer>>,
    pub transports: Mutex<HashMap<ParticipantId, Arc<MockTransportState>>>,
    fail_start_for: Mutex<Vec<ParticipantId>>,
    fail_create_for: Mutex<Vec<ParticipantId>>,
}

impl MockPeerFactory {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            created: Mutex::new(Vec::new()),
            transports: Mutex::new(HashMap::new()),
            fail_start_for: Mutex::new(Vec::new()),
            fail_create_for: Mutex::new(Vec::new()),
        }
    }

    /// Make `start_negotiation` fail for this peer's transport
    pub fn fail_start(&self, id: ParticipantId) {
        self.fail_start_for.lock().unwrap().push(id);
    }

    /// Make transport creation itself fail for this peer
    pub fn fail_create(&self, id: ParticipantId) {
        self.fail_create_for.lock().unwrap().push(id);
    }

    pub fn transport(&self, id: &ParticipantId) -> Arc<MockTransportState> {
        self.transports.lock().unwrap().get(id).cloned().unwrap()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl PeerTransportFactory for MockPeerFactory {
    async fn create(
        &self,
        peer_id: &ParticipantId,
        role: ConnectionRole,
        ice_servers: &[IceServer],
        local_stream: Option<MediaStream>,
        _events: meshspace::peer::PeerEventSender,
    ) -> Result<Box<dyn PeerTransport>> {
        if self.fail_create_for.lock().unwrap().contains(peer_id) {
            return Err(meshspace::Error::PeerConnectionError(
                "simulated create failure".to_string(),
            ));
        }

        self.created.lock().unwrap().push(CreatedPeer {
            id: peer_id.clone(),
            role,
            had_stream: local_stream.is_some(),
            ice_server_count: ice_servers.len(),
        });

        let state = Arc::new(MockTransportState {
            id: peer_id.clone(),
            log: self.log.clone(),
            fail_start: self.fail_start_for.lock().unwrap().contains(peer_id),
            started: AtomicBool::new(false),
            signals: Mutex::new(Vec::new()),
            sent_data: Mutex::new(Vec::new()),
        });
        self.transports
            .lock()
            .unwrap()
            .insert(peer_id.clone(), state.clone());
        Ok(Box::new(TransportHandle(state)))
    }
}

// ---------------------------------------------------------------------------
// Assembled fixture
// ---------------------------------------------------------------------------

/// A session manager wired to mocks, with every handle a test needs
pub struct TestMesh {
    pub manager: SessionManager,
    pub log: CallLog,
    pub factory: Arc<MockPeerFactory>,
    pub renderer: Arc<RecordingRenderer>,
    pub sink: Arc<RecordingSink>,
    pub sent_frames: Arc<Mutex<Vec<String>>>,
    pub peer_events: meshspace::peer::PeerEventSender,
}

impl TestMesh {
    /// Manager with a granted single-rung capture
    pub fn with_media() -> Self {
        Self::build(LocalMedia::with_streams(vec![combined_stream()]))
    }

    /// Manager running in zero-stream mode
    pub fn without_media() -> Self {
        Self::build(LocalMedia::none())
    }

    fn build(media: LocalMedia) -> Self {
        let log = CallLog::new();
        let factory = Arc::new(MockPeerFactory::new(log.clone()));
        let renderer = Arc::new(RecordingRenderer::new(log.clone()));
        let sink = Arc::new(RecordingSink::new(log.clone()));

        let (transport, _frames_tx, sent_frames) = mock_signaling();
        let channel = SignalingChannel::new(Box::new(transport));
        let outbound = channel.outbound();

        let (peer_tx, _peer_rx) = mpsc::unbounded_channel();

        let manager = SessionManager::new(
            factory.clone(),
            renderer.clone(),
            sink.clone(),
            outbound,
            peer_tx.clone(),
            media,
            None,
        );

        Self {
            manager,
            log,
            factory,
            renderer,
            sink,
            sent_frames,
            peer_events: peer_tx,
        }
    }
}

pub fn pid(s: &str) -> ParticipantId {
    ParticipantId::from(s)
}
