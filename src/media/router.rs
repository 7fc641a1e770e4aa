//! Media track router
//!
//! Demultiplexes a combined inbound stream into single-kind sub-streams and
//! hands each to the external presentation sink. A kind that is absent from
//! the combined stream is skipped entirely: an audio-only stream never
//! touches the video surface, which stays in its placeholder state.

use async_trait::async_trait;
use tracing::debug;

use crate::media::{MediaStream, TrackKind};
use crate::signaling::ParticipantId;

/// On-screen media sink (external collaborator)
///
/// Upserts are idempotent per participant: repeated calls with a fresh
/// stream update the existing surface rather than duplicating it.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// Create or update the video surface for a participant.
    /// `None` creates the surface in its placeholder state.
    async fn upsert_video(&self, id: &ParticipantId, stream: Option<MediaStream>);

    /// Create or update the audio surface for a participant
    async fn upsert_audio(&self, id: &ParticipantId, stream: MediaStream);

    /// Tear down all presentation surfaces for a participant
    async fn remove_presentation(&self, id: &ParticipantId);
}

/// Demultiplexes combined inbound streams toward the presentation sink
#[derive(Debug, Default)]
pub struct TrackRouter;

impl TrackRouter {
    /// Create a new router
    pub fn new() -> Self {
        Self
    }

    /// Route one combined stream for one participant.
    ///
    /// Safe to call again for the same participant on renegotiation; the
    /// sink's upsert semantics update the surfaces in place.
    pub async fn route(
        &self,
        id: &ParticipantId,
        stream: &MediaStream,
        sink: &dyn PresentationSink,
    ) {
        if let Some(video) = stream.single_kind(TrackKind::Video) {
            debug!("Routing video sub-stream for peer {}", id);
            sink.upsert_video(id, Some(video)).await;
        }

        if let Some(audio) = stream.single_kind(TrackKind::Audio) {
            debug!("Routing audio sub-stream for peer {}", id);
            sink.upsert_audio(id, audio).await;
        }
    }
}
