//! Media stream model types
//!
//! The core never touches raw frames; streams and tracks are lightweight
//! handles identifying what the external device stack or a peer transport
//! delivered. Splitting and attachment decisions are made on these handles.

pub mod capture;
pub mod router;

pub use capture::{acquire, CaptureDevice, CaptureError, LocalMedia};
pub use router::{PresentationSink, TrackRouter};

use serde::{Deserialize, Serialize};

/// The kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    /// Audio track
    Audio,
    /// Video track
    Video,
}

/// A single media track handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrack {
    /// Track identifier, unique within its stream
    pub id: String,

    /// Audio or video
    pub kind: TrackKind,
}

impl MediaTrack {
    /// Create a track with a generated identifier
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
        }
    }

    /// Create a track with a known identifier
    pub fn with_id(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A media stream: an ordered collection of tracks under one identity.
///
/// Combined streams arriving from a peer may carry both kinds; single-kind
/// streams are what the presentation sink consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStream {
    id: String,
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    /// Create a stream with a generated identifier
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
        }
    }

    /// Create a stream with a known identifier
    pub fn with_id(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    /// Stream identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Tracks of one kind, in order
    pub fn tracks_of_kind(&self, kind: TrackKind) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    /// Whether the stream carries at least one audio track
    pub fn has_audio(&self) -> bool {
        self.tracks_of_kind(TrackKind::Audio).next().is_some()
    }

    /// Whether the stream carries at least one video track
    pub fn has_video(&self) -> bool {
        self.tracks_of_kind(TrackKind::Video).next().is_some()
    }

    /// Build a fresh single-kind stream around the first track of `kind`,
    /// or `None` when the kind is absent.
    pub fn single_kind(&self, kind: TrackKind) -> Option<MediaStream> {
        self.tracks_of_kind(kind)
            .next()
            .cloned()
            .map(|track| MediaStream::new(vec![track]))
    }
}

/// One rung of the capture quality ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraintProfile {
    /// Audio constraints, `None` for a video-only profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConstraints>,

    /// Video constraints, `None` for an audio-only profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoConstraints>,
}

/// Audio capture constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConstraints {
    /// Enable echo cancellation
    pub echo_cancellation: bool,
    /// Enable noise suppression
    pub noise_suppression: bool,
}

/// Video capture constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConstraints {
    /// Capture width in pixels
    pub width: u32,
    /// Capture height in pixels
    pub height: u32,
    /// Capture frame rate in fps
    pub frame_rate: f32,
}
