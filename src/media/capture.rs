//! Local media acquisition
//!
//! Attempts the configured constraint profiles strictly in order against the
//! local capture device. The profiles form a refinement ladder under a single
//! granted permission, so the first failure aborts the whole acquisition:
//! it never skips a failing rung and continues. Operating with zero capture
//! streams is a fully supported mode (audio/video-less participation).

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::media::{MediaConstraintProfile, MediaStream};

/// Errors surfaced by the local capture device
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The user or platform denied capture permission
    #[error("Capture permission denied: {0}")]
    PermissionDenied(String),

    /// No usable capture device present
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Device exists but is claimed by another consumer
    #[error("Capture device busy: {0}")]
    Busy(String),
}

/// Local media device API (external collaborator)
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request a capture stream honoring `profile`
    async fn request_capture(
        &self,
        profile: &MediaConstraintProfile,
    ) -> std::result::Result<MediaStream, CaptureError>;
}

/// The outcome of local media acquisition for the session.
///
/// Streams are ordered highest to lowest requested quality; index 0 is the
/// stream attached to new outbound connections. Immutable once acquisition
/// completes for the session.
#[derive(Debug, Clone)]
pub struct LocalMedia {
    streams: Vec<MediaStream>,
    granted: bool,
}

impl LocalMedia {
    /// The no-media outcome (acquisition denied or failed)
    pub fn none() -> Self {
        Self {
            streams: Vec::new(),
            granted: false,
        }
    }

    /// A successful outcome with the given streams, highest quality first
    pub fn with_streams(streams: Vec<MediaStream>) -> Self {
        Self {
            streams,
            granted: true,
        }
    }

    /// Whether acquisition fully succeeded
    pub fn granted(&self) -> bool {
        self.granted
    }

    /// All acquired streams, highest quality first
    pub fn streams(&self) -> &[MediaStream] {
        &self.streams
    }

    /// The stream attached to new outbound connections, if any
    pub fn primary(&self) -> Option<&MediaStream> {
        self.streams.first()
    }
}

/// Acquire local capture streams over a descending-quality ladder.
///
/// Profiles are attempted strictly in order. The first failure aborts the
/// entire acquisition and yields the no-media outcome; partial results are
/// discarded. An empty ladder succeeds vacuously with zero streams.
pub async fn acquire(device: &dyn CaptureDevice, profiles: &[MediaConstraintProfile]) -> LocalMedia {
    let mut streams = Vec::with_capacity(profiles.len());

    for (i, profile) in profiles.iter().enumerate() {
        match device.request_capture(profile).await {
            Ok(stream) => {
                debug!("Acquired capture stream {}/{}", i + 1, profiles.len());
                streams.push(stream);
            }
            Err(e) => {
                warn!("Capture acquisition aborted at profile {}: {}", i, e);
                return LocalMedia::none();
            }
        }
    }

    info!(
        "Local media acquisition complete: {} stream(s)",
        streams.len()
    );

    LocalMedia {
        streams,
        granted: true,
    }
}
