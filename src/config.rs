//! Configuration types for the mesh session

use serde::{Deserialize, Serialize};

use crate::media::{AudioConstraints, MediaConstraintProfile, VideoConstraints};

/// Default capture resolution, highest rung of the quality ladder
pub const DEFAULT_VIDEO_WIDTH: u32 = 160;
/// Default capture height
pub const DEFAULT_VIDEO_HEIGHT: u32 = 120;

/// Main configuration for a mesh session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Signaling server URL (ws:// or wss://)
    pub signaling_url: String,

    /// Capture constraint profiles, ordered highest to lowest quality.
    /// Acquisition attempts them strictly in order as a refinement ladder.
    pub constraint_profiles: Vec<MediaConstraintProfile>,

    /// Greeting sent over the peer channel once a connection is established.
    /// `None` uses a default derived from the local participant identity.
    pub greeting: Option<String>,
}

/// ICE server entry, delivered once by the signaling server at introduction
/// and passed unmodified into every peer transport created afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs (stun: / turn: / turns:)
    pub urls: Vec<String>,

    /// Username for TURN authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Credential for TURN authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://localhost:8080".to_string(),
            constraint_profiles: default_constraint_profiles(),
            greeting: None,
        }
    }
}

/// The default three-rung descending quality ladder: full capture size at
/// 10 fps, half size at 5 fps, half size at 0.5 fps. Audio constraints are
/// identical on every rung.
pub fn default_constraint_profiles() -> Vec<MediaConstraintProfile> {
    let audio = AudioConstraints {
        echo_cancellation: true,
        noise_suppression: true,
    };

    vec![
        MediaConstraintProfile {
            audio: Some(audio.clone()),
            video: Some(VideoConstraints {
                width: DEFAULT_VIDEO_WIDTH,
                height: DEFAULT_VIDEO_HEIGHT,
                frame_rate: 10.0,
            }),
        },
        MediaConstraintProfile {
            audio: Some(audio.clone()),
            video: Some(VideoConstraints {
                width: DEFAULT_VIDEO_WIDTH / 2,
                height: DEFAULT_VIDEO_HEIGHT / 2,
                frame_rate: 5.0,
            }),
        },
        MediaConstraintProfile {
            audio: Some(audio),
            video: Some(VideoConstraints {
                width: DEFAULT_VIDEO_WIDTH / 2,
                height: DEFAULT_VIDEO_HEIGHT / 2,
                frame_rate: 0.5,
            }),
        },
    ]
}

impl MeshConfig {
    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `signaling_url` is not a WebSocket URL
    /// - a constraint profile requests neither audio nor video
    /// - a video constraint has a zero dimension or non-positive frame rate
    pub fn validate(&self) -> crate::Result<()> {
        use crate::Error;

        if !self.signaling_url.starts_with("ws://") && !self.signaling_url.starts_with("wss://") {
            return Err(Error::InvalidConfig(format!(
                "signaling_url must start with ws:// or wss://, got {}",
                self.signaling_url
            )));
        }

        for (i, profile) in self.constraint_profiles.iter().enumerate() {
            if profile.audio.is_none() && profile.video.is_none() {
                return Err(Error::InvalidConfig(format!(
                    "constraint profile {} requests neither audio nor video",
                    i
                )));
            }
            if let Some(video) = &profile.video {
                if video.width == 0 || video.height == 0 {
                    return Err(Error::InvalidConfig(format!(
                        "constraint profile {} has a zero video dimension",
                        i
                    )));
                }
                if video.frame_rate <= 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "constraint profile {} has non-positive frame rate {}",
                        i, video.frame_rate
                    )));
                }
            }
        }

        Ok(())
    }
}
