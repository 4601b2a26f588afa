//! Sound system error types.
//!
//! This module defines the error types for athan playback. None of them is
//! fatal: a failed playback means "no sound this time" and the engine keeps
//! ticking.

use thiserror::Error;

/// Errors that can occur while loading or playing an athan recording.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// The class's asset file does not exist.
    #[error("athan recording not found: {0}")]
    AssetNotFound(String),

    /// The asset exists but is not a decodable audio file.
    #[error("failed to decode athan recording: {0}")]
    DecodeError(String),

    /// The asset could not be read.
    #[error("failed to load athan recording: {0}")]
    LoadFailed(String),

    /// The recording loaded but playback did not start.
    #[error("failed to start playback: {0}")]
    StartFailed(String),

    /// Rewinding a cached recording failed.
    #[error("failed to replay cached recording: {0}")]
    ReplayFailed(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_))
    }

    /// Returns true if this error is related to the asset file.
    #[must_use]
    pub fn is_asset_error(&self) -> bool {
        matches!(self, Self::AssetNotFound(_) | Self::DecodeError(_))
    }

    /// Returns true if the failure happened before a handle existed.
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotAvailable(_)
                | Self::AssetNotFound(_)
                | Self::DecodeError(_)
                | Self::LoadFailed(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "connect an audio output device",
            Self::AssetNotFound(_) => "place athan.mp3 and athanFajr.mp3 in the sounds directory",
            Self::DecodeError(_) => "the recording may be corrupted; replace the file",
            Self::LoadFailed(_) => "check the sounds directory permissions",
            Self::StartFailed(_) | Self::ReplayFailed(_) => {
                "press Enter to try the athan again manually"
            }
        }
    }
}
