//! Playback capability.
//!
//! Decoding and output are not done here; a [`Player`] is handed a file and
//! a volume already clamped to `0.0..=1.0`.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::PlaybackError;

/// Lowest accepted volume.
pub const MIN_VOLUME: f32 = 0.0;

/// Highest accepted volume.
pub const MAX_VOLUME: f32 = 1.0;

/// Clamp `volume` into `MIN_VOLUME..=MAX_VOLUME`; NaN becomes silence.
#[must_use]
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        MIN_VOLUME
    } else {
        volume.clamp(MIN_VOLUME, MAX_VOLUME)
    }
}

/// Something that can play an audio file.
#[cfg_attr(test, mockall::automock)]
pub trait Player: Send + Sync {
    /// Start playing `path` at `volume`.
    fn play(&self, path: &Path, volume: f32) -> Result<(), PlaybackError>;
}

/// Hands samples to the operating system's default audio application.
///
/// The OS player owns the output level, so `volume` is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlayer;

impl Player for SystemPlayer {
    fn play(&self, path: &Path, volume: f32) -> Result<(), PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::FileMissing {
                path: path.to_path_buf(),
            });
        }
        debug!(volume, "Opening {} with the system player", path.display());
        open::that_detached(path).map_err(|e| {
            warn!("System player failed for {}: {}", path.display(), e);
            PlaybackError::Failed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(0.5), 0.5);
        assert_eq!(clamp_volume(-1.0), 0.0);
        assert_eq!(clamp_volume(3.0), 1.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
    }

    #[test]
    fn test_system_player_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemPlayer
            .play(&dir.path().join("gone.wav"), 1.0)
            .unwrap_err();
        assert!(matches!(err, PlaybackError::FileMissing { .. }));
    }
}
