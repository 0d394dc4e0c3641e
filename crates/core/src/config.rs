//! Session configuration
//!
//! Everything has a default, so an empty JSON object is a valid config.
//! [`GameConfig::from_env`] reads the file named by `BEAT_TETRIS_CONFIG`
//! (when set) and then applies `BEAT_TETRIS_SEED`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::piece::PieceTimings;
use crate::playback::TempoTracks;

pub const CONFIG_PATH_ENV: &str = "BEAT_TETRIS_CONFIG";
pub const SEED_ENV: &str = "BEAT_TETRIS_SEED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for shape selection.
    pub seed: u32,
    /// Shift applied to every beat time, in seconds.
    pub clock_offset: f64,
    pub timings: PieceTimings,
    /// Alternate recordings for tempo escalation; empty means the theme ladder.
    pub tempo_tracks: TempoTracks,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            clock_offset: 0.0,
            timings: PieceTimings::default(),
            tempo_tracks: TempoTracks::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Config from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        use std::env;

        let mut config = match env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(seed) = env::var(SEED_ENV).ok().and_then(|s| s.trim().parse().ok()) {
            config.seed = seed;
        }
        Ok(config)
    }

    /// Configured tracks, or the bundled ladder when none are given.
    pub fn tempo_tracks(&self) -> TempoTracks {
        if self.tempo_tracks.tracks().is_empty() {
            TempoTracks::theme_ladder()
        } else {
            self.tempo_tracks.clone()
        }
    }

    fn validate(&self) -> Result<()> {
        let delays = [
            ("timings.hard_terminate", self.timings.hard_terminate),
            ("timings.soft_terminate", self.timings.soft_terminate),
            ("timings.input_repeat", self.timings.input_repeat),
        ];
        for (what, value) in delays {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::InvalidDuration { what, value });
            }
        }
        for track in self.tempo_tracks.tracks() {
            if !(track.duration.is_finite() && track.duration > 0.0) {
                return Err(CoreError::InvalidDuration {
                    what: "tempo track duration",
                    value: track.duration,
                });
            }
        }
        if !self.clock_offset.is_finite() {
            return Err(CoreError::Config("clock_offset must be finite".to_string()));
        }
        Ok(())
    }
}
