//! Playback state for the ambient channel.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// The ambient track currently looping.
#[derive(Debug, Clone)]
pub struct CurrentTrack {
    /// Category name the track was resolved from.
    pub name: String,
    /// Full path of the file handed to the audio backend.
    pub path: PathBuf,
    /// Probed duration of one loop cycle, when the backend could
    /// determine it. `None` disables auto-advance for this track.
    pub length: Option<Duration>,
}

/// Mutable playback state, guarded by the engine's state lock.
#[derive(Debug)]
pub struct PlaybackState {
    pub(crate) current: Option<CurrentTrack>,
    /// Origin of the current loop cycle. Shifted forward on resume so
    /// the remaining time in the cycle survives a pause.
    pub(crate) started_at: Option<Instant>,
    pub(crate) paused: bool,
    pub(crate) paused_at: Option<Instant>,
    pub(crate) ambient_volume: f32,
    pub(crate) effect_volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current: None,
            started_at: None,
            paused: false,
            paused_at: None,
            ambient_volume: 1.0,
            effect_volume: 1.0,
        }
    }
}

impl PlaybackState {
    /// Time until the current track finishes its loop cycle, measured
    /// from its (possibly resume-shifted) start. `None` when nothing is
    /// playing or the track length is unknown.
    pub(crate) fn remaining_in_cycle(&self) -> Option<Duration> {
        let length = self.current.as_ref()?.length?;
        if length.is_zero() {
            return None;
        }
        let elapsed = self.started_at?.elapsed();
        let into_cycle = elapsed.as_nanos() % length.as_nanos();
        Some(length - Duration::from_nanos(into_cycle as u64))
    }
}

/// Point-in-time view of the engine for status displays.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub current: Option<String>,
    pub queued: Vec<String>,
    pub paused: bool,
    pub fading: bool,
    pub ambient_volume: f32,
    pub effect_volume: f32,
    pub fade_duration: Duration,
}
