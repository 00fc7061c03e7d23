//! Audio output backends.
//!
//! The engine drives two fixed channels: the looping ambient bed and
//! the fire-and-forget effect channel. All methods take `&self` —
//! backends manage their own concurrency.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;

#[cfg(feature = "native")]
pub mod output;

/// The two output channels of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ambient,
    Effect,
}

impl Channel {
    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Ambient => 0,
            Channel::Effect => 1,
        }
    }
}

/// Trait for audio output backends.
pub trait AudioBackend: Send + Sync {
    /// Start `path` on `channel`, replacing whatever it was playing.
    /// `looped` repeats the source indefinitely.
    fn play(&self, channel: Channel, path: &Path, looped: bool);
    fn stop(&self, channel: Channel);
    fn pause(&self, channel: Channel);
    fn resume(&self, channel: Channel);
    fn set_volume(&self, channel: Channel, volume: f32);
    fn volume(&self, channel: Channel) -> f32;
    fn is_busy(&self, channel: Channel) -> bool;
    /// Probe the duration of a file, if the backend can tell.
    fn track_length(&self, path: &Path) -> Option<Duration>;
}

/// No-op backend for headless use. Remembers volumes so fades still
/// observe sensible values, plays nothing.
pub struct NullBackend {
    volumes: Mutex<[f32; 2]>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            volumes: Mutex::new([1.0, 1.0]),
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullBackend {
    fn play(&self, _channel: Channel, _path: &Path, _looped: bool) {}
    fn stop(&self, _channel: Channel) {}
    fn pause(&self, _channel: Channel) {}
    fn resume(&self, _channel: Channel) {}

    fn set_volume(&self, channel: Channel, volume: f32) {
        self.volumes.lock()[channel.index()] = volume.clamp(0.0, 1.0);
    }

    fn volume(&self, channel: Channel) -> f32 {
        self.volumes.lock()[channel.index()]
    }

    fn is_busy(&self, _channel: Channel) -> bool {
        false
    }

    fn track_length(&self, _path: &Path) -> Option<Duration> {
        None
    }
}
