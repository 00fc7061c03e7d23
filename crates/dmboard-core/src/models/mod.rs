//! Data model shared across the engine.

pub mod playback;

pub use playback::{CurrentTrack, EngineSnapshot, PlaybackState};
