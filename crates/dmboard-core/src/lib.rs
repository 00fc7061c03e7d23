//! dmboard-core — ambient playback engine for a tabletop soundboard.
//!
//! Two output channels: a looping ambient bed and a one-shot effect
//! channel. Ambient categories queue FIFO; a timer advances the queue
//! at loop boundaries; fades ramp volume on background threads.
//!
//! # Architecture
//!
//! ```text
//! SoundCatalog   category name -> file path (JSON config)
//! AmbientEngine  state machine: current track, queue, timer, fades
//! AudioBackend   trait seam: rodio on native, NullBackend headless
//! ```

pub mod backend;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod models;
pub mod timer;

pub use backend::{AudioBackend, Channel, NullBackend};
pub use catalog::{CatalogConfig, SoundCatalog, SoundKind};
pub use engine::AmbientEngine;
pub use error::{CatalogError, EngineError};
pub use models::{CurrentTrack, EngineSnapshot, PlaybackState};
