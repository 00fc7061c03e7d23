//! Engine and configuration errors.

use thiserror::Error;

/// The single engine-level error: a category did not resolve to a
/// playable file on disk. Non-fatal; the operation that raised it
/// leaves playback state untouched.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no playable sound for category {category:?}")]
    NotFound { category: String },
}

/// Errors loading the sound catalog config. These surface at startup,
/// before the engine exists.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog config: {0}")]
    Parse(#[from] serde_json::Error),
}
