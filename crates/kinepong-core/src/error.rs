//! Error types shared across KinePong crates

use thiserror::Error;

/// Core KinePong errors
///
/// Stage-specific crates carry their own richer error enums and convert
/// into this one at crate boundaries.
#[derive(Error, Debug)]
pub enum KinepongError {
    // Decode errors
    #[error("Frame decode failed: {0}")]
    Decode(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

/// Result type for KinePong operations
pub type KinepongResult<T> = Result<T, KinepongError>;
