//! Transport errors

use thiserror::Error;

use kinepong_core::KinepongError;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Socket error: {0}")]
    Socket(String),
}

impl From<TransportError> for KinepongError {
    fn from(err: TransportError) -> Self {
        KinepongError::Transport(err.to_string())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
