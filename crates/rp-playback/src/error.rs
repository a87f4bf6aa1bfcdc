//! Playback-subsystem error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no playback is running")]
    NotRunning,
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
