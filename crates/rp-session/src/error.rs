//! Session error type.
//!
//! Every error is reported synchronously to the requester; nothing is
//! swallowed and nothing is retried automatically.  Note there is no
//! "playback already active" variant: starting playback while an episode is
//! running cancels the old episode first, by design.

use rp_playback::PlaybackError;
use rp_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("start and destination are the same location: {0}")]
    SameLocation(String),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("no path between {from} and {to}")]
    NoPath { from: String, to: String },

    #[error("catalog has no locations")]
    EmptyCatalog,

    #[error("no route has been computed yet")]
    NoActiveRoute,

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),
}

pub type SessionResult<T> = Result<T, SessionError>;
