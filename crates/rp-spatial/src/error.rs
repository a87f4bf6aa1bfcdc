//! Spatial-subsystem error type.

use rp_core::NodeId;
use thiserror::Error;

/// Errors produced by `rp-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("location name must not be empty")]
    EmptyLocationName,

    #[error("location {name} has invalid coordinates ({lat}, {lon})")]
    InvalidLocation { name: String, lat: f64, lon: f64 },

    #[error("duplicate location {0}")]
    DuplicateLocation(String),

    #[error("edge {from} – {to}: {detail}")]
    InvalidEdge {
        from:   String,
        to:     String,
        detail: String,
    },

    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("no path between {from} and {to}")]
    NoPath { from: String, to: String },

    #[error("graph provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("catalog parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
