//! `rp-core` — foundational types for the `routeplay` routing framework.
//!
//! This crate is a dependency of every other `rp-*` crate.  It intentionally
//! has no `rp-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                  |
//! |-----------|-------------------------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`, `EpisodeId`           |
//! | [`geo`]   | `GeoPoint`, haversine distance            |
//! | [`error`] | `CoreError`, `CoreResult`                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, EpisodeId, NodeId};
