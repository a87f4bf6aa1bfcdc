//! `rp-playback` — playback state machine and simulation player.
//!
//! # Two timelines
//!
//! Route requests live on the **control timeline**; step emission lives on
//! the **playback timeline** (one background worker thread per active
//! episode).  The worker is the only writer of playback state; the control
//! side reads snapshots and issues `start`/`cancel` commands.  Events reach
//! the presentation layer through an ordered single-consumer channel.
//!
//! ```text
//! control:   start(route) ──────────────┐        cancel()
//!                                       ▼           │
//! playback:  [Progress … Progress] → Arrived        ▼
//!            [Progress …]─────────────────────→ Cancelled
//! ```
//!
//! # Crate layout
//!
//! | Module      | Contents                                            |
//! |-------------|-----------------------------------------------------|
//! | [`config`]  | `PlaybackConfig` (step cadence, sampling cap)       |
//! | [`event`]   | `PlaybackEvent`                                     |
//! | [`episode`] | `Episode`, `PlaybackPhase`, `sample_indices`        |
//! | [`player`]  | `SimulationPlayer`, `PlaybackSnapshot`              |
//! | [`error`]   | `PlaybackError`, `PlaybackResult<T>`                |

pub mod config;
pub mod episode;
pub mod error;
pub mod event;
pub mod player;

#[cfg(test)]
mod tests;

pub use config::PlaybackConfig;
pub use episode::{Episode, PlaybackPhase, sample_indices};
pub use error::{PlaybackError, PlaybackResult};
pub use event::PlaybackEvent;
pub use player::{PlaybackSnapshot, SimulationPlayer};
