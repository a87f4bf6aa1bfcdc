//! Playback event values.
//!
//! Events are immutable; the presentation layer renders them however it
//! likes (text label, map marker position, …).  Per episode, the stream is
//! zero or more `Progress` events in non-decreasing step order followed by
//! exactly one terminal event.

use rp_core::EpisodeId;

/// One event of a playback episode's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackEvent {
    /// The cursor advanced to a sampled location on the route.
    Progress {
        episode: EpisodeId,
        /// Zero-based index into the sampled step sequence.
        step_index: usize,
        /// Location name, always drawn from the active route.
        location: String,
        /// `round((step_index + 1) / total_steps × 100)`; non-decreasing
        /// within an episode and exactly 100 only on the final step.
        percent_complete: u8,
    },

    /// Terminal: the cursor reached the route's final location.
    Arrived {
        episode: EpisodeId,
        final_location: String,
    },

    /// Terminal: the episode was cancelled; no further steps follow, even
    /// ones already scheduled.
    Cancelled { episode: EpisodeId },

    /// Terminal: an internal inconsistency was detected (for example a
    /// sampled step naming a location absent from the catalog).  Playback
    /// does not retry.
    Failed { episode: EpisodeId, reason: String },
}

impl PlaybackEvent {
    /// The episode this event belongs to.
    pub fn episode(&self) -> EpisodeId {
        match *self {
            PlaybackEvent::Progress { episode, .. }
            | PlaybackEvent::Arrived { episode, .. }
            | PlaybackEvent::Cancelled { episode }
            | PlaybackEvent::Failed { episode, .. } => episode,
        }
    }

    /// `true` for the last event of an episode's stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlaybackEvent::Progress { .. })
    }
}
