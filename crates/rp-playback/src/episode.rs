//! The pure playback state machine.
//!
//! An `Episode` is one run of the player over a computed route: it owns the
//! sampled step sequence and the phase, and produces event values when
//! advanced.  It knows nothing about threads or cadence — the
//! [`player`](crate::player) drives it on the playback timeline, and tests
//! drive it synchronously.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use rp_core::EpisodeId;
use rp_spatial::RouteResult;

use crate::PlaybackEvent;

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Lifecycle phase of a playback episode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackPhase {
    /// No episode has been started.
    #[default]
    Idle,
    /// Steps are being emitted.
    Running,
    /// The final location was reached; `Arrived` was emitted.
    Completed,
    /// `Cancelled` was emitted; scheduled steps were discarded.
    Cancelled,
    /// An internal inconsistency was detected; `Failed` was emitted.
    Failed,
}

impl PlaybackPhase {
    /// `true` once the episode can emit no further events.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlaybackPhase::Completed | PlaybackPhase::Cancelled | PlaybackPhase::Failed
        )
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

/// Evenly spaced sample of `0..path_len`, at most `max_steps` long, first
/// and last index always included.
///
/// For `path_len <= max_steps` this is simply every index.  Otherwise the
/// `k`-th sample is `round(k · (path_len−1) / (max_steps−1))`; the scale
/// factor is ≥ 1, so the sequence is strictly increasing.
pub fn sample_indices(path_len: usize, max_steps: usize) -> Vec<usize> {
    debug_assert!(max_steps >= 2);
    if path_len <= max_steps {
        return (0..path_len).collect();
    }
    let span = (path_len - 1) as f64;
    let slots = (max_steps - 1) as f64;
    (0..max_steps)
        .map(|k| (k as f64 * span / slots).round() as usize)
        .collect()
}

// ── Episode ───────────────────────────────────────────────────────────────────

/// One playback run over a route, from `Running` to a terminal phase.
pub struct Episode {
    id:    EpisodeId,
    /// Full route, location names in travel order.
    route: Vec<String>,
    /// Sampled indices into `route`; what actually gets emitted.
    steps: Vec<usize>,
    /// Next entry of `steps` to emit.
    cursor: usize,
    phase: PlaybackPhase,
    /// Locations the catalog knows about; a sampled step outside this set is
    /// an internal inconsistency.  `None` disables the check.
    known: Option<Arc<FxHashSet<String>>>,
}

impl Episode {
    pub fn new(
        id: EpisodeId,
        route: &RouteResult,
        max_steps: usize,
        known: Option<Arc<FxHashSet<String>>>,
    ) -> Self {
        let steps = sample_indices(route.path.len(), max_steps.max(2));
        Self {
            id,
            route: route.path.clone(),
            steps,
            cursor: 0,
            phase: PlaybackPhase::Running,
            known,
        }
    }

    pub fn id(&self) -> EpisodeId {
        self.id
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Zero-based index of the last emitted step (0 before the first step).
    pub fn step_index(&self) -> usize {
        self.cursor.saturating_sub(1)
    }

    /// Number of sampled steps this episode will emit.
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Percentage for the most recently emitted step.
    pub fn percent_complete(&self) -> u8 {
        if self.cursor == 0 {
            0
        } else {
            percent_for(self.cursor - 1, self.steps.len())
        }
    }

    /// Emit the next step.
    ///
    /// Returns one `Progress` event per call, except the final step which
    /// also carries the terminal `Arrived` — and returns nothing once the
    /// phase is terminal.  A sampled step that falls outside the route or
    /// names an unknown location flips the phase to `Failed` and yields the
    /// terminal `Failed` event instead.
    pub fn advance(&mut self) -> Vec<PlaybackEvent> {
        if self.phase != PlaybackPhase::Running {
            return Vec::new();
        }

        let Some(&route_idx) = self.steps.get(self.cursor) else {
            // An empty route has no steps to emit.
            return vec![self.fail("route has no steps")];
        };
        let Some(location) = self.route.get(route_idx) else {
            return vec![self.fail(&format!("sampled index {route_idx} out of range"))];
        };
        let location = location.clone();
        if let Some(known) = &self.known
            && !known.contains(&location)
        {
            return vec![self.fail(&format!("location {location} absent from catalog"))];
        }

        let step_index = self.cursor;
        self.cursor += 1;

        let mut events = vec![PlaybackEvent::Progress {
            episode: self.id,
            step_index,
            location: location.clone(),
            percent_complete: percent_for(step_index, self.steps.len()),
        }];

        if self.cursor == self.steps.len() {
            self.phase = PlaybackPhase::Completed;
            events.push(PlaybackEvent::Arrived {
                episode: self.id,
                final_location: location,
            });
        }
        events
    }

    /// Cancel the episode.  Returns the terminal `Cancelled` event if it was
    /// still running, `None` otherwise.
    pub fn cancel(&mut self) -> Option<PlaybackEvent> {
        if self.phase != PlaybackPhase::Running {
            return None;
        }
        self.phase = PlaybackPhase::Cancelled;
        Some(PlaybackEvent::Cancelled { episode: self.id })
    }

    fn fail(&mut self, reason: &str) -> PlaybackEvent {
        self.phase = PlaybackPhase::Failed;
        tracing::warn!(episode = %self.id, reason, "playback failed");
        PlaybackEvent::Failed {
            episode: self.id,
            reason: reason.to_owned(),
        }
    }
}

/// `round((step + 1) / total × 100)`, clamped to 99 for non-final steps so
/// 100 appears exactly once, on the final step.
fn percent_for(step: usize, total: usize) -> u8 {
    if step + 1 == total {
        return 100;
    }
    let raw = ((step + 1) as f64 / total as f64 * 100.0).round() as u8;
    raw.min(99)
}
