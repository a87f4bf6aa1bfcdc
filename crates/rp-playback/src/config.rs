//! Playback configuration.

use std::time::Duration;

/// Cadence and sampling parameters for the simulation player.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackConfig {
    /// Wall-clock interval between consecutive steps.  Default: 1.5 s, the
    /// cadence the presentation layer animates at.
    pub step_interval: Duration,

    /// Upper bound on emitted steps per episode.  Longer paths are sampled
    /// at evenly spaced indices (first and last always included) so total
    /// playback duration stays bounded.  Values below 2 are treated as 2.
    /// Default: 25.
    pub max_visual_steps: usize,
}

impl PlaybackConfig {
    /// `max_visual_steps` with the lower bound applied.
    #[inline]
    pub fn effective_max_steps(&self) -> usize {
        self.max_visual_steps.max(2)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            step_interval:    Duration::from_millis(1_500),
            max_visual_steps: 25,
        }
    }
}
