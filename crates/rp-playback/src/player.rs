//! The cadence-driven simulation player.
//!
//! # Concurrency model
//!
//! One background worker thread exists per active episode.  The worker owns
//! the [`Episode`] and is the only writer of the shared
//! [`PlaybackSnapshot`]; the control side reads snapshots and issues
//! commands.  Cancellation rides a dedicated channel the worker waits on
//! between steps (`recv_timeout(step_interval)`), so a cancel takes effect
//! before the next scheduled step fires — no stale step is ever emitted
//! after the cancellation event.
//!
//! `start` while an episode is running first signals cancel and **joins**
//! the old worker; the join is the cancellation acknowledgment.  Because the
//! old worker has fully exited before the new one is spawned, events of two
//! episodes never interleave, and a cancelled episode's `Cancelled` event is
//! delivered before the next episode's first `Progress` event.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use rustc_hash::FxHashSet;

use rp_core::EpisodeId;
use rp_spatial::RouteResult;

use crate::episode::{Episode, PlaybackPhase};
use crate::{PlaybackConfig, PlaybackError, PlaybackEvent, PlaybackResult};

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Control-side view of the live playback state.
///
/// Written only by the worker thread (after the initial `start` reset);
/// read via [`SimulationPlayer::snapshot`].
#[derive(Clone, Debug, Default)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    /// Episode the snapshot describes; `EpisodeId::INVALID` before the
    /// first `start`.
    pub episode: EpisodeId,
    /// Last emitted step index.
    pub step_index: usize,
    /// Last emitted percentage; monotonically non-decreasing per episode.
    pub percent_complete: u8,
}

// ── Worker handle ─────────────────────────────────────────────────────────────

struct Worker {
    cancel_tx: Sender<()>,
    handle:    JoinHandle<()>,
}

// ── SimulationPlayer ──────────────────────────────────────────────────────────

/// Drives playback of computed routes on a fixed cadence, one episode at a
/// time, delivering events through a single-consumer channel.
pub struct SimulationPlayer {
    config: PlaybackConfig,
    /// Catalog location names for step validation; `None` disables it.
    known: Option<Arc<FxHashSet<String>>>,
    events_tx: Sender<PlaybackEvent>,
    /// Handed out once via [`take_events`](Self::take_events).
    events_rx: Option<Receiver<PlaybackEvent>>,
    shared: Arc<Mutex<PlaybackSnapshot>>,
    worker: Option<Worker>,
    next_episode: u32,
}

impl SimulationPlayer {
    pub fn new(config: PlaybackConfig) -> Self {
        let (events_tx, events_rx) = channel();
        Self {
            config,
            known: None,
            events_tx,
            events_rx: Some(events_rx),
            shared: Arc::new(Mutex::new(PlaybackSnapshot::default())),
            worker: None,
            next_episode: 0,
        }
    }

    /// Take the single-consumer event receiver.  Returns `None` on every
    /// call after the first.
    pub fn take_events(&mut self) -> Option<Receiver<PlaybackEvent>> {
        self.events_rx.take()
    }

    /// Supply the set of known location names; sampled steps outside it
    /// fail the episode.  Called on session build and on catalog reload.
    pub fn set_known_locations<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known = Some(Arc::new(names.into_iter().map(Into::into).collect()));
    }

    /// Start playing `route`.  Legal from any state: a running episode is
    /// cancelled (and its worker joined) first, so at most one episode emits
    /// at any instant.
    pub fn start(&mut self, route: &RouteResult) -> EpisodeId {
        self.cancel_active();

        let id = EpisodeId(self.next_episode);
        self.next_episode += 1;

        let episode = Episode::new(
            id,
            route,
            self.config.effective_max_steps(),
            self.known.clone(),
        );

        // Reset the snapshot before the worker exists; from here on the
        // worker is the only writer.
        *lock_snapshot(&self.shared) = PlaybackSnapshot {
            phase: PlaybackPhase::Running,
            episode: id,
            step_index: 0,
            percent_complete: 0,
        };

        let (cancel_tx, cancel_rx) = channel();
        let events_tx = self.events_tx.clone();
        let shared = Arc::clone(&self.shared);
        let interval = self.config.step_interval;

        tracing::info!(episode = %id, steps = episode.total_steps(), "playback started");
        let handle = std::thread::spawn(move || {
            run_episode(episode, interval, cancel_rx, events_tx, shared);
        });
        self.worker = Some(Worker { cancel_tx, handle });
        id
    }

    /// Cancel the running episode.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NotRunning`] if no episode is running.  If the
    /// episode reaches its terminal state on its own while the cancel is in
    /// flight, the call still succeeds — exactly one terminal event is
    /// emitted either way.
    pub fn cancel(&mut self) -> PlaybackResult<()> {
        if self.snapshot().phase != PlaybackPhase::Running {
            // Reap a finished worker so a later `start` doesn't re-join it.
            if let Some(w) = self.worker.take() {
                let _ = w.handle.join();
            }
            return Err(PlaybackError::NotRunning);
        }
        self.cancel_active();
        Ok(())
    }

    /// Latest playback state as seen by the control timeline.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        lock_snapshot(&self.shared).clone()
    }

    pub fn is_running(&self) -> bool {
        self.snapshot().phase == PlaybackPhase::Running
    }

    /// Signal cancel and wait for the worker to exit (the acknowledgment).
    fn cancel_active(&mut self) {
        if let Some(w) = self.worker.take() {
            // Send fails iff the worker already exited; join either way.
            let _ = w.cancel_tx.send(());
            let _ = w.handle.join();
        }
    }
}

impl Drop for SimulationPlayer {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

// ── Worker loop ───────────────────────────────────────────────────────────────

fn run_episode(
    mut episode: Episode,
    interval:    Duration,
    cancel_rx:   Receiver<()>,
    events_tx:   Sender<PlaybackEvent>,
    shared:      Arc<Mutex<PlaybackSnapshot>>,
) {
    loop {
        // Emit the next step immediately, then wait out the cadence.
        for event in episode.advance() {
            publish(&episode, &event, &events_tx, &shared);
        }
        if episode.phase().is_terminal() {
            return;
        }

        match cancel_rx.recv_timeout(interval) {
            // Cancel requested — or the player was dropped mid-episode;
            // either way no further step may fire.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(event) = episode.cancel() {
                    publish(&episode, &event, &events_tx, &shared);
                }
                return;
            }
            Err(RecvTimeoutError::Timeout) => {} // next step is due
        }
    }
}

fn publish(
    episode:   &Episode,
    event:     &PlaybackEvent,
    events_tx: &Sender<PlaybackEvent>,
    shared:    &Arc<Mutex<PlaybackSnapshot>>,
) {
    {
        let mut snap = lock_snapshot(shared);
        snap.phase = episode.phase();
        snap.episode = episode.id();
        snap.step_index = episode.step_index();
        snap.percent_complete = episode.percent_complete();
    }
    // A dropped receiver just means nobody is listening anymore.
    let _ = events_tx.send(event.clone());
}

/// Lock the snapshot, recovering from poisoning — the snapshot is plain
/// data, always valid, so a panicked holder cannot corrupt it.
fn lock_snapshot(shared: &Arc<Mutex<PlaybackSnapshot>>) -> MutexGuard<'_, PlaybackSnapshot> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
