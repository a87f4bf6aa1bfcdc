//! Unit tests for rp-playback.
//!
//! `Episode` is exercised synchronously (no threads); `SimulationPlayer`
//! tests use millisecond cadences for runs that must finish and long
//! cadences for runs that must be interrupted, so nothing here sleeps for
//! real.

#[cfg(test)]
mod helpers {
    use rp_spatial::RouteResult;

    /// A route over the given location names; weight/estimate are irrelevant
    /// to playback.
    pub fn route(names: &[&str]) -> RouteResult {
        RouteResult {
            path: names.iter().map(|&n| n.to_owned()).collect(),
            total_weight_km: 1.0,
            estimated_minutes: 1.5,
        }
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sampling {
    use crate::sample_indices;

    #[test]
    fn short_paths_keep_every_index() {
        assert_eq!(sample_indices(5, 25), [0, 1, 2, 3, 4]);
        assert_eq!(sample_indices(1, 25), [0]);
    }

    #[test]
    fn long_paths_are_capped() {
        let steps = sample_indices(100, 10);
        assert_eq!(steps.len(), 10);
        assert_eq!(steps[0], 0);
        assert_eq!(*steps.last().unwrap(), 99);
        assert!(steps.windows(2).all(|w| w[0] < w[1]), "not strictly increasing: {steps:?}");
    }

    #[test]
    fn two_step_floor() {
        assert_eq!(sample_indices(100, 2), [0, 99]);
    }

    #[test]
    fn exact_fit_is_identity() {
        assert_eq!(sample_indices(10, 10), (0..10).collect::<Vec<_>>());
    }
}

// ── Episode state machine ─────────────────────────────────────────────────────

#[cfg(test)]
mod episode {
    use std::sync::Arc;

    use rustc_hash::FxHashSet;

    use rp_core::EpisodeId;

    use crate::{Episode, PlaybackEvent, PlaybackPhase};

    fn running(names: &[&str]) -> Episode {
        Episode::new(EpisodeId(0), &super::helpers::route(names), 25, None)
    }

    #[test]
    fn full_run_event_sequence() {
        let mut ep = running(&["A", "C", "E"]);
        assert_eq!(ep.phase(), PlaybackPhase::Running);
        assert_eq!(ep.total_steps(), 3);

        let first = ep.advance();
        assert_eq!(
            first,
            [PlaybackEvent::Progress {
                episode: EpisodeId(0),
                step_index: 0,
                location: "A".into(),
                percent_complete: 33,
            }]
        );

        let second = ep.advance();
        assert_eq!(
            second,
            [PlaybackEvent::Progress {
                episode: EpisodeId(0),
                step_index: 1,
                location: "C".into(),
                percent_complete: 67,
            }]
        );

        // Final step carries the terminal Arrived alongside its Progress.
        let last = ep.advance();
        assert_eq!(
            last,
            [
                PlaybackEvent::Progress {
                    episode: EpisodeId(0),
                    step_index: 2,
                    location: "E".into(),
                    percent_complete: 100,
                },
                PlaybackEvent::Arrived {
                    episode: EpisodeId(0),
                    final_location: "E".into(),
                },
            ]
        );
        assert_eq!(ep.phase(), PlaybackPhase::Completed);
        assert!(ep.advance().is_empty(), "no events after terminal state");
    }

    #[test]
    fn percent_is_non_decreasing_and_hits_100_once() {
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let mut ep = running(&names);
        let mut percents = Vec::new();
        loop {
            let events = ep.advance();
            if events.is_empty() {
                break;
            }
            for event in events {
                if let PlaybackEvent::Progress { percent_complete, .. } = event {
                    percents.push(percent_complete);
                }
            }
        }
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
        assert_eq!(percents.iter().filter(|&&p| p == 100).count(), 1);
        assert_eq!(*percents.last().unwrap(), 100);
    }

    #[test]
    fn cancel_midway() {
        let mut ep = running(&["A", "B", "C"]);
        ep.advance();

        let event = ep.cancel();
        assert_eq!(event, Some(PlaybackEvent::Cancelled { episode: EpisodeId(0) }));
        assert_eq!(ep.phase(), PlaybackPhase::Cancelled);

        // Nothing further: no steps, no second terminal.
        assert!(ep.advance().is_empty());
        assert_eq!(ep.cancel(), None);
    }

    #[test]
    fn unknown_location_fails_the_episode() {
        let known: FxHashSet<String> = ["A", "C"].into_iter().map(str::to_owned).collect();
        let mut ep = Episode::new(
            EpisodeId(3),
            &super::helpers::route(&["A", "C", "E"]),
            25,
            Some(Arc::new(known)),
        );

        assert_eq!(ep.advance().len(), 1);
        assert_eq!(ep.advance().len(), 1);

        let events = ep.advance();
        assert_eq!(events.len(), 1);
        assert!(
            matches!(&events[0], PlaybackEvent::Failed { episode: EpisodeId(3), reason } if reason.contains("E")),
            "expected Failed, got {events:?}"
        );
        assert_eq!(ep.phase(), PlaybackPhase::Failed);
        assert!(ep.advance().is_empty());
    }

    #[test]
    fn empty_route_fails() {
        let mut ep = running(&[]);
        let events = ep.advance();
        assert!(matches!(events.as_slice(), [PlaybackEvent::Failed { .. }]));
        assert_eq!(ep.phase(), PlaybackPhase::Failed);
    }

    #[test]
    fn long_route_is_sampled() {
        let names: Vec<String> = (0..100).map(|i| format!("L{i:03}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut ep = Episode::new(EpisodeId(0), &super::helpers::route(&name_refs), 10, None);
        assert_eq!(ep.total_steps(), 10);

        let mut locations = Vec::new();
        loop {
            let events = ep.advance();
            if events.is_empty() {
                break;
            }
            for event in events {
                if let PlaybackEvent::Progress { location, .. } = event {
                    locations.push(location);
                }
            }
        }
        assert_eq!(locations.len(), 10);
        assert_eq!(locations.first().map(String::as_str), Some("L000"));
        assert_eq!(locations.last().map(String::as_str), Some("L099"));
        // Every emitted location is drawn from the route.
        assert!(locations.iter().all(|l| names.contains(l)));
    }
}

// ── Threaded player ───────────────────────────────────────────────────────────

#[cfg(test)]
mod player {
    use std::sync::mpsc::Receiver;
    use std::time::Duration;

    use rp_core::EpisodeId;

    use crate::{PlaybackConfig, PlaybackError, PlaybackEvent, PlaybackPhase, SimulationPlayer};

    /// Cadence fast enough that completing runs finish instantly.
    fn fast_config() -> PlaybackConfig {
        PlaybackConfig {
            step_interval: Duration::from_millis(1),
            max_visual_steps: 25,
        }
    }

    /// Cadence long enough that a second step never fires during a test;
    /// cancellation wakes the worker immediately regardless.
    fn slow_config() -> PlaybackConfig {
        PlaybackConfig {
            step_interval: Duration::from_secs(30),
            max_visual_steps: 25,
        }
    }

    fn recv(rx: &Receiver<PlaybackEvent>) -> PlaybackEvent {
        rx.recv_timeout(Duration::from_secs(5)).expect("event expected")
    }

    /// Drain events until (and including) the episode's terminal event.
    fn collect_episode(rx: &Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        loop {
            let event = recv(rx);
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                return events;
            }
        }
    }

    #[test]
    fn completes_and_reports_arrival() {
        let mut player = SimulationPlayer::new(fast_config());
        let rx = player.take_events().unwrap();

        let id = player.start(&super::helpers::route(&["A", "B", "C"]));
        let events = collect_episode(&rx);

        assert_eq!(events.len(), 4); // 3 progress + arrived
        assert!(events.iter().all(|e| e.episode() == id));
        assert!(matches!(
            events.last(),
            Some(PlaybackEvent::Arrived { final_location, .. }) if final_location == "C"
        ));

        let percents: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::Progress { percent_complete, .. } => Some(*percent_complete),
                _ => None,
            })
            .collect();
        assert_eq!(percents, [33, 67, 100]);

        let snap = player.snapshot();
        assert_eq!(snap.phase, PlaybackPhase::Completed);
        assert_eq!(snap.percent_complete, 100);
    }

    #[test]
    fn restart_cancels_prior_episode_first() {
        let mut player = SimulationPlayer::new(slow_config());
        let rx = player.take_events().unwrap();

        let first = player.start(&super::helpers::route(&["A", "B", "C"]));
        assert!(matches!(
            recv(&rx),
            PlaybackEvent::Progress { episode, step_index: 0, .. } if episode == first
        ));

        // New request while running: the old episode's Cancelled must arrive
        // before the new episode's first Progress.
        let second = player.start(&super::helpers::route(&["X", "Y"]));
        assert_ne!(first, second);
        assert_eq!(recv(&rx), PlaybackEvent::Cancelled { episode: first });
        assert!(matches!(
            recv(&rx),
            PlaybackEvent::Progress { episode, step_index: 0, .. } if episode == second
        ));

        // Explicit cancel of the new episode.
        player.cancel().unwrap();
        assert_eq!(recv(&rx), PlaybackEvent::Cancelled { episode: second });

        // No stale events after a cancellation event.
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(player.snapshot().phase, PlaybackPhase::Cancelled);
    }

    #[test]
    fn cancel_without_episode_errors() {
        let mut player = SimulationPlayer::new(fast_config());
        assert!(matches!(player.cancel(), Err(PlaybackError::NotRunning)));
    }

    #[test]
    fn cancel_after_completion_errors() {
        let mut player = SimulationPlayer::new(fast_config());
        let rx = player.take_events().unwrap();
        player.start(&super::helpers::route(&["A", "B"]));
        collect_episode(&rx);
        assert!(matches!(player.cancel(), Err(PlaybackError::NotRunning)));
    }

    #[test]
    fn unknown_location_fails_episode() {
        let mut player = SimulationPlayer::new(fast_config());
        player.set_known_locations(["A", "B"]);
        let rx = player.take_events().unwrap();

        player.start(&super::helpers::route(&["A", "B", "Z"]));
        let events = collect_episode(&rx);

        assert!(matches!(
            events.last(),
            Some(PlaybackEvent::Failed { reason, .. }) if reason.contains("Z")
        ));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert_eq!(player.snapshot().phase, PlaybackPhase::Failed);
    }

    #[test]
    fn take_events_is_single_consumer() {
        let mut player = SimulationPlayer::new(fast_config());
        assert!(player.take_events().is_some());
        assert!(player.take_events().is_none());
    }

    #[test]
    fn snapshot_readable_while_running() {
        let mut player = SimulationPlayer::new(slow_config());
        let rx = player.take_events().unwrap();

        let id = player.start(&super::helpers::route(&["A", "B", "C"]));
        // First step is emitted (and the snapshot published) before the
        // worker starts waiting out the cadence.
        recv(&rx);

        let snap = player.snapshot();
        assert_eq!(snap.phase, PlaybackPhase::Running);
        assert_eq!(snap.episode, id);
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.percent_complete, 33);
        assert!(player.is_running());
    }

    #[test]
    fn episode_ids_are_monotonic() {
        let mut player = SimulationPlayer::new(slow_config());
        let _rx = player.take_events().unwrap();
        let a = player.start(&super::helpers::route(&["A", "B"]));
        let b = player.start(&super::helpers::route(&["A", "B"]));
        assert_eq!(a, EpisodeId(0));
        assert_eq!(b, EpisodeId(1));
    }
}
