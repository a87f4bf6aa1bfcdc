//! citygrid — smallest end-to-end example for the routeplay framework.
//!
//! Builds an 8-location synthetic city catalog inspired by the geography of
//! Mobile, Alabama, synthesizes the route graph, finds a shortest route,
//! and drives a fast-cadence playback to completion.  A second run shows
//! cancel-and-restart: requesting a new playback while one is running.

use std::time::Duration;

use anyhow::{Context, Result};

use rp_core::GeoPoint;
use rp_playback::{PlaybackConfig, PlaybackEvent};
use rp_session::{RouteSession, SessionConfig};
use rp_spatial::Catalog;

// ── Constants ─────────────────────────────────────────────────────────────────

const STEP_INTERVAL_MS:   u64   = 250; // fast cadence so the demo finishes quickly
const MAX_VISUAL_STEPS:   usize = 25;
const AVERAGE_SPEED_KMH:  f64   = 40.0;

// ── Catalog ───────────────────────────────────────────────────────────────────

fn build_catalog() -> Result<Catalog> {
    Ok(Catalog::from_entries([
        ("North Terminal",   GeoPoint::new(30.720, -88.075)),
        ("Riverside Market", GeoPoint::new(30.705, -88.050)),
        ("Cathedral Square", GeoPoint::new(30.690, -88.045)),
        ("Old Depot",        GeoPoint::new(30.685, -88.060)),
        ("Commerce Park",    GeoPoint::new(30.700, -88.030)),
        ("Harbor Clinic",    GeoPoint::new(30.675, -88.025)),
        ("East Pier",        GeoPoint::new(30.665, -88.010)),
        ("Stadium Gate",     GeoPoint::new(30.655, -88.080)),
    ])?)
}

fn print_event(event: &PlaybackEvent) {
    match event {
        PlaybackEvent::Progress { location, percent_complete, .. } => {
            println!("  at {location} ({percent_complete}%)");
        }
        PlaybackEvent::Arrived { final_location, .. } => {
            println!("  reached destination: {final_location}");
        }
        PlaybackEvent::Cancelled { episode } => {
            println!("  playback {episode} cancelled");
        }
        PlaybackEvent::Failed { reason, .. } => {
            println!("  playback failed: {reason}");
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SessionConfig {
        average_speed_kmh: AVERAGE_SPEED_KMH,
        playback: PlaybackConfig {
            step_interval:    Duration::from_millis(STEP_INTERVAL_MS),
            max_visual_steps: MAX_VISUAL_STEPS,
        },
    };
    let mut session = RouteSession::new(build_catalog()?, config)?;
    let events = session
        .events()
        .context("event receiver already taken")?;

    // ── Route + playback to completion ────────────────────────────────────
    let route = session.find_route("North Terminal", "East Pier")?;
    println!("Best route: {}", route.path.join(" → "));
    println!(
        "Total distance: {:.2} km — estimated {:.1} min at {AVERAGE_SPEED_KMH} km/h",
        route.total_weight_km, route.estimated_minutes
    );

    session.play(&route);
    for event in events.iter() {
        print_event(&event);
        if matches!(event, PlaybackEvent::Arrived { .. }) {
            break;
        }
    }

    // ── Cancel-and-restart ────────────────────────────────────────────────
    println!("\nRe-routing mid-playback:");
    let long_way = session.find_route("Stadium Gate", "Commerce Park")?;
    session.play(&long_way);
    std::thread::sleep(Duration::from_millis(STEP_INTERVAL_MS / 2));

    // A new playback while one is running cancels the old episode first.
    let detour = session.find_route("Stadium Gate", "Riverside Market")?;
    session.play(&detour);
    for event in events.iter() {
        print_event(&event);
        if matches!(event, PlaybackEvent::Arrived { .. }) {
            break;
        }
    }

    Ok(())
}
