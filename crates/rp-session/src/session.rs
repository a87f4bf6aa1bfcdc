//! The session object.
//!
//! One `RouteSession` exists per map load.  It owns the catalog, the graph
//! built from it, the router, and the single simulation player — replacing
//! any notion of module-level global state with an explicit lifecycle:
//! created on load, rebuilt on catalog change, torn down on drop.
//!
//! Graph construction is sequenced by `&mut self`: a reload completes (or
//! fails) before any further routing call can observe the graph, so no
//! request ever runs over a half-built graph.

use std::sync::mpsc::Receiver;

use rp_core::{EpisodeId, GeoPoint};
use rp_playback::{PlaybackConfig, PlaybackEvent, PlaybackSnapshot, SimulationPlayer};
use rp_spatial::{
    Catalog, DijkstraRouter, ExternalGraph, GraphBuilder, GraphProvider, RouteGraph, RouteResult,
    Router, SpatialError,
};

use crate::{SessionError, SessionResult};

// ── SessionConfig ─────────────────────────────────────────────────────────────

/// Session-level configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Assumed average travel speed used to derive a route's estimated
    /// traversal time.  Default: 40 km/h.
    pub average_speed_kmh: f64,

    /// Playback cadence and sampling parameters.
    pub playback: PlaybackConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            playback: PlaybackConfig::default(),
        }
    }
}

// ── RouteSession ──────────────────────────────────────────────────────────────

/// Owns the catalog, graph, router, and playback for one session.
///
/// Generic over the routing algorithm the way the rest of the stack is;
/// [`RouteSession::new`] and friends pick [`DijkstraRouter`].
pub struct RouteSession<R: Router = DijkstraRouter> {
    catalog: Catalog,
    graph:   RouteGraph,
    router:  R,
    config:  SessionConfig,
    player:  SimulationPlayer,
    /// Most recent successful route; superseded (not mutated) by later calls.
    last_route: Option<RouteResult>,
}

impl RouteSession<DijkstraRouter> {
    /// Create a session over `catalog` with a synthesized graph.
    pub fn new(catalog: Catalog, config: SessionConfig) -> SessionResult<Self> {
        Self::with_router(catalog, None, DijkstraRouter, config)
    }

    /// Create a session whose graph comes from an external provider.
    ///
    /// A provider that cannot deliver surfaces
    /// [`SpatialError::ProviderUnavailable`]; the caller decides whether to
    /// try again.
    pub fn with_provider(
        catalog: Catalog,
        provider: &dyn GraphProvider,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let external = provider.fetch()?;
        Self::with_router(catalog, Some(&external), DijkstraRouter, config)
    }
}

impl<R: Router> RouteSession<R> {
    /// Generic constructor: any router, optional pre-fetched provider graph.
    pub fn with_router(
        catalog: Catalog,
        external: Option<&ExternalGraph>,
        router: R,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let graph = GraphBuilder::new().build(&catalog, external)?;
        let mut player = SimulationPlayer::new(config.playback.clone());
        set_known_locations(&mut player, &catalog, &graph);
        Ok(Self {
            catalog,
            graph,
            router,
            config,
            player,
            last_route: None,
        })
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Compute the shortest route between two named locations.
    ///
    /// Synchronous; the result is stored as the session's active route and
    /// also returned.  Rejects `start == dest` before the routing engine is
    /// ever invoked, and never rebuilds the graph on failure.
    pub fn find_route(&mut self, start: &str, dest: &str) -> SessionResult<RouteResult> {
        if self.graph.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }
        let start_id = self
            .graph
            .node_id(start)
            .ok_or_else(|| SessionError::UnknownLocation(start.to_owned()))?;
        let dest_id = self
            .graph
            .node_id(dest)
            .ok_or_else(|| SessionError::UnknownLocation(dest.to_owned()))?;
        if start_id == dest_id {
            return Err(SessionError::SameLocation(start.to_owned()));
        }

        let route = self
            .router
            .shortest_path(&self.graph, start_id, dest_id)
            .map_err(|e| match e {
                SpatialError::NoPath { from, to } => SessionError::NoPath { from, to },
                other => SessionError::Spatial(other),
            })?;
        let result = route.into_result(&self.graph, self.config.average_speed_kmh);

        tracing::info!(
            start,
            dest,
            hops = result.len() - 1,
            total_km = result.total_weight_km,
            eta_min = result.estimated_minutes,
            "route found"
        );
        self.last_route = Some(result.clone());
        Ok(result)
    }

    /// The most recent successful route, if any.
    pub fn last_route(&self) -> Option<&RouteResult> {
        self.last_route.as_ref()
    }

    // ── Playback ──────────────────────────────────────────────────────────

    /// Start playing `route`.  A running episode is cancelled first; this is
    /// not an error.
    pub fn play(&mut self, route: &RouteResult) -> EpisodeId {
        self.player.start(route)
    }

    /// Play the most recently computed route.
    pub fn play_last(&mut self) -> SessionResult<EpisodeId> {
        let route = self.last_route.clone().ok_or(SessionError::NoActiveRoute)?;
        Ok(self.player.start(&route))
    }

    /// Cancel the running episode.
    pub fn cancel_playback(&mut self) -> SessionResult<()> {
        self.player.cancel()?;
        Ok(())
    }

    /// Take the single-consumer playback event receiver.  `None` on every
    /// call after the first.
    pub fn events(&mut self) -> Option<Receiver<PlaybackEvent>> {
        self.player.take_events()
    }

    /// Latest playback state, readable at any time from the control
    /// timeline.
    pub fn playback_snapshot(&self) -> PlaybackSnapshot {
        self.player.snapshot()
    }

    // ── Catalog lifecycle ─────────────────────────────────────────────────

    /// Replace the catalog (and optionally the provider graph), rebuilding
    /// everything derived from it.
    ///
    /// A running playback is cancelled first — its route references the old
    /// graph.  The rebuild completes before this returns, so no routing
    /// call ever sees a half-built graph; on failure the session keeps its
    /// previous catalog and graph.
    pub fn reload_catalog(
        &mut self,
        catalog: Catalog,
        provider: Option<&dyn GraphProvider>,
    ) -> SessionResult<()> {
        let external = match provider {
            Some(p) => Some(p.fetch()?),
            None    => None,
        };
        let graph = GraphBuilder::new().build(&catalog, external.as_ref())?;

        let _ = self.player.cancel(); // NotRunning is fine here
        self.catalog = catalog;
        self.graph = graph;
        self.last_route = None;
        set_known_locations(&mut self.player, &self.catalog, &self.graph);
        tracing::info!(locations = self.catalog.len(), "catalog reloaded");
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    /// Name of the catalog location nearest to `pos` (map-click snapping).
    pub fn nearest_location(&self, pos: GeoPoint) -> Option<&str> {
        self.graph.nearest_node(pos).map(|n| self.graph.node_name(n))
    }
}

/// Playback validates each step against the catalog.  A provider graph may
/// carry nodes the catalog does not know; with an empty catalog the graph's
/// own node set is the only sensible reference.
fn set_known_locations(player: &mut SimulationPlayer, catalog: &Catalog, graph: &RouteGraph) {
    if catalog.is_empty() {
        let names: Vec<String> = (0..graph.node_count())
            .map(|i| {
                graph
                    .node_name(rp_core::NodeId(i as u32))
                    .to_owned()
            })
            .collect();
        player.set_known_locations(names);
    } else {
        player.set_known_locations(catalog.names().map(str::to_owned));
    }
}
