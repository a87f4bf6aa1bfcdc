//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Sessions call routing via the [`Router`] trait, so applications can swap
//! in custom implementations (A*, contraction hierarchies) without touching
//! the rest of the stack.  The default [`DijkstraRouter`] is sufficient for
//! catalog-scale graphs.
//!
//! # Determinism
//!
//! The frontier heap is keyed `(cost, NodeId)`.  Node ids are assigned by
//! lexicographic name rank at graph build time, so when several frontier
//! nodes share the minimum tentative distance the alphabetically first
//! location is finalized first.  Relaxation uses strict `<`, keeping the
//! first-finalized predecessor on equal-cost alternatives.  Together these
//! make repeated identical queries return identical paths.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rp_core::NodeId;

use crate::network::RouteGraph;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query in internal-id form: an ordered node
/// sequence from start to destination (inclusive) and the total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes to visit in order, from start to destination.
    pub nodes: Vec<NodeId>,
    /// Sum of traversed edge weights; equals the Dijkstra tentative distance
    /// at the destination.
    pub total_weight_km: f64,
}

impl Route {
    /// `true` if the start and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Resolve node ids to location names and attach a travel-time estimate.
    ///
    /// `average_speed_kmh` is supplied by the caller (it is a session
    /// configuration value, not a router constant).
    pub fn into_result(self, graph: &RouteGraph, average_speed_kmh: f64) -> RouteResult {
        let path = self
            .nodes
            .iter()
            .map(|&n| graph.node_name(n).to_owned())
            .collect();
        RouteResult {
            path,
            total_weight_km: self.total_weight_km,
            estimated_minutes: self.total_weight_km / average_speed_kmh * 60.0,
        }
    }
}

/// A computed route in display form: location names from start to
/// destination, total weight, and the derived travel-time estimate.
///
/// Immutable once produced; a later query supersedes it rather than
/// mutating it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    /// Location names from start to destination, inclusive.
    pub path: Vec<String>,
    /// Sum of traversed edge weights (km for synthesized graphs).
    pub total_weight_km: f64,
    /// `total_weight_km / average_speed_kmh × 60`.
    pub estimated_minutes: f64,
}

impl RouteResult {
    pub fn start(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    pub fn destination(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Number of locations on the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; the session may be shared behind
/// a reference across control-side threads.
pub trait Router: Send + Sync {
    /// Compute the shortest path from `start` to `dest`.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::UnknownNode`] if either id is not a node of `graph`.
    /// - [`SpatialError::NoPath`] if the endpoints lie in different
    ///   connected components.
    fn shortest_path(
        &self,
        graph: &RouteGraph,
        start: NodeId,
        dest: NodeId,
    ) -> SpatialResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Classic Dijkstra over the CSR graph.
///
/// Terminates as soon as the destination is popped from the frontier; the
/// deterministic tie-break (see module docs) means early termination never
/// changes the reported path.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_path(
        &self,
        graph: &RouteGraph,
        start: NodeId,
        dest: NodeId,
    ) -> SpatialResult<Route> {
        dijkstra(graph, start, dest)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Frontier entry ordered by `(cost, node)`.
///
/// `f64` is not `Ord`, so ordering goes through `total_cmp`.  Costs are
/// finite by construction (edge weights are validated finite and the graph
/// is finite), so `total_cmp` agrees with the usual numeric order here.
#[derive(Copy, Clone, Debug)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

fn dijkstra(graph: &RouteGraph, start: NodeId, dest: NodeId) -> SpatialResult<Route> {
    if !graph.contains(start) {
        return Err(SpatialError::UnknownNode(start));
    }
    if !graph.contains(dest) {
        return Err(SpatialError::UnknownNode(dest));
    }
    if start == dest {
        return Ok(Route { nodes: vec![start], total_weight_km: 0.0 });
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = predecessor of v on the best known path; INVALID if unreached.
    let mut prev = vec![NodeId::INVALID; n];

    dist[start.index()] = 0.0;

    // Min-heap: Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
    heap.push(Reverse(HeapEntry { cost: 0.0, node: start }));

    while let Some(Reverse(HeapEntry { cost, node })) = heap.pop() {
        if node == dest {
            return reconstruct(graph, &prev, start, dest, cost);
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for (neighbor, weight) in graph.neighbors(node) {
            let new_cost = cost + weight;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = node;
                heap.push(Reverse(HeapEntry { cost: new_cost, node: neighbor }));
            }
        }
    }

    Err(no_path(graph, start, dest))
}

fn reconstruct(
    graph:    &RouteGraph,
    prev:     &[NodeId],
    start:    NodeId,
    dest:     NodeId,
    total_km: f64,
) -> SpatialResult<Route> {
    let mut nodes = Vec::new();
    let mut cur = dest;
    loop {
        nodes.push(cur);
        let p = prev[cur.index()];
        if p == NodeId::INVALID {
            break;
        }
        cur = p;
    }
    nodes.reverse();

    // A walk that does not end at the start means the predecessor chain is
    // broken; report it as unreachable rather than returning a bogus path.
    if nodes.first() != Some(&start) {
        return Err(no_path(graph, start, dest));
    }

    tracing::debug!(
        from = graph.node_name(start),
        to = graph.node_name(dest),
        hops = nodes.len() - 1,
        total_km,
        "shortest path found"
    );
    Ok(Route { nodes, total_weight_km: total_km })
}

fn no_path(graph: &RouteGraph, start: NodeId, dest: NodeId) -> SpatialError {
    SpatialError::NoPath {
        from: graph.node_name(start).to_owned(),
        to:   graph.node_name(dest).to_owned(),
    }
}
