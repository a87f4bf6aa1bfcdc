//! Route graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for adjacency.
//! Given a `NodeId n`, its outgoing arcs occupy the slice:
//!
//! ```text
//! arc_to[ node_adj_start[n] .. node_adj_start[n+1] ]
//! ```
//!
//! The graph is undirected: every edge is stored as two directed arcs with
//! the same weight.  `edge_count()` reports undirected edges; the arc arrays
//! are twice that long.
//!
//! # Node identity
//!
//! Node IDs are assigned by **lexicographic name rank** at build time:
//! `NodeId(0)` is the alphabetically first location.  Comparing two ids
//! therefore compares their names, which is what gives the router its
//! deterministic tie-break (see [`router`](crate::router)).
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! by display layers to snap a map click to the closest catalog location.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::{FxHashMap, FxHashSet};

use rp_core::{GeoPoint, NodeId};

use crate::{Catalog, ExternalGraph, SpatialError, SpatialResult};

/// Default number of nearest neighbours each node connects to when the graph
/// is synthesized from a bare catalog.
pub const DEFAULT_SYNTHESIS_NEIGHBORS: usize = 3;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node snapping at city scale; edge synthesis uses true
    /// haversine distances instead (see [`GraphBuilder`]).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RouteGraph ────────────────────────────────────────────────────────────────

/// Weighted undirected location graph in CSR format plus a spatial index.
///
/// Built once per session (or per catalog reload) and read-only thereafter.
/// Do not construct directly; use [`GraphBuilder`].
pub struct RouteGraph {
    /// Location names in lexicographic order.  Indexed by `NodeId`.
    node_names: Vec<String>,

    /// Geographic position of each node.  Indexed by `NodeId`.
    node_pos: Vec<GeoPoint>,

    /// CSR row pointer.  Arcs of node `n` are at
    /// `node_adj_start[n] .. node_adj_start[n+1]`.  Length = `node_count + 1`.
    node_adj_start: Vec<u32>,

    /// Destination node of each directed arc.
    arc_to: Vec<NodeId>,

    /// Weight (km, or provider-supplied length) of each directed arc.
    arc_weight_km: Vec<f64>,

    /// name → `NodeId` lookup.
    name_index: FxHashMap<String, NodeId>,

    /// Spatial index over node positions.
    spatial_idx: RTree<NodeEntry>,

    /// Undirected edge count (`arc_to.len() / 2`).
    undirected_edges: usize,
}

impl RouteGraph {
    /// An empty graph with no nodes or edges.  Any routing request against
    /// it fails with [`SpatialError::UnknownNode`].
    pub fn empty() -> Self {
        assemble(Vec::new(), Vec::new(), &[])
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.undirected_edges
    }

    pub fn is_empty(&self) -> bool {
        self.node_names.is_empty()
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    /// Resolve a location name to its `NodeId`.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Name of `node`.
    ///
    /// # Panics
    /// Panics if `node` is out of range; ids handed out by this graph are
    /// always in range.
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_names[node.index()]
    }

    pub fn node_pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// `true` if `node` indexes a node of this graph.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_names.len()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over `(neighbor, weight_km)` for all arcs out of `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let start = self.node_adj_start[node.index()] as usize;
        let end   = self.node_adj_start[node.index() + 1] as usize;
        self.arc_to[start..end]
            .iter()
            .zip(&self.arc_weight_km[start..end])
            .map(|(&to, &w)| (to, w))
    }

    /// Degree of `node` (number of incident undirected edges).
    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.node_adj_start[node.index()] as usize;
        let end   = self.node_adj_start[node.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`RouteGraph`] from a catalog, either by importing a
/// provider-supplied graph verbatim or by synthesizing edges from scratch.
///
/// # Synthesis
///
/// With no provider graph, every node is connected to its `k` nearest
/// neighbours by haversine distance, `k` clamped into `[3, 5]` and capped at
/// the number of other nodes.  Distances are computed exactly and sorted
/// (ties broken by name rank) rather than queried from the R-tree, because
/// degree-space nearest neighbours can disagree with great-circle ordering
/// away from the equator.  An edge already added from the reverse direction
/// is detected via its canonical `(min, max)` id pair and never added twice.
///
/// Synthesis cannot fail: an empty catalog yields an empty graph and a
/// single-location catalog yields one isolated node.
///
/// # Example
///
/// ```
/// use rp_core::GeoPoint;
/// use rp_spatial::{Catalog, GraphBuilder};
///
/// let catalog = Catalog::from_entries([
///     ("Depot",    GeoPoint::new(30.69, -88.04)),
///     ("Hospital", GeoPoint::new(30.70, -88.03)),
///     ("Airport",  GeoPoint::new(30.63, -88.07)),
///     ("Harbor",   GeoPoint::new(30.71, -88.02)),
/// ]).unwrap();
/// let graph = GraphBuilder::new().build(&catalog, None).unwrap();
/// assert_eq!(graph.node_count(), 4);
/// assert!(graph.edge_count() >= 3);
/// ```
pub struct GraphBuilder {
    neighbors_k: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { neighbors_k: DEFAULT_SYNTHESIS_NEIGHBORS }
    }

    /// Requested nearest-neighbour count for synthesis.  Clamped into
    /// `[3, 5]` at build time.
    pub fn neighbors(mut self, k: usize) -> Self {
        self.neighbors_k = k;
        self
    }

    /// Build the graph for `catalog`.
    ///
    /// With a provider graph, its nodes and edges are imported verbatim
    /// (weights taken as given) after validation; no synthesis occurs.
    /// Without one, edges are synthesized as described on [`GraphBuilder`].
    pub fn build(
        &self,
        catalog: &Catalog,
        provider: Option<&ExternalGraph>,
    ) -> SpatialResult<RouteGraph> {
        let graph = match provider {
            Some(external) => import_external(external)?,
            None           => self.synthesize(catalog),
        };
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            provider = provider.is_some(),
            "route graph built"
        );
        Ok(graph)
    }

    fn synthesize(&self, catalog: &Catalog) -> RouteGraph {
        // Lexicographic id assignment: sort names, carry positions along.
        let mut entries: Vec<(String, GeoPoint)> = catalog
            .iter()
            .map(|(n, p)| (n.to_owned(), p))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let names:     Vec<String>   = entries.iter().map(|(n, _)| n.clone()).collect();
        let positions: Vec<GeoPoint> = entries.iter().map(|(_, p)| *p).collect();

        let n = names.len();
        if n < 2 {
            // 0 nodes → empty graph; 1 node → isolated node, no edges.
            return assemble(names, positions, &[]);
        }

        let k = self.neighbors_k.clamp(3, 5).min(n - 1);

        let mut seen = FxHashSet::default();
        let mut edges: Vec<(NodeId, NodeId, f64)> = Vec::with_capacity(n * k);

        for i in 0..n {
            let from = NodeId(i as u32);

            // Exact haversine distance to every other node, ascending,
            // ties by name rank.
            let mut candidates: Vec<(f64, NodeId)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (positions[i].distance_km(positions[j]), NodeId(j as u32)))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            for &(dist, to) in candidates.iter().take(k) {
                let key = canonical_pair(from, to);
                if seen.insert(key) {
                    edges.push((from, to, dist));
                }
            }
        }

        tracing::debug!(nodes = n, k, edges = edges.len(), "synthesized edges");
        assemble(names, positions, &edges)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Provider import ───────────────────────────────────────────────────────────

fn import_external(external: &ExternalGraph) -> SpatialResult<RouteGraph> {
    // Validate nodes, then sort for lexicographic id assignment.
    let mut entries: Vec<(String, GeoPoint)> = Vec::with_capacity(external.nodes.len());
    for node in &external.nodes {
        if node.name.trim().is_empty() {
            return Err(SpatialError::EmptyLocationName);
        }
        if !node.pos.is_valid() {
            return Err(SpatialError::InvalidLocation {
                name: node.name.clone(),
                lat:  node.pos.lat,
                lon:  node.pos.lon,
            });
        }
        entries.push((node.name.clone(), node.pos));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    if entries.windows(2).any(|w| w[0].0 == w[1].0) {
        let dup = entries
            .windows(2)
            .find(|w| w[0].0 == w[1].0)
            .map(|w| w[0].0.clone())
            .unwrap_or_default();
        return Err(SpatialError::DuplicateLocation(dup));
    }

    let names:     Vec<String>   = entries.iter().map(|(n, _)| n.clone()).collect();
    let positions: Vec<GeoPoint> = entries.iter().map(|(_, p)| *p).collect();
    let name_rank: FxHashMap<&str, NodeId> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), NodeId(i as u32)))
        .collect();

    let mut seen = FxHashSet::default();
    let mut edges: Vec<(NodeId, NodeId, f64)> = Vec::with_capacity(external.edges.len());

    for edge in &external.edges {
        let invalid = |detail: &str| SpatialError::InvalidEdge {
            from:   edge.from.clone(),
            to:     edge.to.clone(),
            detail: detail.to_owned(),
        };

        let from = *name_rank
            .get(edge.from.as_str())
            .ok_or_else(|| invalid("unknown endpoint"))?;
        let to = *name_rank
            .get(edge.to.as_str())
            .ok_or_else(|| invalid("unknown endpoint"))?;

        if from == to {
            return Err(invalid("self-edge"));
        }
        if !edge.weight_km.is_finite() || edge.weight_km <= 0.0 {
            return Err(invalid("weight must be positive and finite"));
        }
        if !seen.insert(canonical_pair(from, to)) {
            return Err(invalid("duplicate unordered pair"));
        }
        edges.push((from, to, edge.weight_km));
    }

    Ok(assemble(names, positions, &edges))
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Canonical `(min, max)` key for an unordered node pair.
#[inline]
fn canonical_pair(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Build the CSR arrays, name index, and R-tree from a deduplicated
/// undirected edge list.  Each edge becomes two directed arcs.
fn assemble(
    names:     Vec<String>,
    positions: Vec<GeoPoint>,
    edges:     &[(NodeId, NodeId, f64)],
) -> RouteGraph {
    let node_count = names.len();

    // CSR row pointer: count arcs per node, then prefix-sum.
    let mut node_adj_start = vec![0u32; node_count + 1];
    for &(a, b, _) in edges {
        node_adj_start[a.index() + 1] += 1;
        node_adj_start[b.index() + 1] += 1;
    }
    for i in 1..=node_count {
        node_adj_start[i] += node_adj_start[i - 1];
    }
    debug_assert_eq!(node_adj_start[node_count] as usize, edges.len() * 2);

    // Fill arc arrays with a per-node write cursor.
    let arc_count = edges.len() * 2;
    let mut arc_to        = vec![NodeId::INVALID; arc_count];
    let mut arc_weight_km = vec![0.0f64; arc_count];
    let mut cursor = node_adj_start.clone();
    for &(a, b, w) in edges {
        let ia = cursor[a.index()] as usize;
        cursor[a.index()] += 1;
        arc_to[ia] = b;
        arc_weight_km[ia] = w;

        let ib = cursor[b.index()] as usize;
        cursor[b.index()] += 1;
        arc_to[ib] = a;
        arc_weight_km[ib] = w;
    }

    let name_index: FxHashMap<String, NodeId> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), NodeId(i as u32)))
        .collect();

    // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
    let rtree_entries: Vec<NodeEntry> = positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| NodeEntry {
            point: [pos.lat, pos.lon],
            id: NodeId(i as u32),
        })
        .collect();
    let spatial_idx = RTree::bulk_load(rtree_entries);

    RouteGraph {
        node_names: names,
        node_pos: positions,
        node_adj_start,
        arc_to,
        arc_weight_km,
        name_index,
        spatial_idx,
        undirected_edges: edges.len(),
    }
}
