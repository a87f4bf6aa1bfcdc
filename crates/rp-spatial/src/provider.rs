//! External graph provider seam.
//!
//! A provider is any collaborator that can hand over an already-weighted
//! graph — e.g. a road-network service whose edge weights are physical road
//! lengths.  When a provider graph is present the builder imports it
//! verbatim and performs no nearest-neighbour synthesis.
//!
//! Provider failures are surfaced as
//! [`SpatialError::ProviderUnavailable`](crate::SpatialError::ProviderUnavailable)
//! and never retried here; the caller decides whether to attempt graph
//! construction again.

use rp_core::GeoPoint;

use crate::SpatialResult;

/// One node of a provider-supplied graph.
#[derive(Debug, Clone)]
pub struct ExternalNode {
    pub name: String,
    pub pos:  GeoPoint,
}

/// One weighted undirected edge of a provider-supplied graph.
#[derive(Debug, Clone)]
pub struct ExternalEdge {
    pub from:      String,
    pub to:        String,
    /// Weight as given by the provider (typically physical road length, km).
    pub weight_km: f64,
}

/// A complete provider-supplied graph, imported verbatim by
/// [`GraphBuilder`](crate::GraphBuilder).
#[derive(Debug, Clone, Default)]
pub struct ExternalGraph {
    pub nodes: Vec<ExternalNode>,
    pub edges: Vec<ExternalEdge>,
}

impl ExternalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, pos: GeoPoint) -> &mut Self {
        self.nodes.push(ExternalNode { name: name.into(), pos });
        self
    }

    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        weight_km: f64,
    ) -> &mut Self {
        self.edges.push(ExternalEdge {
            from: from.into(),
            to: to.into(),
            weight_km,
        });
        self
    }
}

/// Pluggable source of provider graphs.
///
/// Implementations wrap whatever transport the external service uses; a
/// fetch that cannot reach the service should return
/// [`SpatialError::ProviderUnavailable`](crate::SpatialError::ProviderUnavailable).
pub trait GraphProvider {
    fn fetch(&self) -> SpatialResult<ExternalGraph>;
}
