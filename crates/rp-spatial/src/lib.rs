//! `rp-spatial` — location catalog, route graph, and shortest-path routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`catalog`]  | `Catalog` (ordered name → coordinate), CSV loading        |
//! | [`network`]  | `RouteGraph` (CSR + R-tree), `GraphBuilder`               |
//! | [`provider`] | `GraphProvider` trait, `ExternalGraph`                    |
//! | [`router`]   | `Router` trait, `Route`, `RouteResult`, `DijkstraRouter`  |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types. |

pub mod catalog;
pub mod error;
pub mod network;
pub mod provider;
pub mod router;


pub use catalog::{Catalog, load_catalog_csv, load_catalog_reader};
pub use error::{SpatialError, SpatialResult};
pub use network::{GraphBuilder, RouteGraph};
pub use provider::{ExternalEdge, ExternalGraph, ExternalNode, GraphProvider};
pub use router::{DijkstraRouter, Route, RouteResult, Router};
