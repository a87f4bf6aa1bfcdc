//! Location catalog: the named set of geographic locations available for
//! routing.
//!
//! A `Catalog` is loaded once per session (or on reload) and is immutable
//! thereafter — the session replaces the whole catalog rather than mutating
//! it.  Names and coordinates are validated at load time so the graph and
//! router never see malformed locations.
//!
//! # CSV format
//!
//! One row per location:
//!
//! ```csv
//! name,lat,lon
//! Central Hospital,30.695,-88.050
//! North Clinic,30.710,-88.070
//! ```
//!
//! Rows are inserted in file order; insertion order is preserved by
//! [`Catalog::iter`] (relevant for display layers that list locations).

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use rp_core::GeoPoint;

use crate::{SpatialError, SpatialResult};

// ── Catalog ───────────────────────────────────────────────────────────────────

/// Insertion-ordered mapping of display name → coordinate.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names:     Vec<String>,
    positions: Vec<GeoPoint>,
    /// name → index into the parallel vectors.
    index: FxHashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `(name, position)` pairs, validating each entry.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyLocationName`], [`SpatialError::InvalidLocation`]
    /// or [`SpatialError::DuplicateLocation`] on the first offending entry.
    pub fn from_entries<I, S>(entries: I) -> SpatialResult<Self>
    where
        I: IntoIterator<Item = (S, GeoPoint)>,
        S: Into<String>,
    {
        let mut catalog = Self::new();
        for (name, pos) in entries {
            catalog.insert(name.into(), pos)?;
        }
        Ok(catalog)
    }

    /// Insert one validated location.  Used by loaders; sessions treat a
    /// built catalog as read-only.
    pub fn insert(&mut self, name: String, pos: GeoPoint) -> SpatialResult<()> {
        if name.trim().is_empty() {
            return Err(SpatialError::EmptyLocationName);
        }
        if !pos.is_valid() {
            return Err(SpatialError::InvalidLocation {
                name,
                lat: pos.lat,
                lon: pos.lon,
            });
        }
        if self.index.contains_key(&name) {
            return Err(SpatialError::DuplicateLocation(name));
        }
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.positions.push(pos);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Coordinate of `name`, if present.
    pub fn position(&self, name: &str) -> Option<GeoPoint> {
        self.index.get(name).map(|&i| self.positions[i])
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GeoPoint)> + '_ {
        self.names
            .iter()
            .zip(&self.positions)
            .map(|(n, &p)| (n.as_str(), p))
    }

    /// Location names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }
}

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CatalogRecord {
    name: String,
    lat:  f64,
    lon:  f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a catalog from a `name,lat,lon` CSV file.
pub fn load_catalog_csv(path: &Path) -> SpatialResult<Catalog> {
    let file = std::fs::File::open(path).map_err(SpatialError::Io)?;
    load_catalog_reader(file)
}

/// Like [`load_catalog_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_catalog_reader<R: Read>(reader: R) -> SpatialResult<Catalog> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut catalog = Catalog::new();

    for row in csv_reader.deserialize() {
        let record: CatalogRecord =
            row.map_err(|e| SpatialError::Parse(e.to_string()))?;
        catalog.insert(record.name, GeoPoint::new(record.lat, record.lon))?;
    }

    tracing::debug!(locations = catalog.len(), "catalog loaded");
    Ok(catalog)
}
