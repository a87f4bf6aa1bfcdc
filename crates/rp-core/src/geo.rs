//! Geographic coordinate type and distance math.
//!
//! `GeoPoint` uses `f64` (double-precision) latitude/longitude.  Route
//! weights are kilometre-scale haversine distances and the router's
//! tie-breaking relies on bit-exact symmetry of the distance function, so
//! the usual single-precision memory economy is not worth it here.

/// A WGS-84 geographic coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    ///
    /// Pure and total: every pair of coordinates yields a finite,
    /// non-negative distance.  The formula is symmetric in its inputs, so
    /// `a.distance_km(b) == b.distance_km(a)` holds exactly — no shortcut
    /// that would break that symmetry is taken.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// `true` when both components are finite and within WGS-84 range
    /// (latitude ±90°, longitude ±180°).
    ///
    /// Catalog loading rejects invalid points up front so the graph and
    /// router never have to re-check them.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
