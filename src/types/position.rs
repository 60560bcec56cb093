use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Mean earth radius in meters, as used for haversine distances
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A point on earth in degrees
///
/// - `lat`: latitude in [-90, +90]
/// - `lon`: longitude in [-180, +180]
///
/// Equality and hashing compare the raw bit patterns so that coordinates can
/// be used as node identifiers of a Graph Form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoCoords {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoords {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters (haversine formula)
    pub fn distance_to(&self, other: &GeoCoords) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

impl PartialEq for GeoCoords {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }
}

impl Eq for GeoCoords {}

impl Hash for GeoCoords {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
    }
}

impl fmt::Display for GeoCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A vehicle-independent node position on a facility map (VDA 5050 style)
///
/// Orientation and allowed deviations are omitted since they do not
/// influence distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vda5050Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub map_id: String,
}

impl Vda5050Position {
    pub fn new(x: f64, y: f64, map_id: impl Into<String>) -> Self {
        Self {
            x,
            y,
            map_id: map_id.into(),
        }
    }

    /// 2D Euclidean distance; the map ids are ignored
    ///
    /// This is a lower bound for any travelled distance between the two
    /// positions and therefore an admissible heuristic.
    pub fn euclidean_distance(a: &Vda5050Position, b: &Vda5050Position) -> f64 {
        (a.x - b.x).hypot(a.y - b.y)
    }
}
