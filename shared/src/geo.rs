use serde::{Deserialize, Serialize};

/// A WGS84 point. Serialized as `[lat, lng]`, the form map libraries take directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CoordinateRepr", into = "[f64; 2]")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.latitude, c.longitude]
    }
}

/// Older service builds emit locations as objects; accept both shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Pair([f64; 2]),
    Object { latitude: f64, longitude: f64 },
}

impl From<CoordinateRepr> for Coordinate {
    fn from(repr: CoordinateRepr) -> Self {
        match repr {
            CoordinateRepr::Pair([latitude, longitude]) => Self::new(latitude, longitude),
            CoordinateRepr::Object {
                latitude,
                longitude,
            } => Self::new(latitude, longitude),
        }
    }
}

/// Geographic extent of a problem instance, wire form `[southWest, northEast]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Coordinate; 2]", into = "[Coordinate; 2]")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl From<[Coordinate; 2]> for Bounds {
    fn from([south_west, north_east]: [Coordinate; 2]) -> Self {
        Self {
            south_west,
            north_east,
        }
    }
}

impl From<Bounds> for [Coordinate; 2] {
    fn from(b: Bounds) -> Self {
        [b.south_west, b.north_east]
    }
}
