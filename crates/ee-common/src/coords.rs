//! Geographic coordinate types.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees, latitude first (map-widget order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Coordinates in GeoJSON order: `[lon, lat]`.
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Check that latitude and longitude are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// A geographic bounding box in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a "minx,miny,maxx,maxy" string.
    pub fn parse(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let num = |p: &str| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(p.to_string()))
        };

        Ok(Self {
            min_x: num(parts[0])?,
            min_y: num(parts[1])?,
            max_x: num(parts[2])?,
            max_y: num(parts[3])?,
        })
    }

    /// Center of the box as a map position.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min_y + self.max_y) / 2.0,
            (self.min_x + self.max_x) / 2.0,
        )
    }

    /// Check if a point is contained within this bbox.
    pub fn contains(&self, p: &LatLon) -> bool {
        p.lon >= self.min_x && p.lon <= self.max_x && p.lat >= self.min_y && p.lat <= self.max_y
    }

    /// Closed exterior ring (counter-clockwise, first vertex repeated).
    pub fn to_ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min_x, self.min_y],
            [self.max_x, self.min_y],
            [self.max_x, self.max_y],
            [self.min_x, self.max_y],
            [self.min_x, self.min_y],
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),
}
