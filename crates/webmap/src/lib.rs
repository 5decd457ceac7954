//! Interactive web map documents.
//!
//! A `Map` collects a view state (center, zoom, controls) and an ordered set
//! of tile layers, then serializes to one self-contained Leaflet HTML page.

pub mod html;
pub mod layer;
pub mod map;

pub use layer::TileLayer;
pub use map::Map;
