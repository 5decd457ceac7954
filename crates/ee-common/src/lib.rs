//! Common types and utilities shared across the landsat-diff crates.

pub mod coords;
pub mod error;
pub mod vis;

pub use coords::{BoundingBox, LatLon};
pub use error::{EeError, EeResult};
pub use vis::{Color, VisParams};
