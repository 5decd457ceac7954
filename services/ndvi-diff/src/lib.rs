//! Composite difference service library.
//!
//! Builds the request graph for a country-clipped difference of two
//! Landsat composites, registers it with the imagery service and
//! assembles the resulting web map.

pub mod pipeline;
pub mod scenario;

pub use pipeline::{Pipeline, Plan};
pub use scenario::{Scenario, ScenarioError};
