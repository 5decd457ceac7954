//! Client for the imagery service REST API.
//!
//! This crate provides:
//! - `ClientConfig`: endpoint, project and bearer token
//! - `ImageryService`: the async seam between orchestration and the network
//! - `EarthEngineClient`: the reqwest-backed implementation
//! - `request_tile_layer`: visualize an image and register it as a tiled map

pub mod client;
pub mod config;
pub mod map;

pub use client::{EarthEngineClient, ImageryService};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use map::{request_tile_layer, FileFormat, MapId, MapOptions, TileLayerRequest};
