//! Geometry handles.

use ee_common::BoundingBox;
use serde_json::json;

use crate::node::{ComputedObject, Node};

/// A server-side geometry, either constructed from coordinates or derived
/// from a feature or collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(Node);

impl Geometry {
    /// A point in GeoJSON order (longitude first).
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry(Node::invoke(
            "GeometryConstructors.Point",
            [("coordinates", Node::Constant(json!([lon, lat])))],
        ))
    }

    /// A polygon from linear rings; the first ring is the exterior.
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry(Node::invoke(
            "GeometryConstructors.Polygon",
            [("coordinates", Node::Constant(json!(rings)))],
        ))
    }

    /// An axis-aligned rectangle.
    pub fn rectangle(bbox: &BoundingBox) -> Self {
        Geometry(Node::invoke(
            "GeometryConstructors.Rectangle",
            [(
                "coordinates",
                Node::Constant(json!([bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y])),
            )],
        ))
    }

    pub fn from_node(node: Node) -> Self {
        Geometry(node)
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl ComputedObject for Geometry {
    fn node(&self) -> &Node {
        &self.0
    }
}

impl From<&BoundingBox> for Geometry {
    fn from(bbox: &BoundingBox) -> Self {
        Geometry::rectangle(bbox)
    }
}
