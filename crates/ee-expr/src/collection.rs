//! Features and feature collections.

use ee_common::{EeError, EeResult};
use serde_json::{Map, Value};

use crate::filter::Filter;
use crate::geometry::Geometry;
use crate::node::{ComputedObject, Node};

/// A single geometry with properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature(Node);

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Feature(Node::invoke(
            "Feature",
            [
                ("geometry", geometry.into_node()),
                ("metadata", Node::Constant(Value::Object(properties))),
            ],
        ))
    }

    /// The feature's geometry.
    pub fn geometry(&self) -> Geometry {
        Geometry::from_node(Node::invoke(
            "Feature.geometry",
            [("feature", self.0.clone())],
        ))
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl ComputedObject for Feature {
    fn node(&self) -> &Node {
        &self.0
    }
}

/// A remote table of features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection(Node);

impl FeatureCollection {
    /// Reference a catalog table by id.
    pub fn load(table_id: impl Into<String>) -> Self {
        FeatureCollection(Node::invoke(
            "Collection.loadTable",
            [("tableId", Node::from(table_id.into()))],
        ))
    }

    /// A collection built from literal features.
    pub fn from_features(features: impl IntoIterator<Item = Feature>) -> Self {
        FeatureCollection(Node::invoke(
            "Collection",
            [(
                "features",
                Node::Array(features.into_iter().map(Feature::into_node).collect()),
            )],
        ))
    }

    /// One point feature per record, taking coordinates from the named
    /// latitude and longitude fields. Every field, coordinates included,
    /// is kept as a property.
    pub fn from_records(
        records: &[Map<String, Value>],
        lat_field: &str,
        lon_field: &str,
    ) -> EeResult<Self> {
        let features = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let lat = coordinate(record, lat_field, i)?;
                let lon = coordinate(record, lon_field, i)?;
                Ok(Feature::new(Geometry::point(lon, lat), record.clone()))
            })
            .collect::<EeResult<Vec<_>>>()?;
        Ok(Self::from_features(features))
    }

    pub fn filter(&self, filter: Filter) -> FeatureCollection {
        FeatureCollection(Node::invoke(
            "Collection.filter",
            [("collection", self.0.clone()), ("filter", filter.into_node())],
        ))
    }

    pub fn first(&self) -> Feature {
        Feature(Node::invoke(
            "Collection.first",
            [("collection", self.0.clone())],
        ))
    }

    /// Number of elements, evaluated remotely.
    pub fn size(&self) -> Number {
        Number(Node::invoke(
            "Collection.size",
            [("collection", self.0.clone())],
        ))
    }

    /// Union of all element geometries.
    pub fn geometry(&self) -> Geometry {
        Geometry::from_node(Node::invoke(
            "Collection.geometry",
            [("collection", self.0.clone())],
        ))
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl ComputedObject for FeatureCollection {
    fn node(&self) -> &Node {
        &self.0
    }
}

impl From<&FeatureCollection> for Geometry {
    fn from(fc: &FeatureCollection) -> Self {
        fc.geometry()
    }
}

impl From<&Feature> for Geometry {
    fn from(f: &Feature) -> Self {
        f.geometry()
    }
}

/// A number computed by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Number(Node);

impl ComputedObject for Number {
    fn node(&self) -> &Node {
        &self.0
    }
}

fn coordinate(record: &Map<String, Value>, field: &str, row: usize) -> EeResult<f64> {
    let value = record
        .get(field)
        .ok_or_else(|| EeError::invalid(field, format!("missing in record {}", row)))?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| {
            EeError::invalid(field, format!("record {} has non-numeric value {}", row, value))
        })
}
