//! Collection filters.

use serde_json::Value;

use crate::node::{ComputedObject, Node};

/// A server-side predicate over collection elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(Node);

impl Filter {
    /// Keep elements whose `property` equals `value`.
    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter(Node::invoke(
            "Filter.equals",
            [
                ("leftField", Node::from(property.into())),
                ("rightValue", Node::Constant(value.into())),
            ],
        ))
    }

    /// Keep elements whose `property` differs from `value`.
    pub fn neq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter(Node::invoke(
            "Filter.notEquals",
            [
                ("leftField", Node::from(property.into())),
                ("rightValue", Node::Constant(value.into())),
            ],
        ))
    }

    /// Keep elements matching every filter.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter(Node::invoke(
            "Filter.and",
            [(
                "filters",
                Node::Array(filters.into_iter().map(|f| f.0).collect()),
            )],
        ))
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl ComputedObject for Filter {
    fn node(&self) -> &Node {
        &self.0
    }
}
