//! Expression tree nodes.
//!
//! A `Node` is an immutable description of a server-side computation.
//! Building nodes never talks to the service; the tree is encoded and
//! submitted only when a result or a map is requested.

use std::collections::BTreeMap;

use serde_json::Value;

/// One node of a server-side expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A literal JSON value (number, string, bool, null, or a list/object of literals).
    Constant(Value),

    /// An ordered list whose items may be computed.
    Array(Vec<Node>),

    /// A string-keyed map whose values may be computed.
    Dictionary(BTreeMap<String, Node>),

    /// A call to a named server-side function.
    Invocation(Invocation),
}

/// A named function call with named arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub function: String,
    pub arguments: BTreeMap<String, Node>,
}

impl Node {
    /// Build a function invocation node.
    pub fn invoke<'a>(
        function: impl Into<String>,
        arguments: impl IntoIterator<Item = (&'a str, Node)>,
    ) -> Self {
        Node::Invocation(Invocation {
            function: function.into(),
            arguments: arguments
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        })
    }

    /// A literal list of strings, e.g. band names.
    pub fn strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Node::Array(
            items
                .into_iter()
                .map(|s| Node::Constant(Value::String(s.into())))
                .collect(),
        )
    }

    /// Name of the invoked function, if this is an invocation.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Node::Invocation(inv) => Some(inv.function.as_str()),
            _ => None,
        }
    }

    /// Named argument of an invocation.
    pub fn argument(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Invocation(inv) => inv.arguments.get(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Node::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// Read a list of literal strings, from either an `Array` of string
    /// constants or a single constant JSON array.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            Node::Array(items) => items
                .iter()
                .map(|n| n.as_constant().and_then(Value::as_str).map(str::to_string))
                .collect(),
            Node::Constant(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }

    /// True when the node contains no invocation anywhere.
    pub fn is_literal(&self) -> bool {
        match self {
            Node::Constant(_) => true,
            Node::Array(items) => items.iter().all(Node::is_literal),
            Node::Dictionary(map) => map.values().all(Node::is_literal),
            Node::Invocation(_) => false,
        }
    }

    /// Convert a literal node to plain JSON. Returns `None` if any part is computed.
    pub fn to_literal_json(&self) -> Option<Value> {
        match self {
            Node::Constant(v) => Some(v.clone()),
            Node::Array(items) => items
                .iter()
                .map(Node::to_literal_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Node::Dictionary(map) => map
                .iter()
                .map(|(k, v)| v.to_literal_json().map(|j| (k.clone(), j)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            Node::Invocation(_) => None,
        }
    }

    /// Count invocations of `function` anywhere in the tree.
    pub fn count_calls(&self, function: &str) -> usize {
        match self {
            Node::Constant(_) => 0,
            Node::Array(items) => items.iter().map(|n| n.count_calls(function)).sum(),
            Node::Dictionary(map) => map.values().map(|n| n.count_calls(function)).sum(),
            Node::Invocation(inv) => {
                let own = usize::from(inv.function == function);
                own + inv
                    .arguments
                    .values()
                    .map(|n| n.count_calls(function))
                    .sum::<usize>()
            }
        }
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Constant(Value::from(v))
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Constant(Value::from(v))
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Constant(Value::Bool(v))
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::Constant(Value::String(v.to_string()))
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::Constant(Value::String(v))
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::Constant(v)
    }
}

/// Implemented by every typed handle wrapping a `Node`.
pub trait ComputedObject {
    fn node(&self) -> &Node;

    /// Encode this object into the service wire format.
    fn to_expression(&self) -> crate::Expression {
        crate::Expression::from_node(self.node())
    }
}
