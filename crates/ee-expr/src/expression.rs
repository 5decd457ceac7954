//! Wire encoding of expression trees.
//!
//! The service accepts a flat graph:
//!
//! ```json
//! {"result": "2", "values": {
//!     "0": {"functionInvocationValue": {"functionName": "Image.load", "arguments": {"id": {"constantValue": "..."}}}},
//!     ...
//! }}
//! ```
//!
//! Every function invocation is hoisted into `values` and referenced by key.
//! Structurally identical invocations share one key, and keys are assigned in
//! post-order so arguments always appear before the calls that use them.

use std::collections::{BTreeMap, HashMap};

use ee_common::{EeError, EeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::{Invocation, Node};

/// A serialized expression graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Key of the root value.
    pub result: String,

    /// All hoisted values by key.
    pub values: BTreeMap<String, ValueNode>,
}

/// One value in the wire graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    ConstantValue(Value),
    ArrayValue(ArrayValue),
    DictionaryValue(DictionaryValue),
    FunctionInvocationValue(FunctionInvocation),
    ValueReference(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryValue {
    pub values: BTreeMap<String, ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub function_name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, ValueNode>,
}

impl Expression {
    /// Encode a node tree.
    pub fn from_node(node: &Node) -> Self {
        let mut encoder = Encoder::default();
        let root = encoder.encode(node);
        let result = match root {
            ValueNode::ValueReference(key) => key,
            other => encoder.insert(other),
        };
        Expression {
            result,
            values: encoder.values,
        }
    }

    /// Rebuild the node tree, resolving every `valueReference`.
    pub fn to_node(&self) -> EeResult<Node> {
        let root = self
            .values
            .get(&self.result)
            .ok_or_else(|| dangling(&self.result))?;
        self.decode(root, 0)
    }

    /// Number of hoisted values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Function names of all hoisted invocations, in key order.
    pub fn function_names(&self) -> Vec<&str> {
        let mut keyed: Vec<(usize, &str)> = self
            .values
            .iter()
            .filter_map(|(k, v)| match v {
                ValueNode::FunctionInvocationValue(f) => {
                    Some((k.parse().unwrap_or(usize::MAX), f.function_name.as_str()))
                }
                _ => None,
            })
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, name)| name).collect()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn decode(&self, value: &ValueNode, depth: usize) -> EeResult<Node> {
        // A well-formed graph is acyclic; the depth bound catches self references.
        if depth > self.values.len() + 64 {
            return Err(EeError::Decode("expression graph contains a cycle".to_string()));
        }
        Ok(match value {
            ValueNode::ConstantValue(v) => Node::Constant(v.clone()),
            ValueNode::ArrayValue(arr) => Node::Array(
                arr.values
                    .iter()
                    .map(|v| self.decode(v, depth + 1))
                    .collect::<EeResult<_>>()?,
            ),
            ValueNode::DictionaryValue(dict) => Node::Dictionary(
                dict.values
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.decode(v, depth + 1)?)))
                    .collect::<EeResult<_>>()?,
            ),
            ValueNode::FunctionInvocationValue(f) => Node::Invocation(Invocation {
                function: f.function_name.clone(),
                arguments: f
                    .arguments
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.decode(v, depth + 1)?)))
                    .collect::<EeResult<_>>()?,
            }),
            ValueNode::ValueReference(key) => {
                let target = self.values.get(key).ok_or_else(|| dangling(key))?;
                self.decode(target, depth + 1)?
            }
        })
    }
}

fn dangling(key: &str) -> EeError {
    EeError::Decode(format!("expression references missing value '{}'", key))
}

#[derive(Default)]
struct Encoder {
    values: BTreeMap<String, ValueNode>,
    /// Debug rendering of a hoisted value -> its key.
    seen: HashMap<String, String>,
}

impl Encoder {
    fn encode(&mut self, node: &Node) -> ValueNode {
        if node.is_literal() {
            if let Some(json) = node.to_literal_json() {
                return ValueNode::ConstantValue(json);
            }
        }
        match node {
            Node::Constant(v) => ValueNode::ConstantValue(v.clone()),
            Node::Array(items) => ValueNode::ArrayValue(ArrayValue {
                values: items.iter().map(|n| self.encode(n)).collect(),
            }),
            Node::Dictionary(map) => ValueNode::DictionaryValue(DictionaryValue {
                values: map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.encode(v)))
                    .collect(),
            }),
            Node::Invocation(inv) => {
                let arguments = inv
                    .arguments
                    .iter()
                    .map(|(k, v)| (k.clone(), self.encode(v)))
                    .collect();
                let call = ValueNode::FunctionInvocationValue(FunctionInvocation {
                    function_name: inv.function.clone(),
                    arguments,
                });
                ValueNode::ValueReference(self.insert(call))
            }
        }
    }

    fn insert(&mut self, value: ValueNode) -> String {
        let fingerprint = format!("{:?}", value);
        if let Some(key) = self.seen.get(&fingerprint) {
            return key.clone();
        }
        let key = self.values.len().to_string();
        self.seen.insert(fingerprint, key.clone());
        self.values.insert(key.clone(), value);
        key
    }
}
