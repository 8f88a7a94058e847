//! JSON-LD structured data helpers

use serde::Serialize;
use serde_json::{Map, Value};

/// One `<script type="application/ld+json">` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonLdBlock {
    /// Text content of the script element, untouched
    pub raw: String,

    /// Parsed value, absent when the block is not valid JSON
    pub value: Option<Value>,

    pub invalid: bool,
}

impl JsonLdBlock {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => Self {
                raw: raw.to_string(),
                value: Some(value),
                invalid: false,
            },
            Err(_) => Self {
                raw: raw.to_string(),
                value: None,
                invalid: true,
            },
        }
    }
}

/// Flattens a JSON-LD value into its top-level entity nodes
///
/// Top-level arrays and `@graph` containers are unwrapped. A container that
/// carries its own `@type` is kept as a node as well.
pub fn entity_nodes(value: &Value) -> Vec<&Map<String, Value>> {
    let mut nodes = Vec::new();
    push_nodes(value, &mut nodes);
    nodes
}

fn push_nodes<'a>(value: &'a Value, nodes: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                push_nodes(item, nodes);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                if map.contains_key("@type") {
                    nodes.push(map);
                }
                push_nodes(graph, nodes);
            } else {
                nodes.push(map);
            }
        }
        _ => {}
    }
}

/// All `@type` values of a node (a string or an array of strings)
pub fn node_types(node: &Map<String, Value>) -> Vec<&str> {
    match node.get("@type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// True if a property is present with a non-empty value
pub fn has_property(node: &Map<String, Value>, property: &str) -> bool {
    match node.get(property) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// Walks a value depth-first and returns true if any object satisfies `pred`
pub fn any_object(value: &Value, pred: &dyn Fn(&Map<String, Value>) -> bool) -> bool {
    match value {
        Value::Object(map) => pred(map) || map.values().any(|v| any_object(v, pred)),
        Value::Array(items) => items.iter().any(|v| any_object(v, pred)),
        _ => false,
    }
}
