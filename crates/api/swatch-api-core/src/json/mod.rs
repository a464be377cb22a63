//! Shorthand JSON for graph snapshots.
//!
//! Hand-written snapshots may spell socket defaults tersely. Before a snapshot
//! is deserialized, every socket default is rewritten into the tagged
//! `{ "type": ..., "data": ... }` layout that [`Value`] derives:
//!
//! | shorthand                          | value kind               |
//! |------------------------------------|--------------------------|
//! | `0.5`                              | `float`                  |
//! | `[x, y]`, `[x, y, z]`, `[x, y, z, w]` | `vec2`, `vec3`, `vec4` |
//! | any other list of numbers          | `vector`                 |
//! | `{ "color": [r, g, b, a] }`        | `colorrgba`              |
//! | `{ "float": 0.5 }`, `{ "vec3": [..] }`, ... | the named kind  |
//!
//! A socket itself may be written as a bare value instead of
//! `{ "name": ..., "default_value": ... }`.

use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

use crate::Value;

/// Errors produced while reading snapshot JSON.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("graph snapshot is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Object keys naming a value kind directly, with the tag each maps to.
const NAMED_KINDS: &[(&str, &str)] = &[
    ("float", "float"),
    ("vec2", "vec2"),
    ("vec3", "vec3"),
    ("vec4", "vec4"),
    ("vector", "vector"),
    ("color", "colorrgba"),
];

fn tagged(tag: &str, data: JsonValue) -> JsonValue {
    json!({ "type": tag, "data": data })
}

fn numeric_list_tag(len: usize) -> &'static str {
    match len {
        2 => "vec2",
        3 => "vec3",
        4 => "vec4",
        _ => "vector",
    }
}

fn normalize_object(obj: Map<String, JsonValue>) -> JsonValue {
    if obj.contains_key("type") && obj.contains_key("data") {
        return JsonValue::Object(obj);
    }
    NAMED_KINDS
        .iter()
        .find_map(|(key, tag)| obj.get(*key).map(|data| tagged(tag, data.clone())))
        .unwrap_or(JsonValue::Object(obj))
}

/// Rewrite one shorthand value into the tagged layout. Anything that is not
/// recognised is returned unchanged and left for serde to reject.
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => tagged("float", JsonValue::Number(n)),
        JsonValue::Array(items) if items.iter().all(JsonValue::is_number) => {
            tagged(numeric_list_tag(items.len()), JsonValue::Array(items))
        }
        JsonValue::Object(obj) => normalize_object(obj),
        other => other,
    }
}

/// Normalize, then deserialize into a [`Value`].
pub fn parse_value(value: JsonValue) -> Result<Value, serde_json::Error> {
    serde_json::from_value(normalize_value_json(value))
}

fn is_socket_object(socket: &JsonValue) -> bool {
    socket.as_object().is_some_and(|obj| {
        obj.is_empty() || obj.contains_key("default_value") || obj.contains_key("name")
    })
}

fn normalize_socket(socket: &mut JsonValue) {
    if !is_socket_object(socket) {
        let bare = socket.take();
        *socket = json!({ "default_value": bare });
    }
    if let Some(default) = socket.get_mut("default_value") {
        if !default.is_null() {
            *default = normalize_value_json(default.take());
        }
    }
}

/// Normalize every socket under `trees[].nodes[].inputs|outputs` in place.
/// Nodes may also name their type with `kind` instead of `type`.
pub fn normalize_graph_spec_value(root: &mut JsonValue) {
    let Some(trees) = root.get_mut("trees").and_then(JsonValue::as_array_mut) else {
        return;
    };
    let nodes = trees
        .iter_mut()
        .filter_map(|tree| tree.get_mut("nodes").and_then(JsonValue::as_array_mut))
        .flatten();
    for node in nodes {
        if node.get("type").is_none() {
            if let Some(kind) = node.get("kind").cloned() {
                node["type"] = kind;
            }
        }
        for side in ["inputs", "outputs"] {
            if let Some(sockets) = node.get_mut(side).and_then(JsonValue::as_array_mut) {
                sockets.iter_mut().for_each(normalize_socket);
            }
        }
    }
}

/// Parse snapshot text and normalize it.
pub fn normalize_graph_spec_json(text: &str) -> Result<JsonValue, JsonError> {
    let mut root: JsonValue = serde_json::from_str(text).map_err(JsonError::Parse)?;
    normalize_graph_spec_value(&mut root);
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_lists_pick_a_vector_kind_by_length() {
        assert_eq!(normalize_value_json(json!([1, 2]))["type"], "vec2");
        assert_eq!(normalize_value_json(json!([1, 2, 3]))["type"], "vec3");
        assert_eq!(normalize_value_json(json!([1, 2, 3, 1]))["type"], "vec4");
        assert_eq!(normalize_value_json(json!([1, 2, 3, 4, 5]))["type"], "vector");
    }

    #[test]
    fn color_shorthand_parses_as_rgba() {
        let parsed = parse_value(json!({ "color": [0.2, 0.3, 0.4, 1.0] })).expect("parse value");
        assert_eq!(parsed, Value::ColorRgba([0.2, 0.3, 0.4, 1.0]));
        assert_eq!(parse_value(json!(0.5)).expect("parse value"), Value::Float(0.5));
    }

    #[test]
    fn tagged_values_pass_through() {
        let canonical = json!({ "type": "float", "data": 0.5 });
        assert_eq!(normalize_value_json(canonical.clone()), canonical);
        assert!(parse_value(json!("metal")).is_err());
    }

    #[test]
    fn sockets_accept_bare_values_and_keep_names() {
        let mut root = json!({
            "trees": [{
                "name": "Material",
                "nodes": [{
                    "name": "RGB",
                    "kind": "ShaderNodeRGB",
                    "inputs": [0.5, {}, null],
                    "outputs": [{ "name": "Color", "default_value": [0.2, 0.3, 0.4, 1.0] }]
                }]
            }]
        });
        normalize_graph_spec_value(&mut root);
        let node = &root["trees"][0]["nodes"][0];
        assert_eq!(node["type"], "ShaderNodeRGB");
        assert_eq!(node["inputs"][0]["default_value"]["type"], "float");
        assert_eq!(node["inputs"][1], json!({}));
        assert_eq!(node["inputs"][2], json!({ "default_value": null }));
        assert_eq!(node["outputs"][0]["default_value"]["type"], "vec4");
        assert_eq!(node["outputs"][0]["name"], "Color");
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        assert!(matches!(
            normalize_graph_spec_json("{ trees: "),
            Err(JsonError::Parse(_))
        ));
    }
}
