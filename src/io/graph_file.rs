//! Graph JSON files: plain `{nodes, edges}` or timestamped
//! `{time_unit, timestamps: [{t, nodes, edges}]}`.
//!
//! Files are validated on the raw JSON value first so the user sees which field
//! is wrong, then deserialized into a [`Timeline`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::core::graph::{Edge, Frame, GraphData, Node, Timeline};

#[derive(Debug, thiserror::Error)]
pub enum GraphFileError {
    #[error("Failed to read graph file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON syntax: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

fn invalid(message: impl Into<String>) -> GraphFileError {
    GraphFileError::Invalid(message.into())
}

const NODE_KEYS: [&str; 4] = ["id", "label", "value", "category"];
const EDGE_KEYS: [&str; 4] = ["source", "target", "relationship", "strength"];
const TIMESTAMP_KEYS: [&str; 3] = ["t", "nodes", "edges"];

fn require_keys(obj: &Map<String, Value>, keys: &[&str]) -> Result<(), GraphFileError> {
    let missing: Vec<&str> = keys.iter().copied().filter(|k| !obj.contains_key(*k)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(invalid(format!(
            "Missing/Incorrect required keys: {}",
            missing.join(", ")
        )))
    }
}

fn require_string(obj: &Map<String, Value>, key: &str, what: &str) -> Result<(), GraphFileError> {
    match obj.get(key) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(invalid(format!("Invalid {what}, {key} must be a string"))),
    }
}

fn require_number(obj: &Map<String, Value>, key: &str, what: &str) -> Result<f64, GraphFileError> {
    obj.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(format!("Invalid {what}, {key} must be a number")))
}

fn require_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    message: &str,
) -> Result<&'a Vec<Value>, GraphFileError> {
    obj.get(key).and_then(Value::as_array).ok_or_else(|| invalid(message))
}

pub fn validate_node(node: &Value) -> Result<(), GraphFileError> {
    let obj = node
        .as_object()
        .ok_or_else(|| invalid("Invalid node, must be an object"))?;
    require_keys(obj, &NODE_KEYS)?;
    require_string(obj, "id", "node")?;
    require_string(obj, "label", "node")?;
    require_number(obj, "value", "node")?;
    require_string(obj, "category", "node")
}

/// Relationship strings are not checked against the known kinds.
pub fn validate_edge(edge: &Value) -> Result<(), GraphFileError> {
    let obj = edge
        .as_object()
        .ok_or_else(|| invalid("Invalid edge, must be an object"))?;
    require_keys(obj, &EDGE_KEYS)?;
    require_string(obj, "source", "edge")?;
    require_string(obj, "target", "edge")?;
    require_string(obj, "relationship", "edge")?;
    let strength = require_number(obj, "strength", "edge")?;
    if !(0.0..=1.0).contains(&strength) {
        return Err(invalid("Invalid edge, strength must be between 0 and 1"));
    }
    Ok(())
}

fn validate_timestamp(timestamp: &Value) -> Result<(), GraphFileError> {
    let obj = timestamp
        .as_object()
        .ok_or_else(|| invalid("Invalid timestamp, must be an object"))?;
    require_keys(obj, &TIMESTAMP_KEYS)?;
    if !obj.get("t").is_some_and(Value::is_number) {
        return Err(invalid("Invalid timestamp, must be a number"));
    }
    require_array(obj, "nodes", "Invalid timestamp, nodes must be an array")?;
    require_array(obj, "edges", "Invalid timestamp, edges must be an array")?;
    Ok(())
}

fn validate_graph_body(obj: &Map<String, Value>) -> Result<(), GraphFileError> {
    let nodes = require_array(obj, "nodes", "Invalid keys, must be 'nodes' and 'edges'")?;
    let edges = require_array(obj, "edges", "Invalid keys, must be 'nodes' and 'edges'")?;
    nodes.iter().try_for_each(validate_node)?;
    edges.iter().try_for_each(validate_edge)
}

fn validate_timestamped(obj: &Map<String, Value>) -> Result<(), GraphFileError> {
    if !obj.get("time_unit").is_some_and(Value::is_string) {
        return Err(invalid("Invalid time_unit, must be a string"));
    }
    let timestamps = require_array(obj, "timestamps", "Invalid timestamps, must be an array")?;
    if timestamps.is_empty() {
        return Err(invalid("Timestamps array cannot be empty"));
    }
    timestamps.iter().try_for_each(validate_timestamp)?;
    // Every timestamp is known to hold arrays at this point.
    let objects = || timestamps.iter().filter_map(Value::as_object);
    objects()
        .flat_map(|ts| ts.get("nodes").and_then(Value::as_array).into_iter().flatten())
        .try_for_each(validate_node)?;
    objects()
        .flat_map(|ts| ts.get("edges").and_then(Value::as_array).into_iter().flatten())
        .try_for_each(validate_edge)
}

fn is_timestamped(obj: &Map<String, Value>) -> bool {
    obj.contains_key("timestamps") && obj.contains_key("time_unit")
}

fn is_plain(obj: &Map<String, Value>) -> bool {
    obj.contains_key("nodes") && obj.contains_key("edges")
}

/// Checks structure and field types without building anything.
pub fn validate(value: &Value) -> Result<(), GraphFileError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("Invalid JSON syntax"))?;
    if is_timestamped(obj) {
        validate_timestamped(obj)
    } else if is_plain(obj) {
        validate_graph_body(obj)
    } else {
        Err(invalid(
            "Invalid graph format, for timestamp format use keys:'timestamps' and 'time_unit', \
             for non-timestamp format use 'nodes' and 'edges'",
        ))
    }
}

#[derive(Deserialize)]
struct PlainFile {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct TimestampEntry {
    t: f64,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct TimestampedFile {
    time_unit: String,
    timestamps: Vec<TimestampEntry>,
}

/// Validate and convert a graph document.
pub fn parse_graph(json: &str, graph_id: &str) -> Result<Timeline, GraphFileError> {
    let value: Value = serde_json::from_str(json)?;
    validate(&value)?;
    let is_timestamped = value.as_object().is_some_and(is_timestamped);
    if is_timestamped {
        let file: TimestampedFile = serde_json::from_value(value)?;
        let frames = file
            .timestamps
            .into_iter()
            .map(|ts| Frame {
                t: ts.t,
                data: GraphData {
                    nodes: ts.nodes,
                    edges: ts.edges,
                },
            })
            .collect();
        Ok(Timeline::timestamped(graph_id, file.time_unit, frames))
    } else {
        let file: PlainFile = serde_json::from_value(value)?;
        Ok(Timeline::single(
            graph_id,
            GraphData {
                nodes: file.nodes,
                edges: file.edges,
            },
        ))
    }
}

/// File stem, used as the graph id when none is given.
pub fn default_graph_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("graph")
        .to_string()
}

pub fn load_graph_file(path: &Path, graph_id: Option<&str>) -> Result<Timeline, GraphFileError> {
    let json = std::fs::read_to_string(path)?;
    let id = graph_id.map_or_else(|| default_graph_id(path), str::to_string);
    parse_graph(&json, &id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::Relationship;

    fn message(json: &str) -> String {
        parse_graph(json, "g").unwrap_err().to_string()
    }

    #[test]
    fn plain_file_becomes_single_frame() {
        let tl = parse_graph(
            r#"{"nodes":[{"id":"a","label":"A","value":1,"category":"x"}],
                "edges":[{"source":"a","target":"a","relationship":"odd","strength":0.5}]}"#,
            "g",
        )
        .unwrap();
        assert!(!tl.is_timestamped());
        assert_eq!(tl.frames.len(), 1);
        assert_eq!(tl.current().nodes[0].label, "A");
        assert_eq!(
            tl.current().edges[0].relationship,
            Relationship::Other("odd".into())
        );
    }

    #[test]
    fn timestamped_file_keeps_frame_order() {
        let tl = parse_graph(
            r#"{"time_unit":"days","timestamps":[
                {"t":2,"nodes":[],"edges":[]},
                {"t":1,"nodes":[{"id":"a","label":"A","value":0.5,"category":"x"}],"edges":[]}]}"#,
            "g",
        )
        .unwrap();
        assert_eq!(tl.time_unit.as_deref(), Some("days"));
        assert_eq!(tl.frames.iter().map(|f| f.t).collect::<Vec<_>>(), vec![2.0, 1.0]);
        assert!(tl.current().nodes.is_empty());
    }

    #[test]
    fn rejects_unknown_shape() {
        assert!(message(r#"{"foo":1}"#).starts_with("Invalid graph format"));
        assert_eq!(message("[1,2]"), "Invalid JSON syntax");
        assert!(message("{nope").starts_with("Invalid JSON syntax: "));
    }

    #[test]
    fn reports_missing_node_keys() {
        assert_eq!(
            message(r#"{"nodes":[{"id":"a","label":"A"}],"edges":[]}"#),
            "Missing/Incorrect required keys: value, category"
        );
    }

    #[test]
    fn reports_wrong_field_types() {
        assert_eq!(
            message(r#"{"nodes":[{"id":1,"label":"A","value":1,"category":"x"}],"edges":[]}"#),
            "Invalid node, id must be a string"
        );
        assert_eq!(
            message(
                r#"{"nodes":[],"edges":[{"source":"a","target":"b","relationship":"causal","strength":"hi"}]}"#
            ),
            "Invalid edge, strength must be a number"
        );
    }

    #[test]
    fn strength_must_be_a_unit_fraction() {
        assert_eq!(
            message(
                r#"{"nodes":[],"edges":[{"source":"a","target":"b","relationship":"causal","strength":1.5}]}"#
            ),
            "Invalid edge, strength must be between 0 and 1"
        );
    }

    #[test]
    fn timestamped_checks_run_in_order() {
        assert_eq!(
            message(r#"{"time_unit":3,"timestamps":[]}"#),
            "Invalid time_unit, must be a string"
        );
        assert_eq!(
            message(r#"{"time_unit":"d","timestamps":[]}"#),
            "Timestamps array cannot be empty"
        );
        assert_eq!(
            message(r#"{"time_unit":"d","timestamps":[{"t":"x","nodes":[],"edges":[]}]}"#),
            "Invalid timestamp, must be a number"
        );
        assert_eq!(
            message(r#"{"time_unit":"d","timestamps":[{"t":1,"nodes":{},"edges":[]}]}"#),
            "Invalid timestamp, nodes must be an array"
        );
    }

    #[test]
    fn graph_id_defaults_to_file_stem() {
        assert_eq!(default_graph_id(Path::new("/data/smoking.json")), "smoking");
    }
}
