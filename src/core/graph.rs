//! Graph data model: nodes, edges and the per-timestamp frames of a loaded file.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A categorized graph node. Positions are derived, never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub category: String,
}

/// Edge relationship kind. Unknown strings are kept verbatim so the renderer
/// can log them and fall back to the default style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relationship {
    Causal,
    Correlated,
    Inhibitory,
    Other(String),
}

impl Relationship {
    pub fn as_str(&self) -> &str {
        match self {
            Relationship::Causal => "causal",
            Relationship::Correlated => "correlated",
            Relationship::Inhibitory => "inhibitory",
            Relationship::Other(s) => s,
        }
    }

    pub fn is_causal(&self) -> bool {
        matches!(self, Relationship::Causal)
    }
}

impl From<String> for Relationship {
    fn from(s: String) -> Self {
        match s.as_str() {
            "causal" => Relationship::Causal,
            "correlated" => Relationship::Correlated,
            "inhibitory" => Relationship::Inhibitory,
            _ => Relationship::Other(s),
        }
    }
}

impl From<&str> for Relationship {
    fn from(s: &str) -> Self {
        Relationship::from(s.to_string())
    }
}

impl From<Relationship> for String {
    fn from(r: Relationship) -> Self {
        match r {
            Relationship::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two node ids. `strength` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relationship: Relationship,
    pub strength: f32,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: impl Into<Relationship>,
        strength: f32,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship: relationship.into(),
            strength,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(&self.source, &self.target)
    }

    /// True when this is a causal edge touching `node_id` at either end.
    pub fn is_causal_incident(&self, node_id: &str) -> bool {
        self.relationship.is_causal() && (self.source == node_id || self.target == node_id)
    }
}

/// `source + "-" + target`. Two parallel edges share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub String);

impl EdgeKey {
    pub fn new(source: &str, target: &str) -> Self {
        Self(format!("{source}-{target}"))
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `{nodes, edges}` snapshot, as consumed by the diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphData {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// A single timestamp of a timestamped graph file.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub t: f64,
    pub data: GraphData,
}

/// The graph currently on screen: one frame for plain files, one per `t` for
/// timestamped files. Mutating `selected` is what triggers a new layout pass,
/// so only go through [`Timeline::select`].
#[derive(Resource, Debug, Clone, Default)]
pub struct Timeline {
    pub graph_id: String,
    pub time_unit: Option<String>,
    pub frames: Vec<Frame>,
    selected: usize,
}

impl Timeline {
    pub fn single(graph_id: impl Into<String>, data: GraphData) -> Self {
        Self {
            graph_id: graph_id.into(),
            time_unit: None,
            frames: vec![Frame { t: 0.0, data }],
            selected: 0,
        }
    }

    pub fn timestamped(graph_id: impl Into<String>, time_unit: String, frames: Vec<Frame>) -> Self {
        Self {
            graph_id: graph_id.into(),
            time_unit: Some(time_unit),
            frames,
            selected: 0,
        }
    }

    pub fn is_timestamped(&self) -> bool {
        self.time_unit.is_some()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_t(&self) -> Option<f64> {
        self.frames.get(self.selected).map(|f| f.t)
    }

    /// The `{nodes, edges}` of the selected frame, or an empty graph.
    pub fn current(&self) -> &GraphData {
        static EMPTY: GraphData = GraphData {
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        self.frames.get(self.selected).map(|f| &f.data).unwrap_or(&EMPTY)
    }

    /// Select frame `index`. Returns false when out of range or unchanged.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.frames.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        true
    }

    /// Select the first frame whose `t` equals `t`.
    pub fn select_t(&mut self, t: f64) -> bool {
        match self.frames.iter().position(|f| f.t == t) {
            Some(index) => self.select(index),
            None => false,
        }
    }
}
