//! Hover/click focus and the dimming it implies.
//!
//! Only causal edges count for focus. Hovering a node keeps it and its
//! one-hop causal neighbors lit; clicking a node keeps lit everything causally
//! upstream and downstream of it. A click stays in place while hover changes
//! underneath it, and takes precedence for dimming.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::core::graph::{Edge, EdgeKey, Relationship, Timeline};

/// Above either threshold the relationship toggles start off.
pub const DECLUTTER_EDGE_THRESHOLD: usize = 150;
pub const DECLUTTER_NODE_THRESHOLD: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Hovering(String),
    Clicked(String),
}

/// Nodes and edges reached by walking causal edges from a start node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CausalPath {
    pub nodes: HashSet<String>,
    pub edges: HashSet<EdgeKey>,
}

/// Forward walk over `source == current → target`, then backward walk over
/// `target == current → source`, sharing one visited set. Iterative, so deep
/// chains and cycles are safe.
pub fn causal_path(start: &str, edges: &[Edge]) -> CausalPath {
    let mut path = CausalPath::default();
    path.nodes.insert(start.to_string());

    let causal: Vec<&Edge> = edges.iter().filter(|e| e.relationship.is_causal()).collect();

    let mut stack = vec![start.to_string()];
    while let Some(current) = stack.pop() {
        for edge in causal.iter().filter(|e| e.source == current) {
            path.edges.insert(edge.key());
            if path.nodes.insert(edge.target.clone()) {
                stack.push(edge.target.clone());
            }
        }
    }

    let mut stack = vec![start.to_string()];
    while let Some(current) = stack.pop() {
        for edge in causal.iter().filter(|e| e.target == current) {
            path.edges.insert(edge.key());
            if path.nodes.insert(edge.source.clone()) {
                stack.push(edge.source.clone());
            }
        }
    }

    path
}

/// Nodes joined to `id` by a causal edge in either direction.
pub fn causal_neighbors(id: &str, edges: &[Edge]) -> HashSet<String> {
    edges
        .iter()
        .filter(|e| e.is_causal_incident(id))
        .map(|e| if e.source == id { e.target.clone() } else { e.source.clone() })
        .collect()
}

#[derive(Resource, Debug, Clone, Default)]
pub struct InteractionState {
    hovered: Option<String>,
    clicked: Option<String>,
    hover_neighbors: HashSet<String>,
    path: CausalPath,
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        match (&self.clicked, &self.hovered) {
            (Some(id), _) => InteractionMode::Clicked(id.clone()),
            (None, Some(id)) => InteractionMode::Hovering(id.clone()),
            (None, None) => InteractionMode::Idle,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn clicked(&self) -> Option<&str> {
        self.clicked.as_deref()
    }

    /// Nodes lit by the active click (empty without one).
    pub fn highlighted_nodes(&self) -> &HashSet<String> {
        &self.path.nodes
    }

    pub fn pointer_over(&mut self, id: &str, edges: &[Edge]) {
        if self.hovered.as_deref() == Some(id) {
            return;
        }
        self.hovered = Some(id.to_string());
        self.hover_neighbors = causal_neighbors(id, edges);
    }

    pub fn pointer_out(&mut self) {
        self.hovered = None;
        self.hover_neighbors.clear();
    }

    /// Clicking the clicked node again toggles the click off.
    pub fn click_node(&mut self, id: &str, edges: &[Edge]) {
        if self.clicked.as_deref() == Some(id) {
            self.clear_click();
        } else {
            self.clicked = Some(id.to_string());
            self.path = causal_path(id, edges);
        }
    }

    pub fn click_background(&mut self) {
        self.clear_click();
    }

    fn clear_click(&mut self) {
        self.clicked = None;
        self.path = CausalPath::default();
    }

    /// Recompute derived sets after the edge set changed.
    pub fn refresh(&mut self, edges: &[Edge]) {
        if let Some(id) = &self.hovered {
            self.hover_neighbors = causal_neighbors(id, edges);
        }
        if let Some(id) = &self.clicked {
            self.path = causal_path(id, edges);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_node_dimmed(&self, id: &str) -> bool {
        if let Some(clicked) = &self.clicked {
            return clicked != id && !self.path.nodes.contains(id);
        }
        if let Some(hovered) = &self.hovered {
            return hovered != id && !self.hover_neighbors.contains(id);
        }
        false
    }

    pub fn is_edge_dimmed(&self, edge: &Edge) -> bool {
        if self.clicked.is_some() {
            return !self.path.edges.contains(&edge.key());
        }
        if let Some(hovered) = &self.hovered {
            return !edge.is_causal_incident(hovered);
        }
        false
    }
}

/// Which edges get drawn. Does not affect causal traversal.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EdgeFilter {
    pub show_causal: bool,
    pub show_correlated: bool,
    pub show_inhibitory: bool,
    pub min_strength: f32,
    pub max_strength: f32,
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self {
            show_causal: true,
            show_correlated: true,
            show_inhibitory: true,
            min_strength: 0.0,
            max_strength: 1.0,
        }
    }
}

impl EdgeFilter {
    pub fn should_declutter(node_count: usize, edge_count: usize) -> bool {
        edge_count > DECLUTTER_EDGE_THRESHOLD || node_count > DECLUTTER_NODE_THRESHOLD
    }

    /// Default filter for a freshly loaded graph of this size.
    pub fn for_graph(node_count: usize, edge_count: usize) -> Self {
        let mut filter = Self::default();
        filter.declutter(node_count, edge_count);
        filter
    }

    /// Switch every relationship toggle off for large graphs.
    pub fn declutter(&mut self, node_count: usize, edge_count: usize) {
        if Self::should_declutter(node_count, edge_count) {
            self.show_causal = false;
            self.show_correlated = false;
            self.show_inhibitory = false;
        }
    }

    pub fn allows(&self, edge: &Edge) -> bool {
        let in_range = edge.strength >= self.min_strength && edge.strength <= self.max_strength;
        let visible = match edge.relationship {
            Relationship::Causal => self.show_causal,
            Relationship::Correlated => self.show_correlated,
            Relationship::Inhibitory => self.show_inhibitory,
            Relationship::Other(_) => false,
        };
        in_range && visible
    }
}

/// Keeps focus sets and the declutter defaults in step with the displayed frame.
pub fn refresh_interaction_system(
    timeline: Res<Timeline>,
    mut state: ResMut<InteractionState>,
    mut filter: ResMut<EdgeFilter>,
) {
    if !timeline.is_changed() {
        return;
    }
    let data = timeline.current();
    state.refresh(&data.edges);
    if EdgeFilter::should_declutter(data.nodes.len(), data.edges.len()) {
        filter.declutter(data.nodes.len(), data.edges.len());
        info!(
            "[FILTER] {} nodes / {} edges: relationship toggles off",
            data.nodes.len(),
            data.edges.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Edge> {
        vec![
            Edge::new("A", "B", "causal", 0.5),
            Edge::new("B", "C", "causal", 0.5),
            Edge::new("B", "D", "correlated", 0.5),
        ]
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn idle_dims_nothing() {
        let state = InteractionState::default();
        assert_eq!(state.mode(), InteractionMode::Idle);
        assert!(!state.is_node_dimmed("A"));
        assert!(!state.is_edge_dimmed(&chain()[2]));
    }

    #[test]
    fn click_source_lights_downstream() {
        let edges = chain();
        let mut state = InteractionState::default();
        state.click_node("A", &edges);
        assert_eq!(state.highlighted_nodes(), &set(&["A", "B", "C"]));
        assert!(state.is_node_dimmed("D"));
        assert!(!state.is_node_dimmed("C"));
        assert!(!state.is_edge_dimmed(&edges[1]));
        assert!(state.is_edge_dimmed(&edges[2]));
    }

    #[test]
    fn click_sink_lights_upstream() {
        let edges = chain();
        let mut state = InteractionState::default();
        state.click_node("C", &edges);
        assert_eq!(state.highlighted_nodes(), &set(&["A", "B", "C"]));
        assert!(state.is_node_dimmed("D"));
    }

    #[test]
    fn click_same_node_twice_toggles_off() {
        let edges = chain();
        let mut state = InteractionState::default();
        state.click_node("A", &edges);
        state.click_node("A", &edges);
        assert_eq!(state.mode(), InteractionMode::Idle);
        assert!(state.highlighted_nodes().is_empty());
    }

    #[test]
    fn background_click_clears_but_keeps_hover() {
        let edges = chain();
        let mut state = InteractionState::default();
        state.pointer_over("B", &edges);
        state.click_node("A", &edges);
        assert_eq!(state.mode(), InteractionMode::Clicked("A".into()));
        state.click_background();
        assert_eq!(state.mode(), InteractionMode::Hovering("B".into()));
    }

    #[test]
    fn pointer_out_keeps_click() {
        let edges = chain();
        let mut state = InteractionState::default();
        state.click_node("A", &edges);
        state.pointer_over("D", &edges);
        state.pointer_out();
        assert_eq!(state.mode(), InteractionMode::Clicked("A".into()));
    }

    #[test]
    fn hover_ignores_non_causal_neighbors() {
        let edges = vec![
            Edge::new("A", "B", "causal", 0.5),
            Edge::new("A", "C", "correlated", 0.5),
        ];
        let mut state = InteractionState::default();
        state.pointer_over("A", &edges);
        assert!(!state.is_node_dimmed("A"));
        assert!(!state.is_node_dimmed("B"));
        assert!(state.is_node_dimmed("C"));
        assert!(!state.is_edge_dimmed(&edges[0]));
        assert!(state.is_edge_dimmed(&edges[1]));
    }

    #[test]
    fn cycles_terminate() {
        let edges = vec![
            Edge::new("A", "B", "causal", 1.0),
            Edge::new("B", "C", "causal", 1.0),
            Edge::new("C", "A", "causal", 1.0),
            Edge::new("X", "A", "causal", 1.0),
        ];
        let path = causal_path("B", &edges);
        assert_eq!(path.nodes, set(&["A", "B", "C", "X"]));
        assert_eq!(path.edges.len(), 4);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let edges: Vec<_> = (0..5_000)
            .map(|i| Edge::new(format!("n{i}"), format!("n{}", i + 1), "causal", 1.0))
            .collect();
        let path = causal_path("n5000", &edges);
        assert_eq!(path.nodes.len(), 5_001);
        assert_eq!(path.edges.len(), 5_000);
    }

    #[test]
    fn isolated_click_dims_everything_else() {
        let edges = chain();
        let mut state = InteractionState::default();
        state.click_node("Z", &edges);
        assert!(!state.is_node_dimmed("Z"));
        for id in ["A", "B", "C", "D"] {
            assert!(state.is_node_dimmed(id), "{id}");
        }
        assert!(edges.iter().all(|e| state.is_edge_dimmed(e)));
    }

    #[test]
    fn refresh_follows_new_edges() {
        let mut state = InteractionState::default();
        state.click_node("A", &chain());
        state.refresh(&[Edge::new("A", "Q", "causal", 1.0)]);
        assert_eq!(state.highlighted_nodes(), &set(&["A", "Q"]));
    }

    #[test]
    fn declutter_thresholds() {
        assert!(!EdgeFilter::should_declutter(500, 150));
        assert!(EdgeFilter::should_declutter(501, 0));
        assert!(EdgeFilter::should_declutter(0, 151));
        let filter = EdgeFilter::for_graph(600, 10);
        assert!(!filter.show_causal && !filter.show_correlated && !filter.show_inhibitory);
        assert_eq!(EdgeFilter::for_graph(10, 10), EdgeFilter::default());
    }

    #[test]
    fn filter_checks_strength_and_kind() {
        let mut filter = EdgeFilter {
            min_strength: 0.2,
            max_strength: 0.8,
            ..Default::default()
        };
        assert!(filter.allows(&Edge::new("a", "b", "causal", 0.5)));
        assert!(!filter.allows(&Edge::new("a", "b", "causal", 0.9)));
        assert!(!filter.allows(&Edge::new("a", "b", "mystery", 0.5)));
        filter.show_inhibitory = false;
        assert!(!filter.allows(&Edge::new("a", "b", "inhibitory", 0.5)));
    }
}
