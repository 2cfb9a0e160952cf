//! Category-radial layout: nodes sit around a circle by category, spread by a
//! deterministic index-derived offset, with z cached per node id so repeated
//! passes never make nodes jump in depth.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::graph::{Node, Timeline};
use crate::core::resources::DiagramSession;

/// Radius of the category circle before scaling.
pub const CATEGORY_RADIUS: f32 = 200.0;

/// Node id → world position for the current layout pass.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct NodePositions(pub HashMap<String, Vec3>);

impl NodePositions {
    pub fn get(&self, id: &str) -> Option<Vec3> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Axis-aligned (min, max) corners of all positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.0.values();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))))
    }
}

/// Per-session z memo. Only the first pass that sees a node id decides its z.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    z: HashMap<String, f32>,
}

impl LayoutCache {
    pub fn cached_z(&self, id: &str) -> Option<f32> {
        self.z.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.z.clear();
    }
}

/// Grows with node count so larger graphs spread out sub-linearly.
pub fn scale_factor(node_count: usize) -> f32 {
    (node_count as f32).sqrt() * 0.25
}

/// Pairs closer than this get pushed apart.
pub fn min_distance(node_count: usize) -> f32 {
    50.0 * scale_factor(node_count)
}

/// Distinct categories in first-seen order, each at an even angle on the circle.
fn category_anchors(nodes: &[Node]) -> HashMap<&str, Vec2> {
    let mut order: Vec<&str> = Vec::new();
    for node in nodes {
        if !order.contains(&node.category.as_str()) {
            order.push(&node.category);
        }
    }
    let step = std::f32::consts::TAU / order.len().max(1) as f32;
    order
        .into_iter()
        .enumerate()
        .map(|(i, category)| {
            let angle = i as f32 * step;
            (category, Vec2::new(angle.cos(), angle.sin()) * CATEGORY_RADIUS)
        })
        .collect()
}

/// One layout pass. Identical input order always yields the identical map.
///
/// The separation step is a single corrective sweep, not a relaxation loop:
/// for every ordered pair it pushes the second node by `+min_distance` on all
/// axes when the pair is too close. Dense graphs can keep residual close pairs.
pub fn layout(nodes: &[Node], cache: &mut LayoutCache) -> NodePositions {
    if nodes.is_empty() {
        return NodePositions::default();
    }

    let anchors = category_anchors(nodes);
    let scale = scale_factor(nodes.len());
    let min_dist = min_distance(nodes.len());

    let mut positions: HashMap<String, Vec3> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let z = *cache
            .z
            .entry(node.id.clone())
            .or_insert_with(|| ((i % 5) as f32 - 5.0) * 100.0 * scale);
        let anchor = anchors.get(node.category.as_str()).copied().unwrap_or(Vec2::ZERO);
        let noise_x = ((i % 10) as f32 - 5.0) * 10.0 * scale;
        let noise_y = (((i / 10) % 10) as f32 - 5.0) * 10.0 * scale;
        positions.insert(
            node.id.clone(),
            Vec3::new((anchor.x + noise_x) * scale, (anchor.y + noise_y) * scale, z),
        );
    }

    for (i, node) in nodes.iter().enumerate() {
        let Some(&pos1) = positions.get(&node.id) else {
            continue;
        };
        for (j, other) in nodes.iter().enumerate() {
            if i == j {
                continue;
            }
            let Some(pos2) = positions.get_mut(&other.id) else {
                continue;
            };
            if pos1.distance(*pos2) < min_dist {
                *pos2 += Vec3::splat(min_dist);
            }
        }
    }

    NodePositions(positions)
}

/// Re-runs the layout whenever the displayed node set changes.
pub fn layout_system(
    timeline: Res<Timeline>,
    mut session: ResMut<DiagramSession>,
    mut positions: ResMut<NodePositions>,
) {
    if !timeline.is_changed() {
        return;
    }
    let nodes = &timeline.current().nodes;
    *positions = layout(nodes, &mut session.layout);
    info!("[LAYOUT] Placed {} nodes", positions.len());
}
