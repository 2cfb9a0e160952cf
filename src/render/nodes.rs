//! Node spheres: color by category, scale by graph size and selection,
//! translucent when dimmed.

use bevy::prelude::*;

use crate::core::components::NodeView;
use crate::core::graph::{Node, Timeline};
use crate::core::resources::{DiagramSession, SelectedNode};
use crate::input::interaction::InteractionState;
use crate::render::layout::NodePositions;
use crate::render::palette::hex_to_color;

/// Base sphere radius before scaling.
pub const NODE_SPHERE_RADIUS: f32 = 6.0;
pub const DIMMED_NODE_OPACITY: f32 = 0.3;
const SELECTED_SCALE_BOOST: f32 = 5.0;
const MIN_NODE_SCALE: f32 = 2.0;

/// `max(2·sqrt(n)·0.1·boost, 2)` where boost is 5 for the selected node.
pub fn node_scale(node_count: usize, selected: bool) -> f32 {
    let boost = if selected { SELECTED_SCALE_BOOST } else { 1.0 };
    (2.0 * (node_count as f32).sqrt() * 0.1 * boost).max(MIN_NODE_SCALE)
}

/// Everything needed to draw one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProps {
    pub position: Vec3,
    pub color: &'static str,
    pub is_selected: bool,
    pub is_dimmed: bool,
    pub scale: f32,
}

impl NodeProps {
    pub fn radius(&self) -> f32 {
        NODE_SPHERE_RADIUS * self.scale
    }

    pub fn opacity(&self) -> f32 {
        if self.is_dimmed {
            DIMMED_NODE_OPACITY
        } else {
            1.0
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_scale(Vec3::splat(self.scale))
    }

    pub fn material(&self) -> StandardMaterial {
        let base = hex_to_color(self.color).with_alpha(self.opacity());
        StandardMaterial {
            base_color: base,
            alpha_mode: AlphaMode::Blend,
            emissive: if self.is_selected {
                LinearRgba::rgb(1.0, 0.0, 0.0)
            } else {
                LinearRgba::BLACK
            },
            ..default()
        }
    }
}

/// Props for `node`, or `None` when the layout has no position for it.
pub fn node_props(
    node: &Node,
    positions: &NodePositions,
    session: &mut DiagramSession,
    interaction: &InteractionState,
    selected: &SelectedNode,
) -> Option<NodeProps> {
    let position = positions.get(&node.id)?;
    let is_selected = selected.is(&node.id);
    Some(NodeProps {
        position,
        color: session.palette.color_hex(&node.category),
        is_selected,
        is_dimmed: interaction.is_node_dimmed(&node.id),
        scale: node_scale(positions.len(), is_selected),
    })
}

#[derive(Resource)]
pub struct NodeMesh(pub Handle<Mesh>);

pub fn setup_node_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(NodeMesh(meshes.add(Sphere::new(NODE_SPHERE_RADIUS))));
}

/// Respawns all spheres after a layout pass.
pub fn spawn_node_views_system(
    mut commands: Commands,
    timeline: Res<Timeline>,
    positions: Res<NodePositions>,
    mut session: ResMut<DiagramSession>,
    interaction: Res<InteractionState>,
    selected: Res<SelectedNode>,
    mesh: Option<Res<NodeMesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<NodeView>>,
) {
    if !positions.is_changed() {
        return;
    }
    let Some(mesh) = mesh else {
        return;
    };
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    for node in &timeline.current().nodes {
        let Some(props) = node_props(node, &positions, &mut session, &interaction, &selected)
        else {
            continue;
        };
        commands.spawn((
            Mesh3d(mesh.0.clone()),
            MeshMaterial3d(materials.add(props.material())),
            props.transform(),
            NodeView {
                id: node.id.clone(),
                radius: props.radius(),
            },
        ));
    }
}

/// Restyles existing spheres when focus or selection changes.
pub fn update_node_views_system(
    timeline: Res<Timeline>,
    positions: Res<NodePositions>,
    mut session: ResMut<DiagramSession>,
    interaction: Res<InteractionState>,
    selected: Res<SelectedNode>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut views: Query<(&mut NodeView, &mut Transform, &MeshMaterial3d<StandardMaterial>)>,
) {
    if positions.is_changed() || !(interaction.is_changed() || selected.is_changed()) {
        return;
    }
    let data = timeline.current();
    for (mut view, mut transform, material) in &mut views {
        let Some(node) = data.node(&view.id) else {
            continue;
        };
        let Some(props) = node_props(node, &positions, &mut session, &interaction, &selected)
        else {
            continue;
        };
        *transform = props.transform();
        view.radius = props.radius();
        if let Some(mat) = materials.get_mut(&material.0) {
            *mat = props.material();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn node(id: &str, category: &str) -> Node {
        Node {
            id: id.to_string(),
            label: id.to_string(),
            value: 1.0,
            category: category.to_string(),
        }
    }

    #[test]
    fn small_graphs_use_minimum_scale() {
        assert_eq!(node_scale(4, false), 2.0);
        assert_eq!(node_scale(100, false), 2.0);
        // 2 * 10 * 0.1 * 5
        assert!((node_scale(100, true) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn large_graphs_grow_nodes() {
        // 2 * 30 * 0.1
        assert!((node_scale(900, false) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn props_reflect_focus_and_selection() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), Vec3::ZERO);
        map.insert("b".to_string(), Vec3::X);
        let positions = NodePositions(map);
        let mut session = DiagramSession::default();
        let mut interaction = InteractionState::default();
        interaction.click_node("a", &[]);
        let selected = SelectedNode(Some("a".to_string()));

        let a = node_props(&node("a", "x"), &positions, &mut session, &interaction, &selected)
            .unwrap();
        let b = node_props(&node("b", "y"), &positions, &mut session, &interaction, &selected)
            .unwrap();

        assert!(a.is_selected && !a.is_dimmed);
        assert_eq!(a.color, "#195c90");
        assert!(b.is_dimmed && !b.is_selected);
        assert_eq!(b.color, "#de7f26");
        assert_eq!(b.opacity(), DIMMED_NODE_OPACITY);
        assert!(a.radius() > b.radius());
    }

    #[test]
    fn unplaced_node_has_no_props() {
        let mut session = DiagramSession::default();
        let props = node_props(
            &node("ghost", "x"),
            &NodePositions::default(),
            &mut session,
            &InteractionState::default(),
            &SelectedNode::default(),
        );
        assert!(props.is_none());
    }
}
