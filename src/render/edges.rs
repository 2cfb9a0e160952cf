//! Edge geometry and edge entities.
//!
//! Lines are trimmed by the node radius at both ends so they meet sphere
//! surfaces. Causal edges get an arrowhead near the target. Every drawn edge
//! carries an invisible hit box at the arrow position for hover tooltips.

use bevy::prelude::*;

use crate::core::components::{ArrowHead, EdgeView};
use crate::core::graph::{Relationship, Timeline};
use crate::input::interaction::{EdgeFilter, InteractionState};
use crate::render::layout::NodePositions;

/// Endpoint trim along the edge direction.
pub const NODE_RADIUS: f32 = 12.0;
/// Arrowhead center distance back from the target node center.
pub const ARROW_OFFSET: f32 = 16.0;
pub const ARROW_RADIUS: f32 = 5.0;
pub const ARROW_HEIGHT: f32 = 10.0;
/// Cross-section of the hover hit box.
pub const HIT_BOX_WIDTH: f32 = 5.0;
pub const DIMMED_OPACITY: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeColor {
    Black,
    Red,
}

impl EdgeColor {
    pub fn with_opacity(self, opacity: f32) -> Color {
        match self {
            EdgeColor::Black => Color::srgba(0.0, 0.0, 0.0, opacity),
            EdgeColor::Red => Color::srgba(1.0, 0.0, 0.0, opacity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStyle {
    pub color: EdgeColor,
    pub arrow: bool,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            color: EdgeColor::Black,
            arrow: false,
        }
    }
}

/// Unknown relationships log and fall back to the default style.
pub fn style_for(relationship: &Relationship) -> EdgeStyle {
    match relationship {
        Relationship::Causal => EdgeStyle {
            color: EdgeColor::Black,
            arrow: true,
        },
        Relationship::Correlated => EdgeStyle::default(),
        Relationship::Inhibitory => EdgeStyle {
            color: EdgeColor::Red,
            arrow: false,
        },
        Relationship::Other(kind) => {
            error!("[EDGE] Unknown relationship type {:?}", kind);
            EdgeStyle::default()
        }
    }
}

pub fn line_width(strength: f32) -> f32 {
    0.1 + strength * 3.0
}

pub fn opacity(dimmed: bool) -> f32 {
    if dimmed {
        DIMMED_OPACITY
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowTransform {
    pub position: Vec3,
    /// Rotates the +Y cone axis onto the edge direction.
    pub rotation: Quat,
}

/// Oriented box, long axis along the edge direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub start: Vec3,
    pub end: Vec3,
    pub width: f32,
    pub style: EdgeStyle,
    pub opacity: f32,
    pub arrow: Option<ArrowTransform>,
    pub hit_box: HitBox,
}

impl EdgeGeometry {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Transform of a unit Y-aligned cylinder stretched over the trimmed line.
    pub fn line_transform(&self) -> Transform {
        let dir = (self.end - self.start).normalize_or_zero();
        let rotation = if dir == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Y, dir)
        };
        Transform {
            translation: self.midpoint(),
            rotation,
            scale: Vec3::new(self.width, self.length(), self.width),
        }
    }
}

/// Geometry for one edge, or `None` (logged) when an endpoint is missing.
pub fn build_edge_geometry(
    source: Option<Vec3>,
    target: Option<Vec3>,
    relationship: &Relationship,
    strength: f32,
    dimmed: bool,
) -> Option<EdgeGeometry> {
    let (Some(source), Some(target)) = (source, target) else {
        error!(
            "[EDGE] Invalid source or target position for edge: {:?} -> {:?}",
            source, target
        );
        return None;
    };

    let direction = target - source;
    let dir = direction.normalize_or_zero();
    let style = style_for(relationship);
    let arrow_position = target - dir * ARROW_OFFSET;
    let rotation = if dir == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::Y, dir)
    };
    let box_rotation = if dir == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::X, dir)
    };

    Some(EdgeGeometry {
        start: source + dir * NODE_RADIUS,
        end: target - dir * NODE_RADIUS,
        width: line_width(strength),
        style,
        opacity: opacity(dimmed),
        arrow: style.arrow.then_some(ArrowTransform {
            position: arrow_position,
            rotation,
        }),
        hit_box: HitBox {
            center: arrow_position,
            rotation: box_rotation,
            half_extents: Vec3::new(
                direction.length() * 0.5,
                HIT_BOX_WIDTH * 0.5,
                HIT_BOX_WIDTH * 0.5,
            ),
        },
    })
}

/// Shared meshes for edge lines and arrowheads.
#[derive(Resource)]
pub struct EdgeMeshes {
    pub line: Handle<Mesh>,
    pub arrow: Handle<Mesh>,
}

pub fn setup_edge_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(EdgeMeshes {
        line: meshes.add(Cylinder::new(0.5, 1.0)),
        arrow: meshes.add(Cone {
            radius: ARROW_RADIUS,
            height: ARROW_HEIGHT,
        }),
    });
}

fn edge_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

/// Rebuilds edge entities whenever positions, focus or the filter change.
pub fn sync_edge_views_system(
    mut commands: Commands,
    timeline: Res<Timeline>,
    positions: Res<NodePositions>,
    interaction: Res<InteractionState>,
    filter: Res<EdgeFilter>,
    edge_meshes: Option<Res<EdgeMeshes>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, Or<(With<EdgeView>, With<ArrowHead>)>>,
) {
    if !(positions.is_changed() || interaction.is_changed() || filter.is_changed()) {
        return;
    }
    let Some(edge_meshes) = edge_meshes else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    for edge in timeline.current().edges.iter().filter(|e| filter.allows(e)) {
        let Some(geometry) = build_edge_geometry(
            positions.get(&edge.source),
            positions.get(&edge.target),
            &edge.relationship,
            edge.strength,
            interaction.is_edge_dimmed(edge),
        ) else {
            continue;
        };

        let color = geometry.style.color.with_opacity(geometry.opacity);
        commands.spawn((
            Mesh3d(edge_meshes.line.clone()),
            MeshMaterial3d(materials.add(edge_material(color))),
            geometry.line_transform(),
            EdgeView {
                key: edge.key(),
                relationship: edge.relationship.clone(),
                strength: edge.strength,
                hit_box: geometry.hit_box,
            },
        ));

        if let Some(arrow) = geometry.arrow {
            commands.spawn((
                Mesh3d(edge_meshes.arrow.clone()),
                MeshMaterial3d(materials.add(edge_material(color))),
                Transform::from_translation(arrow.position).with_rotation(arrow.rotation),
                ArrowHead,
            ));
        }
    }
}
