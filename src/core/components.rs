//! ECS components for the diagram.

use bevy::prelude::*;

use crate::core::graph::{EdgeKey, Relationship};
use crate::render::edges::HitBox;

/// Marker for the primary 3D camera.
#[derive(Component)]
pub struct MainCamera;

/// Sphere entity standing for the node with this id.
#[derive(Component, Debug, Clone)]
pub struct NodeView {
    pub id: String,
    /// World radius of the sphere after scaling, used for picking.
    pub radius: f32,
}

/// Line entity of a drawn edge. Arrow and hit box data live alongside so
/// hover picking does not need to rebuild geometry.
#[derive(Component, Debug, Clone)]
pub struct EdgeView {
    pub key: EdgeKey,
    pub relationship: Relationship,
    pub strength: f32,
    pub hit_box: HitBox,
}

/// Arrowhead cone child of a causal edge.
#[derive(Component)]
pub struct ArrowHead;
