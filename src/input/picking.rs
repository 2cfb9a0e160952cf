//! Pointer picking against node spheres and edge hit boxes.
//!
//! A left press that moves less than [`CLICK_DRAG_THRESHOLD`] pixels before
//! release is a click; anything longer is an orbit drag and selects nothing.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::core::components::{EdgeView, MainCamera, NodeView};
use crate::core::graph::{Edge, EdgeKey, Relationship, Timeline};
use crate::input::camera::OrbitController;
use crate::input::interaction::InteractionState;
use crate::render::edges::HitBox;

pub const CLICK_DRAG_THRESHOLD: f32 = 5.0;

/// Distance along the ray to the first intersection with a sphere.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let near = -b - sqrt;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt;
    (far >= 0.0).then_some(far)
}

/// Slab test in the box's local frame.
pub fn ray_hit_box(origin: Vec3, dir: Vec3, hit_box: &HitBox) -> Option<f32> {
    let inv = hit_box.rotation.inverse();
    let o = inv * (origin - hit_box.center);
    let d = inv * dir;
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, h) = (o[axis], d[axis], hit_box.half_extents[axis]);
        if d.abs() < f32::EPSILON {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

/// Edge under the pointer, shown as a relationship/strength tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeHover {
    pub key: EdgeKey,
    pub relationship: Relationship,
    pub strength: f32,
}

#[derive(Resource, Debug, Default)]
pub struct PointerState {
    /// Cursor position at the last left press.
    press: Option<Vec2>,
    pub hovered_edge: Option<EdgeHover>,
    pub cursor: Option<Vec2>,
}

fn cursor_ray(
    windows: &Query<&Window, With<PrimaryWindow>>,
    camera_q: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<(Vec2, Ray3d)> {
    let cursor = windows.single().ok()?.cursor_position()?;
    let (camera, transform) = camera_q.single().ok()?;
    let ray = camera.viewport_to_world(transform, cursor).ok()?;
    Some((cursor, ray))
}

fn nearest_node<'a>(
    ray: Ray3d,
    nodes: impl Iterator<Item = (&'a NodeView, &'a GlobalTransform)>,
) -> Option<&'a str> {
    nodes
        .filter_map(|(view, transform)| {
            ray_sphere(ray.origin, *ray.direction, transform.translation(), view.radius)
                .map(|t| (t, view.id.as_str()))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

/// Node hover transition for whatever lies under the pointer. Hover stays as it
/// is while the camera is being dragged.
pub fn update_node_hover(
    interaction: &mut InteractionState,
    under_pointer: Option<&str>,
    interacting: bool,
    edges: &[Edge],
) {
    if interacting {
        return;
    }
    match under_pointer {
        Some(id) if interaction.hovered() != Some(id) => interaction.pointer_over(id, edges),
        None if interaction.hovered().is_some() => interaction.pointer_out(),
        _ => {}
    }
}

/// Pointer is off the 3D canvas: drop node and edge hover.
fn leave_canvas(interaction: &mut ResMut<InteractionState>, pointer: &mut ResMut<PointerState>) {
    if interaction.hovered().is_some() {
        interaction.pointer_out();
    }
    if pointer.hovered_edge.is_some() {
        pointer.hovered_edge = None;
    }
}

/// Updates hovered node and hovered edge.
pub fn pointer_hover_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    controller_q: Query<&OrbitController, With<MainCamera>>,
    nodes: Query<(&NodeView, &GlobalTransform)>,
    edges: Query<&EdgeView>,
    timeline: Res<Timeline>,
    mut interaction: ResMut<InteractionState>,
    mut pointer: ResMut<PointerState>,
) {
    let Some((cursor, ray)) = cursor_ray(&windows, &camera_q) else {
        if pointer.cursor.is_some() {
            pointer.cursor = None;
        }
        leave_canvas(&mut interaction, &mut pointer);
        return;
    };
    pointer.cursor = Some(cursor);

    let edge_hover = edges
        .iter()
        .filter_map(|view| {
            ray_hit_box(ray.origin, *ray.direction, &view.hit_box).map(|t| (t, view))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, view)| EdgeHover {
            key: view.key.clone(),
            relationship: view.relationship.clone(),
            strength: view.strength,
        });
    if pointer.hovered_edge != edge_hover {
        pointer.hovered_edge = edge_hover;
    }

    let interacting = controller_q.single().is_ok_and(|c| c.interacting);
    let under_pointer = nearest_node(ray, nodes.iter());
    if interaction.hovered() != under_pointer {
        update_node_hover(
            &mut interaction,
            under_pointer,
            interacting,
            &timeline.current().edges,
        );
    }
}

/// Runs while egui owns the pointer, so moving onto a panel ends the hover.
pub fn pointer_over_ui_system(
    mut interaction: ResMut<InteractionState>,
    mut pointer: ResMut<PointerState>,
) {
    leave_canvas(&mut interaction, &mut pointer);
}

/// Click on a node toggles its causal path; click on empty space clears it.
pub fn pointer_click_system(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    nodes: Query<(&NodeView, &GlobalTransform)>,
    timeline: Res<Timeline>,
    mut interaction: ResMut<InteractionState>,
    mut pointer: ResMut<PointerState>,
) {
    if mouse_buttons.just_pressed(MouseButton::Left) {
        pointer.press = cursor_ray(&windows, &camera_q).map(|(cursor, _)| cursor);
        return;
    }
    if !mouse_buttons.just_released(MouseButton::Left) {
        return;
    }
    let Some(press) = pointer.press.take() else {
        return;
    };
    let Some((cursor, ray)) = cursor_ray(&windows, &camera_q) else {
        return;
    };
    if press.distance(cursor) > CLICK_DRAG_THRESHOLD {
        return;
    }

    match nearest_node(ray, nodes.iter()) {
        Some(id) => {
            info!("[FOCUS] Clicked node {}", id);
            interaction.click_node(id, &timeline.current().edges);
        }
        None if interaction.clicked().is_some() => interaction.click_background(),
        None => {}
    }
}
