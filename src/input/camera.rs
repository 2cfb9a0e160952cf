//! Orbit camera: drag to rotate, right/middle drag to pan, wheel to zoom.
//!
//! The controller keeps the camera position as given so a pose read back after
//! applying a view is exactly that view. The orbit target is re-derived from the
//! position, angles and distance.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::core::components::MainCamera;
use crate::core::config::VizConfig;
use crate::core::presets::ViewState;
use crate::core::view::{Orientation, ViewPosition};
use crate::render::layout::NodePositions;

pub const MIN_DISTANCE: f32 = 10.0;
pub const BASE_MAX_DISTANCE: f32 = 2000.0;
pub const FIT_MARGIN: f32 = 1.5;
const POLAR_EPSILON: f32 = 0.01;
const PAN_FACTOR: f32 = 0.002;

/// Zoom-out limit grows with the graph so large graphs can still be framed.
pub fn max_distance(node_count: usize) -> f32 {
    BASE_MAX_DISTANCE.max(node_count as f32 * 10.0)
}

/// Far clip plane for a graph of this size.
pub fn far_plane(node_count: usize) -> f32 {
    5000.0_f32.max(node_count as f32 * 20.0)
}

/// Unit vector from target to camera for polar angle `polar` (from +Y) and
/// azimuth `azimuth` (around +Y, zero on +Z).
pub fn orbit_direction(polar: f32, azimuth: f32) -> Vec3 {
    Vec3::new(
        polar.sin() * azimuth.sin(),
        polar.cos(),
        polar.sin() * azimuth.cos(),
    )
}

/// Published on every camera pose change.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CameraMoved(pub ViewPosition);

#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitController {
    pub position: Vec3,
    pub target: Vec3,
    pub distance: f32,
    pub polar: f32,
    pub azimuth: f32,
    pub roll: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// True while an orbit or pan drag is in progress.
    pub interacting: bool,
}

impl Default for OrbitController {
    fn default() -> Self {
        let distance = 500.0;
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            distance,
            polar: FRAC_PI_2,
            azimuth: 0.0,
            roll: 0.0,
            min_distance: MIN_DISTANCE,
            max_distance: BASE_MAX_DISTANCE,
            interacting: false,
        }
    }
}

impl OrbitController {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.azimuth, self.polar - FRAC_PI_2, self.roll)
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation(),
            ..default()
        }
    }

    pub fn view_state(&self) -> ViewPosition {
        ViewPosition::new(
            self.position,
            Some(Orientation {
                pitch: self.polar,
                yaw: self.azimuth,
                roll: self.roll,
            }),
        )
    }

    /// Absolute: applying the same view twice gives the same pose.
    /// Without an orientation the current angles are kept.
    pub fn apply_view(&mut self, view: &ViewPosition) {
        if !view.is_finite() {
            warn!("[CAMERA] Ignoring non-finite view {:?}", view);
            return;
        }
        if let Some(o) = view.orientation {
            self.polar = o.pitch;
            self.azimuth = o.yaw;
            self.roll = o.roll;
        }
        self.position = view.position();
        self.target = self.position - orbit_direction(self.polar, self.azimuth) * self.distance;
    }

    /// Frame every position: target the box center, back off along +Z.
    pub fn fit_to_positions(&mut self, positions: &NodePositions) {
        self.max_distance = max_distance(positions.len());
        let Some((min, max)) = positions.bounds() else {
            return;
        };
        let center = (min + max) * 0.5;
        let size = max - min;
        let distance = (size.max_element() * FIT_MARGIN).clamp(self.min_distance, self.max_distance);
        self.target = center;
        self.distance = distance;
        self.polar = FRAC_PI_2;
        self.azimuth = 0.0;
        self.roll = 0.0;
        self.position = center + Vec3::Z * distance;
    }

    fn reposition(&mut self) {
        self.position = self.target + orbit_direction(self.polar, self.azimuth) * self.distance;
    }

    /// Orbit around the target by drag delta in radians.
    pub fn rotate(&mut self, delta_azimuth: f32, delta_polar: f32) {
        self.azimuth += delta_azimuth;
        self.polar = (self.polar + delta_polar).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.reposition();
    }

    /// Screen-space pan; moves target and camera together.
    pub fn pan(&mut self, delta: Vec2, speed: f32) {
        let rotation = self.rotation();
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let offset = (-right * delta.x + up * delta.y) * self.distance * PAN_FACTOR * speed;
        self.target += offset;
        self.position += offset;
    }

    /// Positive `amount` moves closer.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance * (1.0 - amount)).clamp(self.min_distance, self.max_distance);
        self.reposition();
    }
}

pub fn setup_camera(mut commands: Commands) {
    let controller = OrbitController::default();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 50.0_f32.to_radians(),
            near: 0.1,
            far: far_plane(0),
            ..default()
        }),
        controller.transform(),
        controller,
        MainCamera,
    ));
}

/// Left drag orbits, right or middle drag pans. Drag start/end toggles
/// `interacting`, which suppresses node hover.
pub fn camera_orbit_system(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    config: Res<VizConfig>,
    mut camera_q: Query<&mut OrbitController, With<MainCamera>>,
) {
    let Ok(mut controller) = camera_q.single_mut() else {
        for _ in mouse_motion.read() {}
        return;
    };

    let orbiting = mouse_buttons.pressed(MouseButton::Left);
    let panning =
        mouse_buttons.pressed(MouseButton::Right) || mouse_buttons.pressed(MouseButton::Middle);
    let delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    let dragging = (orbiting || panning) && delta != Vec2::ZERO;
    if dragging && !controller.interacting {
        controller.interacting = true;
    } else if !orbiting && !panning && controller.interacting {
        controller.interacting = false;
    }
    if delta == Vec2::ZERO {
        return;
    }

    if orbiting {
        controller.rotate(-delta.x * config.orbit_speed, -delta.y * config.orbit_speed);
    } else if panning {
        controller.pan(delta, config.pan_speed);
    }
}

pub fn camera_zoom_system(
    mut mouse_wheel: MessageReader<MouseWheel>,
    config: Res<VizConfig>,
    mut camera_q: Query<&mut OrbitController, With<MainCamera>>,
) {
    let Ok(mut controller) = camera_q.single_mut() else {
        return;
    };
    for event in mouse_wheel.read() {
        let amount = match event.unit {
            MouseScrollUnit::Line => event.y * config.zoom_speed,
            MouseScrollUnit::Pixel => event.y * config.zoom_speed * 0.01,
        };
        controller.zoom(amount);
    }
}

/// Re-frames the camera after each layout pass and widens the far plane.
pub fn camera_fit_system(
    positions: Res<NodePositions>,
    mut camera_q: Query<(&mut OrbitController, &mut Projection), With<MainCamera>>,
) {
    if !positions.is_changed() {
        return;
    }
    let Ok((mut controller, mut projection)) = camera_q.single_mut() else {
        return;
    };
    controller.fit_to_positions(&positions);
    if let Projection::Perspective(perspective) = projection.as_mut() {
        perspective.far = far_plane(positions.len());
    }
    info!(
        "[CAMERA] Fit {} nodes at distance {:.1}",
        positions.len(),
        controller.distance
    );
}

/// Applies a view pushed by a preset load.
pub fn apply_pending_view_system(
    mut view_state: ResMut<ViewState>,
    mut camera_q: Query<&mut OrbitController, With<MainCamera>>,
) {
    if !view_state.has_pending_view() {
        return;
    }
    let Ok(mut controller) = camera_q.single_mut() else {
        return;
    };
    if let Some(view) = view_state.take_pending_view() {
        controller.apply_view(&view);
    }
}

/// Writes the controller pose to the camera and publishes it.
pub fn sync_camera_transform_system(
    mut camera_q: Query<(&OrbitController, &mut Transform), Changed<OrbitController>>,
    mut moved: MessageWriter<CameraMoved>,
) {
    for (controller, mut transform) in &mut camera_q {
        *transform = controller.transform();
        moved.write(CameraMoved(controller.view_state()));
    }
}

/// Subscriber that keeps the live view in `ViewState` for "save current view".
pub fn record_current_view_system(
    mut moved: MessageReader<CameraMoved>,
    mut view_state: ResMut<ViewState>,
) {
    if let Some(CameraMoved(view)) = moved.read().last() {
        view_state.current_view = Some(*view);
    }
}
