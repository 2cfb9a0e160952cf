//! Camera pose and preset types shared by the camera controller and the preset store.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Camera orientation in radians: pitch is the orbit polar angle, yaw the
/// azimuthal angle, roll the rotation about the view axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Exact camera pose. `orientation` is `None` only for default/unset views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub orientation: Option<Orientation>,
}

impl ViewPosition {
    pub fn new(position: Vec3, orientation: Option<Orientation>) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            orientation,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// All present numeric fields are finite.
    pub fn is_finite(&self) -> bool {
        let pos_ok = self.x.is_finite() && self.y.is_finite() && self.z.is_finite();
        let orient_ok = self
            .orientation
            .map_or(true, |o| o.pitch.is_finite() && o.yaw.is_finite() && o.roll.is_finite());
        pos_ok && orient_ok
    }
}

/// A named camera snapshot attached to a graph. `name` is the identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub updated: DateTime<Utc>,
    pub filters: Option<Vec<String>>,
    pub pathways: Option<Vec<String>>,
    pub view: Option<ViewPosition>,
}

impl Preset {
    /// A preset as produced by "save current view".
    pub fn capture(name: impl Into<String>, view: Option<ViewPosition>) -> Self {
        Self {
            name: name.into(),
            updated: Utc::now(),
            filters: Some(Vec::new()),
            pathways: None,
            view,
        }
    }
}

/// The slice of the graph aggregate the viewer needs: ownership, sharing and presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub id: String,
    pub owner: String,
    #[serde(default)]
    pub graph_name: String,
    #[serde(default)]
    pub shared_emails: Vec<String>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl GraphRecord {
    pub fn new(id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    /// Owner or shared-access email may save and delete presets.
    pub fn can_edit_presets(&self, uid: &str, email: &str) -> bool {
        self.owner == uid || (!email.is_empty() && self.shared_emails.iter().any(|e| e == email))
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Replace the preset with the same name in place, or append.
    pub fn upsert_preset(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    pub fn remove_preset(&mut self, name: &str) {
        self.presets.retain(|p| p.name != name);
    }
}
