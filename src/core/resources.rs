//! Resources shared across systems.

use bevy::prelude::*;

use crate::render::layout::LayoutCache;
use crate::render::palette::CategoryPalette;

/// Per-diagram memo state: cached node z values and the category colors.
/// Replaced wholesale when a new graph is loaded; switching timestamps keeps it.
#[derive(Resource, Debug, Default)]
pub struct DiagramSession {
    pub layout: LayoutCache,
    pub palette: CategoryPalette,
}

impl DiagramSession {
    pub fn reset(&mut self) {
        self.layout.clear();
        self.palette.clear();
    }
}

/// Node picked from the sidebar list. Rendered enlarged with a red glow.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct SelectedNode(pub Option<String>);

impl SelectedNode {
    /// Clicking the selected node again clears the selection.
    pub fn toggle(&mut self, id: &str) {
        if self.0.as_deref() == Some(id) {
            self.0 = None;
        } else {
            self.0 = Some(id.to_string());
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.0.as_deref() == Some(id)
    }
}

/// Transient status / error message displayed in the bottom bar.
/// `timer` counts down in seconds; the message is visible while `timer > 0`.
#[derive(Resource, Default)]
pub struct StatusMessage {
    pub text: String,
    pub timer: f32,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn set(&mut self, text: impl Into<String>, duration: f32) {
        self.text = text.into();
        self.timer = duration;
        self.is_error = false;
    }

    pub fn error(&mut self, text: impl Into<String>, duration: f32) {
        self.set(text, duration);
        self.is_error = true;
    }

    pub fn is_visible(&self) -> bool {
        self.timer > 0.0 && !self.text.is_empty()
    }

    pub fn tick(&mut self, dt: f32) {
        self.timer = (self.timer - dt).max(0.0);
    }
}
