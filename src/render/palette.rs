//! Category colors. Each newly seen category takes the next palette entry,
//! cycling once there are more categories than colors.

use bevy::prelude::*;
use std::collections::HashMap;

pub const PALETTE: [&str; 7] = [
    "#195c90", // blue
    "#de7f26", // orange
    "#a0db8e", // green
    "#ac1e8e", // magenta
    "#edae01", // gold
    "#d61800", // red
    "#cf6766", // rose
];

/// Category → palette entry, memoized for one diagram session.
#[derive(Debug, Clone, Default)]
pub struct CategoryPalette {
    assigned: HashMap<String, &'static str>,
}

impl CategoryPalette {
    pub fn color_hex(&mut self, category: &str) -> &'static str {
        let next = PALETTE[self.assigned.len() % PALETTE.len()];
        *self.assigned.entry(category.to_string()).or_insert(next)
    }

    /// Already-assigned color without assigning a new one.
    pub fn peek(&self, category: &str) -> Option<&'static str> {
        self.assigned.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn clear(&mut self) {
        self.assigned.clear();
    }
}

pub fn hex_to_color(hex: &str) -> Color {
    bevy::color::Srgba::hex(hex)
        .unwrap_or(bevy::color::Srgba::new(0.5, 0.5, 0.5, 1.0))
        .into()
}
