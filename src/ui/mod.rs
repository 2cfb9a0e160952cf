//! egui overlays: top bar, sidebar, tooltips and status bar.

pub mod fuzzy;
pub mod overlay;
pub mod sidebar;
