//! Input handling: orbit camera, pointer picking, and hover/click focus.

pub mod camera;
pub mod interaction;
pub mod picking;
