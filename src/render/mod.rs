//! Layout, colors and the meshes that draw the diagram.

pub mod edges;
pub mod layout;
pub mod nodes;
pub mod palette;
