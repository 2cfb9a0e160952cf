//! Core types, resources, and utilities shared across the application.

pub mod components;
pub mod config;
pub mod graph;
pub mod presets;
pub mod resources;
pub mod view;
