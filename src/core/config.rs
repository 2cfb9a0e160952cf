use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Application configuration loaded from `~/.causalvizrc`.
#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
pub struct VizConfig {
    /// Viewport background in hex format (e.g., "#f7f7f2").
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Orbit rotation in radians per pixel of drag.
    #[serde(default = "default_orbit_speed")]
    pub orbit_speed: f32,
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f32,
    /// Fractional distance change per wheel line.
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    #[serde(default = "default_status_message_duration")]
    pub status_message_duration: f32,
    /// Directory holding one preset record per graph.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Acting user, checked against the graph owner when saving presets.
    #[serde(default = "default_user_uid")]
    pub user_uid: String,
    /// Acting user's email, checked against the graph's shared emails.
    #[serde(default)]
    pub user_email: String,
}

fn default_background_color() -> String { "#f7f7f2".to_string() }
fn default_orbit_speed() -> f32 { 0.005 }
fn default_pan_speed() -> f32 { 1.0 }
fn default_zoom_speed() -> f32 { 0.1 }
fn default_status_message_duration() -> f32 { 4.0 }
fn default_data_dir() -> String { "graphs".to_string() }
fn default_user_uid() -> String { "local".to_string() }

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            orbit_speed: default_orbit_speed(),
            pan_speed: default_pan_speed(),
            zoom_speed: default_zoom_speed(),
            status_message_duration: default_status_message_duration(),
            data_dir: default_data_dir(),
            user_uid: default_user_uid(),
            user_email: String::new(),
        }
    }
}

impl VizConfig {
    /// Parse the background hex string into a Bevy Color.
    pub fn bg_color(&self) -> Color {
        bevy::color::Srgba::hex(&self.background_color)
            .unwrap_or(bevy::color::Srgba::new(0.97, 0.97, 0.95, 1.0))
            .into()
    }

    /// `data_dir` relative to the working directory unless absolute.
    pub fn data_path(&self) -> PathBuf {
        let dir = PathBuf::from(&self.data_dir);
        if dir.is_absolute() {
            return dir;
        }
        env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(dir)
    }
}

/// Attempts to load the configuration from `~/.causalvizrc`.
/// Falls back to default if the file is missing or invalid.
pub fn load_config() -> VizConfig {
    if let Ok(home) = env::var("HOME") {
        let path = PathBuf::from(home).join(".causalvizrc");
        if let Ok(contents) = fs::read_to_string(path) {
            match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(err) => {
                    eprintln!("Failed to parse ~/.causalvizrc: {}", err);
                }
            }
        }
    }
    VizConfig::default()
}
