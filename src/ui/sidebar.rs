//! Left panel: searchable node list and the graph's view presets.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::core::config::VizConfig;
use crate::core::graph::Timeline;
use crate::core::presets::{delete_preset, save_current_view, Actor, ViewState};
use crate::core::resources::{SelectedNode, StatusMessage};
use crate::core::view::{Preset, ViewPosition};
use crate::io::presets::PresetBackend;
use crate::ui::fuzzy::search_nodes;

#[derive(Resource, Default)]
pub struct SidebarState {
    pub search: String,
    pub preset_name: String,
}

enum PresetAction {
    Load(Preset),
    Delete(Preset),
    Save,
    ClearActive,
}

/// `(x, y, z) pitch/yaw/roll` to two decimals.
pub fn describe_view(view: Option<&ViewPosition>) -> String {
    let Some(view) = view else {
        return "no view".to_string();
    };
    let mut text = format!("({:.2}, {:.2}, {:.2})", view.x, view.y, view.z);
    if let Some(o) = view.orientation {
        text.push_str(&format!(
            " pitch {:.2} yaw {:.2} roll {:.2}",
            o.pitch, o.yaw, o.roll
        ));
    }
    text
}

fn node_list(
    ui: &mut egui::Ui,
    sidebar: &mut SidebarState,
    timeline: &Timeline,
    selected: &SelectedNode,
) -> Option<String> {
    let mut clicked = None;
    ui.heading("Nodes");
    ui.add(
        egui::TextEdit::singleline(&mut sidebar.search)
            .hint_text("Search nodes...")
            .desired_width(f32::INFINITY),
    );
    egui::ScrollArea::vertical()
        .id_salt("node_list")
        .max_height(280.0)
        .show(ui, |ui| {
            let hits = search_nodes(&timeline.current().nodes, &sidebar.search);
            if hits.is_empty() {
                ui.label(
                    egui::RichText::new("No matches")
                        .color(egui::Color32::GRAY)
                        .italics(),
                );
            }
            for node in hits {
                if ui
                    .selectable_label(selected.is(&node.id), &node.label)
                    .on_hover_text(&node.category)
                    .clicked()
                {
                    clicked = Some(node.id.clone());
                }
            }
        });
    clicked
}

fn preset_list(
    ui: &mut egui::Ui,
    sidebar: &mut SidebarState,
    view_state: &ViewState,
) -> Option<PresetAction> {
    let mut action = None;
    ui.heading("Presets");
    if view_state.graph.is_none() {
        ui.label("Open a graph to manage presets");
        return None;
    }
    egui::ScrollArea::vertical()
        .id_salt("preset_list")
        .max_height(240.0)
        .show(ui, |ui| {
            for preset in view_state.presets() {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.selectable_label(view_state.is_active(preset), &preset.name);
                        if ui.small_button("Load").clicked() {
                            action = Some(PresetAction::Load(preset.clone()));
                        }
                        if ui.small_button("Delete").clicked() {
                            action = Some(PresetAction::Delete(preset.clone()));
                        }
                    });
                    ui.label(
                        egui::RichText::new(preset.updated.format("%Y-%m-%d %H:%M UTC").to_string())
                            .small(),
                    );
                    ui.label(egui::RichText::new(describe_view(preset.view.as_ref())).small());
                });
            }
        });
    if view_state.active_preset.is_some() && ui.button("Clear active preset").clicked() {
        action = Some(PresetAction::ClearActive);
    }
    ui.separator();
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut sidebar.preset_name)
                .hint_text("Preset name")
                .desired_width(140.0),
        );
        if ui.button("Save current view").clicked() {
            action = Some(PresetAction::Save);
        }
    });
    action
}

pub fn ui_sidebar_system(
    mut contexts: EguiContexts,
    mut sidebar: ResMut<SidebarState>,
    timeline: Res<Timeline>,
    mut selected: ResMut<SelectedNode>,
    mut view_state: ResMut<ViewState>,
    mut backend: ResMut<PresetBackend>,
    mut status: ResMut<StatusMessage>,
    config: Res<VizConfig>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut clicked_node = None;
    let mut action = None;
    egui::SidePanel::left("sidebar")
        .default_width(260.0)
        .show(ctx, |ui| {
            clicked_node = node_list(ui, &mut sidebar, &timeline, &selected);
            ui.separator();
            action = preset_list(ui, &mut sidebar, &view_state);
        });

    if let Some(id) = clicked_node {
        selected.toggle(&id);
    }

    let actor = Actor {
        uid: &config.user_uid,
        email: &config.user_email,
    };
    let duration = config.status_message_duration;
    match action {
        Some(PresetAction::Load(preset)) => {
            info!("[PRESET] Loading '{}'", preset.name);
            view_state.load_preset(&preset);
        }
        Some(PresetAction::ClearActive) => view_state.clear_active_preset(),
        Some(PresetAction::Save) => {
            let name = sidebar.preset_name.clone();
            match save_current_view(&mut view_state, &mut *backend.0, actor, &name) {
                Ok(preset) => {
                    status.set(format!("Saved preset '{}'", preset.name), duration);
                    sidebar.preset_name.clear();
                }
                Err(e) => {
                    warn!("[PRESET] Save failed: {}", e);
                    status.error(e.to_string(), duration);
                }
            }
        }
        Some(PresetAction::Delete(preset)) => {
            match delete_preset(&mut view_state, &mut *backend.0, actor, &preset) {
                Ok(()) => status.set(format!("Deleted preset '{}'", preset.name), duration),
                Err(e) => {
                    warn!("[PRESET] Delete failed: {}", e);
                    status.error(e.to_string(), duration);
                }
            }
        }
        None => {}
    }
}
