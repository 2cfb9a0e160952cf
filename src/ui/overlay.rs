//! Top bar (open, edge filters, timestamp), hover tooltips and the status bar.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::sync::mpsc;

use crate::core::config::VizConfig;
use crate::core::graph::Timeline;
use crate::core::presets::ViewState;
use crate::core::resources::StatusMessage;
use crate::input::interaction::{EdgeFilter, InteractionState};
use crate::input::picking::PointerState;
use crate::io::{CurrentFile, FileDialogResult, PendingFileDialog};

fn open_graph_dialog(pending_dialog: &PendingFileDialog, start_dir: std::path::PathBuf) {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("graph", &["json"])
            .set_directory(start_dir)
            .pick_file()
        {
            let _ = tx.send(FileDialogResult::Open(path));
        }
    });
    match pending_dialog.0.lock() {
        Ok(mut guard) => *guard = Some(rx),
        Err(e) => error!("[LOAD] File dialog state poisoned: {}", e),
    }
}

/// Relationship toggles and strength range. Returns the edited copy.
fn filter_controls(ui: &mut egui::Ui, filter: &EdgeFilter) -> EdgeFilter {
    let mut edited = filter.clone();
    ui.checkbox(&mut edited.show_causal, "Causal");
    ui.checkbox(&mut edited.show_correlated, "Correlated");
    ui.checkbox(&mut edited.show_inhibitory, "Inhibitory");
    ui.separator();
    ui.label("Strength");
    let max = edited.max_strength;
    ui.add(
        egui::DragValue::new(&mut edited.min_strength)
            .speed(0.01)
            .range(0.0..=max),
    );
    ui.label("to");
    let min = edited.min_strength;
    ui.add(
        egui::DragValue::new(&mut edited.max_strength)
            .speed(0.01)
            .range(min..=1.0),
    );
    edited
}

pub fn ui_top_bar_system(
    mut contexts: EguiContexts,
    pending_dialog: Res<PendingFileDialog>,
    current_file: Res<CurrentFile>,
    config: Res<VizConfig>,
    mut timeline: ResMut<Timeline>,
    mut filter: ResMut<EdgeFilter>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut edited_filter = None;
    let mut selected_frame = None;

    egui::TopBottomPanel::top("top_bar")
        .default_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open graph...").clicked() {
                    let start_dir = current_file
                        .0
                        .as_ref()
                        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
                        .unwrap_or_else(|| config.data_path());
                    open_graph_dialog(&pending_dialog, start_dir);
                }
                if let Some(path) = &current_file.0 {
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
                    ui.label(egui::RichText::new(name).strong());
                }
                ui.separator();

                let edited = filter_controls(ui, &filter);
                if edited != *filter {
                    edited_filter = Some(edited);
                }

                if timeline.frames.len() > 1 {
                    ui.separator();
                    let unit = timeline.time_unit.clone().unwrap_or_default();
                    let mut index = timeline.selected_index();
                    let t = timeline.selected_t().unwrap_or_default();
                    ui.label(format!("t = {t} {unit}"));
                    ui.add(
                        egui::Slider::new(&mut index, 0..=timeline.frames.len() - 1)
                            .show_value(false),
                    );
                    if index != timeline.selected_index() {
                        selected_frame = Some(index);
                    }
                }
            });
        });

    if let Some(edited) = edited_filter {
        *filter = edited;
    }
    if let Some(index) = selected_frame {
        if timeline.select(index) {
            info!("[LOAD] Showing t = {:?}", timeline.selected_t());
        }
    }
}

/// Node tooltip (label, value, category) or edge tooltip (relationship, strength)
/// next to the pointer.
pub fn ui_tooltip_system(
    mut contexts: EguiContexts,
    pointer: Res<PointerState>,
    interaction: Res<InteractionState>,
    timeline: Res<Timeline>,
) {
    let Some(cursor) = pointer.cursor else {
        return;
    };
    let node = interaction.hovered().and_then(|id| timeline.current().node(id));
    if node.is_none() && pointer.hovered_edge.is_none() {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("hover_tooltip"))
        .fixed_pos(egui::pos2(cursor.x + 14.0, cursor.y + 14.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                if let Some(node) = node {
                    ui.label(egui::RichText::new(&node.label).strong());
                    ui.label(format!("Value: {}", node.value));
                    ui.label(format!("Category: {}", node.category));
                } else if let Some(edge) = &pointer.hovered_edge {
                    ui.label(format!("Relationship: {}", edge.relationship));
                    ui.label(format!("Strength: {:.2}", edge.strength));
                }
            });
        });
}

pub fn ui_bottom_bar_system(
    mut contexts: EguiContexts,
    status: Res<StatusMessage>,
    timeline: Res<Timeline>,
    view_state: Res<ViewState>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let data = timeline.current();
            ui.label(format!("{} nodes, {} edges", data.nodes.len(), data.edges.len()));
            if let Some(view) = &view_state.current_view {
                ui.separator();
                ui.label(format!("camera ({:.2}, {:.2}, {:.2})", view.x, view.y, view.z));
            }
            if status.is_visible() {
                ui.separator();
                let color = if status.is_error {
                    egui::Color32::from_rgb(200, 40, 40)
                } else {
                    egui::Color32::from_rgb(60, 120, 60)
                };
                ui.label(egui::RichText::new(&status.text).color(color));
            }
        });
    });
}

pub fn status_message_tick_system(time: Res<Time>, mut status: ResMut<StatusMessage>) {
    if status.timer > 0.0 {
        status.tick(time.delta_secs());
    }
}
