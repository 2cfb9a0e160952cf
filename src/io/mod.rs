//! File I/O: graph files, the open-file dialog, and preset persistence.

pub mod graph_file;
pub mod presets;

use bevy::prelude::*;
use std::path::PathBuf;

use crate::core::config::VizConfig;
use crate::core::graph::Timeline;
use crate::core::presets::ViewState;
use crate::core::resources::{DiagramSession, SelectedNode, StatusMessage};
use crate::input::interaction::{EdgeFilter, InteractionState};
use graph_file::load_graph_file;
use presets::PresetBackend;

/// Pending file dialog result from background thread. Check each frame.
/// Wrapped in Mutex because Receiver is Send but not Sync.
#[derive(Resource, Default)]
pub struct PendingFileDialog(
    pub std::sync::Mutex<Option<std::sync::mpsc::Receiver<FileDialogResult>>>,
);

pub enum FileDialogResult {
    Open(PathBuf),
}

/// Deferred load. Set by the dialog or the command line; processed in Update.
#[derive(Resource, Default)]
pub struct PendingLoad {
    pub path: Option<PathBuf>,
    /// Overrides the file-stem graph id.
    pub graph_id: Option<String>,
}

impl PendingLoad {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            graph_id: None,
        }
    }
}

/// Path of the graph on screen, shown in the top bar.
#[derive(Resource, Default)]
pub struct CurrentFile(pub Option<PathBuf>);

pub fn process_pending_file_dialog_system(
    pending_dialog: Res<PendingFileDialog>,
    mut pending_load: ResMut<PendingLoad>,
) {
    let Ok(mut guard) = pending_dialog.0.try_lock() else {
        return;
    };
    let Some(rx) = guard.as_ref() else {
        return;
    };
    match rx.try_recv() {
        Ok(FileDialogResult::Open(path)) => {
            *guard = None;
            *pending_load = PendingLoad::open(path);
        }
        Err(std::sync::mpsc::TryRecvError::Disconnected) => *guard = None,
        Err(std::sync::mpsc::TryRecvError::Empty) => {}
    }
}

/// Loads the pending graph and starts a fresh diagram session for it:
/// new z cache and colors, no focus or selection, declutter defaults, and
/// the graph's presets.
pub fn process_pending_load_system(
    mut pending: ResMut<PendingLoad>,
    mut timeline: ResMut<Timeline>,
    mut session: ResMut<DiagramSession>,
    mut interaction: ResMut<InteractionState>,
    mut selected: ResMut<SelectedNode>,
    mut filter: ResMut<EdgeFilter>,
    mut view_state: ResMut<ViewState>,
    mut backend: ResMut<PresetBackend>,
    mut current_file: ResMut<CurrentFile>,
    mut status: ResMut<StatusMessage>,
    config: Res<VizConfig>,
) {
    let Some(path) = pending.path.take() else {
        return;
    };
    let graph_id = pending.graph_id.take();

    let loaded = match load_graph_file(&path, graph_id.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("[LOAD] {}: {}", path.display(), e);
            status.error(e.to_string(), config.status_message_duration);
            return;
        }
    };

    let data = loaded.current();
    let (node_count, edge_count) = (data.nodes.len(), data.edges.len());
    *filter = EdgeFilter::for_graph(node_count, edge_count);
    session.reset();
    interaction.reset();
    selected.0 = None;

    let graph_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    *view_state = match backend.0.open_graph(&loaded.graph_id, &config.user_uid, &graph_name) {
        Ok(record) => ViewState::with_graph(record),
        Err(e) => {
            warn!("[PRESET] Presets unavailable for {}: {}", loaded.graph_id, e);
            ViewState::default()
        }
    };

    info!(
        "[LOAD] Loaded {} ({} nodes, {} edges, {} frames)",
        path.display(),
        node_count,
        edge_count,
        loaded.frames.len()
    );
    status.set(
        format!("Loaded {graph_name}"),
        config.status_message_duration,
    );
    *timeline = loaded;
    current_file.0 = Some(path);
}
