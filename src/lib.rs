//! causalviz: 3D causal graph viewer. Library for testing and reuse.

pub mod core;
pub mod input;
pub mod io;
pub mod render;
pub mod ui;

use bevy::prelude::*;
use bevy_egui::{input::egui_wants_any_pointer_input, EguiPlugin};

use crate::core::graph::Timeline;
use crate::core::presets::ViewState;
use crate::core::resources::{DiagramSession, SelectedNode, StatusMessage};

use input::camera::{
    apply_pending_view_system, camera_fit_system, camera_orbit_system, camera_zoom_system,
    record_current_view_system, setup_camera, sync_camera_transform_system, CameraMoved,
};
use input::interaction::{refresh_interaction_system, EdgeFilter, InteractionState};
use input::picking::{
    pointer_click_system, pointer_hover_system, pointer_over_ui_system, PointerState,
};

use io::presets::{JsonPresetApi, PresetBackend};
use io::{
    process_pending_file_dialog_system, process_pending_load_system, CurrentFile,
    PendingFileDialog, PendingLoad,
};

use render::edges::{setup_edge_meshes, sync_edge_views_system};
use render::layout::{layout_system, NodePositions};
use render::nodes::{setup_node_mesh, spawn_node_views_system, update_node_views_system};

use ui::overlay::{
    status_message_tick_system, ui_bottom_bar_system, ui_tooltip_system, ui_top_bar_system,
};
use ui::sidebar::{ui_sidebar_system, SidebarState};

/// Command line: `causalviz [GRAPH.json] [--graph-id ID]`.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub graph: Option<std::path::PathBuf>,
    pub graph_id: Option<String>,
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> CliArgs {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--graph-id" {
            cli.graph_id = args.next();
        } else if cli.graph.is_none() {
            cli.graph = Some(arg.into());
        }
    }
    cli
}

/// Resources and systems of the viewer, without windowing, rendering or egui.
/// Expects `VizConfig` and `PresetBackend` to be inserted by the caller.
/// Tests drive this with `MinimalPlugins`.
pub fn add_diagram_systems(app: &mut App) {
    app.init_resource::<Timeline>()
        .init_resource::<DiagramSession>()
        .init_resource::<NodePositions>()
        .init_resource::<InteractionState>()
        .init_resource::<EdgeFilter>()
        .init_resource::<SelectedNode>()
        .init_resource::<ViewState>()
        .init_resource::<StatusMessage>()
        .init_resource::<PendingLoad>()
        .init_resource::<CurrentFile>()
        .add_message::<CameraMoved>()
        .add_systems(
            Update,
            (
                process_pending_load_system,
                (layout_system, refresh_interaction_system),
                camera_fit_system,
                apply_pending_view_system,
                sync_camera_transform_system,
                record_current_view_system,
            )
                .chain(),
        )
        .add_systems(Update, status_message_tick_system);
}

/// Build and run the viewer.
pub fn run() {
    let app_config = crate::core::config::load_config();
    let cli = parse_args(std::env::args().skip(1));

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "causalviz".to_string(),
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(app_config.bg_color()))
    .insert_resource(PresetBackend(Box::new(JsonPresetApi::new(
        app_config.data_path(),
    ))))
    .insert_resource(app_config)
    .add_plugins(EguiPlugin::default())
    .init_resource::<PendingFileDialog>()
    .init_resource::<PointerState>()
    .init_resource::<SidebarState>();

    add_diagram_systems(&mut app);

    if let Some(path) = cli.graph {
        app.insert_resource(PendingLoad {
            path: Some(path),
            graph_id: cli.graph_id,
        });
    }

    app.add_systems(
        Startup,
        (setup_camera, setup_lights, setup_node_mesh, setup_edge_meshes),
    )
    .add_systems(
        Update,
        process_pending_file_dialog_system.before(process_pending_load_system),
    )
    .add_systems(
        Update,
        (camera_orbit_system, camera_zoom_system)
            .run_if(not(egui_wants_any_pointer_input))
            .after(apply_pending_view_system)
            .before(sync_camera_transform_system),
    )
    .add_systems(
        Update,
        (
            spawn_node_views_system,
            update_node_views_system,
            sync_edge_views_system,
        )
            .after(refresh_interaction_system)
            .after(layout_system),
    )
    .add_systems(
        Update,
        (pointer_hover_system, pointer_click_system)
            .run_if(not(egui_wants_any_pointer_input))
            .after(sync_camera_transform_system)
            .before(spawn_node_views_system)
            .before(update_node_views_system)
            .before(sync_edge_views_system),
    )
    .add_systems(
        Update,
        pointer_over_ui_system
            .run_if(egui_wants_any_pointer_input)
            .before(spawn_node_views_system)
            .before(update_node_views_system)
            .before(sync_edge_views_system),
    )
    .add_systems(
        bevy_egui::EguiPrimaryContextPass,
        (
            ui_top_bar_system,
            ui_sidebar_system,
            ui_bottom_bar_system,
            ui_tooltip_system,
        )
            .chain(),
    )
    .run();
}

fn setup_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(300.0, 600.0, 400.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 3_000.0,
            ..default()
        },
        Transform::from_xyz(-400.0, -200.0, -300.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
