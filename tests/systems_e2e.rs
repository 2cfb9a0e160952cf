//! E2E tests for the ECS pipeline: load a graph file, lay it out, fit the
//! camera, apply a preset and read the live view back.

use bevy::prelude::*;
use causalviz::add_diagram_systems;
use causalviz::core::components::MainCamera;
use causalviz::core::config::VizConfig;
use causalviz::core::graph::Timeline;
use causalviz::core::presets::ViewState;
use causalviz::core::resources::{DiagramSession, SelectedNode, StatusMessage};
use causalviz::core::view::{Orientation, Preset, ViewPosition};
use causalviz::input::camera::OrbitController;
use causalviz::input::interaction::{EdgeFilter, InteractionState};
use causalviz::io::presets::{JsonPresetApi, PresetBackend};
use causalviz::io::PendingLoad;
use causalviz::render::layout::NodePositions;
use std::fs;
use std::path::Path;

/// Preset records go to `<dir>/presets` so they never clash with graph files.
fn test_app(dir: &Path) -> App {
    let data_dir = dir.join("presets");
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(VizConfig {
            data_dir: data_dir.to_string_lossy().into_owned(),
            ..Default::default()
        })
        .insert_resource(PresetBackend(Box::new(JsonPresetApi::new(&data_dir))));
    add_diagram_systems(&mut app);
    app.world_mut().spawn((
        OrbitController::default(),
        Projection::Perspective(PerspectiveProjection::default()),
        Transform::default(),
        MainCamera,
    ));
    app
}

fn write_graph(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).unwrap();
    path
}

const CHAIN: &str = r#"{
  "nodes": [
    {"id": "A", "label": "Smoking", "value": 1, "category": "behavior"},
    {"id": "B", "label": "Tar", "value": 2, "category": "exposure"},
    {"id": "C", "label": "Cancer", "value": 3, "category": "outcome"},
    {"id": "D", "label": "Cough", "value": 4, "category": "outcome"}
  ],
  "edges": [
    {"source": "A", "target": "B", "relationship": "causal", "strength": 0.9},
    {"source": "B", "target": "C", "relationship": "causal", "strength": 0.7},
    {"source": "B", "target": "D", "relationship": "correlated", "strength": 0.4}
  ]
}"#;

fn controller(app: &mut App) -> OrbitController {
    let world = app.world_mut();
    let mut q = world.query_filtered::<&OrbitController, With<MainCamera>>();
    q.single(world).unwrap().clone()
}

#[test]
fn e2e_load_lays_out_and_fits_camera() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_graph(dir.path(), "smoking.json", CHAIN);
    let mut app = test_app(dir.path());
    app.insert_resource(PendingLoad::open(&path));
    app.update();

    assert_eq!(app.world().resource::<Timeline>().graph_id, "smoking");
    let positions = app.world().resource::<NodePositions>().clone();
    assert_eq!(positions.len(), 4);

    let (min, max) = positions.bounds().unwrap();
    let center = (min + max) * 0.5;
    let cam = controller(&mut app);
    assert!((cam.target - center).length() < 1e-3);
    assert!((cam.position.z - cam.target.z - cam.distance).abs() < 1e-3);

    // The fitted pose is published and recorded as the current view.
    let view = app.world().resource::<ViewState>().current_view.unwrap();
    assert!((view.position() - cam.position).length() < 1e-3);

    // A preset record exists for the graph, owned by the configured user.
    let record = app.world().resource::<ViewState>().graph.clone().unwrap();
    assert_eq!(record.id, "smoking");
    assert_eq!(record.owner, "local");
    assert!(dir.path().join("presets").join("smoking.json").exists());
}

#[test]
fn e2e_preset_round_trip_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_graph(dir.path(), "graph.json", CHAIN);
    let mut app = test_app(dir.path());
    app.insert_resource(PendingLoad::open(&path));
    app.update();

    let view = ViewPosition {
        x: 1.0,
        y: 2.0,
        z: 3.0,
        orientation: Some(Orientation {
            pitch: 0.1,
            yaw: 0.2,
            roll: 0.3,
        }),
    };
    let preset = Preset::capture("front", Some(view));
    app.world_mut().resource_mut::<ViewState>().load_preset(&preset);
    app.update();
    assert_eq!(controller(&mut app).view_state(), view);
    assert_eq!(app.world().resource::<ViewState>().current_view, Some(view));

    // Applying it again is not a relative move.
    app.world_mut().resource_mut::<ViewState>().load_preset(&preset);
    app.update();
    assert_eq!(controller(&mut app).view_state(), view);
}

#[test]
fn e2e_large_graph_starts_decluttered() {
    let dir = tempfile::tempdir().unwrap();
    let nodes: Vec<String> = (0..600)
        .map(|i| format!(r#"{{"id":"n{i}","label":"N{i}","value":{i},"category":"c{}"}}"#, i % 4))
        .collect();
    let json = format!(r#"{{"nodes":[{}],"edges":[]}}"#, nodes.join(","));
    let path = write_graph(dir.path(), "big.json", &json);
    let mut app = test_app(dir.path());
    app.insert_resource(PendingLoad::open(&path));
    app.update();

    let filter = app.world().resource::<EdgeFilter>().clone();
    assert!(!filter.show_causal && !filter.show_correlated && !filter.show_inhibitory);
    assert_eq!(controller(&mut app).max_distance, 6000.0);
}

#[test]
fn e2e_new_file_resets_session_state() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_graph(dir.path(), "first.json", CHAIN);
    let second = write_graph(
        dir.path(),
        "second.json",
        r#"{"nodes":[{"id":"X","label":"X","value":0,"category":"solo"}],"edges":[]}"#,
    );
    let mut app = test_app(dir.path());
    app.insert_resource(PendingLoad::open(&first));
    app.update();

    {
        let world = app.world_mut();
        let edges = world.resource::<Timeline>().current().edges.clone();
        world.resource_mut::<InteractionState>().click_node("A", &edges);
        world.resource_mut::<SelectedNode>().toggle("A");
    }

    app.insert_resource(PendingLoad::open(&second));
    app.update();

    assert!(app.world().resource::<InteractionState>().clicked().is_none());
    assert_eq!(app.world().resource::<SelectedNode>().0, None);
    let session = app.world().resource::<DiagramSession>();
    assert_eq!(session.layout.cached_z("A"), None);
    assert!(session.layout.cached_z("X").is_some());
}

#[test]
fn e2e_invalid_file_reports_status_and_keeps_graph() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_graph(dir.path(), "good.json", CHAIN);
    let bad = write_graph(
        dir.path(),
        "bad.json",
        r#"{"nodes":[{"id":"a"}],"edges":[]}"#,
    );
    let mut app = test_app(dir.path());
    app.insert_resource(PendingLoad::open(&good));
    app.update();
    app.insert_resource(PendingLoad::open(&bad));
    app.update();

    let status = app.world().resource::<StatusMessage>();
    assert!(status.is_error);
    assert_eq!(status.text, "Missing/Incorrect required keys: label, value, category");
    assert_eq!(app.world().resource::<Timeline>().graph_id, "good");
}

#[test]
fn e2e_switching_frames_keeps_depths() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_graph(
        dir.path(),
        "timed.json",
        r#"{"time_unit":"years","timestamps":[
            {"t":1,"nodes":[{"id":"a","label":"A","value":1,"category":"x"},
                            {"id":"b","label":"B","value":1,"category":"y"}],"edges":[]},
            {"t":2,"nodes":[{"id":"new","label":"New","value":1,"category":"z"},
                            {"id":"a","label":"A","value":1,"category":"x"},
                            {"id":"b","label":"B","value":1,"category":"y"}],"edges":[]}]}"#,
    );
    let mut app = test_app(dir.path());
    app.insert_resource(PendingLoad::open(&path));
    app.update();
    let before = app.world().resource::<NodePositions>().clone();

    assert!(app.world_mut().resource_mut::<Timeline>().select(1));
    app.update();
    let after = app.world().resource::<NodePositions>().clone();

    assert_eq!(after.len(), 3);
    for id in ["a", "b"] {
        assert_eq!(before.get(id).unwrap().z, after.get(id).unwrap().z, "{id}");
    }
}
