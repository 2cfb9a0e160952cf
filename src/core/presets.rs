//! Preset store view-model: the loaded graph's presets, the active preset and
//! the live camera view. Persistence happens elsewhere; these methods only
//! update local state after the backend has accepted a change.

use bevy::prelude::*;

use crate::core::view::{GraphRecord, Preset, ViewPosition};
use crate::io::presets::{PresetApi, PresetError};

#[derive(Resource, Debug, Default)]
pub struct ViewState {
    pub graph: Option<GraphRecord>,
    pub current_view: Option<ViewPosition>,
    pub active_preset: Option<Preset>,
    /// View waiting to be applied to the camera by `apply_pending_view_system`.
    pending_view: Option<ViewPosition>,
}

impl ViewState {
    pub fn with_graph(graph: GraphRecord) -> Self {
        Self {
            graph: Some(graph),
            ..Default::default()
        }
    }

    pub fn presets(&self) -> &[Preset] {
        self.graph.as_ref().map(|g| g.presets.as_slice()).unwrap_or(&[])
    }

    /// Make `preset` active and push its view to the camera. A preset without
    /// a view only becomes active.
    pub fn load_preset(&mut self, preset: &Preset) {
        self.active_preset = Some(preset.clone());
        if let Some(view) = preset.view {
            self.current_view = Some(view);
            self.pending_view = Some(view);
        }
    }

    pub fn clear_active_preset(&mut self) {
        self.active_preset = None;
    }

    /// Upsert by name into the loaded graph's preset list.
    pub fn add_preset_to_graph(&mut self, preset: Preset) {
        if let Some(graph) = self.graph.as_mut() {
            graph.upsert_preset(preset);
        }
    }

    pub fn delete_preset_from_graph(&mut self, preset: &Preset) {
        if let Some(graph) = self.graph.as_mut() {
            graph.remove_preset(&preset.name);
        }
    }

    pub fn is_active(&self, preset: &Preset) -> bool {
        self.active_preset.as_ref().is_some_and(|p| p.name == preset.name)
    }

    pub fn take_pending_view(&mut self) -> Option<ViewPosition> {
        self.pending_view.take()
    }

    pub fn has_pending_view(&self) -> bool {
        self.pending_view.is_some()
    }
}

/// Who is saving or deleting, as configured by `user_uid` and `user_email`.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub uid: &'a str,
    pub email: &'a str,
}

fn authorize(state: &ViewState, actor: Actor) -> Result<String, PresetError> {
    let graph = state.graph.as_ref().ok_or(PresetError::NoGraph)?;
    if !graph.can_edit_presets(actor.uid, actor.email) {
        return Err(PresetError::PermissionDenied);
    }
    Ok(graph.id.clone())
}

/// "Save current view": validate, persist, then upsert locally.
pub fn save_current_view(
    state: &mut ViewState,
    api: &mut dyn PresetApi,
    actor: Actor,
    name: &str,
) -> Result<Preset, PresetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PresetError::EmptyName);
    }
    let graph_id = authorize(state, actor)?;
    let preset = Preset::capture(name, state.current_view);
    api.add_preset(&graph_id, &preset)?;
    state.add_preset_to_graph(preset.clone());
    info!("[PRESET] Saved '{}' on graph {}", preset.name, graph_id);
    Ok(preset)
}

/// Delete through the backend, then locally.
pub fn delete_preset(
    state: &mut ViewState,
    api: &mut dyn PresetApi,
    actor: Actor,
    preset: &Preset,
) -> Result<(), PresetError> {
    let graph_id = authorize(state, actor)?;
    api.delete_preset(&graph_id, &preset.name)?;
    state.delete_preset_from_graph(preset);
    info!("[PRESET] Deleted '{}' from graph {}", preset.name, graph_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::Orientation;

    /// In-memory backend that can be told to reject everything.
    #[derive(Default)]
    struct FakeApi {
        reject: bool,
        calls: usize,
    }

    impl PresetApi for FakeApi {
        fn add_preset(&mut self, _graph_id: &str, _preset: &Preset) -> Result<(), PresetError> {
            self.calls += 1;
            if self.reject {
                Err(PresetError::GraphNotFound("g".into()))
            } else {
                Ok(())
            }
        }

        fn delete_preset(&mut self, _graph_id: &str, _name: &str) -> Result<(), PresetError> {
            self.calls += 1;
            if self.reject {
                Err(PresetError::GraphNotFound("g".into()))
            } else {
                Ok(())
            }
        }

        fn get_all_presets(&self, _graph_id: &str) -> Result<Vec<Preset>, PresetError> {
            Ok(Vec::new())
        }
    }

    const OWNER: Actor = Actor { uid: "owner", email: "owner@example.com" };

    fn view(x: f32) -> ViewPosition {
        ViewPosition {
            x,
            y: 2.0,
            z: 3.0,
            orientation: Some(Orientation { pitch: 0.1, yaw: 0.2, roll: 0.3 }),
        }
    }

    fn state() -> ViewState {
        ViewState::with_graph(GraphRecord::new("g", "owner"))
    }

    #[test]
    fn load_preset_pushes_view_once() {
        let mut state = state();
        let preset = Preset::capture("A", Some(view(1.0)));
        state.load_preset(&preset);
        assert!(state.is_active(&preset));
        assert_eq!(state.current_view, Some(view(1.0)));
        assert_eq!(state.take_pending_view(), Some(view(1.0)));
        assert_eq!(state.take_pending_view(), None);
    }

    #[test]
    fn load_preset_without_view_only_marks_active() {
        let mut state = state();
        state.current_view = Some(view(9.0));
        state.load_preset(&Preset::capture("empty", None));
        assert_eq!(state.active_preset.as_ref().map(|p| p.name.as_str()), Some("empty"));
        assert_eq!(state.current_view, Some(view(9.0)));
        assert!(!state.has_pending_view());
    }

    #[test]
    fn clear_active_preset_keeps_camera_view() {
        let mut state = state();
        state.load_preset(&Preset::capture("A", Some(view(1.0))));
        state.clear_active_preset();
        assert!(state.active_preset.is_none());
        assert_eq!(state.current_view, Some(view(1.0)));
    }

    #[test]
    fn add_twice_with_same_name_keeps_second_view() {
        let mut state = state();
        state.add_preset_to_graph(Preset::capture("A", Some(view(1.0))));
        state.add_preset_to_graph(Preset::capture("A", Some(view(5.0))));
        let named_a: Vec<_> = state.presets().iter().filter(|p| p.name == "A").collect();
        assert_eq!(named_a.len(), 1);
        assert_eq!(named_a[0].view, Some(view(5.0)));
    }

    #[test]
    fn delete_removes_by_name() {
        let mut state = state();
        let a = Preset::capture("A", None);
        state.add_preset_to_graph(a.clone());
        state.add_preset_to_graph(Preset::capture("B", None));
        state.delete_preset_from_graph(&a);
        assert_eq!(state.presets().len(), 1);
        assert_eq!(state.presets()[0].name, "B");
    }

    #[test]
    fn empty_name_never_reaches_backend() {
        let mut state = state();
        let mut api = FakeApi::default();
        let err = save_current_view(&mut state, &mut api, OWNER, "   ").unwrap_err();
        assert!(matches!(err, PresetError::EmptyName));
        assert_eq!(api.calls, 0);
    }

    #[test]
    fn stranger_cannot_save() {
        let mut state = state();
        let mut api = FakeApi::default();
        let stranger = Actor { uid: "x", email: "x@example.com" };
        let err = save_current_view(&mut state, &mut api, stranger, "A").unwrap_err();
        assert!(matches!(err, PresetError::PermissionDenied));
        assert_eq!(api.calls, 0);
    }

    #[test]
    fn rejected_save_leaves_local_state_untouched() {
        let mut state = state();
        state.current_view = Some(view(1.0));
        let mut api = FakeApi { reject: true, calls: 0 };
        assert!(save_current_view(&mut state, &mut api, OWNER, "A").is_err());
        assert!(state.presets().is_empty());
    }

    #[test]
    fn accepted_save_captures_current_view() {
        let mut state = state();
        state.current_view = Some(view(1.0));
        let mut api = FakeApi::default();
        let preset = save_current_view(&mut state, &mut api, OWNER, "  front ").unwrap();
        assert_eq!(preset.name, "front");
        assert_eq!(preset.view, Some(view(1.0)));
        assert_eq!(state.presets(), &[preset]);
    }

    #[test]
    fn rejected_delete_keeps_preset() {
        let mut state = state();
        let a = Preset::capture("A", None);
        state.add_preset_to_graph(a.clone());
        let mut api = FakeApi { reject: true, calls: 0 };
        assert!(delete_preset(&mut state, &mut api, OWNER, &a).is_err());
        assert_eq!(state.presets().len(), 1);
    }
}
