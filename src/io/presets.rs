//! Preset persistence. The viewer only ever talks to [`PresetApi`]; the
//! bundled implementation keeps one JSON [`GraphRecord`] per graph on disk.

use bevy::prelude::*;
use std::path::PathBuf;

use crate::core::view::{GraphRecord, Preset};

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Please enter a preset name")]
    EmptyName,
    #[error("No graph is loaded")]
    NoGraph,
    #[error("The graph must be shared with you to save presets")]
    PermissionDenied,
    #[error("Graph not found: {0}")]
    GraphNotFound(String),
    #[error("Record for graph {expected} holds graph {found}")]
    RecordMismatch { expected: String, found: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence contract for presets. `Ok` means the backend accepted the
/// change; callers apply it locally only then.
pub trait PresetApi: Send + Sync {
    fn add_preset(&mut self, graph_id: &str, preset: &Preset) -> Result<(), PresetError>;
    fn delete_preset(&mut self, graph_id: &str, preset_name: &str) -> Result<(), PresetError>;
    fn get_all_presets(&self, graph_id: &str) -> Result<Vec<Preset>, PresetError>;

    fn get_preset(&self, graph_id: &str, preset_name: &str) -> Result<Option<Preset>, PresetError> {
        Ok(self
            .get_all_presets(graph_id)?
            .into_iter()
            .find(|p| p.name == preset_name))
    }

    /// The record the viewer edits presets against. Backends that track
    /// ownership override this; the default treats `owner` as the owner.
    fn open_graph(
        &mut self,
        graph_id: &str,
        owner: &str,
        graph_name: &str,
    ) -> Result<GraphRecord, PresetError> {
        let mut record = GraphRecord::new(graph_id, owner);
        record.graph_name = graph_name.to_string();
        record.presets = match self.get_all_presets(graph_id) {
            Ok(presets) => presets,
            Err(PresetError::GraphNotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(record)
    }
}

/// The active persistence backend.
#[derive(Resource)]
pub struct PresetBackend(pub Box<dyn PresetApi>);

/// File stem for a graph id. ASCII letters, digits and `-` pass through; every
/// other byte becomes `_XX`, so distinct ids never share a file.
fn record_file_stem(graph_id: &str) -> String {
    let mut stem = String::with_capacity(graph_id.len());
    for byte in graph_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{byte:02X}"));
        }
    }
    stem
}

/// Stores `<dir>/<encoded graph_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonPresetApi {
    dir: PathBuf,
}

impl JsonPresetApi {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, graph_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", record_file_stem(graph_id)))
    }

    pub fn read_record(&self, graph_id: &str) -> Result<GraphRecord, PresetError> {
        let path = self.record_path(graph_id);
        if !path.exists() {
            return Err(PresetError::GraphNotFound(graph_id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let record: GraphRecord = serde_json::from_str(&data)?;
        if record.id != graph_id {
            return Err(PresetError::RecordMismatch {
                expected: graph_id.to_string(),
                found: record.id,
            });
        }
        Ok(record)
    }

    pub fn write_record(&self, record: &GraphRecord) -> Result<(), PresetError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(self.record_path(&record.id), json)?;
        Ok(())
    }

    /// Read the record for `graph_id`, creating an empty one owned by `owner` if missing.
    pub fn load_or_create_record(
        &self,
        graph_id: &str,
        owner: &str,
        graph_name: &str,
    ) -> Result<GraphRecord, PresetError> {
        match self.read_record(graph_id) {
            Ok(record) => Ok(record),
            Err(PresetError::GraphNotFound(_)) => {
                let mut record = GraphRecord::new(graph_id, owner);
                record.graph_name = graph_name.to_string();
                self.write_record(&record)?;
                info!("[PRESET] Created graph record {}", self.record_path(graph_id).display());
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }
}

impl PresetApi for JsonPresetApi {
    fn add_preset(&mut self, graph_id: &str, preset: &Preset) -> Result<(), PresetError> {
        let mut record = self.read_record(graph_id)?;
        record.upsert_preset(preset.clone());
        self.write_record(&record)
    }

    fn delete_preset(&mut self, graph_id: &str, preset_name: &str) -> Result<(), PresetError> {
        let mut record = self.read_record(graph_id)?;
        record.remove_preset(preset_name);
        self.write_record(&record)
    }

    fn get_all_presets(&self, graph_id: &str) -> Result<Vec<Preset>, PresetError> {
        Ok(self.read_record(graph_id)?.presets)
    }

    fn open_graph(
        &mut self,
        graph_id: &str,
        owner: &str,
        graph_name: &str,
    ) -> Result<GraphRecord, PresetError> {
        self.load_or_create_record(graph_id, owner, graph_name)
    }
}
