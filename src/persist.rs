//! On-disk state under `<data_dir>/canvas/`: the canvas PNG, the state
//! document and the code and dream histories.

use crate::agent::memory::{CodeMemory, Dream, CODE_HISTORY_LIMIT};
use crate::agent::scheduler::SchedulerSnapshot;
use crate::agent::speed::SpeedLevel;
use crate::draw::canvas::Raster;
use crate::draw::model::{ColorId, ToolId};
use crate::draw::save::{read_png, write_png};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CANVAS_SUBDIR: &str = "canvas";
pub const CANVAS_FILE_NAME: &str = "canvas.png";
pub const STATE_FILE_NAME: &str = "canvas_state.json";
pub const CODE_HISTORY_FILE_NAME: &str = "canvas_code_history.json";
pub const DREAMS_FILE_NAME: &str = "dream_memories.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub x: i32,
    pub y: i32,
    pub pen_down: bool,
    pub color: ColorId,
    pub emotion: String,
    pub steps: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale_factor: f64,
    pub skip_count: u64,
    pub speed: SpeedLevel,
    pub delay_ms: u64,
    #[serde(default)]
    pub tool: ToolId,
    #[serde(default)]
    pub color_history: Vec<ColorId>,
    #[serde(default)]
    pub last_turn_color: Option<ColorId>,
    #[serde(flatten)]
    pub scheduler: SchedulerSnapshot,
    pub timestamp: DateTime<Utc>,
}

/// Reads and writes the persisted session files. Read failures fall back to
/// `None`/empty and are logged; write failures are returned.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(CANVAS_SUBDIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn canvas_path(&self) -> PathBuf {
        self.dir.join(CANVAS_FILE_NAME)
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    pub fn code_history_path(&self) -> PathBuf {
        self.dir.join(CODE_HISTORY_FILE_NAME)
    }

    pub fn dreams_path(&self) -> PathBuf {
        self.dir.join(DREAMS_FILE_NAME)
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create canvas state folder {}", self.dir.display()))
    }

    pub fn save_canvas(&self, raster: &Raster) -> Result<()> {
        self.ensure_dir()?;
        write_png(raster, &self.canvas_path())
    }

    pub fn load_canvas(&self) -> Option<Raster> {
        let path = self.canvas_path();
        if !path.exists() {
            return None;
        }
        match read_png(&path) {
            Ok(raster) => Some(raster),
            Err(e) => {
                tracing::warn!("starting with a blank canvas: {e:#}");
                None
            }
        }
    }

    pub fn save_state(&self, state: &PersistedState) -> Result<()> {
        self.ensure_dir()?;
        write_json(&self.state_path(), state)
    }

    pub fn load_state(&self) -> Option<PersistedState> {
        read_json(&self.state_path())
    }

    /// Writes the long-term dream history and the code history.
    pub fn save(&self, dreams: &[Dream], code_history: &[CodeMemory]) -> Result<()> {
        self.ensure_dir()?;
        write_json(&self.dreams_path(), &dreams)?;
        write_json(&self.code_history_path(), &code_history)
    }

    /// The most recent entries of the stored code history, oldest first.
    pub fn load_code_history(&self) -> Vec<CodeMemory> {
        let mut history: Vec<CodeMemory> =
            read_json(&self.code_history_path()).unwrap_or_default();
        if history.len() > CODE_HISTORY_LIMIT {
            history.drain(..history.len() - CODE_HISTORY_LIMIT);
        }
        history
    }

    pub fn load_dreams(&self) -> Vec<Dream> {
        read_json(&self.dreams_path()).unwrap_or_default()
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))
        .and_then(|content| {
            serde_json::from_str(&content)
                .with_context(|| format!("deserialize {}", path.display()))
        });
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("ignoring stored file: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::memory::CodeContext;
    use crate::agent::scheduler::{ModeKind, SleepPhase};
    use crate::draw::model::Rgb;

    fn state() -> PersistedState {
        let now = Utc::now();
        PersistedState {
            x: 3,
            y: 4,
            pen_down: false,
            color: ColorId::Navy,
            emotion: "serene".into(),
            steps: 120,
            canvas_width: 10,
            canvas_height: 8,
            scale_factor: 2.5,
            skip_count: 2,
            speed: SpeedLevel::Slow,
            delay_ms: 200,
            tool: ToolId::Flower,
            color_history: vec![ColorId::Red, ColorId::Navy],
            last_turn_color: Some(ColorId::Red),
            scheduler: SchedulerSnapshot {
                mode: ModeKind::Resting,
                mode_start_time: now,
                sleep_phase: SleepPhase::Rem,
                sleep_phase_start: now,
                last_checkin_time: now,
            },
            timestamp: now,
        }
    }

    fn memory(code: &str) -> CodeMemory {
        CodeMemory {
            code: code.into(),
            context: CodeContext {
                emotion: "curious".into(),
                x: 1,
                y: 2,
                color: ColorId::White,
                pen_down: true,
                pixels_drawn: 0,
                tool: ToolId::Brush,
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        assert!(store.load_state().is_none());
        assert!(store.load_canvas().is_none());
        assert!(store.load_code_history().is_empty());
        assert!(store.load_dreams().is_empty());
    }

    #[test]
    fn state_document_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        let original = state();
        store.save_state(&original).expect("save state");
        assert_eq!(store.load_state(), Some(original));

        let json = std::fs::read_to_string(store.state_path()).expect("read state");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["mode"], "resting");
        assert_eq!(value["sleep_phase"], "rem");
        assert_eq!(value["speed"], "slow");
    }

    #[test]
    fn corrupt_state_falls_back_to_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        std::fs::create_dir_all(store.dir()).expect("mkdir");
        std::fs::write(store.state_path(), "{not json").expect("write");
        assert!(store.load_state().is_none());
    }

    #[test]
    fn code_history_is_truncated_to_the_newest_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        let history: Vec<CodeMemory> = (0..CODE_HISTORY_LIMIT + 5)
            .map(|i| memory(&i.to_string()))
            .collect();
        store.save(&[], &history).expect("save");
        let loaded = store.load_code_history();
        assert_eq!(loaded.len(), CODE_HISTORY_LIMIT);
        assert_eq!(loaded[0].code, "5");
        assert_eq!(
            loaded.last().map(|m| m.code.as_str()),
            Some((CODE_HISTORY_LIMIT + 4).to_string().as_str())
        );
    }

    #[test]
    fn canvas_png_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        let mut raster = Raster::new(6, 4);
        raster.set(2, 1, Rgb::new(255, 150, 0));
        store.save_canvas(&raster).expect("save canvas");
        assert_eq!(store.load_canvas(), Some(raster));
    }
}
