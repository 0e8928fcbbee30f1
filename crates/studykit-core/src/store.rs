//! Per-mode progress and score tracking.
//!
//! The store is an explicit context object. It hydrates from a
//! [`StateStorage`] port when opened and writes the whole state back after
//! every mutation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::document::PdfDocument;

/// The single slot the whole state is persisted under.
pub const STORAGE_SLOT: &str = "learning-storage";

/// Progress fields stored for one mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_score: Option<f64>,
}

/// A mode's record as returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub mode_id: String,
    /// 0–100.
    pub progress: Option<f64>,
    /// A percentage for most modes, elapsed seconds for matching.
    pub last_score: Option<f64>,
}

/// Everything that outlives a process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub learning_progress: BTreeMap<String, ModeProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Persistence port for [`ScoreStore`].
pub trait StateStorage: Send + Sync {
    /// Load the saved state. `None` means nothing was ever saved.
    fn load(&self) -> Result<Option<PersistedState>>;

    /// Replace the saved state.
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Stores the state as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/learning-storage.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{STORAGE_SLOT}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state from {}", self.path.display()))?;
        let state = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state JSON: {}", self.path.display()))?;
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).context("failed to serialize state")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write state to {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the state in memory; lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<Option<PersistedState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// The last saved state.
    pub fn snapshot(&self) -> Option<PersistedState> {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let mut slot = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        *slot = Some(state.clone());
        Ok(())
    }
}

/// Progress and last score per mode, plus the current document.
pub struct ScoreStore {
    storage: Box<dyn StateStorage>,
    state: PersistedState,
}

impl ScoreStore {
    /// Hydrate from `storage`. Missing state starts empty.
    pub fn open(storage: Box<dyn StateStorage>) -> Result<Self> {
        let state = storage.load()?.unwrap_or_default();
        tracing::debug!(modes = state.learning_progress.len(), "score store hydrated");
        Ok(Self { storage, state })
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    /// `None` means the mode was never attempted.
    pub fn get_progress(&self, mode_id: &str) -> Option<ProgressRecord> {
        self.state
            .learning_progress
            .get(mode_id)
            .map(|p| ProgressRecord {
                mode_id: mode_id.to_string(),
                progress: p.progress,
                last_score: p.last_score,
            })
    }

    /// Every record, ordered by mode id.
    pub fn records(&self) -> Vec<ProgressRecord> {
        self.state
            .learning_progress
            .keys()
            .filter_map(|mode_id| self.get_progress(mode_id))
            .collect()
    }

    /// Upsert the progress field, leaving the last score untouched.
    /// Values are clamped into 0–100.
    pub fn set_progress(&mut self, mode_id: &str, progress: f64) -> Result<()> {
        anyhow::ensure!(progress.is_finite(), "progress must be a finite number");
        let progress = progress.clamp(0.0, 100.0);
        self.update(|state| {
            state
                .learning_progress
                .entry(mode_id.to_string())
                .or_default()
                .progress = Some(progress);
        })?;
        tracing::debug!(mode = mode_id, progress, "progress updated");
        Ok(())
    }

    /// Upsert the last-score field, leaving progress untouched.
    pub fn set_score(&mut self, mode_id: &str, score: f64) -> Result<()> {
        anyhow::ensure!(score.is_finite(), "score must be a finite number");
        self.update(|state| {
            state
                .learning_progress
                .entry(mode_id.to_string())
                .or_default()
                .last_score = Some(score);
        })?;
        tracing::info!(mode = mode_id, score, "score recorded");
        Ok(())
    }

    /// Forget one mode. Returns whether it had a record.
    pub fn clear_mode(&mut self, mode_id: &str) -> Result<bool> {
        if !self.state.learning_progress.contains_key(mode_id) {
            return Ok(false);
        }
        self.update(|state| {
            state.learning_progress.remove(mode_id);
        })?;
        Ok(true)
    }

    /// Forget every mode's progress and score.
    pub fn clear_progress(&mut self) -> Result<()> {
        self.update(|state| state.learning_progress.clear())
    }

    pub fn document(&self) -> Result<Option<PdfDocument>> {
        match (&self.state.pdf_content, &self.state.file_name) {
            (Some(content), name) => {
                let name = name.clone().unwrap_or_else(|| "document.pdf".to_string());
                PdfDocument::from_base64(name, content).map(Some)
            }
            (None, _) => Ok(None),
        }
    }

    pub fn set_document(&mut self, document: &PdfDocument) -> Result<()> {
        self.update(|state| {
            state.pdf_content = Some(document.base64.clone());
            state.file_name = Some(document.file_name.clone());
        })?;
        tracing::info!(file = %document.file_name, "document stored");
        Ok(())
    }

    pub fn clear_document(&mut self) -> Result<()> {
        self.update(|state| {
            state.pdf_content = None;
            state.file_name = None;
        })
    }

    /// Apply `change` to a copy and adopt it only once it is saved, so a
    /// failed write leaves memory matching disk.
    fn update(&mut self, change: impl FnOnce(&mut PersistedState)) -> Result<()> {
        let mut next = self.state.clone();
        change(&mut next);
        self.storage.save(&next)?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shares one `MemoryStorage` between the store and the test.
    struct Shared(Arc<MemoryStorage>);

    impl StateStorage for Shared {
        fn load(&self) -> Result<Option<PersistedState>> {
            self.0.load()
        }
        fn save(&self, state: &PersistedState) -> Result<()> {
            self.0.save(state)
        }
    }

    fn memory_store() -> (Arc<MemoryStorage>, ScoreStore) {
        let memory = Arc::new(MemoryStorage::new());
        let store = ScoreStore::open(Box::new(Shared(Arc::clone(&memory)))).unwrap();
        (memory, store)
    }

    /// Loads a fixed state and refuses every save.
    struct ReadOnly(PersistedState);

    impl StateStorage for ReadOnly {
        fn load(&self) -> Result<Option<PersistedState>> {
            Ok(Some(self.0.clone()))
        }
        fn save(&self, _: &PersistedState) -> Result<()> {
            anyhow::bail!("disk is read-only")
        }
    }

    #[test]
    fn failed_save_leaves_state_unchanged() {
        let mut initial = PersistedState::default();
        initial.learning_progress.insert(
            "quiz".to_string(),
            ModeProgress {
                progress: Some(100.0),
                last_score: Some(75.0),
            },
        );
        let mut store = ScoreStore::open(Box::new(ReadOnly(initial.clone()))).unwrap();

        assert!(store.set_score("quiz", 25.0).is_err());
        assert!(store.set_progress("test", 50.0).is_err());
        assert!(store.clear_mode("quiz").is_err());
        assert!(store.clear_progress().is_err());
        assert_eq!(store.state(), &initial);
    }

    #[test]
    fn missing_record_means_never_attempted() {
        let (_, store) = memory_store();
        assert!(store.get_progress("quiz").is_none());
    }

    #[test]
    fn setters_do_not_clobber_each_other() {
        let (_, mut store) = memory_store();
        store.set_score("quiz", 80.0).unwrap();
        store.set_progress("quiz", 50.0).unwrap();

        let record = store.get_progress("quiz").unwrap();
        assert_eq!(record.mode_id, "quiz");
        assert_eq!(record.last_score, Some(80.0));
        assert_eq!(record.progress, Some(50.0));
    }

    #[test]
    fn modes_are_independent() {
        let (_, mut store) = memory_store();
        store.set_score("matching", 42.0).unwrap();
        store.set_score("test", 75.0).unwrap();
        assert_eq!(store.get_progress("matching").unwrap().last_score, Some(42.0));
        assert_eq!(store.get_progress("test").unwrap().last_score, Some(75.0));
        assert_eq!(store.records().len(), 2);
    }

    #[test]
    fn every_mutation_is_saved() {
        let (memory, mut store) = memory_store();
        store.set_progress("flashcards", 30.0).unwrap();
        let saved = memory.snapshot().unwrap();
        assert_eq!(saved.learning_progress["flashcards"].progress, Some(30.0));

        store.clear_mode("flashcards").unwrap();
        assert!(memory.snapshot().unwrap().learning_progress.is_empty());
    }

    #[test]
    fn progress_is_clamped_and_must_be_finite() {
        let (_, mut store) = memory_store();
        store.set_progress("flashcards", 140.0).unwrap();
        assert_eq!(store.get_progress("flashcards").unwrap().progress, Some(100.0));
        assert!(store.set_progress("flashcards", f64::NAN).is_err());
    }

    #[test]
    fn hydrates_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        assert!(storage.path().ends_with("learning-storage.json"));

        {
            let mut store = ScoreStore::open(Box::new(storage.clone())).unwrap();
            store.set_score("quiz", 100.0).unwrap();
            store.set_progress("quiz", 100.0).unwrap();
        }

        let reopened = ScoreStore::open(Box::new(storage)).unwrap();
        let record = reopened.get_progress("quiz").unwrap();
        assert_eq!(record.last_score, Some(100.0));
        assert_eq!(record.progress, Some(100.0));
    }

    #[test]
    fn persisted_layout_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        let mut store = ScoreStore::open(Box::new(storage.clone())).unwrap();
        store.set_score("test", 75.0).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["learningProgress"]["test"]["lastScore"], 75.0);
        assert!(raw["learningProgress"]["test"].get("progress").is_none());
        assert!(raw.get("pdfContent").is_none());
    }

    #[test]
    fn document_round_trip_and_clear() {
        let (_, mut store) = memory_store();
        assert!(store.document().unwrap().is_none());

        let doc = PdfDocument::from_bytes("notes.pdf", b"%PDF-1.7\n%%EOF").unwrap();
        store.set_document(&doc).unwrap();
        assert_eq!(store.document().unwrap(), Some(doc));

        store.clear_document().unwrap();
        assert!(store.document().unwrap().is_none());
    }

    #[test]
    fn clearing_progress_keeps_document() {
        let (_, mut store) = memory_store();
        let doc = PdfDocument::from_bytes("notes.pdf", b"%PDF-1.7\n%%EOF").unwrap();
        store.set_document(&doc).unwrap();
        store.set_score("quiz", 50.0).unwrap();

        store.clear_progress().unwrap();
        assert!(store.records().is_empty());
        assert!(store.document().unwrap().is_some());
    }
}
