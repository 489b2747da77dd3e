use crate::outcome::TrialOutcome;
use crate::participant::{PARTICIPANT_ID, ParticipantId};
use overlap_core::{TrialLog, TrialResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key the accumulated result sequence is stored under.
pub const ALL_TRIAL_DATA: &str = "allTrialData";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed host storage that survives between trials.
pub trait ResultStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object on disk mapping keys to serialized values. Every `set`
/// rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs_err::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ResultStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Appends each completed trial to the log held in a [`ResultStore`].
pub struct LogRecorder<S: ResultStore> {
    store: S,
    key: String,
    warnings: usize,
    last_completed: Option<TrialResult>,
}

impl<S: ResultStore> LogRecorder<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, ALL_TRIAL_DATA)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            warnings: 0,
            last_completed: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores the participant under [`PARTICIPANT_ID`], next to the log.
    pub fn record_participant(&mut self, participant: &ParticipantId) -> Result<(), StoreError> {
        self.store.set(PARTICIPANT_ID, participant.to_string())
    }

    /// Premature confirm attempts seen so far.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn last_completed(&self) -> Option<&TrialResult> {
        self.last_completed.as_ref()
    }

    /// The stored log, with unreadable contents treated as empty.
    pub fn load_log(&self) -> Result<TrialLog, StoreError> {
        Ok(TrialLog::parse_or_empty(self.store.get(&self.key)?.as_deref()))
    }
}

impl<S: ResultStore> TrialOutcome for LogRecorder<S> {
    fn warn_incomplete(&mut self) {
        self.warnings += 1;
        log::info!("confirm attempted before both sliders were adjusted");
    }

    fn complete(&mut self, result: TrialResult) -> anyhow::Result<()> {
        let mut log = self.load_log()?;
        log.push(&result)?;
        self.store.set(&self.key, log.to_json()?)?;
        log::info!(
            "trial {} recorded ({} in log): size {:.2}%, overlap {:.2}%, {:.2}s",
            result.trial(),
            log.len(),
            result.size_percent(),
            result.overlap_percent(),
            result.response_time(),
        );
        self.last_completed = Some(result);
        Ok(())
    }
}
