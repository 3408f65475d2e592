//! Durable storage for the progress and settings documents.
//!
//! `JsonFileStore` keeps one JSON file per concern under the data directory and
//! writes through a temp file + rename. `MemoryStore` keeps both documents in
//! memory; it backs `--no-save` sessions and tests.

use std::cell::{Cell, RefCell};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::progress::{UserProgress, UserSettings};

pub const PROGRESS_FILE: &str = "progress.json";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not determine the home directory")]
    NoHomeDir,
}

impl StoreError {
    /// True when the document simply does not exist yet (first run).
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Storage seam for the two persisted documents.
pub trait DocumentStore {
    fn load_progress(&self) -> Result<UserProgress, StoreError>;
    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError>;
    /// Remove the durable progress copy. Erasing a missing document succeeds.
    fn erase_progress(&self) -> Result<(), StoreError>;
    fn load_settings(&self) -> Result<UserSettings, StoreError>;
    fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Rc<S> {
    fn load_progress(&self) -> Result<UserProgress, StoreError> {
        (**self).load_progress()
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError> {
        (**self).save_progress(progress)
    }

    fn erase_progress(&self) -> Result<(), StoreError> {
        (**self).erase_progress()
    }

    fn load_settings(&self) -> Result<UserSettings, StoreError> {
        (**self).load_settings()
    }

    fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError> {
        (**self).save_settings(settings)
    }
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir.join(PROGRESS_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    fn read<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write<T: serde::Serialize>(path: &Path, what: &'static str, value: &T) -> Result<(), StoreError> {
        let io_err = |p: &Path| {
            let p = p.to_path_buf();
            move |source| StoreError::Io { path: p, source }
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        let data = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize { what, source })?;

        let temp_path = path.with_extension("json.tmp");
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(io_err(&temp_path))?;
        temp_file.write_all(&data).map_err(io_err(&temp_path))?;
        temp_file.sync_all().map_err(io_err(&temp_path))?;
        std::fs::rename(&temp_path, path).map_err(io_err(path))?;
        debug!(target: "progress", path = %path.display(), bytes = data.len(), "Saved {what}");
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    #[instrument(level = "debug", skip(self))]
    fn load_progress(&self) -> Result<UserProgress, StoreError> {
        Self::read(&self.progress_path())
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError> {
        Self::write(&self.progress_path(), "progress", progress)
    }

    #[instrument(level = "debug", skip(self))]
    fn erase_progress(&self) -> Result<(), StoreError> {
        let path = self.progress_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "progress", path = %path.display(), "No progress file to erase");
                Ok(())
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn load_settings(&self) -> Result<UserSettings, StoreError> {
        Self::read(&self.settings_path())
    }

    fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError> {
        Self::write(&self.settings_path(), "settings", settings)
    }
}

/// In-memory store. `set_fail_writes(true)` makes every save/erase fail, which
/// exercises the advisory-notice path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    progress: RefCell<Option<UserProgress>>,
    settings: RefCell<Option<UserSettings>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with documents, e.g. copies of what is on disk.
    pub fn with_documents(progress: Option<UserProgress>, settings: Option<UserSettings>) -> Self {
        Self {
            progress: RefCell::new(progress),
            settings: RefCell::new(settings),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes (saves and erases).
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn progress(&self) -> Option<UserProgress> {
        self.progress.borrow().clone()
    }

    pub fn settings(&self) -> Option<UserSettings> {
        self.settings.borrow().clone()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "writes disabled"),
            });
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn missing(what: &str) -> StoreError {
        StoreError::Io {
            path: PathBuf::from(format!("<memory>/{what}")),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no document"),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn load_progress(&self) -> Result<UserProgress, StoreError> {
        self.progress.borrow().clone().ok_or_else(|| Self::missing(PROGRESS_FILE))
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<(), StoreError> {
        self.check_write()?;
        *self.progress.borrow_mut() = Some(progress.clone());
        Ok(())
    }

    fn erase_progress(&self) -> Result<(), StoreError> {
        self.check_write()?;
        *self.progress.borrow_mut() = None;
        Ok(())
    }

    fn load_settings(&self) -> Result<UserSettings, StoreError> {
        self.settings.borrow().clone().ok_or_else(|| Self::missing(SETTINGS_FILE))
    }

    fn save_settings(&self, settings: &UserSettings) -> Result<(), StoreError> {
        self.check_write()?;
        *self.settings.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

/// Pick the store for this run. Without a usable data directory, or with saving
/// turned off, documents live in memory; `--no-save` starts from the disk copies.
pub fn open_store(data_dir: Option<&Path>, save: bool) -> Box<dyn DocumentStore> {
    match (data_dir, save) {
        (Some(dir), true) => Box::new(JsonFileStore::new(dir)),
        (Some(dir), false) => {
            let disk = JsonFileStore::new(dir);
            Box::new(MemoryStore::with_documents(disk.load_progress().ok(), disk.load_settings().ok()))
        }
        (None, _) => Box::new(MemoryStore::new()),
    }
}
