//! Durable local settings: one JSON blob in a small file-backed key space.

use std::path::{Path, PathBuf};
use storybook_core::Settings;
use storybook_error::{StorageError, StorageErrorKind, StorybookResult};
use tracing::{debug, instrument, warn};

/// Key holding the settings blob.
pub const SETTINGS_KEY: &str = "storybook-ai-storage";

/// Default byte quota of the local key space.
pub const DEFAULT_QUOTA: usize = 5 * 1024 * 1024;

/// Uploaded logos longer than this are dropped when the quota is hit.
pub const LOGO_URL_DROP_THRESHOLD: usize = 100_000;

/// Key/value store with one file per key and a total byte quota.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    quota: usize,
}

impl FileKeyValueStore {
    /// Store rooted at `dir`, created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>, quota: usize) -> StorybookResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;
        Ok(Self { dir, quota })
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn used_except(&self, key: &str) -> usize {
        let skip = self.path(key);
        std::fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|entry| entry.path() != skip)
                    .filter_map(|entry| entry.metadata().ok())
                    .filter(|meta| meta.is_file())
                    .map(|meta| meta.len() as usize)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn get(&self, key: &str) -> StorybookResult<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", key, e))).into()),
        }
    }

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// [`StorageErrorKind::QuotaExceeded`] when the key space would grow past
    /// its quota; a write error otherwise.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let needed = self.used_except(key) + value.len();
        if needed > self.quota {
            return Err(StorageError::new(StorageErrorKind::QuotaExceeded {
                needed,
                quota: self.quota,
            }));
        }
        std::fs::write(self.path(key), value).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", key, e)))
        })
    }

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, key: &str) -> StorybookResult<()> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", key, e))).into()),
        }
    }
}

/// How a settings save ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved in full
    Saved,
    /// Saved after dropping an oversized uploaded logo
    SavedWithoutLogo,
    /// Nothing fit; the stored blob was removed
    Cleared,
}

/// Settings persisted under [`SETTINGS_KEY`].
#[derive(Debug, Clone)]
pub struct LocalSettingsStore {
    kv: FileKeyValueStore,
}

impl LocalSettingsStore {
    /// Store over an existing key space.
    pub fn new(kv: FileKeyValueStore) -> Self {
        Self { kv }
    }

    /// Store in `dir` with the default quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> StorybookResult<Self> {
        Ok(Self::new(FileKeyValueStore::new(dir, DEFAULT_QUOTA)?))
    }

    /// Store under the user's configuration directory (`.../storybook`).
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration directory is known or it cannot be created.
    pub fn open_default() -> StorybookResult<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::DirectoryCreation(
                    "no configuration directory for this platform".to_string(),
                ))
            })?
            .join("storybook");
        Self::open(dir)
    }

    /// Underlying key space.
    pub fn key_space(&self) -> &FileKeyValueStore {
        &self.kv
    }

    /// Load settings. Missing, unreadable or corrupt blobs give defaults.
    #[instrument(skip(self))]
    pub fn load(&self) -> Settings {
        let raw = match self.kv.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read settings; using defaults");
                return Settings::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored settings are corrupt; using defaults");
            Settings::default()
        })
    }

    /// Save settings, shedding data when the quota is exhausted.
    ///
    /// On quota exhaustion an uploaded logo longer than
    /// [`LOGO_URL_DROP_THRESHOLD`] is dropped and the save retried; if that
    /// still fails the stored blob is removed.
    ///
    /// # Errors
    ///
    /// Write failures other than quota exhaustion.
    #[instrument(skip(self, settings))]
    pub fn save(&self, settings: &Settings) -> StorybookResult<SaveOutcome> {
        match self.write(settings) {
            Ok(()) => {
                debug!("Settings saved");
                return Ok(SaveOutcome::Saved);
            }
            Err(e) if !is_quota(&e) => return Err(e.into()),
            Err(e) => warn!(error = %e.kind, "Storage quota exceeded; clearing large items"),
        }

        if settings.brand_logo_url.len() > LOGO_URL_DROP_THRESHOLD {
            let mut trimmed = settings.clone();
            trimmed.brand_logo_url = String::new();
            match self.write(&trimmed) {
                Ok(()) => return Ok(SaveOutcome::SavedWithoutLogo),
                Err(e) if !is_quota(&e) => return Err(e.into()),
                Err(_) => {}
            }
        }

        self.kv.remove(SETTINGS_KEY)?;
        warn!("Settings removed from local storage");
        Ok(SaveOutcome::Cleared)
    }

    fn write(&self, settings: &Settings) -> Result<(), StorageError> {
        let blob = serde_json::to_string(settings).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("encode settings: {}", e)))
        })?;
        self.kv.set(SETTINGS_KEY, &blob)
    }
}

fn is_quota(err: &StorageError) -> bool {
    matches!(err.kind, StorageErrorKind::QuotaExceeded { .. })
}
