//! Storage gateways: where encoded save blobs actually live.
//!
//! The engine only speaks [`SaveGateway`]; the backing store is swapped per
//! platform. [`MemoryGateway`] backs tests and transient sessions,
//! [`JsonFileGateway`] backs desktop builds with crash-safe atomic writes.

use crate::SaveError;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Keyed blob storage for encoded saves.
///
/// Keys are short file-name-safe identifiers chosen by the engine config, so
/// gateways may use them verbatim in paths.
pub trait SaveGateway {
    /// Returns the blob stored under `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> Result<Option<String>, SaveError>;

    /// Stores `blob` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, blob: &str) -> Result<(), SaveError>;
}

/// In-memory gateway for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    entries: HashMap<String, String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveGateway for MemoryGateway {
    fn load(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// File-backed gateway storing one `{key}.json` per save slot.
///
/// Writes go through the write-rename pattern: the blob lands in
/// `{key}.json.tmp`, is flushed with `sync_all`, then renamed over the final
/// path, so a crash mid-write never corrupts the previous save.
#[derive(Debug)]
pub struct JsonFileGateway {
    dir: PathBuf,
}

impl JsonFileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SaveGateway for JsonFileGateway {
    fn load(&self, key: &str) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), SaveError> {
        let final_path = self.slot_path(key);
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = tmp_path_for(&final_path);
        let mut file = File::create(&tmp_path)?;
        file.write_all(blob.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
