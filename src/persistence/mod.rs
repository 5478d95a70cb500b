//! Owned-artifact persistence
//!
//! The only persisted data: a flat JSON array of artifact id strings, e.g.
//! `["RubyCrystal","SwiftBoots"]`. Writes go to a temp file first and are
//! renamed over the save so a crash never leaves a truncated list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sim::artifact::ArtifactId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("artifact storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed artifact list: {0}")]
    Format(#[from] serde_json::Error),
}

/// Serialize owned artifacts as a JSON array of ids
pub fn encode_owned(owned: &[ArtifactId]) -> Result<String, StorageError> {
    let ids: Vec<&str> = owned.iter().map(|id| id.as_str()).collect();
    Ok(serde_json::to_string(&ids)?)
}

/// Parse a JSON id array. Ids this build doesn't know are skipped.
pub fn decode_owned(json: &str) -> Result<Vec<ArtifactId>, StorageError> {
    let ids: Vec<String> = serde_json::from_str(json)?;
    let owned = ids
        .iter()
        .filter_map(|raw| {
            let id = ArtifactId::parse(raw);
            if id.is_none() {
                log::warn!("Skipping unknown artifact id {raw:?}");
            }
            id
        })
        .collect();
    Ok(owned)
}

/// File-backed owned-artifact list
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the list. A missing file is an empty list, not an error.
    pub fn try_load(&self) -> Result<Vec<ArtifactId>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => decode_owned(&json),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Read the list, starting fresh on any error
    pub fn load(&self) -> Vec<ArtifactId> {
        match self.try_load() {
            Ok(owned) => {
                log::info!("Loaded {} owned artifacts", owned.len());
                owned
            }
            Err(err) => {
                log::warn!("Starting with no artifacts ({}): {err}", self.path.display());
                Vec::new()
            }
        }
    }

    pub fn save(&self, owned: &[ArtifactId]) -> Result<(), StorageError> {
        let json = encode_owned(owned)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Owned artifacts saved ({} entries)", owned.len());
        Ok(())
    }
}
