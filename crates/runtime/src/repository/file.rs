//! File-based SaveRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use battle_core::SaveEnvelope;

use crate::repository::{RepositoryError, Result, SaveRepository};

/// Stores each slot as one JSON file under a base directory.
///
/// Writes go through a temp file and an atomic rename, so a crash mid-save
/// never leaves a half-written envelope behind.
pub struct FileSaveRepository {
    base_dir: PathBuf,
}

impl FileSaveRepository {
    /// Creates a repository rooted at `base_dir`, creating the directory
    /// when missing.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.base_dir.join(format!("save_{}.json", slot))
    }
}

impl SaveRepository for FileSaveRepository {
    fn save(&self, slot: &str, envelope: &SaveEnvelope) -> Result<()> {
        let path = self.slot_path(slot);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(envelope)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved envelope: {}", path.display());

        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SaveEnvelope>> {
        let path = self.slot_path(slot);

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let envelope: SaveEnvelope =
            serde_json::from_str(&json).map_err(|e| RepositoryError::Json(e.to_string()))?;

        tracing::info!(
            "Loaded save slot '{}' with {} referenced records",
            slot,
            envelope.referencing_array.len()
        );

        Ok(Some(envelope))
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::info!("Deleted save slot: {}", path.display());
        }

        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(slot) = filename
                    .strip_prefix("save_")
                    .and_then(|s| s.strip_suffix(".json"))
            {
                slots.push(slot.to_string());
            }
        }

        slots.sort();
        Ok(slots)
    }
}
