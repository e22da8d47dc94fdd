//! In-memory SaveRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use battle_core::SaveEnvelope;

use crate::repository::{RepositoryError, Result, SaveRepository};

/// Stores envelopes in a map, keyed by slot name.
pub struct InMemorySaveRepository {
    slots: RwLock<HashMap<String, SaveEnvelope>>,
}

impl InMemorySaveRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySaveRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveRepository for InMemorySaveRepository {
    fn save(&self, slot: &str, envelope: &SaveEnvelope) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.insert(slot.to_string(), envelope.clone());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SaveEnvelope>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots.get(slot).cloned())
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.remove(slot);
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut names: Vec<String> = slots.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
