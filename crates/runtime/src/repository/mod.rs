//! Save persistence.
//!
//! A [`SaveRepository`] stores [`SaveEnvelope`]s under slot names. The file
//! implementation is the real storage; the in-memory one backs tests and
//! local runs.

use battle_core::SaveEnvelope;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileSaveRepository;
pub use memory::InMemorySaveRepository;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("save repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistence boundary for save envelopes, addressed by slot name.
pub trait SaveRepository {
    /// Persists the envelope under `slot`, replacing any previous save.
    fn save(&self, slot: &str, envelope: &SaveEnvelope) -> Result<()>;

    /// Loads the envelope stored under `slot`, or `None` when the slot is
    /// empty.
    fn load(&self, slot: &str) -> Result<Option<SaveEnvelope>>;

    /// Removes the save stored under `slot`, if any.
    fn delete(&self, slot: &str) -> Result<()>;

    /// Lists the occupied slots, sorted.
    fn list_slots(&self) -> Result<Vec<String>>;
}
