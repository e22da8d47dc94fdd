//! Runtime layer of the battle framework: the synchronous scene loop and
//! save persistence.
//!
//! Everything here runs on one thread: a scene run is a blocking loop, a
//! save is a blocking write. The single-active-run invariant on
//! [`SceneRunner`] is the only concurrency discipline there is.
pub mod error;
pub mod repository;
pub mod runner;
pub mod scene;

pub use error::SceneError;
pub use repository::{
    FileSaveRepository, InMemorySaveRepository, RepositoryError, SaveRepository,
};
pub use runner::SceneRunner;
pub use scene::Scene;
