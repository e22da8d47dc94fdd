//! Definition loaders.
//!
//! Game definitions ship as RON files; each loader parses one table kind
//! into the core types.

use std::fs;
use std::path::Path;

use anyhow::Context;

mod elements;
mod items;

pub use elements::{elements_from_str, load_elements};
pub use items::{ItemDefinition, items_from_str, load_items};

/// Result alias for content loading.
pub type LoadResult<T> = anyhow::Result<T>;

/// Reads a definition file into memory.
pub fn read_file(path: &Path) -> LoadResult<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {path:?}"))
}
