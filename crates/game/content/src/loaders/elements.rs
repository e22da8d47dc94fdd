//! Element table loader.

use std::path::Path;

use anyhow::anyhow;
use battle_core::Element;

use crate::loaders::{LoadResult, read_file};

/// Parses an element table from RON.
///
/// File format: a list of element entries.
///
/// Example:
/// ```ron
/// [
///     (id: "fire", strong_over: ["grass"], weak_over: ["water"]),
///     (id: "ghost", useless_over: ["normal"]),
/// ]
/// ```
pub fn elements_from_str(content: &str) -> LoadResult<Vec<Element>> {
    ron::from_str(content).map_err(|e| anyhow!("Failed to parse element RON: {e}"))
}

/// Loads an element table from a RON file.
pub fn load_elements(path: &Path) -> LoadResult<Vec<Element>> {
    elements_from_str(&read_file(path)?)
}
