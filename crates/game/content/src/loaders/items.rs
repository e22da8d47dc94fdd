//! Item definition loader.

use std::path::Path;
use std::rc::Rc;

use anyhow::anyhow;
use battle_core::{Item, Payload};
use serde::{Deserialize, Serialize};

use crate::collections::HasDataId;
use crate::loaders::{LoadResult, read_file};

/// One item entry of a definition table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    /// Item type name; selects the registered use handlers.
    pub kind: String,
    pub category: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub price: i32,
}

impl ItemDefinition {
    /// Builds the runtime item for this definition.
    pub fn to_item(&self) -> Rc<Item> {
        Rc::new(Item {
            id: self.id.clone(),
            kind: self.kind.clone(),
            category: self.category.clone(),
            order: self.order,
            price: self.price,
            data: Payload::Empty,
        })
    }
}

impl HasDataId for ItemDefinition {
    fn data_id(&self) -> &str {
        &self.id
    }
}

/// Parses an item definition table from RON.
///
/// Example:
/// ```ron
/// [
///     (id: "potion", kind: "heal", category: "medicine", price: 200),
///     (id: "net_ball", kind: "ball", category: "balls", order: 2, price: 1000),
/// ]
/// ```
pub fn items_from_str(content: &str) -> LoadResult<Vec<ItemDefinition>> {
    ron::from_str(content).map_err(|e| anyhow!("Failed to parse item RON: {e}"))
}

/// Loads an item definition table from a RON file.
pub fn load_items(path: &Path) -> LoadResult<Vec<ItemDefinition>> {
    items_from_str(&read_file(path)?)
}
