//! Named data collections with lazy loading and placeholder fallback.
//!
//! Game data (creature forms, items, element tables) lives in collections
//! loaded on demand through a consumer-supplied load function. Lookups never
//! fail on an unknown id: they fall back to the `__undef__` placeholder
//! entry when the collection carries one, then to the first entry, so
//! content typos degrade to visible placeholder data instead of crashes.
//! Only an empty collection is an error.

use std::collections::HashMap;

use anyhow::anyhow;

use crate::loaders::LoadResult;

/// Id of the placeholder entry a collection may carry.
pub const UNDEF_DATA_ID: &str = "__undef__";

/// Entries addressable by data id.
pub trait HasDataId {
    fn data_id(&self) -> &str;
}

impl HasDataId for battle_core::Element {
    fn data_id(&self) -> &str {
        &self.id
    }
}

type LoadFn<T> = Box<dyn Fn(&str) -> LoadResult<Vec<T>>>;

/// A set of named collections of `T`, populated through a load function.
pub struct DataCollection<T> {
    load: LoadFn<T>,
    collections: HashMap<String, Vec<T>>,
}

impl<T: HasDataId> DataCollection<T> {
    /// Creates an empty collection set around a load function.
    pub fn new(load: impl Fn(&str) -> LoadResult<Vec<T>> + 'static) -> Self {
        Self {
            load: Box::new(load),
            collections: HashMap::new(),
        }
    }

    /// Creates a collection set pre-seeded with default contents.
    pub fn with_defaults(
        load: impl Fn(&str) -> LoadResult<Vec<T>> + 'static,
        defaults: HashMap<String, Vec<T>>,
    ) -> Self {
        Self {
            load: Box::new(load),
            collections: defaults,
        }
    }

    /// (Re)loads one named collection through the load function.
    pub fn load_collection(&mut self, name: &str) -> LoadResult<()> {
        let data = (self.load)(name)?;
        self.collections.insert(name.to_string(), data);
        Ok(())
    }

    /// Looks up an entry by id, falling back to the `__undef__` placeholder
    /// and then to the first entry.
    ///
    /// # Errors
    ///
    /// Fails when the collection is empty or was never loaded.
    pub fn data_from_collection(&self, name: &str, id: &str) -> LoadResult<&T> {
        let collection = self
            .collections
            .get(name)
            .filter(|collection| !collection.is_empty())
            .ok_or_else(|| anyhow!("empty collection `{name}`, cannot load data"))?;

        Ok(collection
            .iter()
            .find(|data| data.data_id() == id)
            .or_else(|| {
                collection
                    .iter()
                    .find(|data| data.data_id() == UNDEF_DATA_ID)
            })
            .unwrap_or(&collection[0]))
    }
}
