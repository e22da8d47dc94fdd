//! Content pipeline for the battle framework: named data collections and
//! RON definition loaders feeding `battle-core` types.
pub mod collections;
pub mod loaders;

pub use collections::{DataCollection, HasDataId, UNDEF_DATA_ID};
pub use loaders::{
    ItemDefinition, LoadResult, elements_from_str, items_from_str, load_elements, load_items,
    read_file,
};
