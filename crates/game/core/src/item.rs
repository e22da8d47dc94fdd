//! Items and their use handlers.
//!
//! Item definitions come from content collections; what an item *does* is
//! registered per kind in the [`ItemRegistry`]. Using an item does not touch
//! the scene state directly: the handler returns an [`ItemAction`] whose
//! `handle` reaction the scene applies when it is ready to process it.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::mutation::SceneReaction;
use crate::payload::Payload;

/// An item definition.
#[derive(Debug, Default)]
pub struct Item {
    pub id: String,
    /// Item type name, the registry lookup key (`"ball"`, `"heal"`, ...).
    pub kind: String,
    /// Shop/bag grouping.
    pub category: String,
    /// Sort order within the category.
    pub order: i32,
    pub price: i32,
    pub data: Payload,
}

/// A pending item use: the item plus the deferred scene change to apply.
pub struct ItemAction {
    pub item: Rc<Item>,
    pub handle: SceneReaction,
}

impl fmt::Debug for ItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemAction")
            .field("item", &self.item.id)
            .finish_non_exhaustive()
    }
}

/// Scene states able to carry a pending item action.
pub trait ItemActable {
    fn put_item_action(&mut self, action: ItemAction);
    fn take_item_action(&mut self) -> Option<ItemAction>;
}

type CanUseFn = Box<dyn Fn(&Rc<Item>, &dyn Any) -> bool>;
type UseFn = Box<dyn Fn(&Rc<Item>, &dyn Any) -> Option<ItemAction>>;

/// Per-kind item handlers.
///
/// Items with no registered handlers cannot be used and produce no action.
#[derive(Default)]
pub struct ItemRegistry {
    can_use: HashMap<String, CanUseFn>,
    on_use: HashMap<String, UseFn>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler deciding whether an item kind is usable in the
    /// current scene state.
    pub fn on_can_item_be_used(
        &mut self,
        kind: impl Into<String>,
        handler: impl Fn(&Rc<Item>, &dyn Any) -> bool + 'static,
    ) {
        self.can_use.insert(kind.into(), Box::new(handler));
    }

    /// Registers the handler producing the action of using an item kind.
    pub fn on_use_item(
        &mut self,
        kind: impl Into<String>,
        handler: impl Fn(&Rc<Item>, &dyn Any) -> Option<ItemAction> + 'static,
    ) {
        self.on_use.insert(kind.into(), Box::new(handler));
    }

    /// Whether the item can be used against this scene state.
    pub fn can_item_be_used(&self, item: &Rc<Item>, scene_state: &dyn Any) -> bool {
        self.can_use
            .get(&item.kind)
            .is_some_and(|handler| handler(item, scene_state))
    }

    /// Produces the pending action of using the item, if its kind has a
    /// handler and the handler yields one.
    pub fn use_item(&self, item: &Rc<Item>, scene_state: &dyn Any) -> Option<ItemAction> {
        self.on_use
            .get(&item.kind)
            .and_then(|handler| handler(item, scene_state))
    }
}
