//! Effects and their behavior hooks.
//!
//! An effect is a piece of data attached to a creature under a category
//! (`"states"`, `"held_item"`, ...) plus a table of behavior hooks invoked
//! by battle resolution. Hooks are code, never data: they are resolved from
//! the [`EffectRegistry`] when an effect is created (or re-created while
//! loading a save) and are never written to storage.
//!
//! Register behavior once at startup:
//!
//! ```
//! use battle_core::{EffectHooks, EffectRegistry, Effect, EffectContext, EffectOutcome,
//!     DamageData, prevent_effect};
//! use std::sync::Arc;
//!
//! struct Immunity;
//!
//! impl EffectHooks for Immunity {
//!     fn on_damage_computation(
//!         &self,
//!         _effect: &Effect,
//!         context: &mut EffectContext<'_, DamageData>,
//!     ) -> EffectOutcome {
//!         prevent_effect(context, None)
//!     }
//! }
//!
//! let mut registry = EffectRegistry::new();
//! registry.register("states", "immunity", Arc::new(Immunity));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::creature::CreatureHandle;
use crate::element::Element;
use crate::item::Item;
use crate::mutation::SceneReaction;
use crate::payload::Payload;
use crate::skill::Skill;
use crate::state::State;

/// An effect instance attached to a creature.
pub struct Effect {
    /// Effect type name within its category.
    pub kind: String,
    /// Consumer-defined payload (often a back-reference to the owner).
    pub data: Payload,
    hooks: Arc<dyn EffectHooks>,
}

impl Effect {
    pub(crate) fn new(kind: String, data: Payload, hooks: Arc<dyn EffectHooks>) -> Self {
        Self { kind, data, hooks }
    }

    /// The behavior table resolved for this effect.
    pub fn hooks(&self) -> &Arc<dyn EffectHooks> {
        &self.hooks
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("kind", &self.kind)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Return value of preventable hooks.
///
/// `Passthrough` lets the effect execute regardless of prevention; `Prevent`
/// stops it; `Continue` defers to the remaining hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EffectOutcome {
    #[default]
    Continue,
    Passthrough,
    Prevent,
}

/// Data handed to a hook invocation.
pub struct EffectContext<'a, T> {
    /// Creature the effect is resolving against.
    pub target: &'a CreatureHandle,
    /// Creature that triggered the resolution, when there is one.
    pub user: Option<&'a CreatureHandle>,
    /// Skill being resolved, when there is one.
    pub skill: Option<&'a Skill>,
    /// Hook-specific data, mutable so hooks can adjust it.
    pub data: T,
    /// Reason set by a preventing hook, to be queued by the scene.
    pub cancellation_reason: Option<SceneReaction>,
}

impl<'a, T> EffectContext<'a, T> {
    pub fn new(target: &'a CreatureHandle, data: T) -> Self {
        Self {
            target,
            user: None,
            skill: None,
            data,
            cancellation_reason: None,
        }
    }

    pub fn with_user(mut self, user: &'a CreatureHandle) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_skill(mut self, skill: &'a Skill) -> Self {
        self.skill = Some(skill);
        self
    }
}

/// Records the prevention reason on the context and returns
/// [`EffectOutcome::Prevent`].
pub fn prevent_effect<T>(
    context: &mut EffectContext<'_, T>,
    reason: Option<SceneReaction>,
) -> EffectOutcome {
    context.cancellation_reason = reason;
    EffectOutcome::Prevent
}

/// Stat being read and the modifier accumulated so far.
pub struct StatModifierData {
    pub stat: String,
    pub modifier: i32,
}

/// Hit points about to be removed (or just removed).
pub struct DamageData {
    pub hp: i32,
}

/// State involved in an application attempt.
pub struct StateData {
    pub state: Rc<State>,
}

/// Element set under construction.
pub struct ElementsData {
    pub elements: Vec<Element>,
}

/// Item being held or dropped.
pub struct ItemData {
    pub item: Rc<Item>,
}

/// End-of-turn bookkeeping.
pub struct TurnEndData {
    pub turn_number: u32,
}

/// Behavior table of an effect.
///
/// Every hook has a void default, so implementors only write the hooks
/// their effect reacts to.
pub trait EffectHooks {
    fn on_get_stat_modifier(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, StatModifierData>,
    ) {
    }

    fn on_damage_computation(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, DamageData>,
    ) -> EffectOutcome {
        EffectOutcome::Continue
    }

    fn on_after_damage_applied(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, DamageData>,
    ) -> Option<SceneReaction> {
        None
    }

    fn on_can_apply_state(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, StateData>,
    ) -> EffectOutcome {
        EffectOutcome::Continue
    }

    fn on_state_applied(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, StateData>,
    ) -> Option<SceneReaction> {
        None
    }

    fn on_can_use_skill(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, ()>,
    ) -> EffectOutcome {
        EffectOutcome::Continue
    }

    fn on_get_skill_elements(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, ElementsData>,
    ) {
    }

    fn on_get_creature_elements(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, ElementsData>,
    ) {
    }

    fn on_item_held(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, ItemData>,
    ) -> Option<SceneReaction> {
        None
    }

    fn on_item_dropped(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, ItemData>,
    ) -> Option<SceneReaction> {
        None
    }

    fn on_turn_end(
        &self,
        _effect: &Effect,
        _context: &mut EffectContext<'_, TurnEndData>,
    ) -> Option<SceneReaction> {
        None
    }

    /// Whether this effect is finished and should be removed.
    fn on_cleanup(&self, _effect: &Effect, _in_battle: bool) -> bool {
        false
    }
}

/// Hook table with every hook left at its default.
pub struct VoidHooks;

impl EffectHooks for VoidHooks {}

/// Maps `(category, kind)` to the behavior table effects of that kind get.
///
/// Configured once at startup, then passed by reference wherever effects are
/// created. Unknown categories or kinds fall back to a shared void table.
pub struct EffectRegistry {
    hooks: HashMap<String, HashMap<String, Arc<dyn EffectHooks>>>,
    void: Arc<dyn EffectHooks>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
            void: Arc::new(VoidHooks),
        }
    }

    /// Registers the behavior table for a category and kind.
    pub fn register(
        &mut self,
        category: impl Into<String>,
        kind: impl Into<String>,
        hooks: Arc<dyn EffectHooks>,
    ) {
        self.hooks
            .entry(category.into())
            .or_default()
            .insert(kind.into(), hooks);
    }

    /// Tests whether a behavior table exists for a category and kind.
    pub fn exists(&self, category: &str, kind: &str) -> bool {
        self.hooks
            .get(category)
            .is_some_and(|kinds| kinds.contains_key(kind))
    }

    /// Creates an effect with the behavior table registered for its kind,
    /// falling back to void hooks.
    pub fn create_effect(&self, category: &str, kind: impl Into<String>, data: Payload) -> Effect {
        let kind = kind.into();
        let hooks = self
            .hooks
            .get(category)
            .and_then(|kinds| kinds.get(&kind))
            .cloned()
            .unwrap_or_else(|| self.void.clone());
        Effect::new(kind, data, hooks)
    }

    /// The shared fallback table, exposed so callers can tell whether an
    /// effect resolved to real behavior.
    pub fn void_hooks(&self) -> &Arc<dyn EffectHooks> {
        &self.void
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops every finished effect from the creature, across all categories.
///
/// The creature is not borrowed while the hooks run, so `on_cleanup`
/// implementations are free to inspect it (most state-driven effects check
/// whether their state is still present).
pub fn cleanup_effects(creature: &CreatureHandle, in_battle: bool) {
    let mut effects = std::mem::take(&mut creature.borrow_mut().effects);
    for list in effects.values_mut() {
        list.retain(|effect| !effect.hooks().on_cleanup(effect, in_battle));
    }
    creature.borrow_mut().effects = effects;
}
