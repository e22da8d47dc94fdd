//! Creature states (conditions like sleep, burn, immunity).
//!
//! A state is pure data; its behavior, when it has any, lives in an effect
//! registered under the `"states"` category. [`add_state`] attaches that
//! effect automatically, carrying a [`StateAnchor`] payload so hook code can
//! reach back to the owning creature and the state itself.

use std::rc::Rc;

use crate::creature::{Creature, CreatureHandle, CreatureRef};
use crate::payload::Payload;
use crate::registry::Registry;

/// Category under which state-driven effects are registered.
pub const STATE_EFFECT_CATEGORY: &str = "states";

/// A condition applied to a creature.
#[derive(Debug, Default)]
pub struct State {
    /// State type name (`"sleep"`, `"burn"`, ...).
    pub kind: String,
    pub data: Payload,
}

impl State {
    pub fn new(kind: impl Into<String>, data: Payload) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Payload of the effect auto-attached with a state: the owning creature
/// (weak, to not keep the creature alive from inside itself) and the state.
pub struct StateAnchor {
    pub creature: CreatureRef,
    pub state: Rc<State>,
}

/// Tests whether the creature carries a state of this kind.
pub fn has_state(creature: &Creature, kind: &str) -> bool {
    creature.states.iter().any(|state| state.kind == kind)
}

/// Returns the creature's state of this kind, if any.
pub fn get_state(creature: &Creature, kind: &str) -> Option<Rc<State>> {
    creature
        .states
        .iter()
        .find(|state| state.kind == kind)
        .cloned()
}

/// Removes every state of this kind from the creature.
///
/// The companion effect, if one was attached, is not removed here: its
/// `on_cleanup` hook notices the missing state at the next cleanup pass.
pub fn remove_state(creature: &mut Creature, kind: &str) {
    creature.states.retain(|state| state.kind != kind);
}

/// Adds a state to the creature, attaching its companion effect when one is
/// registered for the kind.
///
/// Does nothing when a state of the same kind is already present.
pub fn add_state(creature: &CreatureHandle, state: State, registry: &Registry) {
    if has_state(&creature.borrow(), &state.kind) {
        return;
    }

    let state = Rc::new(state);
    let kind = state.kind.clone();
    creature.borrow_mut().states.push(state.clone());

    if registry.effects().exists(STATE_EFFECT_CATEGORY, &kind) {
        let anchor = StateAnchor {
            creature: Rc::downgrade(creature),
            state,
        };
        let effect =
            registry
                .effects()
                .create_effect(STATE_EFFECT_CATEGORY, kind, Payload::opaque(anchor));
        creature
            .borrow_mut()
            .effects
            .entry(STATE_EFFECT_CATEGORY.to_string())
            .or_default()
            .push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Effect, EffectHooks, VoidHooks};
    use crate::save::shared_node;
    use std::sync::Arc;

    fn creature_handle() -> CreatureHandle {
        shared_node(Creature::new("creature", "form"))
    }

    #[test]
    fn remove_state_tolerates_absent_kinds() {
        let mut creature = Creature::new("creature", "form");
        remove_state(&mut creature, "test");
        assert!(creature.states.is_empty());
    }

    #[test]
    fn remove_state_drops_only_the_named_kind() {
        let mut creature = Creature::new("creature", "form");
        creature.states.push(Rc::new(State::new("test", Payload::Empty)));
        creature.states.push(Rc::new(State::new("test2", Payload::Empty)));

        remove_state(&mut creature, "test");
        assert_eq!(creature.states.len(), 1);
        assert_eq!(creature.states[0].kind, "test2");
    }

    #[test]
    fn has_and_get_find_states_by_kind() {
        let mut creature = Creature::new("creature", "form");
        assert!(!has_state(&creature, "test"));
        assert!(get_state(&creature, "test").is_none());

        let state = Rc::new(State::new("test", Payload::Empty));
        creature.states.push(state.clone());
        assert!(has_state(&creature, "test"));
        assert!(Rc::ptr_eq(&get_state(&creature, "test").unwrap(), &state));
    }

    #[test]
    fn add_state_is_idempotent_per_kind() {
        let creature = creature_handle();
        let registry = Registry::new();

        add_state(&creature, State::new("test", Payload::value(crate::save::SaveValue::int(0))), &registry);
        add_state(&creature, State::new("test", Payload::value(crate::save::SaveValue::int(1))), &registry);

        let creature = creature.borrow();
        assert_eq!(creature.states.len(), 1);
        assert_eq!(creature.states[0].data.as_value().unwrap().as_i64(), Some(0));
        assert!(creature.effects.is_empty());
    }

    struct Marker;

    impl EffectHooks for Marker {
        fn on_cleanup(&self, effect: &Effect, _in_battle: bool) -> bool {
            // Finished once the anchored state is gone from its creature.
            let Some(anchor) = effect.data.downcast_ref::<StateAnchor>() else {
                return true;
            };
            match anchor.creature.upgrade() {
                Some(creature) => !has_state(&creature.borrow(), &anchor.state.kind),
                None => true,
            }
        }
    }

    #[test]
    fn add_state_attaches_the_registered_effect_with_an_anchor() {
        let creature = creature_handle();
        let mut registry = Registry::new();
        registry
            .effects_mut()
            .register(STATE_EFFECT_CATEGORY, "marked", Arc::new(Marker));
        // Unrelated kinds do not get an effect.
        registry
            .effects_mut()
            .register(STATE_EFFECT_CATEGORY, "other", Arc::new(VoidHooks));

        add_state(&creature, State::new("marked", Payload::Empty), &registry);
        add_state(&creature, State::new("plain", Payload::Empty), &registry);

        {
            let borrowed = creature.borrow();
            assert_eq!(borrowed.states.len(), 2);
            let effects = &borrowed.effects[STATE_EFFECT_CATEGORY];
            assert_eq!(effects.len(), 1);
            assert_eq!(effects[0].kind, "marked");

            let anchor = effects[0].data.downcast_ref::<StateAnchor>().unwrap();
            assert!(Rc::ptr_eq(&anchor.creature.upgrade().unwrap(), &creature));
            assert!(Rc::ptr_eq(&anchor.state, &borrowed.states[0]));
            // Effect considers itself alive while the state remains.
            assert!(!effects[0].hooks().on_cleanup(&effects[0], true));
        }

        // Once the state is removed, the next cleanup pass drops the effect.
        // The hook inspects the creature while cleanup runs.
        remove_state(&mut creature.borrow_mut(), "marked");
        crate::effect::cleanup_effects(&creature, true);
        assert!(creature.borrow().effects[STATE_EFFECT_CATEGORY].is_empty());
    }
}
