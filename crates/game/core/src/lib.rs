//! Core entity model and save subsystem for the battle framework.
//!
//! `battle-core` defines the data entities (creatures, effects, states,
//! skills, items, elements) and the mechanism that lets any of them safely
//! persist mutually-referencing data: the cyclic save subsystem under
//! [`save`]. Behavior is pluggable: hook tables, save codecs, item
//! handlers, and the stat formula are all configured on a [`Registry`]
//! passed into the generic entry points.
pub mod codec;
pub mod config;
pub mod creature;
pub mod effect;
pub mod element;
pub mod item;
pub mod mutation;
pub mod payload;
pub mod registry;
pub mod save;
pub mod skill;
pub mod state;

pub use codec::CodecRegistry;
pub use config::GameConfig;
pub use creature::{
    Creature, CreatureHandle, CreatureRef, compute_stat, deserialize_creature, load_roster,
    save_roster, serialize_creature,
};
pub use effect::{
    DamageData, Effect, EffectContext, EffectHooks, EffectOutcome, EffectRegistry, ElementsData,
    ItemData, StatModifierData, StateData, TurnEndData, VoidHooks, cleanup_effects, prevent_effect,
};
pub use element::{
    Element, combined_strength_factor, combined_strength_factor_by_ids, element_strength_factor,
};
pub use item::{Item, ItemActable, ItemAction, ItemRegistry};
pub use mutation::{MutationQueue, SceneReaction};
pub use payload::Payload;
pub use registry::{Registry, StatFormula};
pub use save::{
    CyclicDeserializationContext, CyclicSerializationContext, PendingRecord, ReferenceId,
    ReferenceIdentity, ReferencingArray, SaveEnvelope, SaveError, SaveValue, SharedNode, ValueKind,
    shared_node,
};
pub use skill::{Skill, add_skill, get_skill, has_skill, remove_skill};
pub use state::{
    STATE_EFFECT_CATEGORY, State, StateAnchor, add_state, get_state, has_state, remove_state,
};
