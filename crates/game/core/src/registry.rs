//! Aggregate of every pluggable collaborator.
//!
//! The framework has no hidden process-wide state: behavior tables, save
//! codecs, item handlers, and the stat formula are all owned by a
//! [`Registry`] instance the consumer configures at startup and passes by
//! reference into the generic entry points.

use crate::codec::CodecRegistry;
use crate::creature::Creature;
use crate::effect::EffectRegistry;
use crate::item::ItemRegistry;

/// Computes a named stat for a creature.
pub type StatFormula = Box<dyn Fn(&Creature, &str) -> i32>;

/// Bundle of effect hooks, save codecs, item handlers, and the stat formula.
#[derive(Default)]
pub struct Registry {
    effects: EffectRegistry,
    codecs: CodecRegistry,
    items: ItemRegistry,
    stat_formula: Option<StatFormula>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn codecs_mut(&mut self) -> &mut CodecRegistry {
        &mut self.codecs
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut ItemRegistry {
        &mut self.items
    }

    /// Registers the formula used by `compute_stat`.
    pub fn register_stat_formula(
        &mut self,
        formula: impl Fn(&Creature, &str) -> i32 + 'static,
    ) {
        self.stat_formula = Some(Box::new(formula));
    }

    pub fn stat_formula(&self) -> Option<&StatFormula> {
        self.stat_formula.as_ref()
    }
}
