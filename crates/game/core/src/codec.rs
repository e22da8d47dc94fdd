//! Pluggable per-entity save codecs.
//!
//! The save subsystem never inspects entity payloads itself: consumers
//! register how each entity kind's data is encoded and decoded, and the
//! creature serializer maps every element through the registered function.
//! Serializers receive the active [`ReferencingArray`] and deserializers the
//! active [`CyclicDeserializationContext`], so nested entity data can
//! participate in reference resolution (a state payload can be "the owning
//! creature", stored as a reference id).
//!
//! Every slot defaults to identity passthrough over [`Payload::Value`]
//! data. Opaque payloads have no passthrough; saving one without a codec is
//! [`SaveError::MissingCodec`].

use std::collections::HashMap;
use std::rc::Rc;

use crate::creature::{Creature, CreatureHandle};
use crate::effect::{Effect, EffectRegistry};
use crate::payload::Payload;
use crate::save::{CyclicDeserializationContext, ReferencingArray, SaveError, SaveValue};
use crate::skill::Skill;
use crate::state::State;

pub type CreatureDataSerializeFn =
    Box<dyn Fn(&Creature, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>>;
pub type StateDataSerializeFn =
    Box<dyn Fn(&State, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>>;
pub type SkillDataSerializeFn =
    Box<dyn Fn(&Skill, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>>;
pub type EffectSerializeFn =
    Box<dyn Fn(&Effect, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>>;

/// Decodes a serialized data value back into a payload.
pub type DataDeserializeFn = Box<
    dyn Fn(&Rc<SaveValue>, &CyclicDeserializationContext<Creature>) -> Result<Payload, SaveError>,
>;

/// Decodes a serialized effect record back into its kind and payload.
pub type EffectDeserializeFn = Box<
    dyn Fn(
        &Rc<SaveValue>,
        &CyclicDeserializationContext<Creature>,
    ) -> Result<(String, Payload), SaveError>,
>;

fn serialize_payload_passthrough(
    payload: &Payload,
    category: &str,
    kind: &str,
) -> Result<Rc<SaveValue>, SaveError> {
    match payload {
        Payload::Empty => Ok(SaveValue::null()),
        Payload::Value(value) => Ok(value.clone()),
        Payload::Opaque(_) => Err(SaveError::MissingCodec {
            category: category.to_string(),
            kind: kind.to_string(),
        }),
    }
}

fn deserialize_payload_passthrough(value: &Rc<SaveValue>) -> Payload {
    if value.is_null() {
        Payload::Empty
    } else {
        Payload::Value(value.clone())
    }
}

/// Registry of entity save codecs: one pluggable serializer/deserializer
/// pair per entity kind, plus per-`(category, kind)` effect codecs.
#[derive(Default)]
pub struct CodecRegistry {
    creature_data_serialize: Option<CreatureDataSerializeFn>,
    creature_data_deserialize: Option<DataDeserializeFn>,
    state_data_serialize: Option<StateDataSerializeFn>,
    state_data_deserialize: Option<DataDeserializeFn>,
    skill_data_serialize: Option<SkillDataSerializeFn>,
    skill_data_deserialize: Option<DataDeserializeFn>,
    effect_serialize: HashMap<String, HashMap<String, EffectSerializeFn>>,
    effect_deserialize: HashMap<String, HashMap<String, EffectDeserializeFn>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn register_serialize_creature_data(
        &mut self,
        serializer: impl Fn(&Creature, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>
        + 'static,
    ) {
        self.creature_data_serialize = Some(Box::new(serializer));
    }

    pub fn register_deserialize_creature_data(
        &mut self,
        deserializer: impl Fn(&Rc<SaveValue>, &CyclicDeserializationContext<Creature>) -> Result<Payload, SaveError>
        + 'static,
    ) {
        self.creature_data_deserialize = Some(Box::new(deserializer));
    }

    pub fn register_serialize_state_data(
        &mut self,
        serializer: impl Fn(&State, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>
        + 'static,
    ) {
        self.state_data_serialize = Some(Box::new(serializer));
    }

    pub fn register_deserialize_state_data(
        &mut self,
        deserializer: impl Fn(&Rc<SaveValue>, &CyclicDeserializationContext<Creature>) -> Result<Payload, SaveError>
        + 'static,
    ) {
        self.state_data_deserialize = Some(Box::new(deserializer));
    }

    pub fn register_serialize_skill_data(
        &mut self,
        serializer: impl Fn(&Skill, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>
        + 'static,
    ) {
        self.skill_data_serialize = Some(Box::new(serializer));
    }

    pub fn register_deserialize_skill_data(
        &mut self,
        deserializer: impl Fn(&Rc<SaveValue>, &CyclicDeserializationContext<Creature>) -> Result<Payload, SaveError>
        + 'static,
    ) {
        self.skill_data_deserialize = Some(Box::new(deserializer));
    }

    pub fn register_serialize_effect(
        &mut self,
        category: impl Into<String>,
        kind: impl Into<String>,
        serializer: impl Fn(&Effect, &mut ReferencingArray<CreatureHandle>) -> Result<Rc<SaveValue>, SaveError>
        + 'static,
    ) {
        self.effect_serialize
            .entry(category.into())
            .or_default()
            .insert(kind.into(), Box::new(serializer));
    }

    pub fn register_deserialize_effect(
        &mut self,
        category: impl Into<String>,
        kind: impl Into<String>,
        deserializer: impl Fn(
            &Rc<SaveValue>,
            &CyclicDeserializationContext<Creature>,
        ) -> Result<(String, Payload), SaveError>
        + 'static,
    ) {
        self.effect_deserialize
            .entry(category.into())
            .or_default()
            .insert(kind.into(), Box::new(deserializer));
    }

    // ------------------------------------------------------------------
    // Invocation (registered codec, else passthrough)
    // ------------------------------------------------------------------

    pub fn serialize_creature_data(
        &self,
        creature: &Creature,
        refs: &mut ReferencingArray<CreatureHandle>,
    ) -> Result<Rc<SaveValue>, SaveError> {
        match &self.creature_data_serialize {
            Some(serializer) => serializer(creature, refs),
            None => serialize_payload_passthrough(&creature.data, "creature", &creature.id),
        }
    }

    pub fn deserialize_creature_data(
        &self,
        value: &Rc<SaveValue>,
        context: &CyclicDeserializationContext<Creature>,
    ) -> Result<Payload, SaveError> {
        match &self.creature_data_deserialize {
            Some(deserializer) => deserializer(value, context),
            None => Ok(deserialize_payload_passthrough(value)),
        }
    }

    pub fn serialize_state_data(
        &self,
        state: &State,
        refs: &mut ReferencingArray<CreatureHandle>,
    ) -> Result<Rc<SaveValue>, SaveError> {
        match &self.state_data_serialize {
            Some(serializer) => serializer(state, refs),
            None => serialize_payload_passthrough(&state.data, "state", &state.kind),
        }
    }

    pub fn deserialize_state_data(
        &self,
        value: &Rc<SaveValue>,
        context: &CyclicDeserializationContext<Creature>,
    ) -> Result<Payload, SaveError> {
        match &self.state_data_deserialize {
            Some(deserializer) => deserializer(value, context),
            None => Ok(deserialize_payload_passthrough(value)),
        }
    }

    pub fn serialize_skill_data(
        &self,
        skill: &Skill,
        refs: &mut ReferencingArray<CreatureHandle>,
    ) -> Result<Rc<SaveValue>, SaveError> {
        match &self.skill_data_serialize {
            Some(serializer) => serializer(skill, refs),
            None => serialize_payload_passthrough(&skill.data, "skill", &skill.id),
        }
    }

    pub fn deserialize_skill_data(
        &self,
        value: &Rc<SaveValue>,
        context: &CyclicDeserializationContext<Creature>,
    ) -> Result<Payload, SaveError> {
        match &self.skill_data_deserialize {
            Some(deserializer) => deserializer(value, context),
            None => Ok(deserialize_payload_passthrough(value)),
        }
    }

    /// Serializes one effect of a category, dropping its hook table.
    pub fn serialize_effect(
        &self,
        category: &str,
        effect: &Effect,
        refs: &mut ReferencingArray<CreatureHandle>,
    ) -> Result<Rc<SaveValue>, SaveError> {
        if let Some(serializer) = self
            .effect_serialize
            .get(category)
            .and_then(|kinds| kinds.get(&effect.kind))
        {
            return serializer(effect, refs);
        }

        Ok(SaveValue::object([
            ("type", SaveValue::str(&effect.kind)),
            (
                "data",
                serialize_payload_passthrough(&effect.data, category, &effect.kind)?,
            ),
        ]))
    }

    /// Decodes one effect record of a category, re-attaching the behavior
    /// table registered for its kind.
    pub fn deserialize_effect(
        &self,
        category: &str,
        record: &Rc<SaveValue>,
        context: &CyclicDeserializationContext<Creature>,
        effects: &EffectRegistry,
    ) -> Result<Effect, SaveError> {
        let kind = record.field("type")?.expect_str()?;

        let (kind, payload) = match self
            .effect_deserialize
            .get(category)
            .and_then(|kinds| kinds.get(kind))
        {
            Some(deserializer) => deserializer(record, context)?,
            None => {
                let payload = match record.get("data") {
                    Some(value) => deserialize_payload_passthrough(value),
                    None => Payload::Empty,
                };
                (kind.to_string(), payload)
            }
        };

        Ok(effects.create_effect(category, kind, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn passthrough_serializes_value_payloads_unchanged() {
        let codecs = CodecRegistry::new();
        let mut refs = ReferencingArray::new();

        let data = SaveValue::object([("counter", SaveValue::int(3))]);
        let state = State::new("burn", Payload::value(data.clone()));
        let out = codecs.serialize_state_data(&state, &mut refs).unwrap();
        assert!(Rc::ptr_eq(&out, &data));

        let empty = Skill::new("gust", Payload::Empty);
        let out = codecs.serialize_skill_data(&empty, &mut refs).unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn passthrough_refuses_opaque_payloads() {
        let codecs = CodecRegistry::new();
        let mut refs = ReferencingArray::new();

        let state = State::new("burn", Payload::opaque(5u8));
        let err = codecs.serialize_state_data(&state, &mut refs).unwrap_err();
        match err {
            SaveError::MissingCodec { category, kind } => {
                assert_eq!(category, "state");
                assert_eq!(kind, "burn");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn registered_data_codecs_replace_the_passthrough() {
        let mut codecs = CodecRegistry::new();
        codecs.register_serialize_state_data(|state, _| {
            Ok(SaveValue::int(-state.data.as_value().unwrap().as_i64().unwrap()))
        });
        codecs.register_deserialize_state_data(|value, _| {
            Ok(Payload::value(SaveValue::int(-value.expect_i64()?)))
        });

        let mut refs = ReferencingArray::new();
        let state = State::new("burn", Payload::value(SaveValue::int(7)));
        let out = codecs.serialize_state_data(&state, &mut refs).unwrap();
        assert_eq!(out.as_i64(), Some(-7));

        let envelope = crate::save::SaveEnvelope {
            serialized_object: SaveValue::int(0),
            referencing_array: Vec::new(),
        };
        let context = CyclicDeserializationContext::new(&envelope);
        let payload = codecs.deserialize_state_data(&out, &context).unwrap();
        assert_eq!(payload.as_value().unwrap().as_i64(), Some(7));
    }

    #[test]
    fn effect_passthrough_writes_type_and_data() {
        let codecs = CodecRegistry::new();
        let effects = EffectRegistry::new();
        let mut refs = ReferencingArray::new();

        let effect = effects.create_effect(
            "held_item",
            "berry",
            Payload::value(SaveValue::int(2)),
        );
        let record = codecs
            .serialize_effect("held_item", &effect, &mut refs)
            .unwrap();
        assert_eq!(record.field("type").unwrap().as_str(), Some("berry"));
        assert_eq!(record.field("data").unwrap().as_i64(), Some(2));
    }

    #[test]
    fn effect_decode_reattaches_registered_hooks() {
        struct Sticky;
        impl crate::effect::EffectHooks for Sticky {}

        let codecs = CodecRegistry::new();
        let mut effects = EffectRegistry::new();
        effects.register("held_item", "berry", Arc::new(Sticky));

        let record = SaveValue::object([
            ("type", SaveValue::str("berry")),
            ("data", SaveValue::int(2)),
        ]);
        let envelope = crate::save::SaveEnvelope {
            serialized_object: SaveValue::int(0),
            referencing_array: Vec::new(),
        };
        let context = CyclicDeserializationContext::new(&envelope);

        let effect = codecs
            .deserialize_effect("held_item", &record, &context, &effects)
            .unwrap();
        assert_eq!(effect.kind, "berry");
        assert_eq!(effect.data.as_value().unwrap().as_i64(), Some(2));
        assert!(!Arc::ptr_eq(effect.hooks(), effects.void_hooks()));
    }
}
