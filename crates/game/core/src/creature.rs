//! Creatures and roster persistence.
//!
//! A creature owns its states, skills, and effects; effects routinely hold
//! back-references to the creature that carries them, which is why rosters
//! persist through the cyclic save pass: [`save_roster`] interns every
//! creature into the referencing array and [`load_roster`] rebuilds the
//! exact reference topology, shared handles included.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::codec::CodecRegistry;
use crate::config::GameConfig;
use crate::effect::Effect;
use crate::payload::Payload;
use crate::registry::Registry;
use crate::save::{
    CyclicDeserializationContext, CyclicSerializationContext, ReferencingArray, SaveEnvelope,
    SaveError, SaveValue, SharedNode,
};
use crate::skill::Skill;
use crate::state::State;

/// Shared handle to a creature; identity-bearing, used as the unit of
/// reference in save passes.
pub type CreatureHandle = SharedNode<Creature>;

/// Weak back-reference to a creature, used inside payloads so a creature
/// does not keep itself alive through its own effects.
pub type CreatureRef = Weak<RefCell<Creature>>;

/// A battling creature.
#[derive(Debug, Default)]
pub struct Creature {
    /// Definition id in the creature collection.
    pub id: String,
    /// Current form (species variant) id.
    pub form: String,
    pub hp: i32,
    pub level: u32,
    pub exp: u32,
    pub states: Vec<Rc<State>>,
    pub skills: Vec<Skill>,
    /// Active effects grouped by category (`"states"`, `"held_item"`, ...).
    pub effects: BTreeMap<String, Vec<Effect>>,
    /// Consumer-defined extension data.
    pub data: Payload,
}

impl Creature {
    pub fn new(id: impl Into<String>, form: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            form: form.into(),
            ..Self::default()
        }
    }
}

/// Computes a named stat through the registered formula.
///
/// Returns [`GameConfig::DEFAULT_STAT`] when no formula has been registered.
pub fn compute_stat(creature: &Creature, stat: &str, registry: &Registry) -> i32 {
    match registry.stat_formula() {
        Some(formula) => formula(creature, stat),
        None => GameConfig::DEFAULT_STAT,
    }
}

fn expect_i32(value: &SaveValue) -> Result<i32, SaveError> {
    i32::try_from(value.expect_i64()?).map_err(|_| SaveError::TypeMismatch {
        expected: "int in i32 range",
        found: value.kind(),
    })
}

fn expect_u32(value: &SaveValue) -> Result<u32, SaveError> {
    u32::try_from(value.expect_i64()?).map_err(|_| SaveError::TypeMismatch {
        expected: "non-negative int",
        found: value.kind(),
    })
}

/// Serializes one creature into a save record.
///
/// States, skills, effects, and the extension data all go through their
/// registered codecs (passthrough by default). Effect hook tables are
/// dropped: behavior is code and is re-attached on load.
///
/// This has exactly the serializer shape expected by
/// [`CyclicSerializationContext::cyclic_serialize`], so roster saves pass it
/// straight through.
pub fn serialize_creature(
    creature: &Creature,
    refs: &mut ReferencingArray<CreatureHandle>,
    codecs: &CodecRegistry,
) -> Result<Rc<SaveValue>, SaveError> {
    let states = creature
        .states
        .iter()
        .map(|state| {
            Ok(SaveValue::object([
                ("type", SaveValue::str(&state.kind)),
                ("data", codecs.serialize_state_data(state, refs)?),
            ]))
        })
        .collect::<Result<Vec<_>, SaveError>>()?;

    let skills = creature
        .skills
        .iter()
        .map(|skill| {
            Ok(SaveValue::object([
                ("id", SaveValue::str(&skill.id)),
                ("data", codecs.serialize_skill_data(skill, refs)?),
            ]))
        })
        .collect::<Result<Vec<_>, SaveError>>()?;

    let mut effects = BTreeMap::new();
    for (category, list) in &creature.effects {
        let records = list
            .iter()
            .map(|effect| codecs.serialize_effect(category, effect, refs))
            .collect::<Result<Vec<_>, SaveError>>()?;
        effects.insert(category.clone(), SaveValue::array(records));
    }

    Ok(SaveValue::object([
        ("id", SaveValue::str(&creature.id)),
        ("form", SaveValue::str(&creature.form)),
        ("hp", SaveValue::int(i64::from(creature.hp))),
        ("level", SaveValue::int(i64::from(creature.level))),
        ("exp", SaveValue::int(i64::from(creature.exp))),
        ("states", SaveValue::array(states)),
        ("skills", SaveValue::array(skills)),
        ("effects", Rc::new(SaveValue::Object(effects))),
        ("data", codecs.serialize_creature_data(creature, refs)?),
    ]))
}

/// Decodes one creature save record.
///
/// The inverse of [`serialize_creature`]; effect behavior tables are
/// resolved from the effect registry, never from the save data.
pub fn deserialize_creature(
    record: &SaveValue,
    context: &CyclicDeserializationContext<Creature>,
    registry: &Registry,
) -> Result<Creature, SaveError> {
    let codecs = registry.codecs();

    let mut states = Vec::new();
    for state_record in record.field("states")?.expect_array()? {
        let kind = state_record.field("type")?.expect_str()?.to_string();
        let data = codecs.deserialize_state_data(state_record.field("data")?, context)?;
        states.push(Rc::new(State::new(kind, data)));
    }

    let mut skills = Vec::new();
    for skill_record in record.field("skills")?.expect_array()? {
        let id = skill_record.field("id")?.expect_str()?.to_string();
        let data = codecs.deserialize_skill_data(skill_record.field("data")?, context)?;
        skills.push(Skill::new(id, data));
    }

    let mut effects = BTreeMap::new();
    for (category, records) in record.field("effects")?.expect_object()? {
        let list = records
            .expect_array()?
            .iter()
            .map(|effect_record| {
                codecs.deserialize_effect(category, effect_record, context, registry.effects())
            })
            .collect::<Result<Vec<_>, SaveError>>()?;
        effects.insert(category.clone(), list);
    }

    Ok(Creature {
        id: record.field("id")?.expect_str()?.to_string(),
        form: record.field("form")?.expect_str()?.to_string(),
        hp: expect_i32(record.field("hp")?)?,
        level: expect_u32(record.field("level")?)?,
        exp: expect_u32(record.field("exp")?)?,
        states,
        skills,
        effects,
        data: codecs.deserialize_creature_data(record.field("data")?, context)?,
    })
}

/// Serializes a whole roster into one envelope.
///
/// The envelope root is the array of roster reference ids, in roster order.
pub fn save_roster(
    roster: &[CreatureHandle],
    registry: &Registry,
) -> Result<SaveEnvelope, SaveError> {
    let mut context = CyclicSerializationContext::new();
    let mut ids = Vec::with_capacity(roster.len());
    for creature in roster {
        let pending = context.cyclic_serialize(creature, |creature, refs| {
            serialize_creature(creature, refs, registry.codecs())
        })?;
        ids.push(SaveValue::reference(pending.reference_id));
    }
    context.finalize(SaveValue::array(ids))
}

/// Rebuilds a roster from an envelope, preserving reference identity:
/// every back-reference decoded along the way resolves to the same handles
/// returned here.
pub fn load_roster(
    envelope: &SaveEnvelope,
    registry: &Registry,
) -> Result<Vec<CreatureHandle>, SaveError> {
    let context = CyclicDeserializationContext::new(envelope);
    let mut roster = Vec::new();
    for value in envelope.serialized_object.expect_array()? {
        let record = context.serialized_record(value.as_reference_id()?)?;
        roster.push(context.cyclic_deserialize(&record, |record, context| {
            deserialize_creature(record, context, registry)
        })?);
    }
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_creature() -> Creature {
        let mut creature = Creature::new("id", "form");
        creature.hp = 33;
        creature.level = 5;
        creature.exp = 336;
        creature.data = Payload::value(SaveValue::int(88989));
        creature
    }

    #[test]
    fn compute_stat_defaults_to_one() {
        let registry = Registry::new();
        let creature = sample_creature();
        assert_eq!(compute_stat(&creature, "attack", &registry), 1);
    }

    #[test]
    fn compute_stat_uses_the_registered_formula() {
        let mut registry = Registry::new();
        registry.register_stat_formula(|creature, stat| {
            creature.hp + stat.len() as i32
        });
        let creature = sample_creature();
        assert_eq!(compute_stat(&creature, "spd", &registry), 36);
    }

    #[test]
    fn serialize_copies_data_when_no_codec_is_registered() {
        let registry = Registry::new();
        let mut refs = ReferencingArray::new();
        let record = serialize_creature(&sample_creature(), &mut refs, registry.codecs()).unwrap();

        assert_eq!(record.field("id").unwrap().as_str(), Some("id"));
        assert_eq!(record.field("form").unwrap().as_str(), Some("form"));
        assert_eq!(record.field("hp").unwrap().as_i64(), Some(33));
        assert_eq!(record.field("level").unwrap().as_i64(), Some(5));
        assert_eq!(record.field("exp").unwrap().as_i64(), Some(336));
        assert_eq!(record.field("data").unwrap().as_i64(), Some(88989));
        assert!(record.field("states").unwrap().expect_array().unwrap().is_empty());
        assert!(record.field("skills").unwrap().expect_array().unwrap().is_empty());
    }

    #[test]
    fn serialize_runs_the_registered_creature_data_codec() {
        let mut registry = Registry::new();
        registry.codecs_mut().register_serialize_creature_data(|creature, _| {
            Ok(SaveValue::int(
                -creature.data.as_value().unwrap().as_i64().unwrap(),
            ))
        });

        let mut refs = ReferencingArray::new();
        let record = serialize_creature(&sample_creature(), &mut refs, registry.codecs()).unwrap();
        assert_eq!(record.field("data").unwrap().as_i64(), Some(-88989));
    }

    #[test]
    fn serialize_maps_sub_entities_through_their_codecs() {
        let mut registry = Registry::new();
        registry
            .codecs_mut()
            .register_serialize_state_data(|state, _| {
                Ok(SaveValue::int(state.data.as_value().unwrap().as_i64().unwrap() + 10))
            });
        registry
            .codecs_mut()
            .register_serialize_skill_data(|skill, _| {
                Ok(SaveValue::int(skill.data.as_value().unwrap().as_i64().unwrap() + 20))
            });

        let mut creature = sample_creature();
        creature.states.push(Rc::new(State::new("test", Payload::value(SaveValue::int(0)))));
        creature.states.push(Rc::new(State::new("test2", Payload::value(SaveValue::int(1)))));
        creature.skills.push(Skill::new("gust", Payload::value(SaveValue::int(0))));
        creature.effects.insert(
            "cat".into(),
            vec![registry
                .effects()
                .create_effect("cat", "test", Payload::value(SaveValue::int(0)))],
        );

        let mut refs = ReferencingArray::new();
        let record = serialize_creature(&creature, &mut refs, registry.codecs()).unwrap();

        let states = record.field("states").unwrap().expect_array().unwrap().to_vec();
        assert_eq!(states[0].field("type").unwrap().as_str(), Some("test"));
        assert_eq!(states[0].field("data").unwrap().as_i64(), Some(10));
        assert_eq!(states[1].field("data").unwrap().as_i64(), Some(11));

        let skills = record.field("skills").unwrap().expect_array().unwrap().to_vec();
        assert_eq!(skills[0].field("id").unwrap().as_str(), Some("gust"));
        assert_eq!(skills[0].field("data").unwrap().as_i64(), Some(20));

        // The effect record carries only type and data; hooks never leave
        // the process.
        let effects = record.field("effects").unwrap();
        let cat = effects.get("cat").unwrap().expect_array().unwrap().to_vec();
        assert_eq!(cat[0].expect_object().unwrap().len(), 2);
        assert_eq!(cat[0].field("type").unwrap().as_str(), Some("test"));
        assert_eq!(cat[0].field("data").unwrap().as_i64(), Some(0));
    }

    #[test]
    fn deserialize_rebuilds_the_creature_and_reattaches_hooks() {
        struct Sticky;
        impl crate::effect::EffectHooks for Sticky {
            fn on_cleanup(&self, _effect: &Effect, _in_battle: bool) -> bool {
                true
            }
        }

        let mut registry = Registry::new();
        registry
            .effects_mut()
            .register("cat", "test", std::sync::Arc::new(Sticky));

        let mut creature = sample_creature();
        creature.states.push(Rc::new(State::new("asleep", Payload::value(SaveValue::int(2)))));
        creature.skills.push(Skill::new("gust", Payload::value(SaveValue::int(3))));
        creature.effects.insert(
            "cat".into(),
            vec![registry
                .effects()
                .create_effect("cat", "test", Payload::value(SaveValue::int(4)))],
        );

        let mut refs = ReferencingArray::new();
        let record = serialize_creature(&creature, &mut refs, registry.codecs()).unwrap();

        let envelope = SaveEnvelope {
            serialized_object: SaveValue::int(0),
            referencing_array: Vec::new(),
        };
        let context = CyclicDeserializationContext::new(&envelope);
        let loaded = deserialize_creature(&record, &context, &registry).unwrap();

        assert_eq!(loaded.id, "id");
        assert_eq!(loaded.form, "form");
        assert_eq!(loaded.hp, 33);
        assert_eq!(loaded.level, 5);
        assert_eq!(loaded.exp, 336);
        assert_eq!(loaded.data.as_value().unwrap().as_i64(), Some(88989));
        assert_eq!(loaded.states.len(), 1);
        assert_eq!(loaded.states[0].kind, "asleep");
        assert_eq!(loaded.skills.len(), 1);
        assert_eq!(loaded.skills[0].id, "gust");

        let effect = &loaded.effects["cat"][0];
        assert_eq!(effect.kind, "test");
        // Behavior came back from the registry, not from the record.
        assert!(effect.hooks().on_cleanup(effect, false));
    }

    #[test]
    fn roster_save_produces_one_table_slot_per_creature() {
        let registry = Registry::new();
        let roster: Vec<CreatureHandle> = (0..3)
            .map(|i| {
                crate::save::shared_node(Creature::new(format!("creature-{i}"), "form"))
            })
            .collect();

        let envelope = save_roster(&roster, &registry).unwrap();
        assert_eq!(envelope.referencing_array.len(), 3);
        let root = envelope.serialized_object.expect_array().unwrap();
        let ids: Vec<i64> = root.iter().map(|v| v.as_i64().unwrap()).collect();
        assert_eq!(ids, [0, 1, 2]);
    }
}
