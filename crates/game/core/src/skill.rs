//! Creature skills.

use crate::creature::Creature;
use crate::payload::Payload;

/// A skill known by a creature.
#[derive(Debug, Default)]
pub struct Skill {
    /// Skill definition id.
    pub id: String,
    pub data: Payload,
}

impl Skill {
    pub fn new(id: impl Into<String>, data: Payload) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Tests whether the creature knows a skill with this id.
pub fn has_skill(creature: &Creature, id: &str) -> bool {
    creature.skills.iter().any(|skill| skill.id == id)
}

/// Returns the creature's skill with this id, if any.
pub fn get_skill<'a>(creature: &'a Creature, id: &str) -> Option<&'a Skill> {
    creature.skills.iter().find(|skill| skill.id == id)
}

/// Teaches the creature a skill.
///
/// Does nothing when a skill with the same id is already known.
pub fn add_skill(creature: &mut Creature, skill: Skill) {
    if has_skill(creature, &skill.id) {
        return;
    }
    creature.skills.push(skill);
}

/// Removes every skill with this id from the creature.
pub fn remove_skill(creature: &mut Creature, id: &str) {
    creature.skills.retain(|skill| skill.id != id);
}
