//! Element type-advantage arithmetic.
//!
//! Every creature and skill carries a set of elements; the damage pipeline
//! multiplies one factor per (offensive element, defensive element) pair.
//! Immunity wins over weakness, which wins over strength.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// An element definition, loaded from content tables.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    /// Element ids this element is weak over.
    #[serde(default)]
    pub weak_over: Vec<String>,
    /// Element ids this element is strong over.
    #[serde(default)]
    pub strong_over: Vec<String>,
    /// Element ids this element has no effect on.
    #[serde(default)]
    pub useless_over: Vec<String>,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Factor of one offensive element against one defensive element id.
pub fn element_strength_factor(offensive: &Element, defensive_id: &str) -> f64 {
    if offensive.useless_over.iter().any(|id| id == defensive_id) {
        return GameConfig::USELESS_FACTOR;
    }
    if offensive.weak_over.iter().any(|id| id == defensive_id) {
        return GameConfig::WEAK_FACTOR;
    }
    if offensive.strong_over.iter().any(|id| id == defensive_id) {
        return GameConfig::STRONG_FACTOR;
    }
    GameConfig::NEUTRAL_FACTOR
}

/// Combined factor of a set of offensive elements against defensive ids:
/// the product over the full offense × defense cross product.
pub fn combined_strength_factor_by_ids(offensives: &[Element], defensive_ids: &[&str]) -> f64 {
    offensives
        .iter()
        .flat_map(|element| {
            defensive_ids
                .iter()
                .map(|id| element_strength_factor(element, id))
        })
        .product()
}

/// Combined factor of offensive elements against defensive elements.
pub fn combined_strength_factor(offensives: &[Element], defensives: &[Element]) -> f64 {
    let defensive_ids: Vec<&str> = defensives.iter().map(|element| element.id.as_str()).collect();
    combined_strength_factor_by_ids(offensives, &defensive_ids)
}
