//! Dynamic value tree for save records.
//!
//! [`SaveValue`] is the currency of the save subsystem: serializers produce
//! it, envelopes store it, decoders consume it. Children are `Rc`-shared so
//! a value can be aliased inside a pass. The finalize-time aliasing
//! invariant and the deserialize-time table membership test are pointer
//! identity checks, which a plain owned tree could not express.
//!
//! The tree maps one-to-one onto JSON: reference ids are stored as plain
//! integers, objects as maps, and there is no variant that cannot be
//! persisted.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::SaveError;
use super::referencing::ReferenceId;

/// A JSON-like value with identity-bearing children.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum SaveValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Rc<SaveValue>>),
    Object(BTreeMap<String, Rc<SaveValue>>),
}

/// Discriminant of a [`SaveValue`], used in diagnostics.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Array,
    Object,
}

impl SaveValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    // ------------------------------------------------------------------
    // Constructors (records are built behind Rc handles)
    // ------------------------------------------------------------------

    pub fn null() -> Rc<Self> {
        Rc::new(Self::Null)
    }

    pub fn bool(value: bool) -> Rc<Self> {
        Rc::new(Self::Bool(value))
    }

    pub fn int(value: i64) -> Rc<Self> {
        Rc::new(Self::Int(value))
    }

    pub fn float(value: f64) -> Rc<Self> {
        Rc::new(Self::Float(value))
    }

    pub fn str(value: impl Into<String>) -> Rc<Self> {
        Rc::new(Self::Str(value.into()))
    }

    /// A reference id, stored as a plain integer.
    pub fn reference(id: ReferenceId) -> Rc<Self> {
        Rc::new(Self::Int(i64::from(id.0)))
    }

    pub fn array(items: impl IntoIterator<Item = Rc<SaveValue>>) -> Rc<Self> {
        Rc::new(Self::Array(items.into_iter().collect()))
    }

    pub fn object(
        entries: impl IntoIterator<Item = (&'static str, Rc<SaveValue>)>,
    ) -> Rc<Self> {
        Rc::new(Self::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        ))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Rc<SaveValue>]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Rc<SaveValue>>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Rc<SaveValue>> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Reads this value as a reference id.
    ///
    /// # Errors
    ///
    /// Fails for non-integers and for negative integers. A corrupted `-1`
    /// in stored data surfaces here rather than at the table lookup.
    pub fn as_reference_id(&self) -> Result<ReferenceId, SaveError> {
        match self {
            Self::Int(value) if *value >= 0 && *value <= i64::from(u32::MAX) => {
                Ok(ReferenceId(*value as u32))
            }
            _ => Err(SaveError::TypeMismatch {
                expected: "non-negative reference id",
                found: self.kind(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Decode helpers (shape-checked access for record decoders)
    // ------------------------------------------------------------------

    /// Looks up a required object field.
    pub fn field(&self, name: &'static str) -> Result<&Rc<SaveValue>, SaveError> {
        self.expect_object()?
            .get(name)
            .ok_or(SaveError::MissingField(name))
    }

    pub fn expect_str(&self) -> Result<&str, SaveError> {
        self.as_str().ok_or(SaveError::TypeMismatch {
            expected: "str",
            found: self.kind(),
        })
    }

    pub fn expect_i64(&self) -> Result<i64, SaveError> {
        self.as_i64().ok_or(SaveError::TypeMismatch {
            expected: "int",
            found: self.kind(),
        })
    }

    pub fn expect_array(&self) -> Result<&[Rc<SaveValue>], SaveError> {
        self.as_array().ok_or(SaveError::TypeMismatch {
            expected: "array",
            found: self.kind(),
        })
    }

    pub fn expect_object(&self) -> Result<&BTreeMap<String, Rc<SaveValue>>, SaveError> {
        self.as_object().ok_or(SaveError::TypeMismatch {
            expected: "object",
            found: self.kind(),
        })
    }
}

impl Serialize for SaveValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Str(value) => serializer.serialize_str(value),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&**item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, &**value)?;
                }
                out.end()
            }
        }
    }
}

struct SaveValueVisitor;

impl<'de> Visitor<'de> for SaveValueVisitor {
    type Value = SaveValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a save value")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(SaveValue::Null)
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(SaveValue::Null)
    }

    fn visit_bool<E: serde::de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(SaveValue::Bool(value))
    }

    fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(SaveValue::Int(value))
    }

    fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(value)
            .map(SaveValue::Int)
            .unwrap_or(SaveValue::Float(value as f64)))
    }

    fn visit_f64<E: serde::de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(SaveValue::Float(value))
    }

    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(SaveValue::Str(value.to_owned()))
    }

    fn visit_string<E: serde::de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(SaveValue::Str(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<SaveValue>()? {
            items.push(Rc::new(item));
        }
        Ok(SaveValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, SaveValue>()? {
            entries.insert(key, Rc::new(value));
        }
        Ok(SaveValue::Object(entries))
    }
}

impl<'de> Deserialize<'de> for SaveValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SaveValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_structure() {
        let value = SaveValue::object([
            ("id", SaveValue::str("mistral")),
            ("hp", SaveValue::int(31)),
            ("ratio", SaveValue::float(0.5)),
            ("alive", SaveValue::bool(true)),
            ("tags", SaveValue::array([SaveValue::str("wind"), SaveValue::null()])),
        ]);

        let json = serde_json::to_string(&*value).unwrap();
        let back: SaveValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, *value);
    }

    #[test]
    fn deserialized_children_are_distinct_identities() {
        let back: SaveValue = serde_json::from_str(r#"[{"a":1},{"a":1}]"#).unwrap();
        let items = back.as_array().unwrap();
        assert_eq!(items[0], items[1]);
        assert!(!Rc::ptr_eq(&items[0], &items[1]));
    }

    #[test]
    fn reference_ids_round_trip_as_plain_integers() {
        let value = SaveValue::reference(ReferenceId(7));
        assert_eq!(serde_json::to_string(&*value).unwrap(), "7");
        assert_eq!(value.as_reference_id().unwrap(), ReferenceId(7));
    }

    #[test]
    fn negative_or_non_integer_reference_ids_are_rejected() {
        assert!(SaveValue::Int(-1).as_reference_id().is_err());
        assert!(SaveValue::Float(1.5).as_reference_id().is_err());
        assert!(SaveValue::Str("1".into()).as_reference_id().is_err());
    }

    #[test]
    fn type_mismatch_reports_the_found_kind() {
        let err = SaveValue::Bool(true).expect_object().unwrap_err();
        assert_eq!(err.to_string(), "malformed save data: expected object, found bool");
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let record = SaveValue::object([("id", SaveValue::str("x"))]);
        let err = record.field("form").unwrap_err();
        assert_eq!(err.to_string(), "malformed save data: missing field `form`");
    }
}
