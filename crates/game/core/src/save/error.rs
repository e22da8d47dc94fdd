//! Error types raised by the save subsystem.

use thiserror::Error;

use super::value::ValueKind;

/// Errors surfaced while serializing or deserializing a save pass.
///
/// Every variant is a local precondition violation reported synchronously to
/// the caller of the operation that detected it. The subsystem performs no
/// retries and no partial recovery: a failed pass leaves its context in a
/// state that must be discarded.
#[derive(Debug, Error)]
pub enum SaveError {
    /// A reference id does not address a slot of the referencing array.
    ///
    /// Indicates a corrupted or mismatched envelope/table pair.
    #[error("unknown reference {id} (referencing array length {len})")]
    UnknownReference { id: u32, len: usize },

    /// The finalize root was null or a boolean.
    ///
    /// These values are reserved as validity sentinels and cannot thread
    /// identity through a reference id.
    #[error("serialized root must not be null or a boolean")]
    UnserializableRoot,

    /// The finalize root is, or contains one level deep, a record of the
    /// referencing array.
    ///
    /// Such an envelope would be ambiguous to reconstruct: reference
    /// resolution only rewrites table entries, never the outer tree.
    #[error("serialized root must not be in the referencing array or contain an entry of it")]
    AliasedRoot,

    /// A save record did not have the expected shape.
    #[error("malformed save data: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: ValueKind,
    },

    /// A save record is missing a required field.
    #[error("malformed save data: missing field `{0}`")]
    MissingField(&'static str),

    /// An opaque payload had no registered codec for its category and kind.
    #[error("no save codec registered for opaque {category} `{kind}` payload")]
    MissingCodec { category: String, kind: String },

    /// A back-reference pointed at an entity that no longer exists.
    #[error("dangling back-reference in payload")]
    DanglingReference,
}

pub type Result<T> = std::result::Result<T, SaveError>;
