//! Save subsystem: identity-preserving serialization of cyclic entity graphs.
//!
//! Entity serializers and deserializers plug in through the codec registry;
//! this module owns only the generic mechanism: reference tables, the
//! cyclic pass contexts, and the persisted envelope shape.
mod cyclic;
mod error;
mod referencing;
mod value;

pub use cyclic::{
    CyclicDeserializationContext, CyclicSerializationContext, PendingRecord, SaveEnvelope,
    SharedNode, shared_node,
};
pub use error::SaveError;
pub use referencing::{ReferenceId, ReferenceIdentity, ReferencingArray};
pub use value::{SaveValue, ValueKind};
