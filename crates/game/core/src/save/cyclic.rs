//! Cyclic object-graph serialization.
//!
//! Creatures hold effects that reference back to the owning creature, so a
//! roster is a graph with shared and cyclic references. JSON cannot store
//! such a graph directly. This module flattens it: every node that can be
//! referenced cyclically is interned into a reference table and serialized
//! into a record that embeds the *ids* of the nodes it points at, never
//! their serialized form. Table slots are only populated at finalize time,
//! after the whole graph has been walked, which is what makes visiting
//! order irrelevant and cycles representable.
//!
//! Process:
//! 1. create a [`CyclicSerializationContext`]
//! 2. [`cyclic_serialize`](CyclicSerializationContext::cyclic_serialize)
//!    every cyclic node (records accumulate with pending ids)
//! 3. [`finalize`](CyclicSerializationContext::finalize) once, producing the
//!    [`SaveEnvelope`] to persist
//!
//! Loading mirrors this: a [`CyclicDeserializationContext`] pre-allocates
//! one empty shell per table slot before any field is decoded, so two nodes
//! can reference each other even though neither is fully constructed yet.
//! Decoding a record that belongs to the table populates its shell in
//! place, preserving the identity every earlier reference resolved to.
//!
//! A context models exactly one in-flight pass. Nothing here is re-entrant
//! or thread-aware: the caller walks the graph, then finalizes, in order.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::error::SaveError;
use super::referencing::{ReferenceId, ReferencingArray};
use super::value::SaveValue;

/// Shared, mutable graph-node handle. Node identity is the `Rc` identity.
pub type SharedNode<T> = Rc<RefCell<T>>;

/// Wraps a value into a fresh [`SharedNode`] with its own identity.
pub fn shared_node<T>(value: T) -> SharedNode<T> {
    Rc::new(RefCell::new(value))
}

/// The unit of persisted storage: one flat, acyclic artifact per pass.
///
/// Every reference id appearing in `serialized_object` or inside any table
/// record is an index into `referencing_array`, valid in `[0, len)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnvelope {
    pub serialized_object: Rc<SaveValue>,
    pub referencing_array: Vec<Rc<SaveValue>>,
}

/// A serialized record still waiting for its table slot, tagged with the
/// reference id of its source node.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRecord {
    pub reference_id: ReferenceId,
    pub record: Rc<SaveValue>,
}

/// Accumulates one serialization pass over a cyclic graph of `T` nodes.
///
/// Grows monotonically while the graph is walked and is consumed exactly
/// once by [`finalize`](Self::finalize), which wipes it back to the
/// freshly-constructed state.
#[derive(Debug, Default)]
pub struct CyclicSerializationContext<T> {
    referencing_array: ReferencingArray<SharedNode<T>>,
    pending: Vec<PendingRecord>,
}

impl<T> CyclicSerializationContext<T> {
    pub fn new() -> Self {
        Self {
            referencing_array: ReferencingArray::new(),
            pending: Vec::new(),
        }
    }

    /// True when no pass is in flight (no interned nodes, no pending records).
    pub fn is_empty(&self) -> bool {
        self.referencing_array.is_empty() && self.pending.is_empty()
    }

    pub fn table_len(&self) -> usize {
        self.referencing_array.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Serializes one cyclic node into the context.
    ///
    /// The node is interned first, so the serializer may embed the node's
    /// own id (self-reference) or the ids of nodes that have not been
    /// serialized yet. It only ever needs ids, obtained through
    /// [`ReferencingArray::get_reference_id`] on the table it is handed.
    ///
    /// The tagged record is appended to the pending list and returned.
    pub fn cyclic_serialize<F>(
        &mut self,
        node: &SharedNode<T>,
        serializer: F,
    ) -> Result<PendingRecord, SaveError>
    where
        F: FnOnce(&T, &mut ReferencingArray<SharedNode<T>>) -> Result<Rc<SaveValue>, SaveError>,
    {
        let reference_id = self.referencing_array.get_reference_id(node);
        let guard = node.borrow();
        let record = serializer(&guard, &mut self.referencing_array)?;
        drop(guard);

        let pending = PendingRecord {
            reference_id,
            record,
        };
        self.pending.push(pending.clone());
        Ok(pending)
    }

    /// Binds every pending record into its table slot and produces the
    /// envelope, wiping the context back to its empty state.
    ///
    /// # Errors
    ///
    /// - [`SaveError::UnserializableRoot`]: `root` is null or a boolean
    ///   (reserved as validity sentinels).
    /// - [`SaveError::AliasedRoot`]: `root` is, or one level deep contains,
    ///   a record of the finalized table. Reference resolution only
    ///   rewrites table entries, so such an envelope could not be
    ///   reconstructed unambiguously.
    ///
    /// On error the context keeps its pending state and must be discarded.
    pub fn finalize(&mut self, root: Rc<SaveValue>) -> Result<SaveEnvelope, SaveError> {
        if matches!(*root, SaveValue::Null | SaveValue::Bool(_)) {
            return Err(SaveError::UnserializableRoot);
        }

        // Turn the table of node identities into a table of records,
        // addressable by the same ids embedded in `root`.
        let mut table: ReferencingArray<Rc<SaveValue>> = ReferencingArray::from_entries(
            (0..self.referencing_array.len())
                .map(|_| SaveValue::null())
                .collect(),
        );
        for pending in &self.pending {
            table.overwrite_object_from_reference_id(
                pending.record.clone(),
                pending.reference_id,
            )?;
        }

        if table.find_reference_id(&root).is_some() {
            return Err(SaveError::AliasedRoot);
        }
        let aliased_one_level_deep = match &*root {
            SaveValue::Array(items) => items
                .iter()
                .any(|item| table.find_reference_id(item).is_some()),
            SaveValue::Object(map) => map
                .values()
                .any(|value| table.find_reference_id(value).is_some()),
            _ => false,
        };
        if aliased_one_level_deep {
            return Err(SaveError::AliasedRoot);
        }

        self.referencing_array = ReferencingArray::new();
        self.pending.clear();

        Ok(SaveEnvelope {
            serialized_object: root,
            referencing_array: table.into_entries(),
        })
    }
}

/// Holds one deserialization pass over a [`SaveEnvelope`].
///
/// The serialized table is immutable for the pass; the parallel shell table
/// is allocated up front, one distinct empty node per slot, before any
/// record is decoded.
#[derive(Debug)]
pub struct CyclicDeserializationContext<T> {
    serialized_referencing_array: ReferencingArray<Rc<SaveValue>>,
    deserialized_referencing_array: ReferencingArray<SharedNode<T>>,
}

impl<T: Default> CyclicDeserializationContext<T> {
    pub fn new(envelope: &SaveEnvelope) -> Self {
        let shells = (0..envelope.referencing_array.len())
            .map(|_| shared_node(T::default()))
            .collect();
        Self {
            serialized_referencing_array: ReferencingArray::from_entries(
                envelope.referencing_array.clone(),
            ),
            deserialized_referencing_array: ReferencingArray::from_entries(shells),
        }
    }
}

impl<T> CyclicDeserializationContext<T> {
    pub fn table_len(&self) -> usize {
        self.serialized_referencing_array.len()
    }

    /// Returns the serialized record stored at `id`.
    pub fn serialized_record(&self, id: ReferenceId) -> Result<Rc<SaveValue>, SaveError> {
        self.serialized_referencing_array
            .object_from_reference_id(id)
            .cloned()
    }

    /// Returns the (possibly still empty) shell node for slot `id`.
    ///
    /// Decoders resolve embedded reference ids through this: the handle is
    /// valid immediately and is populated in place later.
    pub fn shell(&self, id: ReferenceId) -> Result<SharedNode<T>, SaveError> {
        self.deserialized_referencing_array
            .object_from_reference_id(id)
            .cloned()
    }

    /// Decodes one record.
    ///
    /// When `record` is itself a slot of the serialized table (identity
    /// lookup), the decoded value is moved into that slot's shell in place
    /// and the shell is returned, so every consumer that resolved the slot
    /// earlier keeps holding the identity that now carries the data. An
    /// inline record that belongs to no slot decodes to a fresh node.
    pub fn cyclic_deserialize<F>(
        &self,
        record: &Rc<SaveValue>,
        deserializer: F,
    ) -> Result<SharedNode<T>, SaveError>
    where
        F: FnOnce(&SaveValue, &Self) -> Result<T, SaveError>,
    {
        let decoded = deserializer(record, self)?;
        match self.serialized_referencing_array.find_reference_id(record) {
            Some(id) => {
                let shell = self.shell(id)?;
                *shell.borrow_mut() = decoded;
                Ok(shell)
            }
            None => Ok(shared_node(decoded)),
        }
    }
}
