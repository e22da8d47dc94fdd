//! Opaque per-entity data carried by creatures, effects, states, skills,
//! and items.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::save::SaveValue;

/// Consumer-defined data attached to an entity.
///
/// `Value` payloads are plain save values and serialize unchanged (the
/// default codec passthrough). `Opaque` payloads carry an arbitrary typed
/// value and only survive a save pass when a codec has been registered for
/// their owning category and kind.
#[derive(Default)]
pub enum Payload {
    #[default]
    Empty,
    Value(Rc<SaveValue>),
    Opaque(Box<dyn Any>),
}

impl Payload {
    /// Wraps a typed value into an opaque payload.
    pub fn opaque<T: Any>(value: T) -> Self {
        Self::Opaque(Box::new(value))
    }

    pub fn value(value: Rc<SaveValue>) -> Self {
        Self::Value(value)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_value(&self) -> Option<&Rc<SaveValue>> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Borrows the opaque payload as `T`, when it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(boxed) => boxed.downcast_ref(),
            _ => None,
        }
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Self::Opaque(boxed) => boxed.downcast_mut(),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Payload::Empty"),
            Self::Value(value) => f.debug_tuple("Payload::Value").field(value).finish(),
            Self::Opaque(_) => f.write_str("Payload::Opaque(..)"),
        }
    }
}

impl From<Rc<SaveValue>> for Payload {
    fn from(value: Rc<SaveValue>) -> Self {
        Self::Value(value)
    }
}
