//! Identifiers and simple allocators for scene entities.

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};

/// Index of an object in the scene table. Tracks hold these as weak references.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GestureId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct JointId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ParamId(pub u32);

/// Monotonic allocator for ObjectId and ParamId. Ids are never reused.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_object: u32,
    next_param: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_object(&mut self) -> Result<ObjectId> {
        next_id(&mut self.next_object, "object").map(ObjectId)
    }

    #[inline]
    pub fn alloc_param(&mut self) -> Result<ParamId> {
        next_id(&mut self.next_param, "parameter").map(ParamId)
    }
}

/// Take the value of a monotonic counter and advance it. Refuses once the counter would
/// overflow, so an id is never handed out twice.
pub(crate) fn next_id(counter: &mut u32, kind: &str) -> Result<u32> {
    let id = *counter;
    match id.checked_add(1) {
        Some(next) => {
            *counter = next;
            Ok(id)
        }
        None => {
            log::warn!("{} ids exhausted", kind);
            Err(AnimationError::IdsExhausted {
                kind: kind.to_string(),
            })
        }
    }
}
