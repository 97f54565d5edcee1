use std::any::Any;
use std::collections::HashMap;

use crate::error::EngineError;

/// Per-run single-slot typed storage.
///
/// Each logical value lives under an explicit tag, exactly one slot per tag.
/// Slots are set-once: writing a tag that already holds a value is an error,
/// as is reading a tag that holds none. This keeps inter-scenario
/// dependencies explicit — a scenario that needs a value a prior phase
/// publishes names the tag, and a missing producer surfaces as a contained
/// action fault instead of silently defaulting.
#[derive(Default)]
pub struct StateBag {
    slots: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `tag`. Errors if the slot already holds a value.
    pub fn put<T: Send + Sync + 'static>(
        &mut self,
        tag: &'static str,
        value: T,
    ) -> Result<(), EngineError> {
        if self.slots.contains_key(tag) {
            return Err(EngineError::SlotOccupied(tag));
        }
        self.slots.insert(tag, Box::new(value));
        Ok(())
    }

    /// Read the value stored under `tag`. Errors if the slot is empty or
    /// holds a value of a different type.
    pub fn get<T: 'static>(&self, tag: &str) -> Result<&T, EngineError> {
        let slot = self
            .slots
            .get(tag)
            .ok_or_else(|| EngineError::SlotEmpty(tag.to_string()))?;
        slot.downcast_ref::<T>()
            .ok_or_else(|| EngineError::SlotType(tag.to_string()))
    }

    /// Non-erroring read for guards: `None` when the slot is empty or the
    /// type does not match.
    pub fn try_get<T: 'static>(&self, tag: &str) -> Option<&T> {
        self.slots.get(tag).and_then(|slot| slot.downcast_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.slots.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
