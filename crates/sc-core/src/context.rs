use std::any::Any;
use std::collections::BTreeMap;

/// Identity of one action occurrence inside a playback: the step and
/// sequence positions plus the action's index within its sequence. Keying
/// mutable state by the full triple keeps parallel sequences isolated even
/// when they share a single action object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContextKey {
    pub step: u32,
    pub sequence: u32,
    pub action: u32,
}

impl ContextKey {
    pub fn new(step: u32, sequence: u32, action: u32) -> Self {
        Self {
            step,
            sequence,
            action,
        }
    }
}

/// Per-playback store for action state. Actions themselves stay immutable;
/// everything that changes during playback lives in here, and the whole
/// store is dropped when a playback ends or is replaced.
#[derive(Default)]
pub struct ContextStore {
    slots: BTreeMap<ContextKey, Box<dyn Any + Send>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, replacing whatever was there.
    pub fn put<T: Any + Send>(&mut self, key: ContextKey, value: T) {
        self.slots.insert(key, Box::new(value));
    }

    pub fn get<T: Any + Send>(&self, key: ContextKey) -> Option<&T> {
        self.slots.get(&key).and_then(|slot| slot.downcast_ref())
    }

    pub fn get_mut<T: Any + Send>(&mut self, key: ContextKey) -> Option<&mut T> {
        self.slots
            .get_mut(&key)
            .and_then(|slot| slot.downcast_mut())
    }

    /// Removes and returns the slot, handing ownership back to the caller.
    pub fn take<T: Any + Send>(&mut self, key: ContextKey) -> Option<T> {
        let slot = self.slots.remove(&key)?;
        match slot.downcast::<T>() {
            Ok(boxed) => Some(*boxed),
            Err(slot) => {
                self.slots.insert(key, slot);
                None
            }
        }
    }

    pub fn remove(&mut self, key: ContextKey) {
        self.slots.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
