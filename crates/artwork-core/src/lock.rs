//! Per-key build serialization.
//!
//! Two builds for the same catalog key share output files, so they must not
//! overlap. Builds for different keys never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A key's mutex and the number of builds holding or waiting on it.
#[derive(Debug, Default)]
struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    users: usize,
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

fn lock_slots(slots: &Slots) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of async mutexes keyed by string, created on demand.
#[derive(Debug, Default)]
pub struct KeyLocks {
    slots: Slots,
}

/// One build's interest in a key. Dropping the last one removes the slot,
/// whether the build finished or was cancelled while waiting.
#[derive(Debug)]
struct Registration {
    key: String,
    slots: Slots,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut slots = lock_slots(&self.slots);
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

/// Held for the duration of one build.
#[derive(Debug)]
pub struct KeyGuard {
    // Declared first so the mutex is released before the slot is pruned
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other guard for `key` is alive.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let mutex = {
            let mut slots = lock_slots(&self.slots);
            let slot = slots.entry(key.to_string()).or_default();
            slot.users += 1;
            Arc::clone(&slot.mutex)
        };
        let registration = Registration {
            key: key.to_string(),
            slots: Arc::clone(&self.slots),
        };
        let guard = mutex.lock_owned().await;
        KeyGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of keys with a live or pending guard.
    pub fn active(&self) -> usize {
        lock_slots(&self.slots).len()
    }
}
