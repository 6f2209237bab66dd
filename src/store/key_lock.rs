//! Per-key mutual exclusion.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Hands out one mutex per key.
///
/// Callers holding the slot for a key are serialized; callers on different
/// keys only contend for the brief map lookup. A slot lives only while some
/// caller holds or waits on it, so the table stays as small as the number
/// of keys in flight.
///
/// # Example
///
/// ```
/// use attendance_payroll::store::KeyedLocks;
///
/// let locks: KeyedLocks<(u64, u32)> = KeyedLocks::default();
/// let total = locks.with_lock((1, 20260302), || Ok(2 + 2)).unwrap();
/// assert_eq!(total, 4);
/// // Released slots are dropped
/// assert!(locks.is_empty().unwrap());
/// ```
#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Runs `f` while holding the lock for `key`.
    ///
    /// The slot is removed afterwards unless another caller is waiting on
    /// it.
    pub fn with_lock<T>(&self, key: K, f: impl FnOnce() -> EngineResult<T>) -> EngineResult<T> {
        let slot = self.slot(key.clone())?;
        let result = {
            // The mutex guards no data, so a panic in an earlier holder
            // leaves nothing inconsistent behind.
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        if let Err(error) = self.release(&key, slot) {
            warn!(error = %error, "Failed to release key lock slot");
        }
        result
    }

    /// Returns the mutex guarding `key`, creating it on first use.
    pub fn slot(&self, key: K) -> EngineResult<Arc<Mutex<()>>> {
        let mut slots = self.table()?;
        Ok(Arc::clone(slots.entry(key).or_default()))
    }

    /// Gives back a slot obtained from [`KeyedLocks::slot`], dropping it from
    /// the table if nobody else holds it.
    pub fn release(&self, key: &K, slot: Arc<Mutex<()>>) -> EngineResult<()> {
        let mut slots = self.table()?;
        drop(slot);
        if slots.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(key);
        }
        Ok(())
    }

    /// Drops slots nobody is holding.
    pub fn prune(&self) -> EngineResult<()> {
        self.table()?.retain(|_, slot| Arc::strong_count(slot) > 1);
        Ok(())
    }

    /// Number of slots currently allocated.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.table()?.len())
    }

    /// Returns true if no slot is allocated.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    fn table(&self) -> EngineResult<std::sync::MutexGuard<'_, HashMap<K, Arc<Mutex<()>>>>> {
        self.slots
            .lock()
            .map_err(|_| EngineError::storage("key lock table poisoned"))
    }
}
