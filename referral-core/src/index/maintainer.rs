//! Index maintainer: membership updates for delimited index entries.
//!
//! Both operations are read-modify-write against a ledger that offers no
//! per-key locking or transactions, so the maintainer serializes updates to
//! the same index key through its own lock map. Callers in separate
//! processes still race; within one process this closes the lost-update
//! window the host leaves open.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::index::codec;
use crate::ledger::{Ledger, LedgerError};

/// Adds and removes member ids on index entries.
///
/// Holds the ledger handle plus one mutex per index key ever touched. Lock
/// entries are never evicted; index keys are status/partner names, a small
/// bounded vocabulary in practice.
pub struct IndexMaintainer {
    ledger: Arc<dyn Ledger>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for IndexMaintainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexMaintainer")
            .field("locked_keys", &self.locks.len())
            .finish()
    }
}

impl IndexMaintainer {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            locks: DashMap::new(),
        }
    }

    fn key_lock(&self, index_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(index_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append `member_id` to the list under `index_key`.
    ///
    /// Appends unconditionally: the list is not a set, and a caller that
    /// indexes the same id twice without a matching removal will see the
    /// duplicate surface in resolution. An absent list becomes the
    /// single-element list.
    pub fn add_member(&self, index_key: &str, member_id: &str) -> Result<(), LedgerError> {
        let lock = self.key_lock(index_key);
        // A poisoned () mutex carries no state worth rejecting; take it anyway.
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut members = codec::decode(self.ledger.get(index_key)?.as_deref());
        members.push(member_id.to_string());
        self.ledger.put(index_key, &codec::encode(&members))?;

        log::debug!(
            "[IndexMaintainer] added '{}' under '{}' ({} members)",
            member_id,
            index_key,
            members.len()
        );
        Ok(())
    }

    /// Remove every occurrence of `member_id` from the list under `index_key`.
    ///
    /// Removing from an absent index, or from a list with no occurrence of
    /// the id, is a no-op success and writes nothing. When the last member
    /// goes, the key is rewritten with an empty value rather than deleted;
    /// readers treat both states as "no members".
    pub fn remove_member(&self, index_key: &str, member_id: &str) -> Result<(), LedgerError> {
        let lock = self.key_lock(index_key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = match self.ledger.get(index_key)? {
            Some(bytes) => bytes,
            None => return Ok(()),
        };

        let mut members = codec::decode(Some(&current));
        let before = members.len();
        members.retain(|id| id != member_id);
        if members.len() == before {
            return Ok(());
        }
        self.ledger.put(index_key, &codec::encode(&members))?;

        log::debug!(
            "[IndexMaintainer] removed '{}' from '{}' ({} occurrences, {} members remain)",
            member_id,
            index_key,
            before - members.len(),
            members.len()
        );
        Ok(())
    }
}
