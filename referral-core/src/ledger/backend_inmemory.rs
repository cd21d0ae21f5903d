//! In-memory Ledger backend.
//!
//! Goals:
//! - Small default backend for tests, demos, and single-process hosts.
//! - Per-key fault injection so error-propagation paths are testable without
//!   a real failing host.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::ledger::{Ledger, LedgerError};

/// HashMap-backed ledger behind a `Mutex`.
///
/// Keys listed in `fail_gets` / `fail_puts` make the corresponding operation
/// return an error, mimicking a host-side failure for exactly that key.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<HashMap<String, Vec<u8>>>,
    fail_gets: Mutex<HashSet<String>>,
    fail_puts: Mutex<HashSet<String>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `get` calls for `key` fail.
    pub fn fail_gets_on(&self, key: impl Into<String>) {
        if let Ok(mut set) = self.fail_gets.lock() {
            set.insert(key.into());
        }
    }

    /// Make subsequent `put` calls for `key` fail.
    pub fn fail_puts_on(&self, key: impl Into<String>) {
        if let Ok(mut set) = self.fail_puts.lock() {
            set.insert(key.into());
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Ledger for InMemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        if self
            .fail_gets
            .lock()
            .map_err(|e| LedgerError::read(key, e.to_string()))?
            .contains(key)
        {
            return Err(LedgerError::read(key, "injected get failure"));
        }
        let state = self
            .state
            .lock()
            .map_err(|e| LedgerError::read(key, e.to_string()))?;
        Ok(state.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        if self
            .fail_puts
            .lock()
            .map_err(|e| LedgerError::write(key, e.to_string()))?
            .contains(key)
        {
            return Err(LedgerError::write(key, "injected put failure"));
        }
        let mut state = self
            .state
            .lock()
            .map_err(|e| LedgerError::write(key, e.to_string()))?;
        state.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
