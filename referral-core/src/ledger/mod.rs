//! Ledger collaborator trait and error types.
//!
//! Responsibilities:
//! - Define the minimal get/put contract the host state store exposes to
//!   this engine. No scans, no transactions, no key versioning.
//! - Keep the interface small so alternate hosts (and test doubles) are
//!   trivial to wire in.

use thiserror::Error;

pub mod backend_inmemory;

pub use backend_inmemory::InMemoryLedger;

/// Error type for the ledger boundary.
///
/// The engine never retries: whatever the host reports is surfaced to the
/// caller as-is.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to get state for {key}: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to put state for {key}: {reason}")]
    Write { key: String, reason: String },
}

impl LedgerError {
    pub fn read(key: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgerError::Read {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgerError::Write {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Minimal host-agnostic key-value contract.
///
/// Notes:
/// - Implementations must be Send + Sync so services can share one handle
///   behind an Arc.
/// - An absent key is `Ok(None)`, never an error.
/// - `put` overwrites unconditionally; history retention (if any) belongs to
///   the host.
pub trait Ledger: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), LedgerError>;
}
