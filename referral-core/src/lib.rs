//! Secondary-index engine for an append/update key-value ledger.
//!
//! The host ledger only knows get/put by key. This crate supplies the
//! lookup-by-status / lookup-by-partner capability on top of it:
//! - `ledger`: the `Ledger` collaborator trait and an in-memory backend.
//! - `index`: the delimited member-list codec, the index maintainer that
//!   keeps membership lists in step with record changes, and the resolver
//!   that expands an index key back into the full member records.
//!
//! Indexes are best-effort, rebuildable caches: the record under its own
//! key is always the source of truth.

pub mod index;
pub mod ledger;

pub use index::codec::{validate_member_id, InvalidMemberId, DELIMITER};
pub use index::maintainer::IndexMaintainer;
pub use index::resolver::IndexResolver;
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
