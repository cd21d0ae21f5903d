//! Index resolver: expand an index key into its member records.
//!
//! Resolution is a pure byte-level join: the aggregate is the raw bytes of
//! each member record, comma-separated, wrapped in `[`..`]`. It is a JSON
//! array exactly when every member record is itself valid JSON; the resolver
//! does not parse or validate anything.

use std::sync::Arc;

use crate::index::codec;
use crate::ledger::{Ledger, LedgerError};

/// Resolves index keys against the ledger.
pub struct IndexResolver {
    ledger: Arc<dyn Ledger>,
}

impl std::fmt::Debug for IndexResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexResolver").finish()
    }
}

impl IndexResolver {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Fetch every member record under `index_key`, in list order, and join
    /// them into one aggregate blob.
    ///
    /// Members whose record is absent are skipped and logged at warn; a
    /// stale index entry must not break resolution of the healthy members.
    /// Ledger read failures (on the index key or any member) propagate.
    pub fn resolve(&self, index_key: &str) -> Result<Vec<u8>, LedgerError> {
        let members = codec::decode(self.ledger.get(index_key)?.as_deref());

        let mut aggregate = Vec::with_capacity(2 + members.len() * 64);
        aggregate.push(b'[');
        let mut first = true;
        for member_id in &members {
            let record = match self.ledger.get(member_id)? {
                Some(bytes) => bytes,
                None => {
                    log::warn!(
                        "[IndexResolver] member '{}' of index '{}' has no record, skipping",
                        member_id,
                        index_key
                    );
                    continue;
                }
            };
            if !first {
                aggregate.push(b',');
            }
            aggregate.extend_from_slice(&record);
            first = false;
        }
        aggregate.push(b']');

        log::debug!(
            "[IndexResolver] resolved '{}' into {} bytes ({} listed members)",
            index_key,
            aggregate.len(),
            members.len()
        );
        Ok(aggregate)
    }
}
