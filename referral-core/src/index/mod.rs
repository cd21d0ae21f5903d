//! Secondary-index engine.
//!
//! An index entry is a ledger value stored under a non-record key (a status
//! name or a partner name) holding the ids of every member record, encoded
//! as one comma-delimited string. Submodules:
//! - `codec`: encode/decode the member list and validate ids at the boundary.
//! - `maintainer`: add/remove members with per-key serialization.
//! - `resolver`: expand an index key into the concatenated member records.

pub mod codec;
pub mod maintainer;
pub mod resolver;
