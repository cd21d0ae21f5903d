//! Delimited member-list codec.
//!
//! One index entry is a single ledger value: member ids joined with a fixed
//! comma delimiter. No escaping is performed, so ids must never contain the
//! delimiter; `validate_member_id` enforces that at the boundary instead of
//! leaving it as an unchecked precondition.

use thiserror::Error;

/// Fixed list delimiter. Changing this breaks every index entry already on
/// the ledger, so it is a constant of the wire format, not a config knob.
pub const DELIMITER: char = ',';

/// An id that cannot be stored in a delimited member list.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid member id {0:?}: ids must be non-empty and must not contain ','")]
pub struct InvalidMemberId(pub String);

/// Reject ids that would corrupt a member list.
///
/// Callers run this before any id reaches `IndexMaintainer::add_member`;
/// ids read back out of an existing list are trusted.
pub fn validate_member_id(id: &str) -> Result<(), InvalidMemberId> {
    if id.is_empty() || id.contains(DELIMITER) {
        return Err(InvalidMemberId(id.to_string()));
    }
    Ok(())
}

/// Join member ids into the stored byte form. Order is preserved; an empty
/// list encodes to an empty value.
pub fn encode(ids: &[String]) -> Vec<u8> {
    ids.join(DELIMITER.to_string().as_str()).into_bytes()
}

/// Split a stored value back into member ids.
///
/// Absent (`None`) and empty values both mean "no members" -- the maintainer
/// writes an empty value rather than deleting the key when the last member
/// is removed.
pub fn decode(bytes: Option<&[u8]>) -> Vec<String> {
    match bytes {
        None => Vec::new(),
        Some(b) if b.is_empty() => Vec::new(),
        Some(b) => String::from_utf8_lossy(b)
            .split(DELIMITER)
            .map(str::to_string)
            .collect(),
    }
}
