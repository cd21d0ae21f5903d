//! Error taxonomy for the partner layer.
//!
//! Everything surfaces to the host as a structured failure value; nothing is
//! retried here. Index-maintenance failures after a successful record write
//! still come back as errors, but the record stays persisted -- indexes are
//! rebuildable caches, the record is the source of truth.

use referral_core::{InvalidMemberId, LedgerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("failed to get state for {key}: {reason}")]
    LedgerRead { key: String, reason: String },
    #[error("failed to put state for {key}: {reason}")]
    LedgerWrite { key: String, reason: String },
    #[error("malformed record for {key}: {reason}")]
    MalformedRecord { key: String, reason: String },
    #[error("no record found for key {0}")]
    NotFound(String),
    #[error("invalid referral id {0:?}: ids must be non-empty and must not contain ','")]
    InvalidId(String),
    #[error("incorrect number of arguments for {function}: expecting {expected}, got {got}")]
    InvalidArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },
    #[error("received unknown function invocation: {0}")]
    UnknownOperation(String),
}

impl ReferralError {
    pub fn malformed(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ReferralError::MalformedRecord {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// The `{"Error":"<message>"}` payload returned to the host on failure.
    pub fn to_error_payload(&self) -> Vec<u8> {
        serde_json::json!({ "Error": self.to_string() })
            .to_string()
            .into_bytes()
    }
}

impl From<LedgerError> for ReferralError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Read { key, reason } => ReferralError::LedgerRead { key, reason },
            LedgerError::Write { key, reason } => ReferralError::LedgerWrite { key, reason },
        }
    }
}

impl From<InvalidMemberId> for ReferralError {
    fn from(err: InvalidMemberId) -> Self {
        ReferralError::InvalidId(err.0)
    }
}
