//! Per-partner configuration.
//!
//! The partner name doubles as the partner index key on the ledger; the
//! status strings are the fixed values the lifecycle stamps on records when
//! attaching a mortgage or closing a deal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartnerConfig {
    /// Partner this deployment serves; also the partner index key.
    pub partner_name: String,
    /// Status stamped on a referral when a mortgage is attached.
    #[serde(default = "default_pending_status")]
    pub pending_status: String,
    /// Status stamped on a referral when a deal is closed.
    #[serde(default = "default_closed_status")]
    pub closed_status: String,
}

fn default_pending_status() -> String {
    "PENDING".to_string()
}

fn default_closed_status() -> String {
    "CLOSED".to_string()
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            partner_name: String::new(),
            pending_status: default_pending_status(),
            closed_status: default_closed_status(),
        }
    }
}

impl PartnerConfig {
    pub fn new(partner_name: impl Into<String>) -> Self {
        Self {
            partner_name: partner_name.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
