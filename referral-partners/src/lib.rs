//! Partner-facing layer over the referral-core index engine.
//!
//! - `records`: the referral record shapes partners store on the ledger.
//! - `config`: per-partner configuration.
//! - `lifecycle`: create / status-transition / attach orchestration that
//!   keeps the status and partner indexes in step with record writes.
//! - `compensation`: the Paycor deal-compensation schedule.
//! - `dispatch`: the function-name entry points consumed by the host.

pub mod compensation;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod records;

pub use config::PartnerConfig;
pub use dispatch::{PartnerService, PaycorService};
pub use error::ReferralError;
pub use lifecycle::ReferralLifecycle;
pub use records::{CustomerReferral, Mortgage, PaycorReferral, ReferralRecord};
