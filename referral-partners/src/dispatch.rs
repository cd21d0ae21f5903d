//! Entry points: dispatch by function name with positional string args.
//!
//! The host hands every call through as `(function, args)`; `dispatch`
//! returns either the operation's payload bytes or the `{"Error":"..."}`
//! payload. Wrong arity and unknown names fail the same way everything else
//! does -- there is exactly one failure shape.

use std::sync::Arc;

use referral_core::{IndexResolver, Ledger};

use crate::config::PartnerConfig;
use crate::error::ReferralError;
use crate::lifecycle::ReferralLifecycle;
use crate::records::{CustomerReferral, PaycorReferral};

fn expect_args(function: &str, args: &[String], expected: usize) -> Result<(), ReferralError> {
    if args.len() != expected {
        return Err(ReferralError::InvalidArgumentCount {
            function: function.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Full-profile partner front end (mortgage referrals).
pub struct PartnerService {
    lifecycle: ReferralLifecycle,
    resolver: IndexResolver,
}

impl PartnerService {
    pub fn new(ledger: Arc<dyn Ledger>, config: PartnerConfig) -> Self {
        Self {
            lifecycle: ReferralLifecycle::new(ledger.clone(), config),
            resolver: IndexResolver::new(ledger),
        }
    }

    pub fn lifecycle(&self) -> &ReferralLifecycle {
        &self.lifecycle
    }

    /// Run one operation; failures come back as the error payload.
    pub fn dispatch(&self, function: &str, args: &[String]) -> Vec<u8> {
        log::info!("[Dispatch] running {}", function);
        self.invoke(function, args)
            .unwrap_or_else(|e| e.to_error_payload())
    }

    fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ReferralError> {
        match function {
            "createReferral" => {
                expect_args(function, args, 2)?;
                self.lifecycle
                    .create::<CustomerReferral>(&args[0], args[1].as_bytes())
            }
            "updateReferralStatus" => {
                expect_args(function, args, 2)?;
                self.lifecycle
                    .transition::<CustomerReferral>(&args[0], &args[1])
            }
            "updateMortgageData" => {
                expect_args(function, args, 2)?;
                self.lifecycle.attach_mortgage(&args[0], args[1].as_bytes())
            }
            "read" => {
                expect_args(function, args, 1)?;
                self.lifecycle.read(&args[0])
            }
            "searchByStatus" => {
                expect_args(function, args, 1)?;
                Ok(self.resolver.resolve(&args[0])?)
            }
            "searchByDepartment" => {
                expect_args(function, args, 0)?;
                Ok(self.resolver.resolve(&self.lifecycle.config().partner_name)?)
            }
            other => Err(ReferralError::UnknownOperation(other.to_string())),
        }
    }
}

/// Paycor front end; no mortgage sub-record, adds deal closing.
pub struct PaycorService {
    lifecycle: ReferralLifecycle,
    resolver: IndexResolver,
}

impl PaycorService {
    pub fn new(ledger: Arc<dyn Ledger>, config: PartnerConfig) -> Self {
        Self {
            lifecycle: ReferralLifecycle::new(ledger.clone(), config),
            resolver: IndexResolver::new(ledger),
        }
    }

    pub fn dispatch(&self, function: &str, args: &[String]) -> Vec<u8> {
        log::info!("[Dispatch] running {}", function);
        self.invoke(function, args)
            .unwrap_or_else(|e| e.to_error_payload())
    }

    fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ReferralError> {
        match function {
            "createReferral" => {
                expect_args(function, args, 2)?;
                self.lifecycle
                    .create::<PaycorReferral>(&args[0], args[1].as_bytes())
            }
            "updateReferralStatus" => {
                expect_args(function, args, 2)?;
                self.lifecycle
                    .transition::<PaycorReferral>(&args[0], &args[1])
            }
            "closeDeal" => {
                expect_args(function, args, 2)?;
                self.lifecycle.close_deal(&args[0], &args[1])
            }
            "read" => {
                expect_args(function, args, 1)?;
                self.lifecycle.read(&args[0])
            }
            "searchByStatus" => {
                expect_args(function, args, 1)?;
                Ok(self.resolver.resolve(&args[0])?)
            }
            other => Err(ReferralError::UnknownOperation(other.to_string())),
        }
    }
}
