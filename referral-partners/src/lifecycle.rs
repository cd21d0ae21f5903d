//! Referral lifecycle orchestration.
//!
//! Responsibilities:
//! - Persist referral records (full overwrite, never patched).
//! - Keep the status and partner indexes in step with every record write,
//!   preserving the previous status so it can be unindexed.
//!
//! Ordering contracts:
//! - create parses and validates before persisting, so the ledger never
//!   holds a record the indexer could not read back.
//! - transitions index the new status before unindexing the old one; a crash
//!   between the two leaves the id listed under both statuses (a later
//!   resolve over-counts, never under-counts).
//! - Record write and index updates are not atomic. An index-maintenance
//!   failure is reported but the persisted record stands; indexes are
//!   rebuildable caches.
//!
//! Mutations of the same referral id are serialized through a per-id lock
//! map, mirroring the per-index-key locks in `IndexMaintainer`. Without it,
//! two concurrent transitions both read the same pre-transition status and
//! the loser's unindex targets a status the winner already cleared, leaving
//! the id durably listed under two statuses at once.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use referral_core::{validate_member_id, IndexMaintainer, Ledger};

use crate::compensation;
use crate::config::PartnerConfig;
use crate::error::ReferralError;
use crate::records::{CustomerReferral, Mortgage, PaycorReferral, ReferralRecord};

pub struct ReferralLifecycle {
    ledger: Arc<dyn Ledger>,
    indexes: IndexMaintainer,
    config: PartnerConfig,
    record_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for ReferralLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferralLifecycle")
            .field("partner", &self.config.partner_name)
            .finish()
    }
}

impl ReferralLifecycle {
    pub fn new(ledger: Arc<dyn Ledger>, config: PartnerConfig) -> Self {
        Self {
            indexes: IndexMaintainer::new(ledger.clone()),
            ledger,
            config,
            record_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &PartnerConfig {
        &self.config
    }

    fn record_lock(&self, referral_id: &str) -> Arc<Mutex<()>> {
        self.record_locks
            .entry(referral_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read a record's raw bytes. Absent keys are `NotFound`.
    pub fn read(&self, referral_id: &str) -> Result<Vec<u8>, ReferralError> {
        self.ledger
            .get(referral_id)?
            .ok_or_else(|| ReferralError::NotFound(referral_id.to_string()))
    }

    /// Persist a new referral verbatim and index it by status, and by
    /// partner for each department matching the configured partner name.
    pub fn create<R: ReferralRecord>(
        &self,
        referral_id: &str,
        record_bytes: &[u8],
    ) -> Result<Vec<u8>, ReferralError> {
        validate_member_id(referral_id)?;
        let record: R = serde_json::from_slice(record_bytes)
            .map_err(|e| ReferralError::malformed(referral_id, e))?;

        let lock = self.record_lock(referral_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        self.ledger.put(referral_id, record_bytes)?;
        self.indexes.add_member(record.status(), referral_id)?;

        for department in record.departments() {
            if department == &self.config.partner_name {
                self.indexes
                    .add_member(&self.config.partner_name, referral_id)?;
            }
        }

        log::info!(
            "[Lifecycle] created referral '{}' with status '{}'",
            referral_id,
            record.status()
        );
        Ok(record_bytes.to_vec())
    }

    /// Move a referral to `new_status`, rewriting the record and both index
    /// entries involved.
    pub fn transition<R: ReferralRecord>(
        &self,
        referral_id: &str,
        new_status: &str,
    ) -> Result<Vec<u8>, ReferralError> {
        let new_status = new_status.to_string();
        self.update_record::<R, _>(referral_id, move |record| {
            record.set_status(new_status);
        })
    }

    /// Attach mortgage terms; stamps the configured pending status as a side
    /// effect and re-indexes exactly like a transition.
    pub fn attach_mortgage(
        &self,
        referral_id: &str,
        mortgage_bytes: &[u8],
    ) -> Result<Vec<u8>, ReferralError> {
        let mortgage: Mortgage = serde_json::from_slice(mortgage_bytes)
            .map_err(|e| ReferralError::malformed(referral_id, e))?;
        let pending = self.config.pending_status.clone();
        self.update_record::<CustomerReferral, _>(referral_id, move |record| {
            record.status = pending;
            record.mortgage = Some(mortgage);
        })
    }

    /// Close a Paycor deal: derive the compensation from the deal-criteria
    /// and customer-size buckets, stamp it with the configured closed
    /// status, and re-index.
    pub fn close_deal(
        &self,
        referral_id: &str,
        deal_criteria: &str,
    ) -> Result<Vec<u8>, ReferralError> {
        let closed = self.config.closed_status.clone();
        let criteria = deal_criteria.to_string();
        self.update_record::<PaycorReferral, _>(referral_id, move |record| {
            let customer_size = record.customer_size.clone().unwrap_or_default();
            let compensation = compensation::compensation_for(
                compensation::deal_size_bucket(&criteria),
                compensation::customer_size_bucket(&customer_size),
            );
            record.compensation = Some(compensation.to_string());
            record.deal_criteria = Some(criteria);
            record.status = closed;
        })
    }

    /// Shared read-modify-persist-reindex path for every mutation of an
    /// existing record. Holds the referral's lock for the whole
    /// read-modify-write so the old status each caller unindexes is the one
    /// actually on the ledger.
    fn update_record<R, F>(&self, referral_id: &str, mutate: F) -> Result<Vec<u8>, ReferralError>
    where
        R: ReferralRecord,
        F: FnOnce(&mut R),
    {
        let lock = self.record_lock(referral_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.read(referral_id)?;
        let mut record: R = serde_json::from_slice(&current)
            .map_err(|e| ReferralError::malformed(referral_id, e))?;

        let old_status = record.status().to_string();
        mutate(&mut record);
        let persisted = serde_json::to_vec(&record)
            .map_err(|e| ReferralError::malformed(referral_id, e))?;

        self.ledger.put(referral_id, &persisted)?;

        if record.status() != old_status {
            // Add before remove; the reverse order could drop the id from
            // both indexes on a crash in between.
            self.indexes.add_member(record.status(), referral_id)?;
            self.indexes.remove_member(&old_status, referral_id)?;
        }

        log::info!(
            "[Lifecycle] referral '{}' moved '{}' -> '{}'",
            referral_id,
            old_status,
            record.status()
        );
        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use referral_core::{InMemoryLedger, IndexResolver, LedgerError};

    fn lifecycle(partner: &str) -> (Arc<InMemoryLedger>, ReferralLifecycle, IndexResolver) {
        let ledger = Arc::new(InMemoryLedger::new());
        let lifecycle = ReferralLifecycle::new(ledger.clone(), PartnerConfig::new(partner));
        let resolver = IndexResolver::new(ledger.clone());
        (ledger, lifecycle, resolver)
    }

    fn r1_bytes() -> Vec<u8> {
        br#"{"referralId":"R1","customerName":"Acme","departments":["Paycor"],"status":"ACTIVE"}"#
            .to_vec()
    }

    #[test]
    fn create_persists_verbatim_and_indexes_status_and_partner() {
        let (ledger, lifecycle, resolver) = lifecycle("Paycor");
        let created = lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();

        assert_eq!(created, r1_bytes());
        assert_eq!(ledger.get("R1").unwrap(), Some(r1_bytes()));

        let mut expected = Vec::new();
        expected.push(b'[');
        expected.extend_from_slice(&r1_bytes());
        expected.push(b']');
        assert_eq!(resolver.resolve("ACTIVE").unwrap(), expected);
        assert_eq!(resolver.resolve("Paycor").unwrap(), expected);
    }

    #[test]
    fn create_skips_partner_index_for_other_departments() {
        let (ledger, lifecycle, _resolver) = lifecycle("HomeLend");
        lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();
        assert_eq!(ledger.get("HomeLend").unwrap(), None);
    }

    #[test]
    fn create_rejects_malformed_record_without_persisting() {
        let (ledger, lifecycle, _resolver) = lifecycle("Paycor");
        let err = lifecycle
            .create::<CustomerReferral>("R1", b"not json at all")
            .unwrap_err();
        assert!(matches!(err, ReferralError::MalformedRecord { .. }));
        // Parse-then-persist: nothing reached the ledger.
        assert_eq!(ledger.get("R1").unwrap(), None);
    }

    #[test]
    fn create_rejects_delimiter_bearing_id() {
        let (ledger, lifecycle, _resolver) = lifecycle("Paycor");
        let err = lifecycle
            .create::<CustomerReferral>("R1,R2", &r1_bytes())
            .unwrap_err();
        assert!(matches!(err, ReferralError::InvalidId(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn transition_moves_membership_between_status_indexes() {
        let (_ledger, lifecycle, resolver) = lifecycle("Paycor");
        lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();
        let persisted = lifecycle
            .transition::<CustomerReferral>("R1", "CLOSED")
            .unwrap();

        assert_eq!(resolver.resolve("ACTIVE").unwrap(), b"[]".to_vec());
        let mut expected = Vec::new();
        expected.push(b'[');
        expected.extend_from_slice(&persisted);
        expected.push(b']');
        assert_eq!(resolver.resolve("CLOSED").unwrap(), expected);

        let record: CustomerReferral = serde_json::from_slice(&persisted).unwrap();
        assert_eq!(record.status, "CLOSED");
    }

    #[test]
    fn transition_to_same_status_keeps_single_membership() {
        let (_ledger, lifecycle, resolver) = lifecycle("Paycor");
        lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();
        lifecycle
            .transition::<CustomerReferral>("R1", "ACTIVE")
            .unwrap();

        let aggregate = resolver.resolve("ACTIVE").unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&aggregate).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn transition_of_unknown_referral_is_not_found() {
        let (_ledger, lifecycle, _resolver) = lifecycle("Paycor");
        assert!(matches!(
            lifecycle.transition::<CustomerReferral>("ghost", "CLOSED"),
            Err(ReferralError::NotFound(_))
        ));
    }

    #[test]
    fn attach_mortgage_stamps_pending_and_reindexes() {
        let (_ledger, lifecycle, resolver) = lifecycle("Paycor");
        lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();
        let persisted = lifecycle
            .attach_mortgage(
                "R1",
                br#"{"mortgageNumber":"M77","mortgageType":"FIXED","referralId":"R1","rate":"4.1","amount":"250000"}"#,
            )
            .unwrap();

        let record: CustomerReferral = serde_json::from_slice(&persisted).unwrap();
        assert_eq!(record.status, "PENDING");
        assert_eq!(record.mortgage.as_ref().unwrap().mortgage_number, "M77");

        assert_eq!(resolver.resolve("ACTIVE").unwrap(), b"[]".to_vec());
        let pending: serde_json::Value =
            serde_json::from_slice(&resolver.resolve("PENDING").unwrap()).unwrap();
        assert_eq!(pending.as_array().unwrap().len(), 1);
    }

    #[test]
    fn attach_mortgage_rejects_malformed_sub_record_before_touching_state() {
        let (ledger, lifecycle, _resolver) = lifecycle("Paycor");
        lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();
        let before = ledger.get("R1").unwrap();

        let err = lifecycle.attach_mortgage("R1", b"{{{").unwrap_err();
        assert!(matches!(err, ReferralError::MalformedRecord { .. }));
        assert_eq!(ledger.get("R1").unwrap(), before);
    }

    #[test]
    fn close_deal_selects_table_value_and_closes() {
        let (_ledger, lifecycle, resolver) = lifecycle("Paycor");
        lifecycle
            .create::<PaycorReferral>(
                "P1",
                br#"{"referralId":"P1","status":"ACTIVE","customerSize":"MICRO"}"#,
            )
            .unwrap();

        let persisted = lifecycle.close_deal("P1", "MID").unwrap();
        let record: PaycorReferral = serde_json::from_slice(&persisted).unwrap();
        assert_eq!(record.compensation.as_deref(), Some("3.5"));
        assert_eq!(record.deal_criteria.as_deref(), Some("MID"));
        assert_eq!(record.status, "CLOSED");

        assert_eq!(resolver.resolve("ACTIVE").unwrap(), b"[]".to_vec());
    }

    #[test]
    fn transition_index_failure_overcounts_never_undercounts() {
        let (ledger, lifecycle, resolver) = lifecycle("Paycor");
        lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap();
        ledger.fail_puts_on("ACTIVE");

        let err = lifecycle
            .transition::<CustomerReferral>("R1", "CLOSED")
            .unwrap_err();
        assert!(matches!(err, ReferralError::LedgerWrite { .. }));

        // The new status was indexed before the failed unindex of the old
        // one, so the id shows under both statuses, never under neither.
        let closed: serde_json::Value =
            serde_json::from_slice(&resolver.resolve("CLOSED").unwrap()).unwrap();
        assert_eq!(closed.as_array().unwrap().len(), 1);
        let active: serde_json::Value =
            serde_json::from_slice(&resolver.resolve("ACTIVE").unwrap()).unwrap();
        assert_eq!(active.as_array().unwrap().len(), 1);

        let record: CustomerReferral =
            serde_json::from_slice(&lifecycle.read("R1").unwrap()).unwrap();
        assert_eq!(record.status, "CLOSED");
    }

    #[test]
    fn concurrent_transitions_never_leave_two_memberships() {
        for round in 0..16 {
            let (_ledger, lifecycle, resolver) = lifecycle("Paycor");
            let id = format!("R{}", round);
            lifecycle
                .create::<CustomerReferral>(&id, &r1_bytes())
                .unwrap();

            let lifecycle = Arc::new(lifecycle);
            let handles: Vec<_> = ["A", "B"]
                .into_iter()
                .map(|status| {
                    let lifecycle = lifecycle.clone();
                    let id = id.clone();
                    std::thread::spawn(move || {
                        lifecycle
                            .transition::<CustomerReferral>(&id, status)
                            .unwrap();
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            // Whichever transition ran last owns the record and its index
            // membership; the other status index must be empty.
            let record: CustomerReferral =
                serde_json::from_slice(&lifecycle.read(&id).unwrap()).unwrap();
            let other = if record.status == "A" { "B" } else { "A" };
            let under_final: serde_json::Value =
                serde_json::from_slice(&resolver.resolve(&record.status).unwrap()).unwrap();
            assert_eq!(under_final.as_array().unwrap().len(), 1);
            assert_eq!(resolver.resolve(other).unwrap(), b"[]".to_vec());
            assert_eq!(resolver.resolve("ACTIVE").unwrap(), b"[]".to_vec());
        }
    }

    #[test]
    fn index_failure_after_persist_reports_but_keeps_record() {
        let (ledger, lifecycle, _resolver) = lifecycle("Paycor");
        ledger.fail_puts_on("ACTIVE");

        let err = lifecycle
            .create::<CustomerReferral>("R1", &r1_bytes())
            .unwrap_err();
        assert!(matches!(err, ReferralError::LedgerWrite { .. }));
        // Record write preceded the index failure and is not rolled back.
        assert_eq!(ledger.get("R1").unwrap(), Some(r1_bytes()));
    }

    #[test]
    fn ledger_read_failure_surfaces_as_referral_error() {
        let (ledger, lifecycle, _resolver) = lifecycle("Paycor");
        ledger.fail_gets_on("R1");
        assert!(matches!(
            lifecycle.read("R1"),
            Err(ReferralError::LedgerRead { .. })
        ));
    }

    #[test]
    fn read_maps_ledger_error_kinds() {
        let (_ledger, lifecycle, _resolver) = lifecycle("Paycor");
        let err: ReferralError = LedgerError::read("R1", "boom").into();
        assert_eq!(err.to_string(), "failed to get state for R1: boom");
        assert!(matches!(
            lifecycle.read("missing"),
            Err(ReferralError::NotFound(_))
        ));
    }
}
