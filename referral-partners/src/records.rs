//! Referral record shapes stored on the ledger.
//!
//! Field names match the JSON the partner front ends have always written
//! (camelCase). Every field defaults when absent so that records written by
//! older or sloppier producers still deserialize, mirroring the tolerance of
//! the systems that produced the existing ledger data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Seam between the lifecycle manager and a concrete record shape.
///
/// The lifecycle only needs to read and rewrite the status, and to see which
/// departments the record claims, so partner-specific shapes stay out of the
/// orchestration code.
pub trait ReferralRecord: Serialize + DeserializeOwned {
    fn status(&self) -> &str;
    fn set_status(&mut self, status: String);

    /// Departments/partner tags on the record; most partner shapes have none.
    fn departments(&self) -> &[String] {
        &[]
    }
}

/// Full-profile customer referral.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerReferral {
    pub referral_id: String,
    pub customer_name: String,
    pub contact_number: String,
    pub customer_id: String,
    pub employee_id: String,
    pub departments: Vec<String>,
    pub create_date: i64,
    pub status: String,
    pub mortgage: Option<Mortgage>,
}

/// Mortgage terms attached to a referral once a deal progresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Mortgage {
    pub mortgage_number: String,
    pub mortgage_type: String,
    pub referral_id: String,
    pub rate: String,
    pub amount: String,
}

impl ReferralRecord for CustomerReferral {
    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        self.status = status;
    }

    fn departments(&self) -> &[String] {
        &self.departments
    }
}

/// Paycor-profile referral; carries deal-compensation fields instead of the
/// mortgage sub-record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaycorReferral {
    pub referral_id: String,
    pub customer_name: String,
    pub contact_number: i64,
    pub create_date: i64,
    pub status: String,
    pub customer_size: Option<String>,
    pub compensation: Option<String>,
    pub partner_name: Option<String>,
    pub deal_criteria: Option<String>,
}

impl ReferralRecord for PaycorReferral {
    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn customer_referral_round_trips_camel_case() {
        let raw = br#"{
            "referralId": "R1",
            "customerName": "Acme",
            "contactNumber": "555-0100",
            "customerId": "C9",
            "employeeId": "E4",
            "departments": ["Paycor"],
            "createDate": 1470000000,
            "status": "ACTIVE",
            "mortgage": null
        }"#;
        let referral: CustomerReferral = serde_json::from_slice(raw).unwrap();
        assert_eq!(referral.referral_id, "R1");
        assert_eq!(referral.departments, vec!["Paycor"]);
        assert_eq!(referral.status(), "ACTIVE");

        let reserialized = serde_json::to_value(&referral).unwrap();
        assert_eq!(reserialized["referralId"], "R1");
        assert_eq!(reserialized["createDate"], 1470000000i64);
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let referral: CustomerReferral =
            serde_json::from_slice(br#"{"referralId":"R2","status":"PENDING"}"#).unwrap();
        assert_eq!(referral.status, "PENDING");
        assert_eq!(referral.departments, Vec::<String>::new());
        assert_eq!(referral.mortgage, None);
    }

    #[test]
    fn paycor_referral_keeps_optional_deal_fields() {
        let referral: PaycorReferral = serde_json::from_slice(
            br#"{"referralId":"P1","status":"ACTIVE","customerSize":"MICRO"}"#,
        )
        .unwrap();
        assert_eq!(referral.customer_size.as_deref(), Some("MICRO"));
        assert_eq!(referral.compensation, None);
        assert!(referral.departments().is_empty());
    }
}
