//! Paycor deal-compensation schedule.
//!
//! Both bucket mappings are ordered if/else chains where the last bucket is
//! the default for anything unrecognized. The chain order and the schedule
//! values are a contract with downstream settlement; do not reorder.

/// Deal-size bucket derived from the free-text deal criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealSize {
    Small,
    Mid,
    Large,
}

/// Customer-size bucket derived from the record's free-text customer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSize {
    Micro,
    Smb,
    Enterprise,
}

/// Map deal criteria to a bucket; anything but SMALL/MID falls into Large.
pub fn deal_size_bucket(deal_criteria: &str) -> DealSize {
    if deal_criteria == "SMALL" {
        DealSize::Small
    } else if deal_criteria == "MID" {
        DealSize::Mid
    } else {
        DealSize::Large
    }
}

/// Map customer size to a bucket; anything but MICRO/SMB falls into
/// Enterprise.
pub fn customer_size_bucket(customer_size: &str) -> CustomerSize {
    if customer_size == "MICRO" {
        CustomerSize::Micro
    } else if customer_size == "SMB" {
        CustomerSize::Smb
    } else {
        CustomerSize::Enterprise
    }
}

/// Fixed compensation schedule, percent of first-year contract value.
pub fn compensation_for(deal: DealSize, customer: CustomerSize) -> &'static str {
    match (deal, customer) {
        (DealSize::Small, CustomerSize::Micro) => "2.5",
        (DealSize::Small, CustomerSize::Smb) => "3.0",
        (DealSize::Small, CustomerSize::Enterprise) => "4.0",
        (DealSize::Mid, CustomerSize::Micro) => "3.5",
        (DealSize::Mid, CustomerSize::Smb) => "4.5",
        (DealSize::Mid, CustomerSize::Enterprise) => "5.5",
        (DealSize::Large, CustomerSize::Micro) => "5.0",
        (DealSize::Large, CustomerSize::Smb) => "6.5",
        (DealSize::Large, CustomerSize::Enterprise) => "8.0",
    }
}
