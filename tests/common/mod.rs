//! Shared fixtures for integration tests.
//!
//! Helpers build referral records and backend payloads the way the dashboard
//! receives them. Not every test file uses every helper.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use referral_engine::models::{PackStatus, RecordId, ReferralRecord};
use referral_engine::ReferralStore;
use serde_json::{json, Value};

/// Fixed clock used wherever expiry matters.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// A record with numeric ids, like the backend sends them.
pub fn member(id: i64, sponsor_id: Option<i64>, name: &str) -> ReferralRecord {
    ReferralRecord {
        id: Some(RecordId::from(id)),
        user_id: Some(RecordId::from(id)),
        name: name.to_string(),
        sponsor_id: sponsor_id.map(RecordId::from),
        referral_code: format!("REF-{}", id),
        ..Default::default()
    }
}

pub fn with_status(mut record: ReferralRecord, status: PackStatus) -> ReferralRecord {
    record.pack_status = Some(status);
    record
}

pub fn with_commission(mut record: ReferralRecord, usd: f64, cdf: f64) -> ReferralRecord {
    record.total_commission_usd = Some(usd);
    record.total_commission_cdf = Some(cdf);
    record
}

pub fn with_dates(mut record: ReferralRecord, purchase: &str, expiry: &str) -> ReferralRecord {
    record.purchase_date = Some(purchase.into());
    record.expiry_date = Some(expiry.into());
    record
}

/// Alice in generation 1 and Bob in generation 2 under `bob_sponsor`.
pub fn alice_and_bob(bob_sponsor: i64) -> Vec<Vec<ReferralRecord>> {
    let alice = with_commission(
        with_status(member(1, None, "Alice"), PackStatus::Active),
        10.0,
        0.0,
    );
    let bob = with_commission(
        with_status(member(2, Some(bob_sponsor), "Bob"), PackStatus::Inactive),
        0.0,
        5000.0,
    );
    vec![vec![alice], vec![bob]]
}

/// `count` generation-1 records named `r1..r{count}`.
pub fn numbered(count: i64) -> Vec<ReferralRecord> {
    (1..=count)
        .map(|i| member(i, None, &format!("r{}", i)))
        .collect()
}

/// A four-generation payload in the backend's snake_case shape.
pub fn sample_payload() -> Value {
    json!([
        [
            {
                "id": 1, "user_id": 101, "name": "Alice Mbuyi", "sponsor_id": null,
                "pack_status": "active", "purchase_date": "15/01/2024",
                "expiry_date": "15/01/2025", "referral_code": "ALI-101",
                "pack_name": "Gold", "total_commission_usd": "12.50",
                "total_commission_cdf": 30000
            },
            {
                "id": 2, "user_id": 102, "name": "Benoit Kasongo", "sponsor_id": null,
                "pack_status": "expired", "purchase_date": "2023-02-01",
                "expiry_date": "2024-02-01", "referral_code": "BEN-102",
                "pack_name": "Silver", "total_commission_usd": 4,
                "total_commission_cdf": null
            }
        ],
        [
            {
                "id": 3, "user_id": 103, "name": "Chantal Ilunga", "sponsor_id": 101,
                "pack_status": "active", "purchase_date": "2024-03-10T09:30:00Z",
                "expiry_date": "2025-03-10", "referral_code": "CHA-103",
                "total_commission_usd": 2.25, "total_commission_cdf": "1,500"
            },
            {
                "id": 4, "user_id": 104, "name": "David Tshibanda", "sponsor_id": "102",
                "pack_status": "inactive", "purchase_date": "2024-04-02 14:00:00",
                "expiry_date": "2024-05-02", "referral_code": "DAV-104",
                "total_commission_usd": 0, "total_commission_cdf": 0
            },
            {
                "id": 5, "user_id": 105, "name": "Esther Mwamba", "sponsor_id": 999,
                "pack_status": "active", "referral_code": "EST-105"
            },
            "garbage"
        ],
        [
            {
                "id": 6, "user_id": 106, "name": "Fabrice Lukusa", "sponsor_id": 103,
                "pack_status": "active", "purchase_date": "20/05/2024",
                "expiry_date": "20/05/2025", "referral_code": "FAB-106",
                "total_commission_usd": 1, "total_commission_cdf": 2500
            }
        ],
        []
    ])
}

pub fn sample_store() -> ReferralStore {
    ReferralStore::from_payload(&sample_payload())
}
