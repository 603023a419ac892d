//! Shared test fixtures for PharmaTrace crates.
//!
//! Provides the canonical set of test organizations — one per role — and
//! pre-seeded in-memory ledgers, so test modules don't repeat the same
//! bring-up boilerplate.

#![deny(unsafe_code)]
// Fixture construction is allowed to panic on impossible inputs.
#![allow(clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use pharmatrace_chain::seed_organizations;
use pharmatrace_runtime::InMemoryLedger;
use pharmatrace_types::{OrgId, OrgKind, Organization};

/// The manufacturing organization used across tests.
pub fn manufacturer() -> Organization {
    Organization {
        id: OrgId::new("Org1"),
        name: "Acme Pharma".to_owned(),
        kind: OrgKind::Manufacturer,
        location: "Jakarta, Indonesia".to_owned(),
    }
}

/// The distributing organization used across tests.
pub fn distributor() -> Organization {
    Organization {
        id: OrgId::new("Org2"),
        name: "MedFlow Logistics".to_owned(),
        kind: OrgKind::Distributor,
        location: "Singapore".to_owned(),
    }
}

/// The pharmacy organization used across tests.
pub fn pharmacy() -> Organization {
    Organization {
        id: OrgId::new("Org3"),
        name: "Sunrise Pharmacy".to_owned(),
        kind: OrgKind::Pharmacy,
        location: "Surabaya, Indonesia".to_owned(),
    }
}

/// The patient organization used across tests.
pub fn patient() -> Organization {
    Organization {
        id: OrgId::new("Org4"),
        name: "Jane Doe".to_owned(),
        kind: OrgKind::Patient,
        location: "Surabaya, Indonesia".to_owned(),
    }
}

/// All four canonical organizations, one per role.
pub fn organizations() -> Vec<Organization> {
    vec![manufacturer(), distributor(), pharmacy(), patient()]
}

/// An in-memory ledger with the canonical organizations seeded.
pub fn seeded_ledger() -> InMemoryLedger {
    let mut ledger = InMemoryLedger::new();
    seed_organizations(&mut ledger, &organizations()).expect("seeding fixtures cannot fail");
    ledger
}

/// Midnight UTC on the given date, for fixed test timestamps.
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("fixture dates are valid")
}
