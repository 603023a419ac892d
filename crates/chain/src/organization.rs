//! Organization reference data.
//!
//! Organizations are immutable, seeded once at system bring-up, and never
//! deleted. Everything else in the system resolves owners, senders, and
//! receivers against these records.

use pharmatrace_runtime::Ledger;
use pharmatrace_types::{validation, OrgId, Organization};
use snafu::ResultExt;

use crate::error::{AlreadyExistsSnafu, InvalidRequestSnafu, Result};
use crate::store::{RecordKind, RecordStore};

/// Seeds the given organizations into world state.
///
/// Each organization is validated and written exactly once; re-seeding an
/// existing code fails rather than silently overwriting reference data.
///
/// # Errors
///
/// Returns `ChainError::InvalidRequest` for malformed seed data and
/// `ChainError::AlreadyExists` when a code is already present.
pub fn seed_organizations<L: Ledger>(ledger: &mut L, orgs: &[Organization]) -> Result<()> {
    for org in orgs {
        validation::validate_organization(org).context(InvalidRequestSnafu)?;
        if RecordStore::exists::<Organization, _>(ledger, org.id.as_str())? {
            return AlreadyExistsSnafu {
                kind: RecordKind::Organization.name(),
                id: org.id.as_str(),
            }
            .fail();
        }
        RecordStore::put(ledger, org)?;
    }
    tracing::info!(count = orgs.len(), "seeded organizations");
    Ok(())
}

/// Reads an organization by its code.
///
/// # Errors
///
/// Returns `ChainError::NotFound` when the code has no record.
pub fn get_organization<L: Ledger>(ledger: &L, id: &OrgId) -> Result<Organization> {
    RecordStore::get(ledger, id.as_str())
}
