//! Owner-scoped drug queries.

use pharmatrace_runtime::Ledger;
use pharmatrace_types::{Drug, OrgId};

use crate::error::{CorruptIndexSnafu, Result};
use crate::index::{IndexFamily, IndexManager};
use crate::store::RecordStore;

/// Closed set of owner-scoped drug queries.
///
/// A fixed set of named variants rather than caller-supplied predicates
/// keeps the index-scan core free of foreign logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrugFilter {
    /// Every drug the organization holds.
    All,
    /// Only drugs not claimed by a pending transfer.
    Available,
}

impl DrugFilter {
    fn matches(self, drug: &Drug) -> bool {
        match self {
            Self::All => true,
            Self::Available => !drug.is_transferred,
        }
    }
}

/// Returns the drugs currently owned by `owner`, filtered by `filter`.
///
/// Resolves each drug through the owner→drug index, so the result is
/// exactly the index's view of ownership.
///
/// # Errors
///
/// Returns `ChainError::CorruptIndex` if an index entry decomposes into
/// an unexpected tuple, `ChainError::NotFound` if an indexed drug record
/// is missing, and the usual scan/decode failures.
pub fn drugs_owned_by<L: Ledger>(
    ledger: &L,
    owner: &OrgId,
    filter: DrugFilter,
) -> Result<Vec<Drug>> {
    let entries = IndexManager::collect(ledger, IndexFamily::OwnerDrug, &[owner.as_str()])?;

    let mut drugs = Vec::with_capacity(entries.len());
    for parts in entries {
        if parts.len() != 2 {
            return CorruptIndexSnafu { family: IndexFamily::OwnerDrug.name(), parts }.fail();
        }
        let drug: Drug = RecordStore::get(ledger, &parts[1])?;
        if filter.matches(&drug) {
            drugs.push(drug);
        }
    }
    Ok(drugs)
}
