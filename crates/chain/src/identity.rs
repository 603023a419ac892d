//! Caller identity resolution.
//!
//! The runtime hands the core an opaque identity token; this module maps
//! it to an [`Organization`] record by stripping the membership-service
//! suffix and reading the organization under the remaining code.

use pharmatrace_runtime::{Ledger, LedgerError};
use pharmatrace_types::Organization;

use crate::error::{ChainError, IdentitySnafu, Result};
use crate::store::RecordStore;

/// Suffix the membership service appends to organization codes in
/// identity tokens.
const MSP_SUFFIX: &str = "MSP";

/// Resolves the invoking caller to its [`Organization`] record.
///
/// # Errors
///
/// Returns `ChainError::Identity` when the runtime has no identity bound
/// or the token reduces to an empty code, and `ChainError::NotFound`
/// when the code has no Organization record — a seed-ordering problem,
/// kept distinguishable from identity failure.
pub fn current_org<L: Ledger>(ledger: &L) -> Result<Organization> {
    let token = ledger.caller().map_err(|source| match source {
        LedgerError::NoCallerIdentity => ChainError::Identity { token: String::new() },
        other => ChainError::Runtime { source: other },
    })?;

    let code = token.strip_suffix(MSP_SUFFIX).unwrap_or(&token);
    if code.is_empty() {
        return IdentitySnafu { token }.fail();
    }

    RecordStore::get(ledger, code)
}
