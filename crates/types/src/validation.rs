//! Field validation for requests and seed data.
//!
//! Validation happens before any ledger write so that every failure here
//! leaves the ledger untouched.

use snafu::{ensure, Snafu};

use crate::records::Organization;
use crate::requests::{BatchCreate, TransferCreate};

/// Identifier prefixes reserved for sequence-generated record keys.
///
/// Organization identifiers must not begin with one of these letters:
/// organizations share the flat key space with generated records, and a
/// colliding prefix would pollute the per-kind namespace range scans.
const RESERVED_ID_PREFIXES: [char; 3] = ['B', 'D', 'T'];

/// Errors produced by request and seed-data validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ValidationError {
    /// A required text field was empty.
    #[snafu(display("Field {field} must not be empty"))]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A batch was requested with no drug units.
    #[snafu(display("Batch amount must be at least 1"))]
    ZeroAmount,

    /// A transfer was requested with no drugs.
    #[snafu(display("Transfer must name at least one drug"))]
    EmptyDrugList,

    /// A transfer named its own sender as the receiver.
    #[snafu(display("Transfer sender and receiver must differ"))]
    SelfTransfer,

    /// An organization identifier collides with a reserved namespace.
    #[snafu(display("Organization id {id} starts with a reserved namespace prefix"))]
    ReservedIdPrefix {
        /// The offending identifier.
        id: String,
    },

    /// A value contained the NUL byte reserved as the key separator.
    #[snafu(display("Field {field} must not contain the NUL separator"))]
    EmbeddedSeparator {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validates a batch-creation request.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyField`] for an empty drug name and
/// [`ValidationError::ZeroAmount`] for a zero amount.
pub fn validate_batch_create(request: &BatchCreate) -> Result<()> {
    ensure!(!request.drug_name.is_empty(), EmptyFieldSnafu { field: "drug_name" });
    ensure!(request.amount >= 1, ZeroAmountSnafu);
    Ok(())
}

/// Validates a transfer-creation request.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyDrugList`] when no drugs are named and
/// [`ValidationError::EmptyField`] for an empty receiver id.
pub fn validate_transfer_create(request: &TransferCreate) -> Result<()> {
    ensure!(!request.receiver_id.as_str().is_empty(), EmptyFieldSnafu { field: "receiver_id" });
    ensure!(!request.drug_ids.is_empty(), EmptyDrugListSnafu);
    Ok(())
}

/// Validates an organization before seeding.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyField`] for a missing id or name,
/// [`ValidationError::EmbeddedSeparator`] if the id contains a NUL byte,
/// and [`ValidationError::ReservedIdPrefix`] if the id begins with one of
/// the sequence-generated namespace letters.
pub fn validate_organization(org: &Organization) -> Result<()> {
    let id = org.id.as_str();
    ensure!(!id.is_empty(), EmptyFieldSnafu { field: "id" });
    ensure!(!org.name.is_empty(), EmptyFieldSnafu { field: "name" });
    ensure!(!id.contains('\0'), EmbeddedSeparatorSnafu { field: "id" });
    ensure!(
        !id.starts_with(&RESERVED_ID_PREFIXES[..]),
        ReservedIdPrefixSnafu { id }
    );
    Ok(())
}
