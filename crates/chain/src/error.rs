//! Error types for the custody-tracking core.
//!
//! Every public operation surfaces one of these variants to the invoking
//! boundary. Nothing is retried internally; the runtime or its caller
//! owns retry policy.

use pharmatrace_runtime::LedgerError;
use pharmatrace_types::{CodecError, DrugId, OrgId, TransferId, ValidationError};
use snafu::Snafu;

/// Failure taxonomy for chain operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChainError {
    /// A referenced record is absent from world state.
    #[snafu(display("{kind} {id} not found"))]
    NotFound {
        /// Entity kind name.
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A create targeted an identifier that is already taken.
    #[snafu(display("{kind} {id} already exists"))]
    AlreadyExists {
        /// Entity kind name.
        kind: &'static str,
        /// The duplicate identifier.
        id: String,
    },

    /// A role or ownership check failed.
    #[snafu(display("Organization {org} is not authorized to {action}"))]
    Unauthorized {
        /// The organization that attempted the operation.
        org: OrgId,
        /// What it attempted.
        action: &'static str,
    },

    /// A transfer named a drug already claimed by a pending transfer.
    #[snafu(display("Drug {drug_id} is already claimed by a pending transfer"))]
    AlreadyTransferred {
        /// The claimed drug.
        drug_id: DrugId,
    },

    /// A transfer named a drug the sender does not own.
    #[snafu(display("Drug {drug_id} is not owned by {claimed_owner}"))]
    NotOwner {
        /// The drug named in the transfer.
        drug_id: DrugId,
        /// The sender claiming ownership.
        claimed_owner: OrgId,
    },

    /// An accept or reject targeted a transfer already in a terminal
    /// state.
    #[snafu(display("Transfer {transfer_id} is already resolved"))]
    AlreadyResolved {
        /// The resolved transfer.
        transfer_id: TransferId,
    },

    /// The per-kind identifier counter ran out of sixteen-digit values.
    #[snafu(display("Identifier sequence for {kind} is exhausted"))]
    SequenceExhausted {
        /// Entity kind name.
        kind: &'static str,
    },

    /// Request or seed-data validation failed before any write.
    #[snafu(display("Invalid request: {source}"))]
    InvalidRequest {
        /// The underlying validation failure.
        source: ValidationError,
    },

    /// Stored bytes could not be decoded into the expected record shape.
    /// Not recoverable locally; the whole operation aborts.
    #[snafu(display("Stored bytes for {kind} {id} are corrupt: {source}"))]
    Decode {
        /// Entity kind name.
        kind: &'static str,
        /// Key whose value failed to decode.
        id: String,
        /// The underlying codec error.
        source: CodecError,
    },

    /// Record serialization failed before a write.
    #[snafu(display("Record encoding failed: {source}"))]
    Encode {
        /// The underlying codec error.
        source: CodecError,
    },

    /// An index entry decomposed into an unexpected part tuple.
    #[snafu(display("Corrupt {family} index entry: {parts:?}"))]
    CorruptIndex {
        /// Index family name.
        family: &'static str,
        /// The parts recovered from the entry key.
        parts: Vec<String>,
    },

    /// The caller's identity token does not resolve to an organization
    /// code.
    #[snafu(display("Cannot resolve caller identity {token:?} to an organization"))]
    Identity {
        /// The opaque token the runtime supplied, if any.
        token: String,
    },

    /// The underlying ledger runtime failed.
    #[snafu(display("Ledger runtime error: {source}"))]
    Runtime {
        /// The underlying runtime error.
        source: LedgerError,
    },
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
