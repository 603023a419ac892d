//! Core types for PharmaTrace.
//!
//! This crate provides the foundational types shared by the ledger runtime
//! boundary and the custody-tracking core:
//!
//! - Typed string identifiers for organizations, batches, drugs, and transfers
//! - Record structures stored on the ledger
//! - Request payloads accepted by the public operations
//! - Centralized postcard serialization with consistent error handling
//! - Field validation for requests and seed data

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod records;
pub mod requests;
pub mod validation;

// Re-export commonly used types at crate root
pub use codec::{decode, encode, CodecError};
pub use records::{
    Batch, BatchId, Drug, DrugHistoryEntry, DrugId, OrgId, OrgKind, Organization, Transfer,
    TransferId, TransferStatus,
};
pub use requests::{BatchCreate, BatchUpdate, TransferCreate, TransferDecision};
pub use validation::ValidationError;
