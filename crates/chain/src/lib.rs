//! Entity lifecycle and custody-transfer core for PharmaTrace.
//!
//! This crate sits between the record types (`pharmatrace-types`) and the
//! ledger runtime boundary (`pharmatrace-runtime`), providing:
//!
//! - Ledger-backed identifier sequences with block reservation
//! - Typed record storage with a fixed set of entity kinds
//! - Hand-maintained composite secondary indexes (owner→drug, batch→drug,
//!   sender/receiver→transfer, transfer→drug)
//! - Caller-identity resolution and organization seeding
//! - Batch and drug lifecycle operations
//! - The custody-transfer workflow state machine
//! - Drug audit trails replayed from the ledger's version history
//!
//! Every public operation executes to completion (or failure) within one
//! logical unit of work. Write-set atomicity at commit is the runtime's
//! contract; mid-invocation states are visible to concurrent readers of
//! the ledger, and the operations are ordered so interrupted work fails
//! toward detectable or superfluous state, never silently missing state.

#![deny(unsafe_code)]

mod batch;
mod drug;
mod error;
mod history;
mod identity;
mod index;
mod organization;
mod sequence;
mod store;
mod transfer;

pub use batch::{all_batches, create_batch, get_batch, update_batch, BatchCreated};
pub use drug::{drugs_owned_by, DrugFilter};
pub use error::{ChainError, Result};
pub use history::drug_history;
pub use identity::current_org;
pub use index::{IndexFamily, IndexManager};
pub use organization::{get_organization, seed_organizations};
pub use sequence::{format_id, next_id, reserve_block, ID_WIDTH};
pub use store::{Record, RecordKind, RecordStore};
pub use transfer::{
    accept_transfer, all_transfers_for, create_transfer, reject_transfer, transfers_for,
    Direction,
};
