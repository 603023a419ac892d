//! Request payloads accepted by the public operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{BatchId, DrugId, OrgId, TransferId};

/// Request to create a batch and its drug units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCreate {
    /// Name of the drug produced in this batch.
    pub drug_name: String,
    /// Date the batch was produced.
    pub production_date: DateTime<Utc>,
    /// Expiry date for every drug in the batch.
    pub expiry_date: DateTime<Utc>,
    /// Number of drug units to create.
    pub amount: u64,
}

/// Request to update a batch's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdate {
    /// Batch to update.
    pub batch_id: BatchId,
    /// New drug name.
    pub drug_name: String,
    /// New production date.
    pub production_date: DateTime<Utc>,
    /// New expiry date.
    pub expiry_date: DateTime<Utc>,
}

/// Request to propose a custody transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCreate {
    /// Organization asked to accept the transfer.
    pub receiver_id: OrgId,
    /// Drugs to move. All must be owned by the sender and unclaimed.
    pub drug_ids: Vec<DrugId>,
    /// Date the transfer is proposed.
    pub transfer_date: DateTime<Utc>,
}

/// Request to accept or reject a pending transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDecision {
    /// Transfer to resolve.
    pub transfer_id: TransferId,
    /// Date the receiver made the decision.
    pub receive_date: DateTime<Utc>,
}
