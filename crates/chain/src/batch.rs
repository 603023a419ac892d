//! Batch lifecycle: creation, updates, and namespace queries.

use pharmatrace_runtime::{namespace_range, Ledger};
use pharmatrace_types::{
    decode, validation, Batch, BatchCreate, BatchId, BatchUpdate, Drug, DrugId, OrgKind,
    Organization,
};
use snafu::{ensure, ResultExt};

use crate::error::{DecodeSnafu, InvalidRequestSnafu, Result, RuntimeSnafu, UnauthorizedSnafu};
use crate::index::{IndexFamily, IndexManager};
use crate::sequence;
use crate::store::{RecordKind, RecordStore};

/// A batch together with the drug units created alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCreated {
    /// The persisted batch record.
    pub batch: Batch,
    /// Identifiers of the drugs created for the batch, in sequence order.
    pub drug_ids: Vec<DrugId>,
}

/// Creates a batch and its drug units.
///
/// Only a manufacturer may create batches. The whole drug identifier
/// block is reserved — counter persisted — before any record lands, so a
/// failure partway through drug creation can never lead to identifier
/// reuse on retry. Each drug starts owned by the caller at the caller's
/// location, with its batch→drug and owner→drug index entries.
///
/// # Errors
///
/// Returns `ChainError::Unauthorized` for a non-manufacturer caller,
/// `ChainError::InvalidRequest` for a malformed request, and the usual
/// sequence/store failures.
pub fn create_batch<L: Ledger>(
    ledger: &mut L,
    caller: &Organization,
    request: &BatchCreate,
) -> Result<BatchCreated> {
    ensure!(
        caller.kind == OrgKind::Manufacturer,
        UnauthorizedSnafu { org: caller.id.clone(), action: "create a batch" }
    );
    validation::validate_batch_create(request).context(InvalidRequestSnafu)?;

    let batch_id = BatchId::new(sequence::next_id(ledger, RecordKind::Batch)?);
    let block = sequence::reserve_block(ledger, RecordKind::Drug, request.amount)?;

    let batch = Batch {
        id: batch_id.clone(),
        drug_name: request.drug_name.clone(),
        manufacturer_name: caller.name.clone(),
        manufacture_location: caller.location.clone(),
        production_date: request.production_date,
        expiry_date: request.expiry_date,
    };
    RecordStore::put(ledger, &batch)?;

    let mut drug_ids = Vec::with_capacity(request.amount as usize);
    for value in block {
        let drug_id = DrugId::new(sequence::format_id(RecordKind::Drug, value));
        let drug = Drug {
            id: drug_id.clone(),
            batch_id: batch_id.clone(),
            owner_id: caller.id.clone(),
            location: caller.location.clone(),
            is_transferred: false,
            transfer_id: None,
        };
        RecordStore::put(ledger, &drug)?;
        IndexManager::add(
            ledger,
            IndexFamily::BatchDrug,
            &[batch_id.as_str(), drug_id.as_str()],
        )?;
        IndexManager::add(
            ledger,
            IndexFamily::OwnerDrug,
            &[caller.id.as_str(), drug_id.as_str()],
        )?;
        drug_ids.push(drug_id);
    }

    tracing::info!(
        batch_id = %batch.id,
        manufacturer = %caller.id,
        amount = request.amount,
        "created batch"
    );
    Ok(BatchCreated { batch, drug_ids })
}

/// Updates a batch's mutable fields (drug name and dates).
///
/// Only the manufacturer that produced the batch may update it.
///
/// # Errors
///
/// Returns `ChainError::NotFound` for an unknown batch and
/// `ChainError::Unauthorized` when the caller is not the producing
/// manufacturer.
pub fn update_batch<L: Ledger>(
    ledger: &mut L,
    caller: &Organization,
    request: &BatchUpdate,
) -> Result<Batch> {
    ensure!(
        caller.kind == OrgKind::Manufacturer,
        UnauthorizedSnafu { org: caller.id.clone(), action: "update a batch" }
    );

    let mut batch: Batch = RecordStore::get(ledger, request.batch_id.as_str())?;
    ensure!(
        batch.manufacturer_name == caller.name,
        UnauthorizedSnafu { org: caller.id.clone(), action: "update another manufacturer's batch" }
    );

    batch.drug_name = request.drug_name.clone();
    batch.production_date = request.production_date;
    batch.expiry_date = request.expiry_date;
    RecordStore::put(ledger, &batch)?;

    tracing::debug!(batch_id = %batch.id, "updated batch");
    Ok(batch)
}

/// Reads a batch by identifier.
///
/// # Errors
///
/// Returns `ChainError::NotFound` when the batch is absent.
pub fn get_batch<L: Ledger>(ledger: &L, id: &BatchId) -> Result<Batch> {
    RecordStore::get(ledger, id.as_str())
}

/// Range-scans the whole batch namespace.
///
/// Bounded only by the number of batches; the scan runs to completion or
/// fails outright.
///
/// # Errors
///
/// Returns `ChainError::Runtime` for scan failures and
/// `ChainError::Decode` if any stored batch is corrupt.
pub fn all_batches<L: Ledger>(ledger: &L) -> Result<Vec<Batch>> {
    let (start, end) = namespace_range(RecordKind::Batch.prefix());
    let cursor = ledger.range_scan(&start, &end).context(RuntimeSnafu)?;

    let mut batches = Vec::new();
    for item in cursor {
        let (key, value) = item.context(RuntimeSnafu)?;
        let batch: Batch = decode(&value).context(DecodeSnafu {
            kind: RecordKind::Batch.name(),
            id: String::from_utf8_lossy(&key).into_owned(),
        })?;
        batches.push(batch);
    }
    Ok(batches)
}
