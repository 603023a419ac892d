//! Custody-transfer workflow.
//!
//! Transfers move through `Pending → {Accepted, Rejected}`; both outcomes
//! are terminal. Creation follows a two-phase discipline — every named
//! drug is validated before any record is mutated — and resolution writes
//! the Transfer record last, so an interrupted resolution is detectable
//! as drugs in their resolved state under a still-Pending transfer.

use std::collections::HashSet;

use pharmatrace_runtime::Ledger;
use pharmatrace_types::{
    validation, Drug, OrgId, Organization, Transfer, TransferCreate, TransferDecision,
    TransferId, TransferStatus, ValidationError,
};
use snafu::{ensure, ResultExt};

use crate::error::{
    AlreadyResolvedSnafu, AlreadyTransferredSnafu, ChainError, CorruptIndexSnafu,
    InvalidRequestSnafu, NotOwnerSnafu, Result, UnauthorizedSnafu,
};
use crate::index::{IndexFamily, IndexManager};
use crate::organization;
use crate::sequence;
use crate::store::{RecordKind, RecordStore};

/// Direction of a transfer relative to an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Transfers the organization proposed.
    Outgoing,
    /// Transfers addressed to the organization.
    Incoming,
}

impl Direction {
    const fn family(self) -> IndexFamily {
        match self {
            Self::Outgoing => IndexFamily::SenderTransfer,
            Self::Incoming => IndexFamily::ReceiverTransfer,
        }
    }
}

/// Proposes a custody transfer of the named drugs to a receiver.
///
/// Phase one validates everything — the receiver exists, every drug
/// exists, is unclaimed, and is owned by the caller — before phase two
/// mutates anything. A precondition failure therefore never leaves
/// partially-claimed drugs behind.
///
/// # Errors
///
/// Returns `ChainError::InvalidRequest` for an empty drug list,
/// `ChainError::NotFound` for an unknown receiver or drug,
/// `ChainError::AlreadyTransferred` when a drug is claimed by a pending
/// transfer, and `ChainError::NotOwner` when the caller does not own a
/// drug.
pub fn create_transfer<L: Ledger>(
    ledger: &mut L,
    caller: &Organization,
    request: &TransferCreate,
) -> Result<Transfer> {
    validation::validate_transfer_create(request).context(InvalidRequestSnafu)?;
    // A self-transfer would make the acceptance-time owner-index
    // reassignment remove the entry it just added.
    if request.receiver_id == caller.id {
        return Err(ChainError::InvalidRequest { source: ValidationError::SelfTransfer });
    }
    organization::get_organization(ledger, &request.receiver_id)?;

    // Phase one: validate every drug before mutating anything.
    let mut drugs = Vec::with_capacity(request.drug_ids.len());
    for drug_id in &request.drug_ids {
        let drug: Drug = RecordStore::get(ledger, drug_id.as_str())?;
        ensure!(!drug.is_transferred, AlreadyTransferredSnafu { drug_id: drug.id.clone() });
        ensure!(
            drug.owner_id == caller.id,
            NotOwnerSnafu { drug_id: drug.id.clone(), claimed_owner: caller.id.clone() }
        );
        drugs.push(drug);
    }

    // Phase two: persist the transfer, its direction indexes, then claim
    // each validated drug.
    let transfer_id = TransferId::new(sequence::next_id(ledger, RecordKind::Transfer)?);
    let transfer = Transfer {
        id: transfer_id.clone(),
        sender_id: caller.id.clone(),
        receiver_id: request.receiver_id.clone(),
        transfer_date: request.transfer_date,
        status: TransferStatus::Pending,
        receive_date: None,
    };
    RecordStore::put(ledger, &transfer)?;
    IndexManager::add(
        ledger,
        IndexFamily::SenderTransfer,
        &[caller.id.as_str(), transfer_id.as_str()],
    )?;
    IndexManager::add(
        ledger,
        IndexFamily::ReceiverTransfer,
        &[request.receiver_id.as_str(), transfer_id.as_str()],
    )?;

    for mut drug in drugs {
        drug.is_transferred = true;
        drug.transfer_id = Some(transfer_id.clone());
        RecordStore::put(ledger, &drug)?;
        IndexManager::add(
            ledger,
            IndexFamily::TransferDrug,
            &[transfer_id.as_str(), drug.id.as_str()],
        )?;
    }

    tracing::info!(
        transfer_id = %transfer.id,
        sender = %transfer.sender_id,
        receiver = %transfer.receiver_id,
        drugs = request.drug_ids.len(),
        "created transfer"
    );
    Ok(transfer)
}

/// Accepts a pending transfer, moving drug ownership to the receiver.
///
/// Per drug, the receiver's owner→drug entry is added before the
/// sender's is removed, so an interrupted reassignment fails toward a
/// superfluous entry rather than a missing one. The transfer→drug entry
/// is retained and `Drug.transfer_id` keeps the resolved transfer's ID
/// as provenance. The Transfer record is written last.
///
/// # Errors
///
/// Returns `ChainError::Unauthorized` when the caller is not the
/// receiver and `ChainError::AlreadyResolved` when the transfer already
/// reached a terminal state; neither mutates any record.
pub fn accept_transfer<L: Ledger>(
    ledger: &mut L,
    caller: &Organization,
    decision: &TransferDecision,
) -> Result<Transfer> {
    let mut transfer: Transfer = RecordStore::get(ledger, decision.transfer_id.as_str())?;
    ensure!(
        transfer.receiver_id == caller.id,
        UnauthorizedSnafu { org: caller.id.clone(), action: "accept this transfer" }
    );
    ensure!(
        !transfer.status.is_resolved(),
        AlreadyResolvedSnafu { transfer_id: transfer.id.clone() }
    );

    let claimed = claimed_drug_ids(ledger, &transfer.id)?;
    for drug_id in &claimed {
        let mut drug: Drug = RecordStore::get(ledger, drug_id)?;
        IndexManager::add(
            ledger,
            IndexFamily::OwnerDrug,
            &[caller.id.as_str(), drug_id.as_str()],
        )?;
        IndexManager::remove(
            ledger,
            IndexFamily::OwnerDrug,
            &[drug.owner_id.as_str(), drug_id.as_str()],
        )?;
        drug.owner_id = caller.id.clone();
        drug.location = caller.location.clone();
        drug.is_transferred = false;
        RecordStore::put(ledger, &drug)?;
    }

    transfer.status = TransferStatus::Accepted;
    transfer.receive_date = Some(decision.receive_date);
    RecordStore::put(ledger, &transfer)?;

    tracing::info!(transfer_id = %transfer.id, drugs = claimed.len(), "accepted transfer");
    Ok(transfer)
}

/// Rejects a pending transfer, releasing the drugs back to the sender.
///
/// Per drug, the claim flag and `transfer_id` are cleared and the
/// transfer→drug entry removed — a rejected transfer no longer claims
/// its drugs. Ownership and location stay with the sender. The Transfer
/// record is written last.
///
/// # Errors
///
/// Same preconditions as [`accept_transfer`].
pub fn reject_transfer<L: Ledger>(
    ledger: &mut L,
    caller: &Organization,
    decision: &TransferDecision,
) -> Result<Transfer> {
    let mut transfer: Transfer = RecordStore::get(ledger, decision.transfer_id.as_str())?;
    ensure!(
        transfer.receiver_id == caller.id,
        UnauthorizedSnafu { org: caller.id.clone(), action: "reject this transfer" }
    );
    ensure!(
        !transfer.status.is_resolved(),
        AlreadyResolvedSnafu { transfer_id: transfer.id.clone() }
    );

    let claimed = claimed_drug_ids(ledger, &transfer.id)?;
    for drug_id in &claimed {
        let mut drug: Drug = RecordStore::get(ledger, drug_id)?;
        drug.is_transferred = false;
        drug.transfer_id = None;
        RecordStore::put(ledger, &drug)?;
        IndexManager::remove(
            ledger,
            IndexFamily::TransferDrug,
            &[transfer.id.as_str(), drug_id.as_str()],
        )?;
    }

    transfer.status = TransferStatus::Rejected;
    transfer.receive_date = Some(decision.receive_date);
    RecordStore::put(ledger, &transfer)?;

    tracing::info!(transfer_id = %transfer.id, drugs = claimed.len(), "rejected transfer");
    Ok(transfer)
}

/// Returns the transfers for `org` in the given direction.
///
/// # Errors
///
/// Returns `ChainError::CorruptIndex` for a malformed index entry and
/// the usual scan/store failures.
pub fn transfers_for<L: Ledger>(
    ledger: &L,
    org: &OrgId,
    direction: Direction,
) -> Result<Vec<Transfer>> {
    let family = direction.family();
    let entries = IndexManager::collect(ledger, family, &[org.as_str()])?;

    let mut transfers = Vec::with_capacity(entries.len());
    for parts in entries {
        if parts.len() != 2 {
            return CorruptIndexSnafu { family: family.name(), parts }.fail();
        }
        transfers.push(RecordStore::get(ledger, &parts[1])?);
    }
    Ok(transfers)
}

/// Returns every transfer touching `org`, outgoing and incoming,
/// deduplicated by identifier.
///
/// # Errors
///
/// Same failures as [`transfers_for`].
pub fn all_transfers_for<L: Ledger>(ledger: &L, org: &OrgId) -> Result<Vec<Transfer>> {
    let mut transfers = transfers_for(ledger, org, Direction::Outgoing)?;
    let mut seen: HashSet<TransferId> =
        transfers.iter().map(|transfer| transfer.id.clone()).collect();

    for transfer in transfers_for(ledger, org, Direction::Incoming)? {
        if seen.insert(transfer.id.clone()) {
            transfers.push(transfer);
        }
    }
    Ok(transfers)
}

/// Drains the transfer→drug cursor for `transfer_id` into drug
/// identifiers, before the caller starts mutating records.
fn claimed_drug_ids<L: Ledger>(ledger: &L, transfer_id: &TransferId) -> Result<Vec<String>> {
    let entries =
        IndexManager::collect(ledger, IndexFamily::TransferDrug, &[transfer_id.as_str()])?;

    let mut drug_ids = Vec::with_capacity(entries.len());
    for mut parts in entries {
        if parts.len() != 2 {
            return CorruptIndexSnafu { family: IndexFamily::TransferDrug.name(), parts }.fail();
        }
        drug_ids.push(parts.swap_remove(1));
    }
    Ok(drug_ids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pharmatrace_test_utils::{day, distributor, manufacturer, pharmacy, seeded_ledger};
    use pharmatrace_runtime::InMemoryLedger;
    use pharmatrace_types::{BatchCreate, DrugId};

    use super::*;
    use crate::batch::create_batch;
    use crate::error::ChainError;

    fn aspirin(amount: u64) -> BatchCreate {
        BatchCreate {
            drug_name: "Aspirin".to_owned(),
            production_date: day(2025, 4, 1),
            expiry_date: day(2027, 4, 1),
            amount,
        }
    }

    /// Seeds orgs, creates a batch of `amount` drugs, and proposes a
    /// transfer of all of them from the manufacturer to the pharmacy.
    fn pending_transfer(amount: u64) -> (InMemoryLedger, Vec<DrugId>, Transfer) {
        let mut ledger = seeded_ledger();
        let sender = manufacturer();
        let created = create_batch(&mut ledger, &sender, &aspirin(amount)).expect("batch");

        let request = TransferCreate {
            receiver_id: pharmacy().id,
            drug_ids: created.drug_ids.clone(),
            transfer_date: day(2025, 4, 7),
        };
        let transfer = create_transfer(&mut ledger, &sender, &request).expect("transfer");
        (ledger, created.drug_ids, transfer)
    }

    #[test]
    fn test_create_transfer_claims_drugs() {
        let (ledger, drug_ids, transfer) = pending_transfer(3);

        assert_eq!(transfer.status, TransferStatus::Pending);
        assert!(transfer.receive_date.is_none());

        for drug_id in &drug_ids {
            let drug: Drug = RecordStore::get(&ledger, drug_id.as_str()).expect("get");
            assert!(drug.is_transferred);
            assert_eq!(drug.transfer_id.as_ref(), Some(&transfer.id));
            // Ownership does not move until acceptance.
            assert_eq!(drug.owner_id, manufacturer().id);
        }

        let claimed = claimed_drug_ids(&ledger, &transfer.id).expect("claimed");
        assert_eq!(claimed.len(), 3);
    }

    #[test]
    fn test_create_transfer_on_claimed_drug_fails_without_mutation() {
        let (mut ledger, drug_ids, _) = pending_transfer(2);
        let sender = manufacturer();

        let request = TransferCreate {
            receiver_id: distributor().id,
            drug_ids: drug_ids.clone(),
            transfer_date: day(2025, 4, 8),
        };
        let err = create_transfer(&mut ledger, &sender, &request).unwrap_err();
        assert!(matches!(err, ChainError::AlreadyTransferred { .. }), "unexpected error: {err}");

        // No second transfer record or index entry appeared.
        let outgoing =
            transfers_for(&ledger, &sender.id, Direction::Outgoing).expect("query");
        assert_eq!(outgoing.len(), 1);
    }

    #[test]
    fn test_create_transfer_not_owner_mutates_nothing() {
        let mut ledger = seeded_ledger();
        let created =
            create_batch(&mut ledger, &manufacturer(), &aspirin(2)).expect("batch");

        // The distributor does not own these drugs.
        let request = TransferCreate {
            receiver_id: pharmacy().id,
            drug_ids: created.drug_ids.clone(),
            transfer_date: day(2025, 4, 7),
        };
        let err = create_transfer(&mut ledger, &distributor(), &request).unwrap_err();
        assert!(matches!(err, ChainError::NotOwner { .. }), "unexpected error: {err}");

        for drug_id in &created.drug_ids {
            let drug: Drug = RecordStore::get(&ledger, drug_id.as_str()).expect("get");
            assert!(!drug.is_transferred, "no drug should have been claimed");
        }
    }

    #[test]
    fn test_self_transfer_rejected() {
        let mut ledger = seeded_ledger();
        let sender = manufacturer();
        let created = create_batch(&mut ledger, &sender, &aspirin(1)).expect("batch");

        let request = TransferCreate {
            receiver_id: sender.id.clone(),
            drug_ids: created.drug_ids,
            transfer_date: day(2025, 4, 7),
        };
        let err = create_transfer(&mut ledger, &sender, &request).unwrap_err();
        assert!(matches!(err, ChainError::InvalidRequest { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_create_transfer_unknown_receiver() {
        let mut ledger = seeded_ledger();
        let created =
            create_batch(&mut ledger, &manufacturer(), &aspirin(1)).expect("batch");

        let request = TransferCreate {
            receiver_id: "Ghost".into(),
            drug_ids: created.drug_ids,
            transfer_date: day(2025, 4, 7),
        };
        let err = create_transfer(&mut ledger, &manufacturer(), &request).unwrap_err();
        assert!(matches!(err, ChainError::NotFound { kind: "organization", .. }));
    }

    #[test]
    fn test_accept_moves_ownership_and_location() {
        let (mut ledger, drug_ids, transfer) = pending_transfer(3);
        let receiver = pharmacy();

        let decision =
            TransferDecision { transfer_id: transfer.id.clone(), receive_date: day(2025, 4, 10) };
        let accepted = accept_transfer(&mut ledger, &receiver, &decision).expect("accept");

        assert_eq!(accepted.status, TransferStatus::Accepted);
        assert_eq!(accepted.receive_date, Some(day(2025, 4, 10)));

        for drug_id in &drug_ids {
            let drug: Drug = RecordStore::get(&ledger, drug_id.as_str()).expect("get");
            assert_eq!(drug.owner_id, receiver.id);
            assert_eq!(drug.location, receiver.location);
            assert!(!drug.is_transferred);
            // Provenance: the resolved transfer stays on the drug.
            assert_eq!(drug.transfer_id.as_ref(), Some(&transfer.id));
        }

        // Exactly one owner→drug entry per drug, under the receiver.
        let receiver_entries =
            IndexManager::collect(&ledger, IndexFamily::OwnerDrug, &[receiver.id.as_str()])
                .expect("scan");
        assert_eq!(receiver_entries.len(), 3);
        let sender_entries = IndexManager::collect(
            &ledger,
            IndexFamily::OwnerDrug,
            &[manufacturer().id.as_str()],
        )
        .expect("scan");
        assert!(sender_entries.is_empty());

        // The transfer→drug entries are retained after acceptance.
        let claimed = claimed_drug_ids(&ledger, &transfer.id).expect("claimed");
        assert_eq!(claimed.len(), 3);
    }

    #[test]
    fn test_accept_by_non_receiver_changes_nothing() {
        let (mut ledger, drug_ids, transfer) = pending_transfer(2);

        let decision =
            TransferDecision { transfer_id: transfer.id.clone(), receive_date: day(2025, 4, 10) };
        let err = accept_transfer(&mut ledger, &distributor(), &decision).unwrap_err();
        assert!(matches!(err, ChainError::Unauthorized { .. }), "unexpected error: {err}");

        let read: Transfer = RecordStore::get(&ledger, transfer.id.as_str()).expect("get");
        assert_eq!(read.status, TransferStatus::Pending);
        for drug_id in &drug_ids {
            let drug: Drug = RecordStore::get(&ledger, drug_id.as_str()).expect("get");
            assert_eq!(drug.owner_id, manufacturer().id);
            assert!(drug.is_transferred);
        }
    }

    #[test]
    fn test_reject_releases_drugs_to_sender() {
        let (mut ledger, drug_ids, transfer) = pending_transfer(2);
        let receiver = pharmacy();
        let sender = manufacturer();

        let decision =
            TransferDecision { transfer_id: transfer.id.clone(), receive_date: day(2025, 4, 10) };
        let rejected = reject_transfer(&mut ledger, &receiver, &decision).expect("reject");

        assert_eq!(rejected.status, TransferStatus::Rejected);
        assert_eq!(rejected.receive_date, Some(day(2025, 4, 10)));

        for drug_id in &drug_ids {
            let drug: Drug = RecordStore::get(&ledger, drug_id.as_str()).expect("get");
            assert_eq!(drug.owner_id, sender.id, "ownership stays with the sender");
            assert_eq!(drug.location, sender.location);
            assert!(!drug.is_transferred);
            // A rejected transfer no longer marks the drug.
            assert!(drug.transfer_id.is_none());
        }

        // The rejected transfer no longer claims any drug.
        let claimed = claimed_drug_ids(&ledger, &transfer.id).expect("claimed");
        assert!(claimed.is_empty());
    }

    #[test]
    fn test_resolved_transfers_are_terminal() {
        let (mut ledger, _, transfer) = pending_transfer(1);
        let receiver = pharmacy();
        let decision =
            TransferDecision { transfer_id: transfer.id.clone(), receive_date: day(2025, 4, 10) };

        accept_transfer(&mut ledger, &receiver, &decision).expect("accept");

        let err = reject_transfer(&mut ledger, &receiver, &decision).unwrap_err();
        assert!(matches!(err, ChainError::AlreadyResolved { .. }), "unexpected error: {err}");
        let err = accept_transfer(&mut ledger, &receiver, &decision).unwrap_err();
        assert!(matches!(err, ChainError::AlreadyResolved { .. }), "unexpected error: {err}");

        let read: Transfer = RecordStore::get(&ledger, transfer.id.as_str()).expect("get");
        assert_eq!(read.status, TransferStatus::Accepted);
    }

    #[test]
    fn test_rejected_drugs_can_be_retransferred() {
        let (mut ledger, drug_ids, transfer) = pending_transfer(1);
        let receiver = pharmacy();
        let sender = manufacturer();

        let decision =
            TransferDecision { transfer_id: transfer.id.clone(), receive_date: day(2025, 4, 10) };
        reject_transfer(&mut ledger, &receiver, &decision).expect("reject");

        // The released drug can go out again, to a different receiver.
        let request = TransferCreate {
            receiver_id: distributor().id,
            drug_ids,
            transfer_date: day(2025, 4, 11),
        };
        let second = create_transfer(&mut ledger, &sender, &request).expect("transfer");
        assert_eq!(second.status, TransferStatus::Pending);
        assert_ne!(second.id, transfer.id);
    }

    #[test]
    fn test_direction_queries() {
        let (ledger, _, transfer) = pending_transfer(1);
        let sender = manufacturer();
        let receiver = pharmacy();

        let outgoing =
            transfers_for(&ledger, &sender.id, Direction::Outgoing).expect("query");
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].id, transfer.id);

        let incoming =
            transfers_for(&ledger, &receiver.id, Direction::Incoming).expect("query");
        assert_eq!(incoming.len(), 1);

        assert!(transfers_for(&ledger, &sender.id, Direction::Incoming)
            .expect("query")
            .is_empty());

        let all = all_transfers_for(&ledger, &sender.id).expect("query");
        assert_eq!(all.len(), 1);
    }
}
