//! Composite secondary indexes.
//!
//! The ledger runtime has no native secondary indexes, so reverse lookups
//! (owner→drug, batch→drug, sender/receiver→transfer, transfer→drug) are
//! maintained by hand: every entry is a zero-payload marker record at a
//! composite key, written and deleted as a side effect of the primary
//! record mutation it mirrors.
//!
//! Reassigning an indexed relationship is not atomic across the
//! remove+add pair at this layer. Callers sequence the add before the
//! delete of the stale entry, so an interrupted reassignment leaves a
//! superfluous entry rather than a missing one.

use pharmatrace_runtime::{composite_key, Ledger};
use snafu::ResultExt;

use crate::error::{Result, RuntimeSnafu};

/// Marker byte stored under every index entry. The entry's existence is
/// the fact; the value carries no payload.
const INDEX_MARKER: [u8; 1] = [0x00];

/// Closed set of index families maintained by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFamily {
    /// `(owner_id, drug_id)` — drugs currently held by an organization.
    OwnerDrug,
    /// `(batch_id, drug_id)` — drugs produced in a batch.
    BatchDrug,
    /// `(sender_id, transfer_id)` — transfers proposed by an organization.
    SenderTransfer,
    /// `(receiver_id, transfer_id)` — transfers addressed to an
    /// organization.
    ReceiverTransfer,
    /// `(transfer_id, drug_id)` — drugs a transfer claims (pending) or
    /// moved (accepted).
    TransferDrug,
}

impl IndexFamily {
    /// Composite-key family name on the ledger.
    pub const fn name(self) -> &'static str {
        match self {
            Self::OwnerDrug => "owner~drug",
            Self::BatchDrug => "batch~drug",
            Self::SenderTransfer => "sender~transfer",
            Self::ReceiverTransfer => "receiver~transfer",
            Self::TransferDrug => "transfer~drug",
        }
    }
}

/// Maintains composite index entries and answers prefix lookups.
pub struct IndexManager;

impl IndexManager {
    /// Writes the marker entry for `parts`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Runtime` if key construction or the write
    /// fails.
    pub fn add<L: Ledger>(ledger: &mut L, family: IndexFamily, parts: &[&str]) -> Result<()> {
        let key = composite_key(family.name(), parts).context(RuntimeSnafu)?;
        ledger.put(&key, &INDEX_MARKER).context(RuntimeSnafu)
    }

    /// Deletes the marker entry for `parts`. Removing an absent entry is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Runtime` if key construction or the delete
    /// fails.
    pub fn remove<L: Ledger>(ledger: &mut L, family: IndexFamily, parts: &[&str]) -> Result<()> {
        let key = composite_key(family.name(), parts).context(RuntimeSnafu)?;
        ledger.delete(&key).context(RuntimeSnafu)
    }

    /// Lazily enumerates the full part tuples of every entry extending
    /// `prefix_parts`, in key order.
    ///
    /// The cursor borrows the ledger; drain or drop it before issuing
    /// writes. Dropping it on any exit path releases the runtime-side
    /// cursor.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Runtime` if the scan cannot be opened;
    /// per-entry failures surface through the iterator.
    pub fn scan<'a, L: Ledger>(
        ledger: &'a L,
        family: IndexFamily,
        prefix_parts: &[&str],
    ) -> Result<impl Iterator<Item = Result<Vec<String>>> + 'a> {
        let cursor = ledger.prefix_scan(family.name(), prefix_parts).context(RuntimeSnafu)?;
        Ok(cursor.map(|item| {
            let (key, _marker) = item.context(RuntimeSnafu)?;
            let (_family, parts) =
                pharmatrace_runtime::split_composite_key(&key).context(RuntimeSnafu)?;
            Ok(parts)
        }))
    }

    /// Drains a prefix scan into a vector of part tuples.
    ///
    /// Convenience for the common pattern of collecting every match
    /// before mutating the records they point at.
    ///
    /// # Errors
    ///
    /// Same failures as [`IndexManager::scan`].
    pub fn collect<L: Ledger>(
        ledger: &L,
        family: IndexFamily,
        prefix_parts: &[&str],
    ) -> Result<Vec<Vec<String>>> {
        Self::scan(ledger, family, prefix_parts)?.collect()
    }
}
