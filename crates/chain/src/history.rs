//! Drug audit-trail queries over the ledger's version history.

use pharmatrace_runtime::Ledger;
use pharmatrace_types::{decode, Drug, DrugHistoryEntry, DrugId};
use snafu::ResultExt;

use crate::error::{DecodeSnafu, Result, RuntimeSnafu};
use crate::store::RecordKind;

/// Replays the full version history of a drug key into an audit trail.
///
/// Entries come back in the order the runtime defines for its history
/// cursor — a runtime guarantee, not re-derived here; the in-memory
/// runtime yields oldest-first. Tombstone versions carry no value bytes
/// and surface as [`Drug::placeholder`] entries with `is_delete` set.
///
/// # Errors
///
/// Returns `ChainError::Runtime` for history-cursor failures and
/// `ChainError::Decode` if a non-tombstone version holds corrupt bytes.
pub fn drug_history<L: Ledger>(ledger: &L, drug_id: &DrugId) -> Result<Vec<DrugHistoryEntry>> {
    let cursor = ledger.history_scan(drug_id.as_str().as_bytes()).context(RuntimeSnafu)?;

    let mut entries = Vec::new();
    for item in cursor {
        let version = item.context(RuntimeSnafu)?;
        let record = match &version.value {
            Some(bytes) => decode(bytes)
                .context(DecodeSnafu { kind: RecordKind::Drug.name(), id: drug_id.as_str() })?,
            None => Drug::placeholder(drug_id.clone()),
        };
        entries.push(DrugHistoryEntry {
            record,
            tx_id: version.tx_id,
            timestamp: version.timestamp,
            is_delete: version.is_delete,
        });
    }
    Ok(entries)
}
