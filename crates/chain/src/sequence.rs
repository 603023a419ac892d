//! Ledger-backed identifier sequences.
//!
//! One counter per entity kind lives at a fixed composite key. Every
//! reservation reads the counter, advances it, and persists it before the
//! caller writes any dependent record — a failed operation burns its
//! reserved identifiers instead of allowing reuse on retry.

use std::ops::Range;

use pharmatrace_runtime::{composite_key, Ledger};
use pharmatrace_types::{decode, encode};
use snafu::{OptionExt, ResultExt};

use crate::error::{
    DecodeSnafu, EncodeSnafu, Result, RuntimeSnafu, SequenceExhaustedSnafu,
};
use crate::store::RecordKind;

/// Fixed width of the numeric portion of generated identifiers.
pub const ID_WIDTH: usize = 16;

/// Highest counter value expressible in [`ID_WIDTH`] decimal digits.
const MAX_SEQUENCE: u64 = 9_999_999_999_999_999;

/// Composite family holding the per-kind counters.
const SEQUENCE_FAMILY: &str = "seq";

fn counter_key(kind: RecordKind) -> Result<Vec<u8>> {
    composite_key(SEQUENCE_FAMILY, &[kind.prefix()]).context(RuntimeSnafu)
}

/// Formats a counter value as a fixed-width identifier for `kind`.
pub fn format_id(kind: RecordKind, value: u64) -> String {
    format!("{}{:0width$}", kind.prefix(), value, width = ID_WIDTH)
}

/// Reserves `amount` consecutive identifier values for `kind`.
///
/// The counter is read once and persisted once, covering the whole block,
/// before this function returns — callers creating many records (batch
/// creation) pay a single round-trip and can never hand out a reserved
/// value twice, even if they fail partway through their own writes.
///
/// # Errors
///
/// Returns `ChainError::Decode` for a malformed stored counter (fatal),
/// `ChainError::SequenceExhausted` when the block would pass the
/// sixteen-digit limit, and `ChainError::Runtime` for read/write
/// failures.
pub fn reserve_block<L: Ledger>(
    ledger: &mut L,
    kind: RecordKind,
    amount: u64,
) -> Result<Range<u64>> {
    let key = counter_key(kind)?;

    let current: u64 = match ledger.get(&key).context(RuntimeSnafu)? {
        Some(bytes) => decode(&bytes)
            .context(DecodeSnafu { kind: "sequence counter", id: kind.prefix() })?,
        None => 0,
    };

    let last = current
        .checked_add(amount)
        .filter(|&value| value <= MAX_SEQUENCE)
        .context(SequenceExhaustedSnafu { kind: kind.name() })?;

    let bytes = encode(&last).context(EncodeSnafu)?;
    ledger.put(&key, &bytes).context(RuntimeSnafu)?;

    Ok(current + 1..last + 1)
}

/// Generates the next identifier for `kind`.
///
/// Two consecutive calls yield distinct, strictly increasing identifiers.
///
/// # Errors
///
/// Same failures as [`reserve_block`].
pub fn next_id<L: Ledger>(ledger: &mut L, kind: RecordKind) -> Result<String> {
    let block = reserve_block(ledger, kind, 1)?;
    Ok(format_id(kind, block.start))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pharmatrace_runtime::InMemoryLedger;

    use super::*;
    use crate::error::ChainError;

    #[test]
    fn test_next_id_is_zero_padded() {
        let mut ledger = InMemoryLedger::new();
        let id = next_id(&mut ledger, RecordKind::Batch).expect("next id");
        assert_eq!(id, "B0000000000000001");
        assert_eq!(id.len(), 1 + ID_WIDTH);
    }

    #[test]
    fn test_consecutive_ids_increase() {
        let mut ledger = InMemoryLedger::new();
        let first = next_id(&mut ledger, RecordKind::Batch).expect("next id");
        let second = next_id(&mut ledger, RecordKind::Batch).expect("next id");
        assert_ne!(first, second);
        assert!(second > first, "{second} should sort after {first}");
        assert_eq!(second, "B0000000000000002");
    }

    #[test]
    fn test_kinds_have_independent_counters() {
        let mut ledger = InMemoryLedger::new();
        let batch = next_id(&mut ledger, RecordKind::Batch).expect("next id");
        let drug = next_id(&mut ledger, RecordKind::Drug).expect("next id");
        assert_eq!(batch, "B0000000000000001");
        assert_eq!(drug, "D0000000000000001");
    }

    #[test]
    fn test_reserve_block_is_contiguous() {
        let mut ledger = InMemoryLedger::new();
        let block = reserve_block(&mut ledger, RecordKind::Drug, 5).expect("reserve");
        assert_eq!(block, 1..6);

        // The next reservation starts after the whole block, even though
        // no drug record was ever written for it.
        let next = reserve_block(&mut ledger, RecordKind::Drug, 1).expect("reserve");
        assert_eq!(next, 6..7);
    }

    #[test]
    fn test_reserved_values_survive_abandonment() {
        let mut ledger = InMemoryLedger::new();
        let abandoned = reserve_block(&mut ledger, RecordKind::Drug, 10).expect("reserve");
        drop(abandoned);

        let id = next_id(&mut ledger, RecordKind::Drug).expect("next id");
        assert_eq!(id, "D0000000000000011");
    }

    #[test]
    fn test_malformed_counter_is_fatal_decode_error() {
        use pharmatrace_runtime::Ledger as _;

        let mut ledger = InMemoryLedger::new();
        let key = counter_key(RecordKind::Batch).expect("key");
        ledger.put(&key, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]).expect("raw put");

        let err = next_id(&mut ledger, RecordKind::Batch).unwrap_err();
        assert!(matches!(err, ChainError::Decode { kind: "sequence counter", .. }));
    }

    #[test]
    fn test_sequence_exhaustion() {
        use pharmatrace_runtime::Ledger as _;

        let mut ledger = InMemoryLedger::new();
        let key = counter_key(RecordKind::Drug).expect("key");
        let bytes = encode(&MAX_SEQUENCE).expect("encode");
        ledger.put(&key, &bytes).expect("raw put");

        let err = next_id(&mut ledger, RecordKind::Drug).unwrap_err();
        assert!(matches!(err, ChainError::SequenceExhausted { kind: "drug" }));
    }

    #[test]
    fn test_format_id_width() {
        assert_eq!(format_id(RecordKind::Transfer, 42), "T0000000000000042");
        assert_eq!(format_id(RecordKind::Drug, MAX_SEQUENCE), "D9999999999999999");
    }
}
