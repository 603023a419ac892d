//! Ledger runtime boundary for PharmaTrace.
//!
//! The custody-tracking core runs on top of an externally supplied
//! append-only key-value ledger. This crate defines that boundary:
//!
//! - The [`Ledger`] trait with the exact primitives the core consumes:
//!   point read/write/delete, ordered range scan, composite-key prefix
//!   scan, per-key history scan, and caller identity
//! - The composite-key codec used for secondary-index keys
//! - [`VersionRecord`], one replayed historical version of a key
//! - [`InMemoryLedger`], a deterministic implementation for tests
//!
//! Durable storage, commit ordering, and conflict detection across
//! concurrent submissions belong to the real runtime behind this trait;
//! the core assumes each invocation's write-set commits atomically and
//! never re-checks it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod key;
mod memory;

pub use key::{
    composite_key, composite_prefix_range, namespace_range, split_composite_key,
};
pub use memory::InMemoryLedger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Errors surfaced by a ledger runtime implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LedgerError {
    /// Underlying get/put/delete/scan operation failed.
    #[snafu(display("Ledger backend error: {message}"))]
    Backend {
        /// Backend-supplied failure description.
        message: String,
    },

    /// The runtime has no caller identity for this invocation.
    #[snafu(display("No caller identity available for this invocation"))]
    NoCallerIdentity,

    /// A composite key part contained the reserved separator byte.
    #[snafu(display("Composite key part contains the separator: {part:?}"))]
    InvalidKeyPart {
        /// The offending part value.
        part: String,
    },

    /// A stored key could not be decomposed into composite parts.
    #[snafu(display("Malformed composite key: {key:?}"))]
    MalformedCompositeKey {
        /// The raw key bytes.
        key: Vec<u8>,
    },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// One historical version of a key, as replayed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Transaction that committed this version.
    pub tx_id: String,
    /// Commit timestamp of that transaction.
    pub timestamp: DateTime<Utc>,
    /// Value bytes at this version; `None` for a deletion tombstone.
    pub value: Option<Vec<u8>>,
    /// Whether this version is a deletion tombstone.
    pub is_delete: bool,
}

/// Lazy cursor over `(key, value)` pairs from a range or prefix scan.
///
/// The cursor borrows the ledger, so the borrow checker forces callers to
/// drain or drop it before issuing writes; dropping it releases the
/// runtime-side iterator state on every exit path.
pub type ScanCursor<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + 'a>;

/// Lazy cursor over the historical versions of a single key.
pub type HistoryCursor<'a> = Box<dyn Iterator<Item = Result<VersionRecord>> + 'a>;

/// An externally supplied append-only key-value ledger.
///
/// Mutating methods take `&mut self`: each invocation of the core runs
/// single-threaded to completion, and concurrency across invocations is
/// the runtime's concern at commit time.
pub trait Ledger {
    /// Returns the opaque identity token of the invoking caller.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoCallerIdentity`] when the runtime has no
    /// identity bound to the current invocation.
    fn caller(&self) -> Result<String>;

    /// Point read. `Ok(None)` means the key is absent from world state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the read fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Point write. Fully overwrites any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the write fails.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Point delete. Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the delete fails.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Ordered scan over world-state keys in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the scan cannot be opened;
    /// per-item errors surface through the cursor.
    fn range_scan<'a>(&'a self, start: &[u8], end: &[u8]) -> Result<ScanCursor<'a>>;

    /// Replays the version history of a single key, in the order the
    /// runtime defines. [`InMemoryLedger`] yields oldest-first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the history cannot be opened.
    fn history_scan<'a>(&'a self, key: &[u8]) -> Result<HistoryCursor<'a>>;

    /// Enumerates composite keys sharing an index family and leading
    /// parts. Implemented over [`Ledger::range_scan`] using the
    /// composite-key prefix range.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidKeyPart`] if a part contains the
    /// separator, or any error from the underlying range scan.
    fn prefix_scan<'a>(&'a self, family: &str, parts: &[&str]) -> Result<ScanCursor<'a>> {
        let (start, end) = key::composite_prefix_range(family, parts)?;
        self.range_scan(&start, &end)
    }
}
