//! Typed record storage over the ledger runtime.
//!
//! Records are keyed by their identifier directly; the identifier's kind
//! prefix doubles as the namespace for range scans. Serialization goes
//! through the centralized codec so corrupt bytes always surface as a
//! decode failure distinct from an absent key.

use pharmatrace_runtime::Ledger;
use pharmatrace_types::{decode, encode, Batch, Drug, Organization, Transfer};
use serde::{de::DeserializeOwned, Serialize};
use snafu::{OptionExt, ResultExt};

use crate::error::{DecodeSnafu, EncodeSnafu, NotFoundSnafu, Result, RuntimeSnafu};

/// Entity kinds stored on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Reference organization, keyed by an externally assigned code.
    Organization,
    /// Production batch.
    Batch,
    /// Individual drug unit.
    Drug,
    /// Custody transfer.
    Transfer,
}

impl RecordKind {
    /// Human-readable kind name used in error context.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Batch => "batch",
            Self::Drug => "drug",
            Self::Transfer => "transfer",
        }
    }

    /// Namespace prefix carried by generated identifiers of this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Organization => "O",
            Self::Batch => "B",
            Self::Drug => "D",
            Self::Transfer => "T",
        }
    }
}

/// A ledger-resident record keyed by its identifier.
pub trait Record: Serialize + DeserializeOwned {
    /// Entity kind, used for namespacing and error context.
    const KIND: RecordKind;

    /// Identifier under which the record is stored.
    fn id(&self) -> &str;
}

impl Record for Organization {
    const KIND: RecordKind = RecordKind::Organization;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Batch {
    const KIND: RecordKind = RecordKind::Batch;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Drug {
    const KIND: RecordKind = RecordKind::Drug;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Transfer {
    const KIND: RecordKind = RecordKind::Transfer;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Typed access to primary records.
pub struct RecordStore;

impl RecordStore {
    /// Reads a record, returning `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Runtime` if the point read fails and
    /// `ChainError::Decode` if present bytes cannot be deserialized.
    pub fn try_get<R: Record, L: Ledger>(ledger: &L, id: &str) -> Result<Option<R>> {
        match ledger.get(id.as_bytes()).context(RuntimeSnafu)? {
            Some(bytes) => {
                let record =
                    decode(&bytes).context(DecodeSnafu { kind: R::KIND.name(), id })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Reads a record that must exist.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::NotFound` when the key is absent, plus the
    /// failures of [`RecordStore::try_get`].
    pub fn get<R: Record, L: Ledger>(ledger: &L, id: &str) -> Result<R> {
        Self::try_get(ledger, id)?.context(NotFoundSnafu { kind: R::KIND.name(), id })
    }

    /// Writes a record, fully overwriting any prior value.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Encode` if serialization fails and
    /// `ChainError::Runtime` if the point write fails.
    pub fn put<R: Record, L: Ledger>(ledger: &mut L, record: &R) -> Result<()> {
        let bytes = encode(record).context(EncodeSnafu)?;
        ledger.put(record.id().as_bytes(), &bytes).context(RuntimeSnafu)
    }

    /// Checks whether a record exists.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Runtime` if the point read fails.
    pub fn exists<R: Record, L: Ledger>(ledger: &L, id: &str) -> Result<bool> {
        Ok(ledger.get(id.as_bytes()).context(RuntimeSnafu)?.is_some())
    }

    /// Physically deletes a record.
    ///
    /// No primary kind is ever deleted by the workflow; this exists for
    /// the boundary's administrative use and for index-style cleanup.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Runtime` if the point delete fails.
    pub fn delete<R: Record, L: Ledger>(ledger: &mut L, id: &str) -> Result<()> {
        ledger.delete(id.as_bytes()).context(RuntimeSnafu)
    }
}
