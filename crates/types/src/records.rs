//! Record definitions for PharmaTrace.
//!
//! These are the logical shapes stored on the ledger: reference
//! organizations, production batches, individual drug units, and custody
//! transfers. Byte encoding is handled by [`crate::codec`]; key layout by
//! the chain crate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `String` for type-safe identifiers.
///
/// Each generated type provides:
/// - Standard derives: Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord
/// - Serde with `#[serde(transparent)]` for wire format compatibility
/// - `From<String>` / `From<&str>` and `Into<String>` conversions
/// - `Display` printing the raw identifier
/// - `new()` constructor and `as_str()` accessor
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a raw value.
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Organization`].
    ///
    /// Organization identifiers are externally assigned codes (the caller
    /// identity token minus its membership-service suffix), not generated
    /// from a sequence.
    OrgId
);

define_id!(
    /// Identifier of a [`Batch`]: the `B` prefix followed by sixteen
    /// zero-padded decimal digits.
    BatchId
);

define_id!(
    /// Identifier of a [`Drug`]: the `D` prefix followed by sixteen
    /// zero-padded decimal digits.
    DrugId
);

define_id!(
    /// Identifier of a [`Transfer`]: the `T` prefix followed by sixteen
    /// zero-padded decimal digits.
    TransferId
);

/// Role of an organization in the supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgKind {
    /// Produces batches and their drug units.
    Manufacturer,
    /// Moves drugs between manufacturers and dispensers.
    Distributor,
    /// Dispenses drugs to patients.
    Pharmacy,
    /// End recipient of a drug unit.
    Patient,
}

/// A participating organization. Immutable reference data, seeded once and
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Externally assigned organization code.
    pub id: OrgId,
    /// Human-readable name.
    pub name: String,
    /// Supply-chain role.
    pub kind: OrgKind,
    /// Physical location, copied onto drugs the organization holds.
    pub location: String,
}

/// A production batch. Created only by a [`OrgKind::Manufacturer`]
/// organization; owns its drug units through the batch→drug index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Generated batch identifier.
    pub id: BatchId,
    /// Name of the drug produced in this batch.
    pub drug_name: String,
    /// Name of the manufacturing organization.
    pub manufacturer_name: String,
    /// Location where the batch was produced.
    pub manufacture_location: String,
    /// Date the batch was produced.
    pub production_date: DateTime<Utc>,
    /// Expiry date for every drug in the batch.
    pub expiry_date: DateTime<Utc>,
}

/// A single drug unit. Created in bulk at batch creation; never deleted.
///
/// Invariants: `batch_id` never changes after creation; `owner_id` always
/// resolves to an existing [`Organization`]; `is_transferred` is true iff
/// the drug is claimed by a still-pending [`Transfer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drug {
    /// Generated drug identifier.
    pub id: DrugId,
    /// Batch this drug was produced in. Fixed for the drug's lifetime.
    pub batch_id: BatchId,
    /// Current owning organization.
    pub owner_id: OrgId,
    /// Current physical location.
    pub location: String,
    /// Whether a pending transfer currently claims this drug.
    pub is_transferred: bool,
    /// The most recent transfer that touched this drug. Retained after
    /// acceptance as provenance; cleared when a transfer is rejected.
    pub transfer_id: Option<TransferId>,
}

impl Drug {
    /// Placeholder record carrying only the identifier.
    ///
    /// Used when replaying history: a deletion tombstone has no value
    /// bytes to decode, so the entry surfaces this stand-in instead.
    pub fn placeholder(id: DrugId) -> Self {
        Self {
            id,
            batch_id: BatchId::new(""),
            owner_id: OrgId::new(""),
            location: String::new(),
            is_transferred: false,
            transfer_id: None,
        }
    }
}

/// Resolution state of a [`Transfer`].
///
/// `Pending` is the only state that admits a transition; both `Accepted`
/// and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Created but not yet accepted or rejected by the receiver.
    Pending,
    /// Receiver accepted; drug ownership moved.
    Accepted,
    /// Receiver rejected; drugs released back to the sender.
    Rejected,
}

impl TransferStatus {
    /// Returns true once the transfer has reached a terminal state.
    #[inline]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A custody transfer of one or more drugs between two organizations.
///
/// The set of claimed drugs is held only in the transfer→drug index, not
/// embedded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Generated transfer identifier.
    pub id: TransferId,
    /// Organization proposing the transfer.
    pub sender_id: OrgId,
    /// Organization asked to accept or reject it.
    pub receiver_id: OrgId,
    /// Date the transfer was proposed.
    pub transfer_date: DateTime<Utc>,
    /// Workflow state.
    pub status: TransferStatus,
    /// Date the receiver resolved the transfer; `None` while pending.
    pub receive_date: Option<DateTime<Utc>>,
}

/// One replayed ledger version of a drug record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugHistoryEntry {
    /// The drug as of this version, or a placeholder for tombstones.
    pub record: Drug,
    /// Ledger transaction that produced this version.
    pub tx_id: String,
    /// Commit timestamp of that transaction.
    pub timestamp: DateTime<Utc>,
    /// Whether this version is a deletion tombstone.
    pub is_delete: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::codec::{decode, encode};

    fn sample_drug() -> Drug {
        Drug {
            id: DrugId::new("D0000000000000001"),
            batch_id: BatchId::new("B0000000000000001"),
            owner_id: OrgId::new("Org1"),
            location: "Jakarta, Indonesia".to_owned(),
            is_transferred: false,
            transfer_id: None,
        }
    }

    #[test]
    fn test_id_display_is_raw_value() {
        let id = DrugId::new("D0000000000000042");
        assert_eq!(id.to_string(), "D0000000000000042");
        assert_eq!(id.as_str(), "D0000000000000042");
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = BatchId::new("B0000000000000007");
        let bytes = encode(&id).expect("encode id");
        let as_string: String = decode(&bytes).expect("decode as plain string");
        assert_eq!(as_string, "B0000000000000007");
    }

    #[test]
    fn test_drug_roundtrip() {
        let drug = sample_drug();
        let bytes = encode(&drug).expect("encode drug");
        let decoded: Drug = decode(&bytes).expect("decode drug");
        assert_eq!(drug, decoded);
    }

    #[test]
    fn test_transfer_roundtrip_preserves_status() {
        let transfer = Transfer {
            id: TransferId::new("T0000000000000001"),
            sender_id: OrgId::new("Org1"),
            receiver_id: OrgId::new("Org3"),
            transfer_date: Utc.with_ymd_and_hms(2025, 4, 7, 10, 0, 0).unwrap(),
            status: TransferStatus::Pending,
            receive_date: None,
        };
        let bytes = encode(&transfer).expect("encode transfer");
        let decoded: Transfer = decode(&bytes).expect("decode transfer");
        assert_eq!(decoded.status, TransferStatus::Pending);
        assert_eq!(transfer, decoded);
    }

    #[test]
    fn test_status_resolution() {
        assert!(!TransferStatus::Pending.is_resolved());
        assert!(TransferStatus::Accepted.is_resolved());
        assert!(TransferStatus::Rejected.is_resolved());
    }

    #[test]
    fn test_placeholder_carries_only_id() {
        let placeholder = Drug::placeholder(DrugId::new("D0000000000000009"));
        assert_eq!(placeholder.id.as_str(), "D0000000000000009");
        assert_eq!(placeholder.batch_id.as_str(), "");
        assert_eq!(placeholder.owner_id.as_str(), "");
        assert!(!placeholder.is_transferred);
        assert!(placeholder.transfer_id.is_none());
    }

    #[test]
    fn test_ids_order_by_sequence() {
        // Fixed-width zero padding makes lexicographic order match
        // numeric order.
        let a = DrugId::new("D0000000000000002");
        let b = DrugId::new("D0000000000000010");
        assert!(a < b);
    }
}
