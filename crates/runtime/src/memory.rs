//! Deterministic in-memory ledger runtime for tests.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use chrono::Utc;

use crate::{HistoryCursor, Ledger, LedgerError, Result, ScanCursor, VersionRecord};

/// In-memory [`Ledger`] implementation.
///
/// World state lives in an ordered map so range scans match the ordering
/// contract of a real runtime; every write and delete also appends a
/// [`VersionRecord`] to the key's history, oldest-first. The caller
/// identity is set explicitly by the test harness.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: BTreeMap<Vec<u8>, Vec<u8>>,
    history: HashMap<Vec<u8>, Vec<VersionRecord>>,
    caller: Option<String>,
    tx_counter: u64,
}

impl InMemoryLedger {
    /// Creates an empty ledger with no caller identity bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the caller identity token for subsequent invocations.
    pub fn set_caller(&mut self, token: impl Into<String>) {
        self.caller = Some(token.into());
    }

    /// Removes the bound caller identity.
    pub fn clear_caller(&mut self) {
        self.caller = None;
    }

    /// Number of keys currently present in world state.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether world state holds no keys.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    fn next_tx_id(&mut self) -> String {
        self.tx_counter += 1;
        format!("tx-{:08}", self.tx_counter)
    }

    fn record_version(&mut self, key: &[u8], value: Option<Vec<u8>>) {
        let is_delete = value.is_none();
        let version = VersionRecord {
            tx_id: self.next_tx_id(),
            timestamp: Utc::now(),
            value,
            is_delete,
        };
        self.history.entry(key.to_vec()).or_default().push(version);
    }
}

impl Ledger for InMemoryLedger {
    fn caller(&self) -> Result<String> {
        self.caller.clone().ok_or(LedgerError::NoCallerIdentity)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.state.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.state.insert(key.to_vec(), value.to_vec());
        self.record_version(key, Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        if self.state.remove(key).is_some() {
            self.record_version(key, None);
        }
        Ok(())
    }

    fn range_scan<'a>(&'a self, start: &[u8], end: &[u8]) -> Result<ScanCursor<'a>> {
        let range = self
            .state
            .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)));
        Ok(Box::new(range.map(|(k, v)| Ok((k.clone(), v.clone())))))
    }

    fn history_scan<'a>(&'a self, key: &[u8]) -> Result<HistoryCursor<'a>> {
        match self.history.get(key) {
            Some(versions) => Ok(Box::new(versions.iter().cloned().map(Ok))),
            None => Ok(Box::new(std::iter::empty())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::composite_key;

    #[test]
    fn test_put_get_delete() {
        let mut ledger = InMemoryLedger::new();
        assert!(ledger.is_empty());

        ledger.put(b"key", b"value").expect("put");
        assert_eq!(ledger.get(b"key").expect("get"), Some(b"value".to_vec()));
        assert_eq!(ledger.len(), 1);

        ledger.delete(b"key").expect("delete");
        assert_eq!(ledger.get(b"key").expect("get"), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let mut ledger = InMemoryLedger::new();

        ledger.put(b"key", b"old").expect("put");
        ledger.put(b"key", b"new").expect("put");
        assert_eq!(ledger.get(b"key").expect("get"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_range_scan_is_ordered_and_half_open() {
        let mut ledger = InMemoryLedger::new();
        for key in [&b"B1"[..], b"B2", b"B3", b"C1"] {
            ledger.put(key, b"v").expect("put");
        }

        let keys: Vec<Vec<u8>> = ledger
            .range_scan(b"B", b"B~")
            .expect("scan")
            .map(|item| item.expect("item").0)
            .collect();
        assert_eq!(keys, vec![b"B1".to_vec(), b"B2".to_vec(), b"B3".to_vec()]);
    }

    #[test]
    fn test_range_scan_twice_yields_same_sequence() {
        let mut ledger = InMemoryLedger::new();
        for key in [&b"a"[..], b"b", b"c"] {
            ledger.put(key, b"v").expect("put");
        }

        let first: Vec<_> = ledger
            .range_scan(b"a", b"z")
            .expect("scan")
            .collect::<Result<Vec<_>>>()
            .expect("drain");
        let second: Vec<_> = ledger
            .range_scan(b"a", b"z")
            .expect("scan")
            .collect::<Result<Vec<_>>>()
            .expect("drain");
        assert_eq!(first, second);
    }

    #[test]
    fn test_prefix_scan_uses_composite_bounds() {
        let mut ledger = InMemoryLedger::new();
        let in_range = composite_key("owner~drug", &["Org1", "D1"]).expect("key");
        let out_of_range = composite_key("owner~drug", &["Org2", "D2"]).expect("key");
        ledger.put(&in_range, &[0x00]).expect("put");
        ledger.put(&out_of_range, &[0x00]).expect("put");

        let hits: Vec<_> = ledger
            .prefix_scan("owner~drug", &["Org1"])
            .expect("scan")
            .collect::<Result<Vec<_>>>()
            .expect("drain");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, in_range);
    }

    #[test]
    fn test_history_records_versions_oldest_first() {
        let mut ledger = InMemoryLedger::new();
        ledger.put(b"key", b"v1").expect("put");
        ledger.put(b"key", b"v2").expect("put");
        ledger.delete(b"key").expect("delete");

        let versions: Vec<_> = ledger
            .history_scan(b"key")
            .expect("history")
            .collect::<Result<Vec<_>>>()
            .expect("drain");

        assert_eq!(versions.len(), 3);
        assert_eq!(versions[0].value, Some(b"v1".to_vec()));
        assert_eq!(versions[1].value, Some(b"v2".to_vec()));
        assert!(versions[2].is_delete);
        assert!(versions[2].value.is_none());
        // Transaction identifiers are distinct and increasing.
        assert!(versions[0].tx_id < versions[1].tx_id);
        assert!(versions[1].tx_id < versions[2].tx_id);
    }

    #[test]
    fn test_delete_absent_key_records_no_tombstone() {
        let mut ledger = InMemoryLedger::new();
        ledger.delete(b"missing").expect("delete");
        assert_eq!(ledger.history_scan(b"missing").expect("history").count(), 0);
    }

    #[test]
    fn test_caller_identity() {
        let mut ledger = InMemoryLedger::new();
        assert!(matches!(
            ledger.caller().unwrap_err(),
            LedgerError::NoCallerIdentity
        ));

        ledger.set_caller("Org1MSP");
        assert_eq!(ledger.caller().expect("caller"), "Org1MSP");

        ledger.clear_caller();
        assert!(ledger.caller().is_err());
    }

    #[test]
    fn test_history_of_unwritten_key_is_empty() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.history_scan(b"never").expect("history").count(), 0);
    }
}
