//! Composite key construction and decomposition.
//!
//! The ledger offers no native secondary indexes, so reverse lookups are
//! emulated with composite keys: an index family name joined with ordered
//! parts using a separator guaranteed not to appear inside any part.
//!
//! Key format: `{0x00}{family}{0x00}{part1}{0x00}...{partN}{0x00}`
//!
//! The leading separator keeps every composite key outside the plain
//! record namespaces (record identifiers never start with NUL), and the
//! trailing separators make each part boundary unambiguous under prefix
//! scans.

use snafu::{ensure, OptionExt};

use crate::{InvalidKeyPartSnafu, LedgerError, MalformedCompositeKeySnafu, Result};

/// Separator between the family name and each part.
const SEPARATOR: u8 = 0x00;

/// Exclusive upper bound suffix for prefix ranges. Sorts after every byte
/// that can appear in a UTF-8 part or a separator.
const RANGE_END: u8 = 0xFF;

/// Sentinel appended to a kind prefix to bound its namespace range.
/// Sorts after every decimal digit in a generated identifier.
const NAMESPACE_SENTINEL: &str = "~";

fn validate_part(part: &str) -> Result<()> {
    ensure!(!part.contains('\0'), InvalidKeyPartSnafu { part });
    Ok(())
}

/// Builds a composite key from an index family name and its parts.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidKeyPart`] if the family or any part
/// contains the separator byte.
pub fn composite_key(family: &str, parts: &[&str]) -> Result<Vec<u8>> {
    validate_part(family)?;

    let len = 2 + family.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.push(SEPARATOR);
    key.extend_from_slice(family.as_bytes());
    key.push(SEPARATOR);
    for part in parts {
        validate_part(part)?;
        key.extend_from_slice(part.as_bytes());
        key.push(SEPARATOR);
    }
    Ok(key)
}

/// Returns the `[start, end)` range covering every composite key that
/// extends `family` + `parts` with further parts (or matches exactly).
///
/// # Errors
///
/// Returns [`LedgerError::InvalidKeyPart`] if the family or any part
/// contains the separator byte.
pub fn composite_prefix_range(family: &str, parts: &[&str]) -> Result<(Vec<u8>, Vec<u8>)> {
    let start = composite_key(family, parts)?;
    let mut end = start.clone();
    end.push(RANGE_END);
    Ok((start, end))
}

/// Decomposes a composite key into its family name and parts.
///
/// # Errors
///
/// Returns [`LedgerError::MalformedCompositeKey`] if the key does not
/// start with the separator, is not NUL-terminated, or holds non-UTF-8
/// segments.
pub fn split_composite_key(key: &[u8]) -> Result<(String, Vec<String>)> {
    let body = key
        .strip_prefix(&[SEPARATOR])
        .and_then(|rest| rest.strip_suffix(&[SEPARATOR]))
        .context(MalformedCompositeKeySnafu { key })?;

    let mut segments = Vec::new();
    for segment in body.split(|&b| b == SEPARATOR) {
        let text = std::str::from_utf8(segment)
            .map_err(|_| LedgerError::MalformedCompositeKey { key: key.to_vec() })?;
        segments.push(text.to_owned());
    }

    // `split` always yields at least one segment; the first is the family.
    let mut segments = segments.into_iter();
    let family = segments.next().unwrap_or_default();
    ensure!(!family.is_empty(), MalformedCompositeKeySnafu { key });
    Ok((family, segments.collect()))
}

/// Returns the `[start, end)` range covering a record kind's namespace:
/// every key formed by the kind prefix plus a generated suffix.
pub fn namespace_range(prefix: &str) -> (Vec<u8>, Vec<u8>) {
    let start = prefix.as_bytes().to_vec();
    let end = format!("{prefix}{NAMESPACE_SENTINEL}").into_bytes();
    (start, end)
}
