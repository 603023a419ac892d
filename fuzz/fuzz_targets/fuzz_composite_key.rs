//! Fuzz target for composite key decomposition.
//!
//! Tests that `split_composite_key` never panics on arbitrary key bytes,
//! and that keys it accepts roundtrip through `composite_key`.

#![no_main]

use libfuzzer_sys::fuzz_target;

use pharmatrace_runtime::{composite_key, composite_prefix_range, split_composite_key};

fuzz_target!(|data: &[u8]| {
    if let Ok((family, parts)) = split_composite_key(data) {
        // Anything the decomposer accepts must re-encode to the same bytes.
        let part_refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        let re_encoded =
            composite_key(&family, &part_refs).expect("accepted key must re-encode");
        assert_eq!(re_encoded, data, "composite key roundtrip mismatch");

        // The key must fall inside its own family's prefix range.
        let (start, end) =
            composite_prefix_range(&family, &[]).expect("family range must build");
        assert!(
            start.as_slice() <= data && data < end.as_slice(),
            "key escapes its family range"
        );
    }
    // Rejection is expected for arbitrary bytes — no panic is the invariant.
});
