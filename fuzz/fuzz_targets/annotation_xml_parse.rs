//! Fuzz target for annotation XML parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the annotation parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use lanternfly::ir::io_voc_xml::{from_annotation_slice, fuzz_drain_annotation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let collected = from_annotation_slice(data);
    let drained = fuzz_drain_annotation(data);

    // Collecting and draining must agree on a fully valid document.
    if let Ok(objects) = collected {
        assert_eq!(objects.len(), drained);
    }
});
