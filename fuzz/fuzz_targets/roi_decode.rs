//! Fuzz target for the binary ROI decoder.
//!
//! Feeds arbitrary bytes to the decoder and, when they decode, re-encodes
//! the record to exercise the writer on whatever the reader accepted.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roicodec::roi::decoder::fuzz_read_header;
use roicodec::roi::{from_roi_slice, to_roi_bytes};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let _ = fuzz_read_header(data);

    if let Ok(record) = from_roi_slice(data) {
        let _ = to_roi_bytes(&record, "fuzz");
    }
});
