#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Dedup must never panic, and a second pass must find nothing to remove
    if let Some(once) = rireki::dedup_keep_last(data) {
        assert!(rireki::dedup_keep_last(&once).is_none());
        assert!(once.len() < data.len());
    }
});
