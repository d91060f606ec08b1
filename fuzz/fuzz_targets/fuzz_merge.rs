#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as one buffer, and the same buffer twice — the merge
    // may reject them, but must never panic.
    let _ = rasterstitch::MergeRequest::new(&[data]).merge();
    let _ = rasterstitch::MergeRequest::new(&[data, data])
        .target(rasterstitch::RasterFormat::Webp)
        .merge();
});
