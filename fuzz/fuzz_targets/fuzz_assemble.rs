#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let frames = [rasterstitch::AnimationFrame::new(data, 33)];
    let _ = rasterstitch::AnimationRequest::new(&frames, 64, 64).assemble();
});
