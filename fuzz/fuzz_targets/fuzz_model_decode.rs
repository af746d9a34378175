#![no_main]

use libfuzzer_sys::fuzz_target;
use sunspec_rs::snapshot::{decode_models, DecodeOptions, ModelPlacement, Snapshot};

const BASE: u32 = 40_000;

fuzz_target!(|data: &[u8]| {
    // First byte picks the model and options, the rest are register words
    if data.len() < 3 {
        return;
    }
    let ids = [1u16, 101, 102, 103, 111, 112, 113, 120, 121, 160, 201, 202, 203, 204];
    let id = ids[usize::from(data[0]) % ids.len()];
    let words: Vec<u16> = data[1..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let length = words.len().saturating_sub(2).min(usize::from(u16::MAX)) as u16;

    let snapshot = Snapshot {
        start: BASE,
        words: Some(words),
        hex: None,
        models: vec![ModelPlacement {
            id,
            base: BASE,
            length,
        }],
    };
    let options = DecodeOptions {
        reversed: data[0] & 0x80 != 0,
        phases: data[0] & 0x40 != 0,
    };
    // Any register contents must decode or fail with an error, never panic
    let _ = decode_models(&snapshot, options);
});
