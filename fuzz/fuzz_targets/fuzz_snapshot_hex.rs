#![no_main]

use libfuzzer_sys::fuzz_target;
use sunspec_rs::snapshot::{decode_hex_words, Snapshot};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(words) = decode_hex_words(text) {
            // Whitespace-free input always holds whole words
            let digits = text.chars().filter(|c| !c.is_whitespace()).count();
            assert_eq!(words.len() * 4, digits);
        }
        if let Ok(snapshot) = Snapshot::from_json(text) {
            let _ = snapshot.model_data();
        }
    }
});
