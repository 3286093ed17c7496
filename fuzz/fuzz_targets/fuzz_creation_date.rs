#![no_main]
use libfuzzer_sys::fuzz_target;
use sfnt_read::dates::postscript::{find_creation_date, parse_creation_date};

fuzz_target!(|data: &[u8]| {
    if let Some(text) = find_creation_date(data) {
        let _ = parse_creation_date(&text);
    }
});
