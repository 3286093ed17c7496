#![no_main]
use libfuzzer_sys::{arbitrary, fuzz_target};
use sfnt_read::encoding::{decode_ascii_z, decode_or_hex, supported_encodings};
use sfnt_read::Validation;

#[derive(Debug, arbitrary::Arbitrary)]
struct Input<'a> {
    /// Picks a supported pair, or one past the end for the raw ids.
    selector: u8,
    platform_id: u16,
    encoding_id: u16,
    relaxed: bool,
    bytes: &'a [u8],
}

fuzz_target!(|input: Input| {
    let validation = if input.relaxed {
        Validation::Relaxed
    } else {
        Validation::Strict
    };
    let pick = input.selector as usize % (supported_encodings().count() + 1);
    let (platform_id, encoding_id) = match supported_encodings().nth(pick) {
        Some((platform, encoding)) => (platform, encoding.unwrap_or(input.encoding_id)),
        None => (input.platform_id, input.encoding_id),
    };
    let text = decode_or_hex(platform_id, encoding_id, 0, input.bytes, validation);
    let _ = text.to_string();
    let _ = decode_ascii_z(input.bytes);
});
