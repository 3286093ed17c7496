//! Johab (KS C 5601-1992 annex 3) decoding
//!
//! Hangul is composed arithmetically from three 5-bit jamo indices; the
//! symbol and hanja ranges are mapped onto KS X 1001 rows and decoded
//! through EUC-KR.

use encoding_rs::EUC_KR;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;
const HANGUL_FILLER: char = '\u{3164}';
const SYLLABLE_BASE: u32 = 0xAC00;
const COMPAT_VOWEL_BASE: u32 = 0x314F;

/// Compatibility jamo for the 19 initial consonants.
#[rustfmt::skip]
static COMPAT_INITIALS: [u16; 19] = [
    0x3131, 0x3132, 0x3134, 0x3137, 0x3138, 0x3139, 0x3141, 0x3142,
    0x3143, 0x3145, 0x3146, 0x3147, 0x3148, 0x3149, 0x314A, 0x314B,
    0x314C, 0x314D, 0x314E,
];

pub(crate) fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();
    while let Some(lead) = iter.next() {
        if lead < 0x80 {
            out.push(lead as char);
            continue;
        }
        let Some(trail) = iter.next() else {
            out.push(REPLACEMENT);
            break;
        };
        match lead {
            0x84..=0xD3 => out.push(hangul(u16::from_be_bytes([lead, trail]))),
            0xD9..=0xDE | 0xE0..=0xF9 => push_ksx1001(&mut out, lead, trail),
            _ => out.push(REPLACEMENT),
        }
    }
    out
}

fn initial(bits: u16) -> Option<Jamo> {
    match bits {
        1 => Some(Jamo::Fill),
        2..=20 => Some(Jamo::Index(bits as u32 - 2)),
        _ => None,
    }
}

fn medial(bits: u16) -> Option<Jamo> {
    match bits {
        2 => Some(Jamo::Fill),
        3..=7 => Some(Jamo::Index(bits as u32 - 3)),
        10..=15 => Some(Jamo::Index(bits as u32 - 5)),
        18..=23 => Some(Jamo::Index(bits as u32 - 7)),
        26..=29 => Some(Jamo::Index(bits as u32 - 9)),
        _ => None,
    }
}

fn final_consonant(bits: u16) -> Option<Jamo> {
    match bits {
        1 => Some(Jamo::Fill),
        2..=17 => Some(Jamo::Index(bits as u32 - 1)),
        19..=29 => Some(Jamo::Index(bits as u32 - 2)),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Jamo {
    Fill,
    Index(u32),
}

fn hangul(code: u16) -> char {
    let fields = (
        initial((code >> 10) & 0x1F),
        medial((code >> 5) & 0x1F),
        final_consonant(code & 0x1F),
    );
    let value = match fields {
        (Some(Jamo::Index(i)), Some(Jamo::Index(m)), Some(fin)) => {
            let f = match fin {
                Jamo::Fill => 0,
                Jamo::Index(f) => f,
            };
            SYLLABLE_BASE + (i * 21 + m) * 28 + f
        }
        (Some(Jamo::Index(i)), Some(Jamo::Fill), Some(Jamo::Fill)) => {
            COMPAT_INITIALS[i as usize] as u32
        }
        (Some(Jamo::Fill), Some(Jamo::Index(m)), Some(Jamo::Fill)) => COMPAT_VOWEL_BASE + m,
        (Some(Jamo::Fill), Some(Jamo::Fill), Some(Jamo::Fill)) => return HANGUL_FILLER,
        _ => return REPLACEMENT,
    };
    char::from_u32(value).unwrap_or(REPLACEMENT)
}

/// Map a symbol or hanja code onto KS X 1001 and decode it as EUC-KR.
fn push_ksx1001(out: &mut String, lead: u8, trail: u8) {
    let base_row = if lead <= 0xDE {
        0x21 + (lead - 0xD9) * 2
    } else {
        0x4A + (lead - 0xE0) * 2
    };
    let (row, col) = match trail {
        0x31..=0x7E => (base_row, trail - 0x31 + 0x21),
        0x91..=0xA0 => (base_row, trail - 0x91 + 0x6F),
        0xA1..=0xFE => (base_row + 1, trail - 0xA1 + 0x21),
        _ => {
            out.push(REPLACEMENT);
            return;
        }
    };
    let raw = [row | 0x80, col | 0x80];
    let (text, _) = EUC_KR.decode_without_bom_handling(&raw);
    out.push_str(&text);
}
