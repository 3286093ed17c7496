//! Decoding name strings
//!
//! The `name` table stores every string in the encoding implied by its
//! platform and encoding IDs. Decoding resolves that pair to a [`Charset`],
//! decodes the raw bytes, and then validates the result so that garbage is
//! never presented as text: anything that fails becomes a hex dump instead.

mod johab;
mod mac;

use encoding_rs::{Encoding, BIG5, EUC_KR, GBK, SHIFT_JIS, X_MAC_CYRILLIC};
use thiserror::Error;
use unicode_script::{Script, UnicodeScript};

use mac::MacCodePage;

/// How strictly decoded text is checked for control characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Validation {
    /// Reject every control character.
    #[default]
    Strict,
    /// Accept newline, carriage return and tab.
    ///
    /// Used for long informational strings such as copyright and license
    /// text, which legitimately span several lines.
    Relaxed,
}

/// A text encoding used by name records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Charset {
    Utf16Be,
    MacRoman,
    MacArabic,
    MacHebrew,
    MacGreek,
    MacCyrillic,
    MacThai,
    ShiftJis,
    Big5,
    EucKr,
    Gbk,
    Johab,
}

/// A platform ID paired with an encoding ID, or with every encoding ID.
type DecoderKey = (u16, Option<u16>);

/// The supported (platform, encoding) pairs, searched in order.
static DECODERS: &[(DecoderKey, Charset)] = &[
    ((0, None), Charset::Utf16Be),
    ((1, Some(0)), Charset::MacRoman),
    ((1, Some(1)), Charset::ShiftJis),
    ((1, Some(2)), Charset::Big5),
    ((1, Some(3)), Charset::EucKr),
    ((1, Some(4)), Charset::MacArabic),
    ((1, Some(5)), Charset::MacHebrew),
    ((1, Some(6)), Charset::MacGreek),
    ((1, Some(7)), Charset::MacCyrillic),
    ((1, Some(21)), Charset::MacThai),
    ((1, Some(25)), Charset::Gbk),
    ((3, Some(0)), Charset::Utf16Be),
    ((3, Some(1)), Charset::Utf16Be),
    ((3, Some(2)), Charset::ShiftJis),
    ((3, Some(3)), Charset::Gbk),
    ((3, Some(4)), Charset::Big5),
    ((3, Some(5)), Charset::EucKr),
    ((3, Some(6)), Charset::Johab),
    ((3, Some(10)), Charset::Utf16Be),
];

/// Every (platform, encoding) pair with a decoder. `None` stands for any
/// encoding ID of that platform.
pub fn supported_encodings() -> impl Iterator<Item = (u16, Option<u16>)> {
    DECODERS.iter().map(|(key, _)| *key)
}

/// Determine the charset for a platform and encoding ID.
///
/// Returns `None` for pairs with no known decoder.
pub fn charset_for(platform_id: u16, encoding_id: u16) -> Option<Charset> {
    DECODERS
        .iter()
        .find(|((platform, encoding), _)| {
            *platform == platform_id && encoding.is_none_or(|e| e == encoding_id)
        })
        .map(|(_, charset)| *charset)
}

impl Charset {
    /// `true` for the Unicode encodings, whose null bytes are significant.
    pub fn is_unicode(self) -> bool {
        matches!(self, Charset::Utf16Be)
    }

    /// Decode raw bytes without validating the result.
    ///
    /// Undecodable sequences become U+FFFD. For the legacy charsets 0x00 and
    /// 0x7F bytes are removed first; fonts commonly pad or terminate strings
    /// with them.
    pub fn decode(self, bytes: &[u8]) -> String {
        if self.is_unicode() {
            return decode_utf16_be(bytes);
        }
        let bytes: Vec<u8> = bytes
            .iter()
            .copied()
            .filter(|b| *b != 0x00 && *b != 0x7F)
            .collect();
        match self {
            Charset::MacRoman => MacCodePage::ROMAN.decode(&bytes),
            Charset::MacArabic => MacCodePage::ARABIC.decode(&bytes),
            Charset::MacHebrew => MacCodePage::HEBREW.decode(&bytes),
            Charset::MacGreek => MacCodePage::GREEK.decode(&bytes),
            Charset::MacThai => MacCodePage::THAI.decode(&bytes),
            Charset::MacCyrillic => decode_with(X_MAC_CYRILLIC, &bytes),
            Charset::ShiftJis => decode_with(SHIFT_JIS, &bytes),
            Charset::Big5 => decode_with(BIG5, &bytes),
            Charset::EucKr => decode_with(EUC_KR, &bytes),
            Charset::Gbk => decode_with(GBK, &bytes),
            Charset::Johab => johab::decode(&bytes),
            Charset::Utf16Be => decode_utf16_be(&bytes),
        }
    }
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        log::trace!("{} data contained malformed sequences", encoding.name());
    }
    text.into_owned()
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if bytes.len() % 2 != 0 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

/// Why a name string could not be presented as text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no decoder for platform {platform_id}, encoding {encoding_id}")]
    NoDecoder { platform_id: u16, encoding_id: u16 },
    #[error("invalid text: {0}")]
    InvalidText(InvalidText),
}

/// The first problem found in decoded text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvalidText {
    #[error("contains undecodable data")]
    Replacement,
    #[error("contains undefined code point U+{0:04X}")]
    UndefinedCodePoint(u32),
    #[error("contains control character U+{0:04X}")]
    ControlCharacter(u32),
    #[error("contains non-printable byte 0x{0:02X}")]
    NonPrintableByte(u8),
}

impl From<InvalidText> for DecodeError {
    fn from(src: InvalidText) -> DecodeError {
        DecodeError::InvalidText(src)
    }
}

/// Code points with no assigned character: unassigned code points and
/// noncharacters. Private use code points count as defined.
fn is_undefined(c: char) -> bool {
    c.script() == Script::Unknown && !is_private_use(c)
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF_0000..=0xF_FFFD | 0x10_0000..=0x10_FFFD)
}

/// Check decoded text for signs that it is not really text.
pub fn validate(text: &str, validation: Validation) -> Result<(), InvalidText> {
    for c in text.chars() {
        if c == char::REPLACEMENT_CHARACTER {
            return Err(InvalidText::Replacement);
        }
        if is_undefined(c) {
            return Err(InvalidText::UndefinedCodePoint(c as u32));
        }
        if c.is_control() {
            let allowed = validation == Validation::Relaxed && matches!(c, '\n' | '\r' | '\t');
            if !allowed {
                return Err(InvalidText::ControlCharacter(c as u32));
            }
        }
    }
    Ok(())
}

/// Decode and validate the raw bytes of a name record.
///
/// The language ID does not affect decoding.
pub fn decode_name(
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    bytes: &[u8],
    validation: Validation,
) -> Result<String, DecodeError> {
    let charset = charset_for(platform_id, encoding_id).ok_or(DecodeError::NoDecoder {
        platform_id,
        encoding_id,
    })?;
    log::trace!(
        "decoding {} bytes as {charset:?} ({platform_id}, {encoding_id}, 0x{language_id:04X})",
        bytes.len()
    );
    let text = charset.decode(bytes);
    validate(&text, validation)?;
    Ok(text)
}

/// A decoded name string, or a hex dump of bytes that did not decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameText {
    Text(String),
    Hex { hex: String, reason: DecodeError },
}

impl NameText {
    /// The decoded text, if decoding succeeded.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NameText::Text(text) => Some(text),
            NameText::Hex { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NameText::Text(_))
    }
}

impl std::fmt::Display for NameText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameText::Text(text) => f.write_str(text),
            NameText::Hex { hex, .. } => write!(f, "<{hex}>"),
        }
    }
}

/// Decode a name record, falling back to a hex dump of the raw bytes.
pub fn decode_or_hex(
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    bytes: &[u8],
    validation: Validation,
) -> NameText {
    match decode_name(platform_id, encoding_id, language_id, bytes, validation) {
        Ok(text) => NameText::Text(text),
        Err(reason) => {
            log::debug!("name string shown as hex: {reason}");
            NameText::Hex {
                hex: hex_dump(bytes),
                reason,
            }
        }
    }
}

/// Decode a short fixed-width ASCII field, such as a vendor ID.
///
/// Null bytes become spaces; any other byte outside printable ASCII
/// rejects the whole field.
pub fn decode_ascii_z(bytes: &[u8]) -> Result<String, DecodeError> {
    bytes
        .iter()
        .map(|b| match b {
            0x00 => Ok(' '),
            0x20..=0x7E => Ok(*b as char),
            _ => Err(DecodeError::from(InvalidText::NonPrintableByte(*b))),
        })
        .collect()
}

/// Format bytes as space-separated uppercase hex pairs.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
