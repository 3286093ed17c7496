use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

/// A four-byte table or signature code.
///
/// [In OpenType][otff], a tag is a 4-byte array where each byte is in the
/// printable ASCII range `(0x20..=0x7E)`.
///
/// Tags read from a file are never validated: damaged directories contain
/// arbitrary bytes and those still need to be representable and printable.
///
/// [otff]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#data-types
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Construct a `Tag` from raw bytes, without validation.
    pub const fn new(src: &[u8; 4]) -> Tag {
        Tag(*src)
    }

    /// Create a tag from text, padding short input with spaces.
    ///
    /// Between one and four printable ASCII bytes are accepted; the first may
    /// not be a space.
    pub const fn new_checked(src: &[u8]) -> Result<Self, InvalidTag> {
        if src.is_empty() || src.len() > 4 {
            return Err(InvalidTag::InvalidLength(src.len()));
        }
        let mut raw = [b' '; 4];
        let mut i = 0;
        while i < src.len() {
            let byte = src[i];
            if !is_printable_byte(byte) || (i == 0 && byte == b' ') {
                return Err(InvalidTag::InvalidByte { pos: i, byte });
            }
            raw[i] = byte;
            i += 1;
        }
        Ok(Tag(raw))
    }

    /// Reinterpret a big-endian `u32`, such as the `0x00010000` version at
    /// the start of an offset table.
    pub const fn from_u32(src: u32) -> Self {
        Self(src.to_be_bytes())
    }

    pub const fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Returns `true` if every byte is printable ASCII.
    pub fn is_printable(self) -> bool {
        self.0.iter().all(|b| is_printable_byte(*b))
    }
}

const fn is_printable_byte(byte: u8) -> bool {
    byte >= 0x20 && byte <= 0x7E
}

/// The reason text could not be turned into a [`Tag`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidTag {
    /// Not between 1 and 4 bytes long.
    InvalidLength(usize),
    /// A byte outside `0x20..=0x7E`, or a leading space.
    InvalidByte { pos: usize, byte: u8 },
    /// A ten character `0x` form that is not valid hex.
    InvalidHex,
}

impl std::error::Error for InvalidTag {}

impl Display for InvalidTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidTag::InvalidByte { pos, byte } => {
                write!(f, "Invalid byte 0x{byte:X} at index {pos}")
            }
            InvalidTag::InvalidLength(len) => write!(f, "Invalid length ({len})"),
            InvalidTag::InvalidHex => f.write_str("Invalid hex tag"),
        }
    }
}

/// Accepts printable tags (`"OS/2"`, `"cvt"`) and the `0x` form that
/// [`Display`] uses for unprintable ones (`"0x00010000"`).
impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src.strip_prefix("0x") {
            Some(hex) if hex.len() == 8 => u32::from_str_radix(hex, 16)
                .map(Tag::from_u32)
                .map_err(|_| InvalidTag::InvalidHex),
            _ => Tag::new_checked(src.as_bytes()),
        }
    }
}

impl crate::raw::Scalar for Tag {
    type Raw = [u8; 4];

    fn to_raw(self) -> Self::Raw {
        self.0
    }

    fn from_raw(raw: Self::Raw) -> Self {
        Tag(raw)
    }
}

/// Printable tags are shown as text; anything else as `0x` and eight hex
/// digits, so a signature like `0x00010000` reads the way it is usually
/// written.
impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            self.0.iter().try_for_each(|b| write!(f, "{}", *b as char))
        } else {
            write!(f, "0x{:08X}", self.to_u32())
        }
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

// The display form round-trips through `FromStr`, so it doubles as the
// human-readable serde form.
#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serde::Serialize::serialize(&self.0, serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
            raw.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; 4] as serde::Deserialize>::deserialize(deserializer).map(Tag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_construction() {
        assert!(Tag::new_checked(b"").is_err());
        assert!(Tag::new_checked(b" ").is_err());
        assert!(Tag::new_checked(b"abcde").is_err());
        assert_eq!(Tag::new_checked(b"OS/2"), Ok(Tag::new(b"OS/2")));
        assert_eq!(Tag::new_checked(b"cvt"), Ok(Tag::new(b"cvt ")));
        assert_eq!(
            Tag::new_checked(&[b'a', 0x7F]),
            Err(InvalidTag::InvalidByte { pos: 1, byte: 0x7F })
        );
    }

    #[test]
    fn signatures() {
        let otto = Tag::from_u32(0x4F54544F);
        assert_eq!(otto, Tag::new(b"OTTO"));
        assert_eq!(otto.to_u32(), 0x4F54544F);
        let truetype = Tag::from_u32(0x00010000);
        assert!(!truetype.is_printable());
        assert_eq!(truetype.to_string(), "0x00010000");
    }

    #[test]
    fn display_round_trips() {
        for tag in [
            Tag::new(b"head"),
            Tag::new(b"cvt "),
            Tag::new(&[0x19, b'z', b'@', 0x7F]),
            Tag::default(),
        ] {
            assert_eq!(tag.to_string().parse::<Tag>(), Ok(tag));
        }
        // a printable tag that happens to start with 0x
        assert_eq!("0x12".parse::<Tag>(), Ok(Tag::new(b"0x12")));
        assert_eq!("0x1234".parse::<Tag>(), Err(InvalidTag::InvalidLength(6)));
        assert_eq!("0xGGGGGGGG".parse::<Tag>(), Err(InvalidTag::InvalidHex));
    }
}
