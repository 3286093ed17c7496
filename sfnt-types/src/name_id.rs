//! Name identifiers
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/name#name-ids>

use core::fmt;

/// The `nameID` of a `name` table record.
///
/// Only the identifiers that reports look up are named; any other value is
/// still representable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NameId(u16);

impl NameId {
    pub const COPYRIGHT_NOTICE: Self = Self(0);
    pub const FAMILY_NAME: Self = Self(1);
    pub const SUBFAMILY_NAME: Self = Self(2);
    pub const UNIQUE_ID: Self = Self(3);
    pub const FULL_NAME: Self = Self(4);
    pub const VERSION_STRING: Self = Self(5);
    pub const POSTSCRIPT_NAME: Self = Self(6);
    pub const TRADEMARK: Self = Self(7);
    pub const MANUFACTURER: Self = Self(8);
    pub const DESIGNER: Self = Self(9);
    pub const DESCRIPTION: Self = Self(10);
    pub const VENDOR_URL: Self = Self(11);
    pub const DESIGNER_URL: Self = Self(12);
    pub const LICENSE_DESCRIPTION: Self = Self(13);
    pub const LICENSE_URL: Self = Self(14);
    pub const TYPOGRAPHIC_FAMILY_NAME: Self = Self(16);
    pub const TYPOGRAPHIC_SUBFAMILY_NAME: Self = Self(17);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// Returns `true` for names that legitimately span several lines.
    ///
    /// Legal and descriptive texts are decoded with relaxed validation, which
    /// accepts line breaks and tabs.
    pub fn is_informational(self) -> bool {
        matches!(
            self,
            Self::COPYRIGHT_NOTICE
                | Self::TRADEMARK
                | Self::DESCRIPTION
                | Self::LICENSE_DESCRIPTION
                | Self::LICENSE_URL
        )
    }

    /// A short English label for the named identifiers.
    pub fn label(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "copyright",
            1 => "family",
            2 => "subfamily",
            3 => "unique ID",
            4 => "full name",
            5 => "version",
            6 => "PostScript name",
            7 => "trademark",
            8 => "manufacturer",
            9 => "designer",
            10 => "description",
            11 => "vendor URL",
            12 => "designer URL",
            13 => "license",
            14 => "license URL",
            16 => "typographic family",
            17 => "typographic subfamily",
            _ => return None,
        })
    }
}

impl From<u16> for NameId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Debug for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "NameId({}, {label})", self.0),
            None => write!(f, "NameId({})", self.0),
        }
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl crate::raw::Scalar for NameId {
    type Raw = [u8; 2];

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }

    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_be_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn informational() {
        assert!(NameId::COPYRIGHT_NOTICE.is_informational());
        assert!(NameId::LICENSE_URL.is_informational());
        assert!(!NameId::FAMILY_NAME.is_informational());
        assert!(!NameId::new(256).is_informational());
    }

    #[test]
    fn labels() {
        assert_eq!(NameId::POSTSCRIPT_NAME.label(), Some("PostScript name"));
        assert_eq!(NameId::new(15).label(), None);
        assert_eq!(format!("{:?}", NameId::FAMILY_NAME), "NameId(1, family)");
        assert_eq!(format!("{:?}", NameId::new(300)), "NameId(300)");
        assert_eq!(NameId::new(300).to_string(), "300");
    }
}
