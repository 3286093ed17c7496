//! Common [scalar data types][data types] used when inspecting sfnt files
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod longdatetime;
mod name_id;
mod raw;
mod tag;

pub use longdatetime::{LongDateTime, SECONDS_1904_TO_1970};
pub use name_id::NameId;
pub use raw::{FixedSize, Scalar};
pub use tag::{InvalidTag, Tag};

/// The header tag for a font collection file.
pub const TTC_HEADER_TAG: Tag = Tag::new(b"ttcf");

/// The tag of the digital signature record in a version 2 collection header.
pub const DSIG_TAG: Tag = Tag::new(b"DSIG");

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The SFNT version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
/// The SFNT version for legacy Apple fonts containing TrueType outlines.
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;

/// The value the checksum of a complete single font file must equal.
pub const WHOLE_FILE_CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;
