//! The outermost layer of a font file: a single font or a collection.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#font-collections>

use types::{
    Tag, CFF_SFNT_VERSION, DSIG_TAG, TRUE_SFNT_VERSION, TTC_HEADER_TAG, TT_SFNT_VERSION,
};

use crate::{source::check_range, ByteSource, ReadError};

/// The largest number of fonts accepted in a collection.
pub const MAX_COLLECTION_FONTS: u32 = 29;

const MIN_FILE_SIZE: u64 = 12;
const COLLECTION_HEADER_LEN: u64 = 12;

/// Whether a file holds one font or a collection of fonts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerKind {
    Single,
    Collection,
}

/// The digital signature record of a version 2 collection header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DsigRecord {
    pub tag: Tag,
    pub length: u32,
    pub offset: u32,
}

impl DsigRecord {
    /// One past the last byte of the signature data.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }
}

/// The layout of one font file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontContainer {
    pub file_size: u64,
    pub kind: ContainerKind,
    /// The offset of each font's table directory; `[0]` for a single font.
    pub font_offsets: Vec<u32>,
    /// Present only for version 2 collection headers with a `DSIG` tag.
    pub dsig: Option<DsigRecord>,
    /// The number of bytes in the collection header (zero for a single font).
    pub header_len: u64,
}

/// Returns `true` if `signature` starts a single font's offset table.
pub fn is_sfnt_version(signature: u32) -> bool {
    matches!(
        signature,
        TT_SFNT_VERSION | CFF_SFNT_VERSION | TRUE_SFNT_VERSION
    )
}

impl FontContainer {
    /// Identify a file and locate the fonts it contains.
    pub fn read<S: ByteSource>(source: &mut S) -> Result<Self, ReadError> {
        let file_size = source.len();
        if file_size < MIN_FILE_SIZE {
            return Err(ReadError::TooSmall(file_size));
        }
        let signature: u32 = source.read_at(0)?;
        if is_sfnt_version(signature) {
            log::debug!("single font, {file_size} bytes");
            return Ok(FontContainer {
                file_size,
                kind: ContainerKind::Single,
                font_offsets: vec![0],
                dsig: None,
                header_len: 0,
            });
        }
        if Tag::from_u32(signature) != TTC_HEADER_TAG {
            return Err(ReadError::NotAFont(Tag::from_u32(signature)));
        }
        Self::read_collection(source)
    }

    fn read_collection<S: ByteSource>(source: &mut S) -> Result<Self, ReadError> {
        let file_size = source.len();
        let major_version: u16 = source.read_at(4)?;
        let num_fonts: u32 = source.read_at(8)?;
        if !(1..=MAX_COLLECTION_FONTS).contains(&num_fonts) {
            return Err(ReadError::CollectionTooLarge(num_fonts));
        }
        let offsets_len = num_fonts as u64 * 4;
        check_range(
            file_size,
            "collection font offsets",
            COLLECTION_HEADER_LEN,
            offsets_len,
        )?;
        let raw = source.read_vec(COLLECTION_HEADER_LEN, offsets_len as usize)?;
        let font_offsets = raw
            .chunks_exact(4)
            .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
            .collect();
        let mut header_len = COLLECTION_HEADER_LEN + offsets_len;

        let mut dsig = None;
        if major_version >= 2 {
            header_len += 12;
            let dsig_pos = COLLECTION_HEADER_LEN + offsets_len;
            if check_range(file_size, "DSIG record", dsig_pos, 12).is_ok() {
                let tag: Tag = source.read_at(dsig_pos)?;
                if tag == DSIG_TAG {
                    dsig = Some(DsigRecord {
                        tag,
                        length: source.read_at(dsig_pos + 4)?,
                        offset: source.read_at(dsig_pos + 8)?,
                    });
                }
            }
        }
        log::debug!("collection v{major_version} with {num_fonts} fonts, {file_size} bytes");
        Ok(FontContainer {
            file_size,
            kind: ContainerKind::Collection,
            font_offsets,
            dsig,
            header_len,
        })
    }

    pub fn is_collection(&self) -> bool {
        self.kind == ContainerKind::Collection
    }

    pub fn num_fonts(&self) -> usize {
        self.font_offsets.len()
    }
}
