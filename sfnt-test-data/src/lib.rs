//! Synthetic font files for the sfnt-inspect tests.
//!
//! Rather than checking in binary fixtures, tests assemble the fonts they
//! need with [`FontBuilder`] and [`CollectionBuilder`]. Built files are
//! well formed: tables are padded and aligned, every directory checksum is
//! correct and the `head` checksum adjustment brings a single font to the
//! expected whole-file sum. Tests damage them afterwards as required.

use std::collections::BTreeMap;

use sfnt_types::{
    Scalar, Tag, DSIG_TAG, TTC_HEADER_TAG, TT_SFNT_VERSION, WHOLE_FILE_CHECKSUM_MAGIC,
};

pub const HEAD: Tag = Tag::new(b"head");
pub const NAME: Tag = Tag::new(b"name");
pub const OS2: Tag = Tag::new(b"OS/2");

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer contains zero bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// Append raw bytes.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append zero bytes until the length is a multiple of four.
    pub fn pad4(mut self) -> Self {
        self.data.resize(self.data.len().next_multiple_of(4), 0);
        self
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// The sfnt checksum, duplicated here so the builders stay independent of
/// the code they are used to test.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

/// Encode a string as UTF-16BE.
pub fn utf16_be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Assembles one font: an offset table followed by its tables.
#[derive(Debug, Clone)]
pub struct FontBuilder {
    sfnt_version: u32,
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        FontBuilder {
            sfnt_version: TT_SFNT_VERSION,
            tables: Default::default(),
        }
    }
}

impl FontBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signature written at the start of the offset table.
    pub fn sfnt_version(mut self, version: u32) -> Self {
        self.sfnt_version = version;
        self
    }

    /// Add (or replace) a table. Tables are written in tag order.
    pub fn table(mut self, tag: Tag, data: impl Into<Vec<u8>>) -> Self {
        self.tables.insert(tag, data.into());
        self
    }

    /// Build a standalone font file.
    pub fn build(&self) -> Vec<u8> {
        self.build_at(0)
    }

    /// The size of the offset table, in bytes.
    pub fn directory_len(&self) -> usize {
        12 + 16 * self.tables.len()
    }

    /// Build a font whose first byte will live at `base` in the final file.
    ///
    /// Table offsets in the directory are absolute, so a font placed in a
    /// collection must know where it will end up.
    pub fn build_at(&self, base: u32) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let mut layout = Vec::new();
        let mut pos = self.directory_len();
        for (tag, data) in &self.tables {
            let mut data = data.clone();
            // the head checksum is computed with a zero adjustment
            if *tag == HEAD && data.len() >= 12 {
                data[8..12].copy_from_slice(&[0; 4]);
            }
            let len = data.len();
            layout.push((*tag, checksum(&data), base + pos as u32, data));
            pos = (pos + len).next_multiple_of(4);
        }

        let mut font = BeBuffer::new()
            .push(self.sfnt_version)
            .push(num_tables)
            .extend([0u16; 3]);
        for (tag, sum, offset, data) in &layout {
            font = font.push(*tag).push(*sum).push(*offset).push(data.len() as u32);
        }
        for (_, _, _, data) in &layout {
            font = font.bytes(data).pad4();
        }
        let mut font = font.into_vec();

        if let Some((_, _, offset, data)) = layout.iter().find(|entry| entry.0 == HEAD) {
            if data.len() >= 12 {
                let adjustment = WHOLE_FILE_CHECKSUM_MAGIC.wrapping_sub(checksum(&font));
                let pos = (*offset - base) as usize + 8;
                font[pos..pos + 4].copy_from_slice(&adjustment.to_be_bytes());
            }
        }
        font
    }
}

/// Assembles a collection file from several fonts.
#[derive(Debug, Clone, Default)]
pub struct CollectionBuilder {
    fonts: Vec<FontBuilder>,
    dsig: Option<Vec<u8>>,
}

impl CollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, font: FontBuilder) -> Self {
        self.fonts.push(font);
        self
    }

    /// Add signature data, making this a version 2 header.
    pub fn dsig(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.dsig = Some(data.into());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let version: u16 = if self.dsig.is_some() { 2 } else { 1 };
        let mut header_len = 12 + 4 * self.fonts.len();
        if self.dsig.is_some() {
            header_len += 12;
        }
        let mut offsets = Vec::new();
        let mut pos = header_len;
        for font in &self.fonts {
            offsets.push(pos as u32);
            pos += font.build_at(pos as u32).len();
        }

        let mut file = BeBuffer::new()
            .push(TTC_HEADER_TAG)
            .extend([version, 0])
            .push(self.fonts.len() as u32)
            .extend(offsets.iter().copied());
        if let Some(dsig) = &self.dsig {
            file = file.push(DSIG_TAG).push(dsig.len() as u32).push(pos as u32);
        }
        for (font, offset) in self.fonts.iter().zip(&offsets) {
            file = file.bytes(&font.build_at(*offset));
        }
        if let Some(dsig) = &self.dsig {
            file = file.bytes(dsig).pad4();
        }
        file.into_vec()
    }
}

/// A format 0 `name` table.
///
/// Each record is `(platform, encoding, language, name_id, raw bytes)`.
pub fn name_table(records: &[(u16, u16, u16, u16, &[u8])]) -> Vec<u8> {
    let string_offset = 6 + 12 * records.len();
    let mut buf = BeBuffer::new()
        .push(0u16)
        .push(records.len() as u16)
        .push(string_offset as u16);
    let mut strings = Vec::new();
    for (platform, encoding, language, name_id, bytes) in records {
        buf = buf
            .extend([*platform, *encoding, *language, *name_id])
            .push(bytes.len() as u16)
            .push(strings.len() as u16);
        strings.extend_from_slice(bytes);
    }
    buf.bytes(&strings).into_vec()
}

/// A 54-byte `head` table with the given raw timestamps.
pub fn head_table(created: i64, modified: i64) -> Vec<u8> {
    BeBuffer::new()
        .extend([1u16, 0])
        .push(0x0001_0000u32) // fontRevision
        .push(0u32) // checkSumAdjustment
        .push(0x5F0F_3CF5u32) // magicNumber
        .push(0u16) // flags
        .push(1000u16) // unitsPerEm
        .push(created)
        .push(modified)
        .extend([0i16; 4]) // bounding box
        .extend([0u16; 2]) // macStyle, lowestRecPPEM
        .extend([2i16, 0, 0])
        .into_vec()
}

/// A version 4 `OS/2` table (96 bytes) with the given vendor ID.
pub fn os2_table(version: u16, vendor_id: [u8; 4]) -> Vec<u8> {
    BeBuffer::new()
        .push(version)
        .extend([0u16; 28])
        .bytes(&vendor_id)
        .extend([0u16; 17])
        .into_vec()
}
