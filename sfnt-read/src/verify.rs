//! Checksum, alignment and size verification

use std::fmt::{self, Display, Formatter};

use types::{Tag, WHOLE_FILE_CHECKSUM_MAGIC};

use crate::{
    directory::HEAD_TAG, tables::head::checksum_adjustment, ByteSource, CancelToken,
    ChecksumBuffer, ContainerKind, FontContainer, OffsetTable, ReadError, TableRecord,
};

/// A recoverable problem found while verifying a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Finding {
    /// A table's data does not match the checksum in its directory record.
    ChecksumMismatch { tag: Tag, stored: u32, computed: u32 },
    /// The checksum of a whole single-font file is not `0xB1B0AFBA`.
    WholeFileChecksum { computed: u32 },
    /// A table (or, with no tag, an offset table) does not start on a
    /// four byte boundary.
    Misaligned { tag: Option<Tag>, offset: u32 },
    /// The structures in the file do not account for exactly its size.
    SizeMismatch { expected: u64, actual: u64 },
}

impl Finding {
    /// Checksum failures; everything else is a warning.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Finding::ChecksumMismatch { .. } | Finding::WholeFileChecksum { .. }
        )
    }

    pub fn is_warning(&self) -> bool {
        !self.is_error()
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Finding::ChecksumMismatch {
                tag,
                stored,
                computed,
            } => write!(
                f,
                "'{tag}' checksum is 0x{computed:08X}, directory says 0x{stored:08X}"
            ),
            Finding::WholeFileChecksum { computed } => write!(
                f,
                "file checksum is 0x{computed:08X}, expected 0x{WHOLE_FILE_CHECKSUM_MAGIC:08X}"
            ),
            Finding::Misaligned { tag: Some(tag), offset } => {
                write!(f, "'{tag}' at 0x{offset:X} is not 4-byte aligned")
            }
            Finding::Misaligned { tag: None, offset } => {
                write!(f, "offset table at 0x{offset:X} is not 4-byte aligned")
            }
            Finding::SizeMismatch { expected, actual } => {
                write!(f, "file is {actual} bytes, structures account for {expected}")
            }
        }
    }
}

/// The overall result of checking a file, worst last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    #[default]
    AllCorrect,
    Warnings,
    ChecksumErrors,
    /// Some part of the file could not be read at all.
    Fatal,
}

impl Severity {
    /// The severity contributed by a single finding.
    pub fn of(finding: &Finding) -> Severity {
        if finding.is_error() {
            Severity::ChecksumErrors
        } else {
            Severity::Warnings
        }
    }
}

/// Computes and compares checksums for the tables of a file.
///
/// The verifier owns the scratch buffer, so one verifier serves a single
/// call chain.
#[derive(Debug)]
pub struct ChecksumVerifier<'a> {
    buffer: ChecksumBuffer,
    cancel: &'a CancelToken,
}

impl<'a> ChecksumVerifier<'a> {
    pub fn new(buffer: ChecksumBuffer, cancel: &'a CancelToken) -> Self {
        ChecksumVerifier { buffer, cancel }
    }

    /// Compute the checksum of one table, as it should appear in the
    /// directory.
    ///
    /// For `head`, the table's own `checkSumAdjustment` is excluded.
    pub fn table_checksum<S: ByteSource>(
        &mut self,
        source: &mut S,
        record: &TableRecord,
    ) -> Result<u32, ReadError> {
        record.check_bounds(source.len(), "table")?;
        let mut sum = self.buffer.region_checksum(
            source,
            record.offset as u64,
            record.length as u64,
            self.cancel,
        )?;
        if record.tag == HEAD_TAG {
            if let Some(adjustment) = checksum_adjustment(source, record)? {
                sum = sum.wrapping_sub(adjustment);
            }
        }
        Ok(sum)
    }

    /// Check every table of one font.
    ///
    /// A table that extends past the end of the file ends verification of
    /// this font with a [`ReadError::BoundsError`].
    pub fn verify_font<S: ByteSource>(
        &mut self,
        source: &mut S,
        directory: &OffsetTable,
    ) -> Result<Vec<Finding>, ReadError> {
        let mut findings = Vec::new();
        if directory.font_offset % 4 != 0 {
            findings.push(Finding::Misaligned {
                tag: None,
                offset: directory.font_offset,
            });
        }
        for record in &directory.records {
            self.cancel.check()?;
            if !record.is_aligned() {
                log::debug!("'{}' at 0x{:X} is misaligned", record.tag, record.offset);
                findings.push(Finding::Misaligned {
                    tag: Some(record.tag),
                    offset: record.offset,
                });
            }
            let computed = self.table_checksum(source, record)?;
            if computed != record.checksum {
                log::warn!(
                    "'{}' checksum mismatch: computed 0x{computed:08X}, stored 0x{:08X}",
                    record.tag,
                    record.checksum
                );
                findings.push(Finding::ChecksumMismatch {
                    tag: record.tag,
                    stored: record.checksum,
                    computed,
                });
            }
        }
        Ok(findings)
    }

    /// File-level checks: the whole-file checksum (single fonts only) and
    /// the bytes-used accounting.
    ///
    /// `directories` are the offset tables that could be read.
    pub fn verify_file<S: ByteSource>(
        &mut self,
        source: &mut S,
        container: &FontContainer,
        directories: &[&OffsetTable],
    ) -> Result<Vec<Finding>, ReadError> {
        let mut findings = Vec::new();
        if container.kind == ContainerKind::Single {
            let computed = self
                .buffer
                .region_checksum(source, 0, container.file_size, self.cancel)?;
            if computed != WHOLE_FILE_CHECKSUM_MAGIC {
                log::warn!("whole file checksum is 0x{computed:08X}");
                findings.push(Finding::WholeFileChecksum { computed });
            }
        }
        let expected = bytes_used(container, directories);
        if expected != container.file_size {
            log::debug!("{expected} bytes used of {}", container.file_size);
            findings.push(Finding::SizeMismatch {
                expected,
                actual: container.file_size,
            });
        }
        Ok(findings)
    }
}

/// The extent of the file described by its structures, rounded up to a
/// multiple of four.
pub fn bytes_used(container: &FontContainer, directories: &[&OffsetTable]) -> u64 {
    let round4 = |n: u64| n.next_multiple_of(4);
    let mut used = round4(container.header_len);
    for directory in directories {
        used = used.max(round4(directory.font_offset as u64 + directory.byte_len()));
        for record in &directory.records {
            used = used.max(round4(record.end()));
        }
    }
    if let Some(dsig) = &container.dsig {
        used = used.max(round4(dsig.end()));
    }
    used
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sfnt_test_data::{
        head_table, name_table, os2_table, utf16_be, CollectionBuilder, FontBuilder, HEAD, NAME,
        OS2,
    };

    use super::*;
    use crate::{compute_checksum, SliceSource};

    fn sample_font() -> FontBuilder {
        FontBuilder::new()
            .table(HEAD, head_table(3_000_000_000, 3_100_000_000))
            .table(NAME, name_table(&[(3, 1, 0x409, 1, &utf16_be("Sample"))]))
            .table(OS2, os2_table(4, *b"TEST"))
    }

    fn verify(bytes: &[u8]) -> (Vec<Finding>, Vec<Finding>) {
        let cancel = CancelToken::new();
        let mut source = SliceSource::new(bytes);
        let container = FontContainer::read(&mut source).unwrap();
        let mut verifier = ChecksumVerifier::new(ChecksumBuffer::new(64), &cancel);
        let directories: Vec<_> = container
            .font_offsets
            .iter()
            .map(|offset| OffsetTable::read(&mut source, *offset).unwrap())
            .collect();
        let mut font_findings = Vec::new();
        for directory in &directories {
            font_findings.extend(verifier.verify_font(&mut source, directory).unwrap());
        }
        let refs: Vec<_> = directories.iter().collect();
        let file_findings = verifier
            .verify_file(&mut source, &container, &refs)
            .unwrap();
        (font_findings, file_findings)
    }

    #[test]
    fn well_formed_font() {
        let font = sample_font().build();
        assert_eq!(compute_checksum(&font), WHOLE_FILE_CHECKSUM_MAGIC);
        assert_eq!(verify(&font), (vec![], vec![]));
    }

    #[test]
    fn flipped_byte() {
        let mut font = sample_font().build();
        let cancel = CancelToken::new();
        let directory = OffsetTable::read(&mut SliceSource::new(&font), 0).unwrap();
        let name = *directory.name().unwrap();
        font[name.offset as usize + 8] ^= 0x01;

        let (font_findings, file_findings) = verify(&font);
        assert_eq!(font_findings.len(), 1);
        assert!(matches!(
            font_findings[0],
            Finding::ChecksumMismatch { tag, stored, .. }
                if tag == NAME && stored == name.checksum
        ));
        assert!(matches!(
            file_findings.as_slice(),
            [Finding::WholeFileChecksum { .. }]
        ));

        // the other tables still verify
        let mut verifier = ChecksumVerifier::new(ChecksumBuffer::default(), &cancel);
        let mut source = SliceSource::new(&font);
        for record in directory.records.iter().filter(|r| r.tag != NAME) {
            assert_eq!(
                verifier.table_checksum(&mut source, record).unwrap(),
                record.checksum
            );
        }
    }

    #[test]
    fn head_adjustment_is_excluded() {
        let font = sample_font().build();
        let directory = OffsetTable::read(&mut SliceSource::new(&font), 0).unwrap();
        let head = *directory.head().unwrap();
        let start = head.offset as usize;
        let raw = compute_checksum(&font[start..start + head.length as usize]);
        assert_ne!(raw, head.checksum);
        let cancel = CancelToken::new();
        let mut verifier = ChecksumVerifier::new(ChecksumBuffer::default(), &cancel);
        let computed = verifier
            .table_checksum(&mut SliceSource::new(&font), &head)
            .unwrap();
        assert_eq!(computed, head.checksum);
    }

    #[test]
    fn collections_skip_whole_file_checksum() {
        let file = CollectionBuilder::new()
            .font(sample_font())
            .font(FontBuilder::new().table(HEAD, head_table(1, 2)))
            .build();
        assert_ne!(compute_checksum(&file), WHOLE_FILE_CHECKSUM_MAGIC);
        assert_eq!(verify(&file), (vec![], vec![]));
    }

    #[test]
    fn dsig_counts_toward_size() {
        let file = CollectionBuilder::new()
            .font(sample_font())
            .dsig(vec![0u8; 10])
            .build();
        let (_, file_findings) = verify(&file);
        assert_eq!(file_findings, vec![]);
    }

    #[test]
    fn size_mismatch() {
        let mut font = sample_font().build();
        font.extend([0u8; 8]);
        let (_, file_findings) = verify(&font);
        assert_eq!(
            file_findings,
            vec![Finding::SizeMismatch {
                expected: font.len() as u64 - 8,
                actual: font.len() as u64,
            }]
        );
        assert!(file_findings[0].is_warning());
    }

    #[test]
    fn table_past_end_of_file() {
        let mut font = sample_font().build();
        let directory = OffsetTable::read(&mut SliceSource::new(&font), 0).unwrap();
        let last = directory.records.last().unwrap();
        let new_len = last.end() as usize - 2;
        font.truncate(new_len);
        let cancel = CancelToken::new();
        let directory = OffsetTable::read(&mut SliceSource::new(&font), 0).unwrap();
        let mut verifier = ChecksumVerifier::new(ChecksumBuffer::default(), &cancel);
        assert!(matches!(
            verifier.verify_font(&mut SliceSource::new(&font), &directory),
            Err(ReadError::BoundsError { .. })
        ));
    }

    #[test]
    fn severity_order() {
        assert!(Severity::Fatal > Severity::ChecksumErrors);
        assert!(Severity::ChecksumErrors > Severity::Warnings);
        assert!(Severity::Warnings > Severity::AllCorrect);
        let finding = Finding::Misaligned {
            tag: Some(NAME),
            offset: 3,
        };
        assert_eq!(Severity::of(&finding), Severity::Warnings);
        assert_eq!(finding.to_string(), "'name' at 0x3 is not 4-byte aligned");
    }
}
