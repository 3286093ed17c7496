//! Inspecting whole files
//!
//! [`scan_file`] runs every check this crate knows about over one file and
//! collects the outcome in a [`FileReport`]. Problems inside one font of a
//! collection are recorded in that font's [`FontReport`] and do not stop
//! the remaining fonts from being read.

use types::NameId;

use crate::{
    dates::{
        postscript::{creation_date_from_source, CreationDate, DateParseError, DEFAULT_HEADER_LIMIT},
        DateOutcome,
    },
    encoding::Validation,
    tables::{
        head::HeadDates,
        name::{Name, NameEntries, NameEntry},
        os2::Os2VendorInfo,
    },
    ByteSource, CancelToken, ChecksumBuffer, ChecksumVerifier, Finding, FontContainer,
    OffsetTable, ReadError, Severity, TableRecord, DEFAULT_CHECKSUM_BUFFER_SIZE,
};

/// Settings for [`scan_file`] and [`scan_files`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// How strictly decoded names are checked.
    ///
    /// Informational names are always checked with
    /// [`Validation::Relaxed`].
    pub validation: Validation,
    pub verify_checksums: bool,
    pub decode_names: bool,
    /// Size of the scratch buffer used for checksums, rounded up to a
    /// multiple of four.
    pub checksum_buffer_size: usize,
    /// How many leading bytes are searched for `%%CreationDate:`.
    pub postscript_header_limit: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            validation: Validation::Strict,
            verify_checksums: true,
            decode_names: true,
            checksum_buffer_size: DEFAULT_CHECKSUM_BUFFER_SIZE,
            postscript_header_limit: DEFAULT_HEADER_LIMIT,
        }
    }
}

impl ScanOptions {
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn with_names(mut self, decode: bool) -> Self {
        self.decode_names = decode;
        self
    }

    pub fn with_checksum_buffer_size(mut self, size: usize) -> Self {
        self.checksum_buffer_size = size;
        self
    }

    pub fn with_postscript_header_limit(mut self, limit: usize) -> Self {
        self.postscript_header_limit = limit;
        self
    }

    /// Look for a PostScript creation date in the first
    /// [`postscript_header_limit`](Self::postscript_header_limit) bytes.
    pub fn creation_date<S: ByteSource>(
        &self,
        source: &mut S,
    ) -> Result<CreationDate, DateParseError> {
        creation_date_from_source(source, self.postscript_header_limit)
    }
}

/// Everything learned about one font of a file.
///
/// Each step that can fail on its own holds a `Result`. Steps that were
/// disabled, or whose table is absent, are `None`.
#[derive(Debug)]
pub struct FontReport {
    /// Position of this font in the collection; zero for single fonts.
    pub index: usize,
    pub offset: u32,
    pub directory: Result<OffsetTable, ReadError>,
    pub checksums: Option<Result<Vec<Finding>, ReadError>>,
    /// Decoded names. A table that stopped partway still keeps the entries
    /// read before the failing record.
    pub names: Option<Result<NameEntries, ReadError>>,
    pub vendor: Option<Result<Os2VendorInfo, ReadError>>,
    pub dates: Option<Result<DateOutcome, ReadError>>,
}

impl FontReport {
    fn skipped(index: usize, offset: u32, error: ReadError) -> Self {
        FontReport {
            index,
            offset,
            directory: Err(error),
            checksums: None,
            names: None,
            vendor: None,
            dates: None,
        }
    }

    /// The error that stopped the structural reading of this font, if any.
    ///
    /// Failing to read the vendor ID or the dates is not structural.
    pub fn fatal_error(&self) -> Option<&ReadError> {
        self.directory
            .as_ref()
            .err()
            .or_else(|| self.checksums.as_ref().and_then(|r| r.as_ref().err()))
            .or_else(|| match &self.names {
                Some(Ok(names)) => names.error.as_ref(),
                Some(Err(e)) => Some(e),
                None => None,
            })
    }

    /// Checksum and alignment findings for this font.
    pub fn findings(&self) -> &[Finding] {
        match &self.checksums {
            Some(Ok(findings)) => findings,
            _ => &[],
        }
    }

    /// The preferred decoded record for `name_id`.
    pub fn name(&self, name_id: NameId) -> Option<&NameEntry> {
        match &self.names {
            Some(Ok(names)) => names.best(name_id),
            _ => None,
        }
    }
}

/// The outcome of [`scan_file`].
#[derive(Debug)]
pub struct FileReport {
    pub container: FontContainer,
    pub fonts: Vec<FontReport>,
    /// Whole-file checksum and size findings.
    pub findings: Vec<Finding>,
}

impl FileReport {
    fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .chain(self.fonts.iter().flat_map(FontReport::findings))
    }

    pub fn severity(&self) -> Severity {
        if self.fonts.iter().any(|font| font.fatal_error().is_some()) {
            return Severity::Fatal;
        }
        self.all_findings()
            .map(Severity::of)
            .max()
            .unwrap_or_default()
    }

    /// Structural errors plus checksum mismatches.
    pub fn error_count(&self) -> usize {
        let fatal = self
            .fonts
            .iter()
            .filter(|font| font.fatal_error().is_some())
            .count();
        fatal + self.all_findings().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.all_findings().filter(|f| f.is_warning()).count()
    }
}

/// Keep an error with the step that produced it, unless it is a
/// cancellation, which ends the whole scan.
fn scoped<T>(result: Result<T, ReadError>) -> Result<Result<T, ReadError>, ReadError> {
    match result {
        Err(ReadError::Cancelled) => Err(ReadError::Cancelled),
        other => Ok(other),
    }
}

fn read_names<S: ByteSource>(
    source: &mut S,
    table: &TableRecord,
    validation: Validation,
    cancel: &CancelToken,
) -> Result<NameEntries, ReadError> {
    Name::read(source, table, cancel)?.entries(source, validation, cancel)
}

fn scan_font<S: ByteSource>(
    source: &mut S,
    index: usize,
    offset: u32,
    options: &ScanOptions,
    verifier: &mut ChecksumVerifier,
    cancel: &CancelToken,
) -> Result<FontReport, ReadError> {
    cancel.check()?;
    let directory = match scoped(OffsetTable::read(source, offset))? {
        Ok(directory) => directory,
        Err(e) => {
            log::warn!("font {index} at 0x{offset:X} skipped: {e}");
            return Ok(FontReport::skipped(index, offset, e));
        }
    };

    let names = match directory.name().filter(|_| options.decode_names) {
        Some(table) => Some(scoped(read_names(source, table, options.validation, cancel))?),
        None => None,
    };
    match &names {
        Some(Err(e)) => log::warn!("font {index}: name table unreadable: {e}"),
        Some(Ok(NameEntries {
            entries,
            error: Some(e),
        })) => log::warn!(
            "font {index}: name table cut short after {} records: {e}",
            entries.len()
        ),
        _ => (),
    }
    let vendor = match directory.os2() {
        Some(table) => Some(scoped(Os2VendorInfo::read(source, table))?),
        None => None,
    };
    let dates = match directory.head() {
        Some(table) => Some(scoped(
            HeadDates::read(source, table).map(|dates| dates.resolve()),
        )?),
        None => None,
    };
    let checksums = if options.verify_checksums {
        let result = scoped(verifier.verify_font(source, &directory))?;
        if let Err(e) = &result {
            log::warn!("font {index}: checksum verification stopped: {e}");
        }
        Some(result)
    } else {
        None
    };
    Ok(FontReport {
        index,
        offset,
        directory: Ok(directory),
        checksums,
        names,
        vendor,
        dates,
    })
}

/// Inspect one font file or collection.
///
/// An `Err` means the file as a whole could not be read (it is too small,
/// not a font, a collection with too many fonts, or I/O failed) or that
/// `cancel` was triggered. Everything else is in the report.
pub fn scan_file<S: ByteSource>(
    mut source: S,
    options: &ScanOptions,
    cancel: &CancelToken,
) -> Result<FileReport, ReadError> {
    cancel.check()?;
    let container = FontContainer::read(&mut source)?;
    log::debug!(
        "{:?} of {} bytes with {} font(s)",
        container.kind,
        container.file_size,
        container.num_fonts()
    );
    let buffer = ChecksumBuffer::new(options.checksum_buffer_size);
    let mut verifier = ChecksumVerifier::new(buffer, cancel);
    let mut fonts = Vec::with_capacity(container.num_fonts());
    for (index, &offset) in container.font_offsets.iter().enumerate() {
        fonts.push(scan_font(
            &mut source,
            index,
            offset,
            options,
            &mut verifier,
            cancel,
        )?);
    }
    let findings = if options.verify_checksums {
        let directories = fonts
            .iter()
            .filter_map(|font| font.directory.as_ref().ok())
            .collect::<Vec<_>>();
        verifier.verify_file(&mut source, &container, &directories)?
    } else {
        Vec::new()
    };
    Ok(FileReport {
        container,
        fonts,
        findings,
    })
}

/// Inspect several files in turn.
///
/// Each file gets its own result; only cancellation, checked before every
/// file, ends the run early.
pub fn scan_files<S, I>(
    sources: I,
    options: &ScanOptions,
    cancel: &CancelToken,
) -> Result<Vec<Result<FileReport, ReadError>>, ReadError>
where
    S: ByteSource,
    I: IntoIterator<Item = S>,
{
    let mut reports = Vec::new();
    for source in sources {
        cancel.check()?;
        match scan_file(source, options, cancel) {
            Err(ReadError::Cancelled) => return Err(ReadError::Cancelled),
            Err(e) => {
                log::warn!("file {} not scanned: {e}", reports.len());
                reports.push(Err(e));
            }
            Ok(report) => reports.push(Ok(report)),
        }
    }
    Ok(reports)
}
