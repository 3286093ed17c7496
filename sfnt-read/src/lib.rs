//! Inspecting OpenType and TrueType files
//!
//! This crate reads the container structure of sfnt font files and
//! collections: the collection header, the table directory of each font, the
//! [`name`][name-table] table, the vendor ID from `OS/2` and the timestamps in
//! `head`. It verifies table and whole-file checksums, and decodes name
//! strings from every platform and legacy encoding in common use.
//!
//! Nothing here requires the whole file to be in memory. Data is read
//! through a [`ByteSource`], which is implemented for byte slices and for
//! any seekable reader.
//!
//! Errors are scoped: a problem in one font of a collection does not stop
//! the others from being read, and a broken `name` table does not stop the
//! checksums from being verified. See [`scan_file`] for the full pipeline.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use sfnt_read::{scan_file, CancelToken, ReaderSource, ScanOptions, Severity};
//! use sfnt_read::types::NameId;
//!
//! let file = std::fs::File::open(path_to_my_font_file).unwrap();
//! let source = ReaderSource::new(std::io::BufReader::new(file)).unwrap();
//! let report = scan_file(source, &ScanOptions::default(), &CancelToken::new()).unwrap();
//! for font in &report.fonts {
//!     if let Some(family) = font.name(NameId::FAMILY_NAME) {
//!         println!("font {}: {}", font.index, family.text);
//!     }
//! }
//! assert_eq!(report.severity(), Severity::AllCorrect);
//! ```
//!
//! [name-table]: https://learn.microsoft.com/en-us/typography/opentype/spec/name

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod cancel;
mod checksum;
mod container;
pub mod dates;
mod directory;
pub mod encoding;
mod error;
mod scan;
mod source;
pub mod tables;
mod verify;

/// Public re-export of the sfnt-types crate.
pub extern crate sfnt_types as types;

pub use cancel::CancelToken;
pub use checksum::{compute_checksum, ChecksumBuffer, DEFAULT_CHECKSUM_BUFFER_SIZE};
pub use container::{
    is_sfnt_version, ContainerKind, DsigRecord, FontContainer, MAX_COLLECTION_FONTS,
};
pub use directory::{OffsetTable, TableRecord, HEAD_TAG, MAX_TABLES, NAME_TAG, OS2_TAG};
pub use encoding::{decode_name, DecodeError, NameText, Validation};
pub use error::ReadError;
pub use scan::{scan_file, scan_files, FileReport, FontReport, ScanOptions};
pub use source::{ByteSource, ReaderSource, SliceSource};
pub use verify::{bytes_used, ChecksumVerifier, Finding, Severity};
