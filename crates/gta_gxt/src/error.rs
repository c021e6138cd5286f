//! Error types that can be emitted from this library
//!

use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::encoding::TextEncoding;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// requested input path does not exist
    #[error("unable to find {}", .0.display())]
    NotFound(PathBuf),

    /// file is not a well formed text table
    #[error("invalid gxt file: {0}")]
    #[diagnostic(code(gta_gxt::format))]
    Format(#[from] FormatError),

    /// a character can not be represented by the target encoding
    #[error("character {ch:?} can not be encoded as {encoding}")]
    Unencodable {
        /// The offending character
        ch: char,
        /// The encoding that was being written
        encoding: TextEncoding,
    },

    /// a table name can not be stored in an 8 byte header slot
    #[error("table name {0:?} must be at most 8 ascii characters")]
    InvalidTableName(String),

    /// the tables of a file do not fit its layout
    #[error("{0}")]
    Layout(String),

    /// a section exceeds the range of its 32 bit length field
    #[error("section is too large to be stored")]
    TooLarge,
}

/// Error type to provide further information when a file is malformed
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// input ends before the format could be detected
    #[error("input is too short to contain a header")]
    TooShort,

    /// leading bytes match none of the known shapes
    #[error("unrecognized header {0:02X?}")]
    UnknownMagic([u8; 8]),

    /// a section marker is missing where one is required
    #[error("expected {expected} marker at offset {offset:#x}")]
    MissingMarker {
        /// The marker that should have been present
        expected: &'static str,
        /// Where it was looked for
        offset: u64,
    },

    /// a section length is negative or not a whole number of records
    #[error("{section} section length {length} is not a multiple of {record_size}")]
    InvalidSectionLength {
        /// The section being read
        section: &'static str,
        /// The declared length
        length: i32,
        /// Size of one record in this section
        record_size: usize,
    },

    /// a directory or key record points before the start of its block
    #[error("negative offset {0}")]
    NegativeOffset(i32),

    /// stream ends before a required field or region
    #[error("unexpected end of data")]
    Truncated,
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            io::ErrorKind::UnexpectedEof => Error::Format(FormatError::Truncated),
            _ => Error::IOError(value),
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        match value {
            binrw::Error::Io(e) => e.into(),
            // derived readers wrap the io error in a backtrace
            other if other.is_eof() => Error::Format(FormatError::Truncated),
            other => Error::BinRWError(other),
        }
    }
}

impl Error {
    /// Whether this error is a structural problem with the input
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
