//! This library handles reading from and creating **GXT** text tables used by the *Grand Theft Auto* games.
//!
//! # GXT Format Documentation
//!
//! GXT files hold every piece of displayed game text, grouped into named tables. The main table is
//! always loaded while mission tables are swapped in as needed. Three shapes exist on disk, all
//! little-endian:
//!
//! | Shape               | Detected by                          | Keys             | Text              |
//! |---------------------|--------------------------------------|------------------|-------------------|
//! | Single table legacy | `TKEY` at offset 0                   | 8 byte names     | UTF-16LE          |
//! | Multi table legacy  | `TABL` at offset 0                   | 8 byte names     | UTF-16LE          |
//! | Hash keyed          | 4 byte version, then `TABL` at 4     | CRC-32 of name   | 8 bit, Windows-1252 |
//!
//! ## File Structure
//!
//! A multi table file starts with a table directory, optionally preceded by a version field:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Version                | 4 bytes: Hash keyed files only, `0x00080004`               |
//! | 0x0000/0x0004  | Magic number           | 4 bytes: "TABL"                                            |
//! | +0x0004        | Directory Length       | 4 bytes: Size of the directory, a multiple of 12           |
//! | +0x0008        | Directory              | 12 bytes per table                                         |
//!
//! The high half of the version field is the number of bits per character. Some re-releases use
//! `0x00100004` with UTF-16 text.
//!
//! ### Directory Entry
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 8 bytes: Zero padded ASCII                              |
//! | 0x0008         | Offset                 | 4 bytes: Absolute offset of the table body              |
//!
//! Every table body but the first starts with its 8 byte name again; the directory offset points
//! at that name.
//!
//! ### Table Body
//!
//! A body is a key block followed by a data block. A single table file is just one body and its
//! table is named `MAIN`.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "TKEY"                                         |
//! | 0x0004         | Key Length             | 4 bytes: Size of the key records                        |
//! | 0x0008         | Key Records            | 12 bytes (named) or 8 bytes (hashed) each               |
//! | ...            | Magic number           | 4 bytes: "TDAT"                                         |
//! | ...            | Data Length            | 4 bytes: Size of the string data                        |
//! | ...            | Data                   | Zero terminated strings                                 |
//!
//! - **Named Key Record**: 4 byte data offset followed by an 8 byte zero padded key name. Strings
//!   carry no length; a string ends where the next one starts.
//! - **Hashed Key Record**: 4 byte data offset followed by the CRC-32 of the upper-cased key name.
//!   Strings end at their zero terminator.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.gxt`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod encoding;
pub mod error;
pub mod file;
pub mod hash;
pub mod read;
pub mod table;
pub mod types;
pub mod write;

pub use encoding::TextEncoding;
pub use file::GxtFile;
pub use read::{GxtReader, LoadOptions};
pub use table::Table;
pub use types::{FormatVariant, Layout};
pub use write::GxtWriter;
