//! Base types for structure of GXT files.

use binrw::{BinRead, BinWrite};
use derive_more::derive::Display;

/// Marker opening the table directory
pub const TABL: [u8; 4] = *b"TABL";
/// Marker opening a key block
pub const TKEY: [u8; 4] = *b"TKEY";
/// Marker opening a string data block
pub const TDAT: [u8; 4] = *b"TDAT";

/// Name of the table that always comes first in string keyed files
pub const MAIN_TABLE: &str = "MAIN";

/// How keys and text are represented in a file
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FormatVariant {
    /// 8 byte key names with 16 bit text
    #[display("string keyed")]
    LegacyStringKeyed,

    /// 32 bit key hashes with 8 bit text
    #[display("hash keyed")]
    HashKeyed,
}

/// Container layout of a file
#[derive(Debug, Display, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// A bare key and data block forming the `MAIN` table
    #[display("single table")]
    SingleTable,

    /// A `TABL` directory followed by table bodies
    #[default]
    #[display("multi table")]
    MultiTable,
}

/// Entry of the `TABL` directory
///
/// The offset is absolute and points at the table body, including the repeated name
/// that every table except the first carries.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct TableHeader {
    /// Zero padded ASCII table name
    pub name: [u8; 8],

    /// Offset from the beginning of the file to the table body
    pub offset: i32,
}

impl TableHeader {
    /// Size of a directory entry on disk
    pub const SIZE: usize = 12;

    /// Decoded table name
    pub fn name(&self) -> String {
        fixed_name(&self.name)
    }
}

/// Key record of a string keyed table
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct NamedKeyRecord {
    /// Offset of the string from the start of the data block
    pub offset: i32,

    /// Zero padded ASCII key name
    pub name: [u8; 8],
}

impl NamedKeyRecord {
    /// Size of a key record on disk
    pub const SIZE: usize = 12;

    /// Decoded key name
    pub fn name(&self) -> String {
        fixed_name(&self.name)
    }
}

/// Key record of a hash keyed table
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct HashedKeyRecord {
    /// Offset of the string from the start of the data block
    pub offset: i32,

    /// [`crate::hash::key_hash`] of the key name
    pub hash: u32,
}

impl HashedKeyRecord {
    /// Size of a key record on disk
    pub const SIZE: usize = 8;
}

/// Decode a zero padded name field, mapping bytes outside 7 bit ASCII to `?`.
pub fn fixed_name(raw: &[u8]) -> String {
    raw.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// Encode a name into a zero padded 8 byte field, truncating anything longer.
pub fn to_fixed_name(name: &str) -> [u8; 8] {
    let mut raw = [0u8; 8];
    for (slot, c) in raw.iter_mut().zip(name.chars()) {
        *slot = if c.is_ascii() { c as u8 } else { b'?' };
    }
    raw
}
