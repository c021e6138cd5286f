//! Types for reading GXT files
//!

use binrw::BinRead;
use bon::Builder;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, instrument, trace};

use crate::{
    encoding::TextEncoding,
    error::{Error, FormatError, Result},
    file::GxtFile,
    table::Table,
    types::{
        to_fixed_name, FormatVariant, HashedKeyRecord, Layout, NamedKeyRecord, TableHeader,
        MAIN_TABLE, TABL, TDAT, TKEY,
    },
};

/// Options for how a GXT file should be loaded
#[derive(Debug, Clone, Builder)]
pub struct LoadOptions {
    /// Decode strings with this encoding instead of the one implied by the file
    pub encoding: Option<TextEncoding>,

    /// Remember the original key names of string keyed tables.
    ///
    /// Without them, saving a string keyed file has to synthesize key names from the
    /// hashes, which changes the keys of every entry.
    #[builder(default = true)]
    pub preserve_key_names: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions::builder().build()
    }
}

/// On-disk shape of a file, as told by its first bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Starts with `TKEY`: the whole file is the `MAIN` table
    SingleTable,

    /// Starts with `TABL`: string keyed table directory
    MultiTable,

    /// Starts with a version field followed by `TABL`: hash keyed table directory
    Versioned(u32),
}

impl Shape {
    /// Classify a stream by its leading bytes.
    ///
    /// On success the stream is positioned where the shape's next structure starts: the
    /// beginning of the file for [`Shape::SingleTable`], the directory length otherwise.
    pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<Shape> {
        let mut prefix = Vec::with_capacity(8);
        reader.by_ref().take(8).read_to_end(&mut prefix)?;

        if prefix.len() < 4 {
            return Err(FormatError::TooShort.into());
        }

        let shape = if prefix[0..4] == TKEY {
            reader.seek(SeekFrom::Start(0))?;
            Shape::SingleTable
        } else if prefix[0..4] == TABL {
            reader.seek(SeekFrom::Start(4))?;
            Shape::MultiTable
        } else if prefix.len() == 8 && prefix[4..8] == TABL {
            reader.seek(SeekFrom::Start(8))?;
            Shape::Versioned(u32::from_le_bytes([
                prefix[0], prefix[1], prefix[2], prefix[3],
            ]))
        } else {
            let mut magic = [0u8; 8];
            magic[..prefix.len()].copy_from_slice(&prefix);
            return Err(FormatError::UnknownMagic(magic).into());
        };

        debug!(?shape, "detected format");
        Ok(shape)
    }

    /// Key representation used by this shape
    pub fn variant(&self) -> FormatVariant {
        match self {
            Shape::SingleTable | Shape::MultiTable => FormatVariant::LegacyStringKeyed,
            Shape::Versioned(_) => FormatVariant::HashKeyed,
        }
    }

    /// Container layout of this shape
    pub fn layout(&self) -> Layout {
        match self {
            Shape::SingleTable => Layout::SingleTable,
            Shape::MultiTable | Shape::Versioned(_) => Layout::MultiTable,
        }
    }

    /// Encoding used by files of this shape unless overridden
    pub fn encoding(&self) -> TextEncoding {
        match self {
            Shape::SingleTable | Shape::MultiTable => TextEncoding::Utf16,
            Shape::Versioned(version) if version >> 16 == 16 => TextEncoding::Utf16,
            Shape::Versioned(_) => TextEncoding::Windows1252,
        }
    }
}

/// GXT file reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_tables(reader: impl Read + Seek) -> gta_gxt::error::Result<()> {
///     let gxt = gta_gxt::GxtReader::new(reader, Default::default()).read()?;
///
///     for table in gxt.tables() {
///         println!("{}: {} entries", table.name(), table.len());
///     }
///
///     Ok(())
/// }
/// ```
pub struct GxtReader<R> {
    reader: R,
    options: LoadOptions,
}

impl<R: Read + Seek> GxtReader<R> {
    /// Prepare to read a GXT file from the stream's start.
    pub fn new(reader: R, options: LoadOptions) -> GxtReader<R> {
        GxtReader { reader, options }
    }

    /// Read every table of the file.
    ///
    /// The reader is consumed; a load either produces the whole model or fails.
    #[instrument(skip(self), err)]
    pub fn read(mut self) -> Result<GxtFile> {
        self.reader.seek(SeekFrom::Start(0))?;

        let shape = Shape::detect(&mut self.reader)?;
        let encoding = self.options.encoding.unwrap_or_else(|| shape.encoding());
        let mut gxt = GxtFile::from_parts(shape.variant(), encoding, shape.layout());

        let headers = match shape {
            Shape::SingleTable => vec![TableHeader {
                name: to_fixed_name(MAIN_TABLE),
                offset: 0,
            }],
            Shape::MultiTable | Shape::Versioned(_) => self.read_headers()?,
        };

        for (index, header) in headers.iter().enumerate() {
            self.reader.seek(SeekFrom::Start(header.offset as u64))?;
            if index > 0 {
                // repeated table name
                self.reader.seek(SeekFrom::Current(8))?;
            }

            let table = match shape.variant() {
                FormatVariant::LegacyStringKeyed => {
                    self.read_named_table(header.name(), encoding)?
                }
                FormatVariant::HashKeyed => self.read_hashed_table(header.name(), encoding)?,
            };

            debug!(table = table.name(), entries = table.len(), "read table");
            gxt.insert_table(table);
        }

        Ok(gxt)
    }

    /// Read the `TABL` directory. The stream must be positioned on its length field.
    pub fn read_headers(&mut self) -> Result<Vec<TableHeader>> {
        let length = self.reader.read_i32::<LittleEndian>()?;
        let count = checked_count("TABL", length, TableHeader::SIZE)?;

        let mut headers = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let header = TableHeader::read(&mut self.reader)?;
            if header.offset < 0 {
                return Err(FormatError::NegativeOffset(header.offset).into());
            }
            trace!(name = %header.name(), offset = header.offset, "table header");
            headers.push(header);
        }

        Ok(headers)
    }

    fn read_named_table(&mut self, name: String, encoding: TextEncoding) -> Result<Table> {
        let count = self.read_section(TKEY, "TKEY", NamedKeyRecord::SIZE)?;
        let mut records = (0..count)
            .map(|_| NamedKeyRecord::read(&mut self.reader).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        let data_length = self.read_section(TDAT, "TDAT", 1)?;
        let data = self.read_block(data_length)?;

        check_offsets(records.iter().map(|r| r.offset))?;
        records.sort_by_key(|r| r.offset);

        let mut table = if self.options.preserve_key_names {
            Table::with_key_names(name)
        } else {
            Table::new(name)
        };

        // No lengths are stored, a string runs up to the next strictly greater offset
        // or the end of the data block
        let mut ends = vec![data_length; records.len()];
        let mut next = data_length;
        for i in (0..records.len()).rev() {
            ends[i] = next;
            if i > 0 && records[i - 1].offset < records[i].offset {
                next = records[i].offset as usize;
            }
        }

        for (record, end) in records.iter().zip(ends) {
            let start = record.offset as usize;
            let region = data.get(start..end).ok_or(FormatError::Truncated)?;
            let value = encoding.decode(region);
            trace!(key = %record.name(), ?value, "entry");
            table.insert_named(record.name(), value);
        }

        Ok(table)
    }

    fn read_hashed_table(&mut self, name: String, encoding: TextEncoding) -> Result<Table> {
        let count = self.read_section(TKEY, "TKEY", HashedKeyRecord::SIZE)?;
        let mut records = (0..count)
            .map(|_| HashedKeyRecord::read(&mut self.reader).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        let data_length = self.read_section(TDAT, "TDAT", 1)?;
        let data = self.read_block(data_length)?;

        check_offsets(records.iter().map(|r| r.offset))?;
        records.sort_by_key(|r| r.offset);

        let mut table = Table::new(name);
        for record in &records {
            let value = encoding.decode_terminated(&data, record.offset as usize)?;
            trace!(hash = format_args!("{:08X}", record.hash), ?value, "entry");
            table.set(record.hash, value);
        }

        Ok(table)
    }

    /// Read a marker and its length field, returning the number of records it holds.
    fn read_section(
        &mut self,
        marker: [u8; 4],
        section: &'static str,
        record_size: usize,
    ) -> Result<usize> {
        let offset = self.reader.stream_position()?;
        let mut found = [0u8; 4];
        self.reader.read_exact(&mut found)?;
        if found != marker {
            return Err(FormatError::MissingMarker {
                expected: section,
                offset,
            }
            .into());
        }

        let length = self.reader.read_i32::<LittleEndian>()?;
        checked_count(section, length, record_size)
    }

    fn read_block(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut data)?;
        if data.len() < length {
            return Err(FormatError::Truncated.into());
        }
        Ok(data)
    }
}

fn checked_count(section: &'static str, length: i32, record_size: usize) -> Result<usize> {
    if length < 0 || length as usize % record_size != 0 {
        return Err(FormatError::InvalidSectionLength {
            section,
            length,
            record_size,
        }
        .into());
    }
    Ok(length as usize / record_size)
}

fn check_offsets(mut offsets: impl Iterator<Item = i32>) -> Result<()> {
    match offsets.find(|&offset| offset < 0) {
        Some(offset) => Err(FormatError::NegativeOffset(offset).into()),
        None => Ok(()),
    }
}
