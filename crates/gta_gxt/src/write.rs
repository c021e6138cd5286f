//! Types for writing GXT files
//!

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Write};
use tracing::{debug, instrument, warn};

use crate::{
    encoding::TextEncoding,
    error::{Error, Result},
    file::GxtFile,
    table::Table,
    types::{
        to_fixed_name, FormatVariant, HashedKeyRecord, Layout, NamedKeyRecord, TableHeader,
        MAIN_TABLE, TABL, TDAT, TKEY,
    },
};

/// Value of the low half of a hash keyed file's version field
const HASHED_FORMAT_VERSION: u32 = 4;

/// GXT file generator
///
/// Entries of string keyed tables are written sorted by their 8 byte key name, entries
/// of hash keyed tables sorted by hash, so the same model always produces the same bytes.
///
/// ```
/// # fn doit() -> gta_gxt::error::Result<()>
/// # {
/// use gta_gxt::{FormatVariant, GxtFile, GxtWriter, Table};
///
/// let mut gxt = GxtFile::new(FormatVariant::HashKeyed);
/// let mut main = Table::new("MAIN");
/// main.set_by_name("FEM_OK", "OK");
/// gxt.insert_table(main);
///
/// let bytes = GxtWriter::new(Vec::new()).finish(&gxt)?;
/// assert_eq!(&bytes[4..8], b"TABL");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct GxtWriter<W: Write> {
    inner: W,
}

impl<W: Write> GxtWriter<W> {
    /// Prepare to write a GXT file into `inner`.
    pub fn new(inner: W) -> GxtWriter<W> {
        GxtWriter { inner }
    }

    /// Lay out every table of `gxt` and write the result.
    ///
    /// Nothing is written to the inner writer unless the whole file could be laid out.
    pub fn finish(mut self, gxt: &GxtFile) -> Result<W> {
        let bytes = layout(gxt)?;
        debug!(size = bytes.len(), "writing file");
        self.inner.write_all(&bytes)?;
        Ok(self.inner)
    }
}

/// Produce the complete on-disk bytes of `gxt`.
#[instrument(skip_all, fields(variant = %gxt.variant(), tables = gxt.len()), err)]
pub(crate) fn layout(gxt: &GxtFile) -> Result<Vec<u8>> {
    let encoding = gxt.encoding();

    let bytes = match (gxt.variant(), gxt.layout()) {
        (FormatVariant::LegacyStringKeyed, Layout::SingleTable) => {
            let table = match gxt.table_at(0) {
                Some(table) if gxt.len() == 1 => table,
                _ => {
                    return Err(Error::Layout(format!(
                        "single table layout requires exactly one table, found {}",
                        gxt.len()
                    )))
                }
            };
            named_body(table, encoding)?
        }
        (FormatVariant::LegacyStringKeyed, Layout::MultiTable) => {
            let mut tables = gxt.tables().collect::<Vec<_>>();
            tables.sort_by(|a, b| {
                b.is_named(MAIN_TABLE)
                    .cmp(&a.is_named(MAIN_TABLE))
                    .then_with(|| a.name().as_bytes().cmp(b.name().as_bytes()))
            });
            directory(&[], &tables, |table| named_body(table, encoding))?
        }
        (FormatVariant::HashKeyed, Layout::MultiTable) => {
            let version = (encoding.bits_per_char() << 16) | HASHED_FORMAT_VERSION;
            let tables = gxt.tables().collect::<Vec<_>>();
            directory(&version.to_le_bytes(), &tables, |table| {
                hashed_body(table, encoding)
            })?
        }
        (FormatVariant::HashKeyed, Layout::SingleTable) => {
            return Err(Error::Layout(
                "hash keyed files always use a table directory".into(),
            ))
        }
    };

    Ok(bytes)
}

/// Write the `TABL` directory followed by every table body.
///
/// Every body but the first is preceded by its table name again, and the directory
/// offsets point at that name.
fn directory<F>(prefix: &[u8], tables: &[&Table], body: F) -> Result<Vec<u8>>
where
    F: Fn(&Table) -> Result<Vec<u8>>,
{
    let directory_length = tables.len() * TableHeader::SIZE;
    let mut offset = prefix.len() + TABL.len() + 4 + directory_length;

    let mut headers = Cursor::new(Vec::new());
    let mut bodies = Vec::new();
    for (index, &table) in tables.iter().enumerate() {
        let name = table_name(table)?;
        TableHeader {
            name,
            offset: to_i32(offset)?,
        }
        .write(&mut headers)?;

        let start = bodies.len();
        if index > 0 {
            bodies.extend_from_slice(&name);
        }
        bodies.extend(body(table)?);
        offset += bodies.len() - start;

        debug!(table = table.name(), entries = table.len(), "laid out table");
    }

    let mut out = Cursor::new(Vec::with_capacity(offset));
    out.write_all(prefix)?;
    out.write_all(&TABL)?;
    out.write_i32::<LittleEndian>(to_i32(directory_length)?)?;
    out.write_all(headers.get_ref())?;
    out.write_all(&bodies)?;
    Ok(out.into_inner())
}

fn named_body(table: &Table, encoding: TextEncoding) -> Result<Vec<u8>> {
    let mut synthesized = 0usize;
    let mut entries = table
        .iter()
        .map(|(hash, value)| {
            let name = match table.key_name(hash) {
                Some(name) => {
                    if name.len() > 8 {
                        warn!(table = table.name(), key = name, "truncating key name");
                    }
                    to_fixed_name(name)
                }
                None => {
                    synthesized += 1;
                    to_fixed_name(&format!("KEY{hash:08X}"))
                }
            };
            (name, value)
        })
        .collect::<Vec<_>>();

    if synthesized > 0 {
        warn!(
            table = table.name(),
            count = synthesized,
            "key names are unknown, synthesizing them from hashes"
        );
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut keys = Cursor::new(Vec::with_capacity(entries.len() * NamedKeyRecord::SIZE));
    let mut data = Vec::with_capacity(data_len(&entries, encoding));
    for (name, value) in entries {
        NamedKeyRecord {
            offset: to_i32(data.len())?,
            name,
        }
        .write(&mut keys)?;
        data.extend(encoding.encode(value)?);
    }

    sections(keys.into_inner(), data)
}

fn hashed_body(table: &Table, encoding: TextEncoding) -> Result<Vec<u8>> {
    let mut entries = table.iter().collect::<Vec<_>>();
    entries.sort_by_key(|(hash, _)| *hash);

    let mut keys = Cursor::new(Vec::with_capacity(entries.len() * HashedKeyRecord::SIZE));
    let mut data = Vec::with_capacity(data_len(&entries, encoding));
    for (hash, value) in entries {
        HashedKeyRecord {
            offset: to_i32(data.len())?,
            hash,
        }
        .write(&mut keys)?;
        data.extend(encoding.encode(value)?);
    }

    sections(keys.into_inner(), data)
}

fn data_len<K>(entries: &[(K, &str)], encoding: TextEncoding) -> usize {
    entries
        .iter()
        .map(|(_, value)| encoding.encoded_len(value))
        .sum()
}

/// Join a key block and a data block with their markers and lengths.
fn sections(keys: Vec<u8>, data: Vec<u8>) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(16 + keys.len() + data.len());
    out.write_all(&TKEY)?;
    out.write_i32::<LittleEndian>(to_i32(keys.len())?)?;
    out.write_all(&keys)?;
    out.write_all(&TDAT)?;
    out.write_i32::<LittleEndian>(to_i32(data.len())?)?;
    out.write_all(&data)?;
    Ok(out)
}

fn table_name(table: &Table) -> Result<[u8; 8]> {
    let name = table.name();
    if !name.is_ascii() || name.len() > 8 {
        return Err(Error::InvalidTableName(name.to_owned()));
    }
    Ok(to_fixed_name(name))
}

fn to_i32(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::TooLarge)
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::{
        encoding::TextEncoding,
        error::{Error, Result},
        file::GxtFile,
        hash::key_hash,
        table::Table,
        types::{FormatVariant, Layout},
        write::GxtWriter,
    };

    fn single_table(table: Table) -> GxtFile {
        let mut gxt = GxtFile::new(FormatVariant::LegacyStringKeyed);
        gxt.set_layout(Layout::SingleTable);
        gxt.insert_table(table);
        gxt
    }

    fn assert_bytes(actual: &[u8], expected: &[u8]) {
        assert_eq!(actual.len(), expected.len());
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));
    }

    #[traced_test]
    #[test]
    fn write_empty_single_table() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            0x54, 0x4B, 0x45, 0x59, 0x00, 0x00, 0x00, 0x00,
            0x54, 0x44, 0x41, 0x54, 0x00, 0x00, 0x00, 0x00,
        ];

        let actual = single_table(Table::with_key_names("MAIN")).write(Vec::new())?;
        assert_bytes(&actual, &expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_single_table_sorted_by_key_name() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Keys
            b'T', b'K', b'E', b'Y', 0x18, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'A', b'_', b'1', 0x00, 0x00, 0x00, 0x00, 0x00,
            0x06, 0x00, 0x00, 0x00, b'B', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Data
            b'T', b'D', b'A', b'T', 0x0C, 0x00, 0x00, 0x00,
            0x48, 0x00, 0x69, 0x00, 0x00, 0x00,
            0x59, 0x00, 0x6F, 0x00, 0x00, 0x00,
        ];

        let mut main = Table::with_key_names("MAIN");
        main.set_by_name("B", "Yo");
        main.set_by_name("A_1", "Hi");

        let actual = single_table(main).write(Vec::new())?;
        assert_bytes(&actual, &expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_multi_table_main_first() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Directory
            b'T', b'A', b'B', b'L', 0x18, 0x00, 0x00, 0x00,
            b'M', b'A', b'I', b'N', 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
            b'O', b'N', b'E', 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00,
            // MAIN
            b'T', b'K', b'E', b'Y', 0x0C, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'K', b'1', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            b'T', b'D', b'A', b'T', 0x04, 0x00, 0x00, 0x00,
            0x41, 0x00, 0x00, 0x00,
            // ONE
            b'O', b'N', b'E', 0x00, 0x00, 0x00, 0x00, 0x00,
            b'T', b'K', b'E', b'Y', 0x0C, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, b'K', b'2', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            b'T', b'D', b'A', b'T', 0x04, 0x00, 0x00, 0x00,
            0x42, 0x00, 0x00, 0x00,
        ];

        let mut one = Table::with_key_names("ONE");
        one.set_by_name("K2", "B");
        let mut main = Table::with_key_names("MAIN");
        main.set_by_name("K1", "A");

        let mut gxt = GxtFile::new(FormatVariant::LegacyStringKeyed);
        gxt.insert_table(one);
        gxt.insert_table(main);

        let actual = gxt.write(Vec::new())?;
        assert_bytes(&actual, &expected);

        Ok(())
    }

    #[test]
    fn write_multi_table_orders_remaining_tables() -> Result<()> {
        let mut gxt = GxtFile::new(FormatVariant::LegacyStringKeyed);
        for name in ["ZED", "ALPHA", "main", "BETA"] {
            gxt.insert_table(Table::with_key_names(name));
        }

        let bytes = gxt.write(Vec::new())?;
        let names = bytes[8..8 + 4 * 12]
            .chunks(12)
            .map(|record| crate::types::fixed_name(&record[..8]))
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["main", "ALPHA", "BETA", "ZED"]);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_hash_keyed_sorted_by_hash() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Version and directory
            0x04, 0x00, 0x08, 0x00,
            b'T', b'A', b'B', b'L', 0x0C, 0x00, 0x00, 0x00,
            b'M', b'A', b'I', b'N', 0x00, 0x00, 0x00, 0x00, 0x18, 0x00, 0x00, 0x00,
            // Keys
            b'T', b'K', b'E', b'Y', 0x10, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
            // Data
            b'T', b'D', b'A', b'T', 0x07, 0x00, 0x00, 0x00,
            0x41, 0x42, 0x00, 0xE9, 0x74, 0xE9, 0x00,
        ];

        let mut main = Table::new("MAIN");
        main.set(2, "\u{e9}t\u{e9}");
        main.set(1, "AB");

        let mut gxt = GxtFile::new(FormatVariant::HashKeyed);
        gxt.insert_table(main);

        let actual = gxt.write(Vec::new())?;
        assert_bytes(&actual, &expected);

        Ok(())
    }

    #[test]
    fn write_hash_keyed_wide_version() -> Result<()> {
        let mut gxt = GxtFile::with_encoding(FormatVariant::HashKeyed, TextEncoding::Utf16);
        gxt.insert_table(Table::new("MAIN"));

        let bytes = gxt.write(Vec::new())?;
        assert_eq!(&bytes[..4], &[0x04, 0x00, 0x10, 0x00]);

        Ok(())
    }

    #[test]
    fn write_synthesizes_missing_key_names() -> Result<()> {
        let mut main = Table::new("MAIN");
        main.set(0x1234ABCD, "x");

        let bytes = single_table(main).write(Vec::new())?;
        assert_eq!(&bytes[12..20], b"KEY1234A");

        Ok(())
    }

    #[test]
    fn write_layout_errors() {
        let mut hashed = GxtFile::new(FormatVariant::HashKeyed);
        hashed.set_layout(Layout::SingleTable);
        hashed.insert_table(Table::new("MAIN"));
        assert!(matches!(hashed.write(Vec::new()), Err(Error::Layout(_))));

        let mut two = single_table(Table::new("MAIN"));
        two.insert_table(Table::new("OTHER"));
        assert!(matches!(two.write(Vec::new()), Err(Error::Layout(_))));

        let empty = {
            let mut gxt = GxtFile::new(FormatVariant::LegacyStringKeyed);
            gxt.set_layout(Layout::SingleTable);
            gxt
        };
        assert!(matches!(empty.write(Vec::new()), Err(Error::Layout(_))));
    }

    #[test]
    fn write_rejects_long_table_names() {
        let mut gxt = GxtFile::new(FormatVariant::HashKeyed);
        gxt.insert_table(Table::new("TOOLONGNAME"));

        assert!(matches!(
            gxt.write(Vec::new()),
            Err(Error::InvalidTableName(name)) if name == "TOOLONGNAME"
        ));
    }

    #[test]
    fn write_rejects_unencodable_text() {
        let mut main = Table::new("MAIN");
        main.set(key_hash("JP"), "\u{65E5}\u{672C}");

        let mut gxt = GxtFile::new(FormatVariant::HashKeyed);
        gxt.insert_table(main);

        assert!(matches!(
            gxt.write(Vec::new()),
            Err(Error::Unencodable { ch: '\u{65E5}', .. })
        ));
    }
}
