//! The aggregate of every table in a GXT file.

use std::{
    fs::File,
    io::{BufReader, Read, Seek, Write},
    path::Path,
};

use indexmap::IndexMap;
use tracing::{instrument, warn};

use crate::{
    encoding::TextEncoding,
    error::{Error, Result},
    hash::key_hash,
    read::{GxtReader, LoadOptions},
    table::Table,
    types::{FormatVariant, Layout},
    write::{self, GxtWriter},
};

/// In memory representation of a GXT file
///
/// Tables keep the order they were loaded or inserted in and are looked up by name
/// ignoring ASCII case.
///
/// ```no_run
/// use gta_gxt::{GxtFile, LoadOptions};
///
/// fn rename_weapon(path: &str) -> gta_gxt::error::Result<()> {
///     let mut gxt = GxtFile::open(path, &LoadOptions::default())?;
///
///     if let Some(table) = gxt.table_mut("MAIN") {
///         table.set_by_name("WEAPON1", "Baseball Bat");
///     }
///
///     gxt.save(path)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GxtFile {
    variant: FormatVariant,
    encoding: TextEncoding,
    layout: Layout,
    tables: IndexMap<String, Table>,
}

impl GxtFile {
    /// Create an empty multi table file using the variant's usual encoding.
    pub fn new(variant: FormatVariant) -> GxtFile {
        let encoding = match variant {
            FormatVariant::LegacyStringKeyed => TextEncoding::Utf16,
            FormatVariant::HashKeyed => TextEncoding::Windows1252,
        };
        GxtFile::with_encoding(variant, encoding)
    }

    /// Create an empty multi table file with an explicit text encoding.
    pub fn with_encoding(variant: FormatVariant, encoding: TextEncoding) -> GxtFile {
        GxtFile {
            variant,
            encoding,
            layout: Layout::MultiTable,
            tables: IndexMap::new(),
        }
    }

    /// Load a file from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>, options: &LoadOptions) -> Result<GxtFile> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::from(e),
        })?;
        GxtFile::read(BufReader::new(file), options)
    }

    /// Load a file from any seekable byte source.
    pub fn read<R: Read + Seek>(reader: R, options: &LoadOptions) -> Result<GxtFile> {
        GxtReader::new(reader, options.clone()).read()
    }

    /// Save this file to disk, replacing anything already there.
    ///
    /// The target is only touched once the whole file has been laid out, so a failed save
    /// leaves an existing file as it was.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = write::layout(self)?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }

    /// Serialize this file into a byte sink.
    pub fn write<W: Write>(&self, writer: W) -> Result<W> {
        GxtWriter::new(writer).finish(self)
    }

    /// How keys and text are represented
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// Encoding of every string in the file
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Change the encoding used when saving.
    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    /// Container layout
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Change the container layout used when saving.
    ///
    /// [`Layout::SingleTable`] is only valid for string keyed files holding one table;
    /// this is checked when writing.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Number of tables in the file
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the file contains no tables
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries over all tables
    pub fn total_entries(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }

    /// Iterate over the tables in order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Iterate over the table names in order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.values().map(Table::name)
    }

    /// Find a table by name, ignoring ASCII case
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&index_key(name))
    }

    /// Find a table by name for modification, ignoring ASCII case
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(&index_key(name))
    }

    /// Get a table by its position
    pub fn table_at(&self, index: usize) -> Option<&Table> {
        self.tables.get_index(index).map(|(_, table)| table)
    }

    /// Position of a table, ignoring ASCII case
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.tables.get_index_of(&index_key(name))
    }

    /// Add a table, replacing and returning any table with the same name.
    ///
    /// A replaced table keeps its position; new tables are appended.
    pub fn insert_table(&mut self, table: Table) -> Option<Table> {
        let replaced = self.tables.insert(index_key(table.name()), table);
        if let Some(old) = &replaced {
            warn!(table = old.name(), "replacing table with duplicate name");
        }
        replaced
    }

    /// Remove a table by name, ignoring ASCII case.
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.shift_remove(&index_key(name))
    }

    /// Look up a key hash in every table, returning the first table holding it.
    pub fn find(&self, hash: u32) -> Option<(&Table, &str)> {
        self.tables
            .values()
            .find_map(|table| table.get(hash).map(|value| (table, value)))
    }

    /// Look up a key name in every table, returning the first table holding it.
    pub fn find_by_name(&self, key: &str) -> Option<(&Table, &str)> {
        self.find(key_hash(key))
    }

    pub(crate) fn from_parts(
        variant: FormatVariant,
        encoding: TextEncoding,
        layout: Layout,
    ) -> GxtFile {
        GxtFile {
            layout,
            ..GxtFile::with_encoding(variant, encoding)
        }
    }
}

fn index_key(name: &str) -> String {
    name.to_ascii_uppercase()
}
