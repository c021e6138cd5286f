use std::path::Path;

use gta_gxt::{GxtFile, LoadOptions};
use miette::{Context, Result};

pub mod diff;
pub mod get;
pub mod info;
pub mod resave;

#[derive(clap::Subcommand)]
pub enum GxtCommands {
    /// Describe the format and tables of a GXT file
    Info(info::InfoArgs),
    /// Print the text stored under a key
    Get(get::GetArgs),
    /// Compare two GXT files
    Diff(diff::DiffArgs),
    /// Load a GXT file and write a normalized copy
    Resave(resave::ResaveArgs),
}

impl GxtCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            GxtCommands::Info(info) => info.handle(),
            GxtCommands::Get(get) => get.handle(),
            GxtCommands::Diff(diff) => diff.handle(),
            GxtCommands::Resave(resave) => resave.handle(),
        }
    }
}

/// Display name for an entry: its key name when known, the hash otherwise.
pub(crate) fn key_label(table: &gta_gxt::Table, hash: u32) -> String {
    match table.key_name(hash) {
        Some(name) => name.to_owned(),
        None => format!("0x{hash:08X}"),
    }
}

pub(crate) fn open(path: &Path, options: &LoadOptions) -> Result<GxtFile> {
    GxtFile::open(path, options).context(format!("path: {}", path.display()))
}
