use clap::Args;
use gta_gxt::LoadOptions;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct GetArgs {
    /// An input GXT file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Key name to look up
    #[arg(short, long)]
    key: String,

    /// Only search this table
    #[arg(short, long)]
    table: Option<String>,
}

impl GetArgs {
    pub fn handle(&self) -> Result<()> {
        let gxt = super::open(&self.file, &LoadOptions::default())?;

        let matches = gxt
            .tables()
            .filter(|t| self.table.as_deref().map_or(true, |name| t.is_named(name)))
            .filter_map(|t| t.get_by_name(&self.key).map(|value| (t.name(), value)))
            .collect::<Vec<_>>();

        if matches.is_empty() {
            return Err(match &self.table {
                Some(table) if gxt.table(table).is_none() => {
                    miette!("no table named {} in {}", table, self.file.display())
                }
                _ => miette!("key {} not found in {}", self.key, self.file.display()),
            });
        }

        for (table, value) in matches {
            println!("{}: {}", table.cyan(), value);
        }

        Ok(())
    }
}
