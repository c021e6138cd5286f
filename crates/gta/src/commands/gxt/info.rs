use clap::Args;
use gta_gxt::LoadOptions;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input GXT file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let gxt = super::open(&self.file, &LoadOptions::default())?;

        println!("{}", self.file.display().bold());
        println!("  variant:  {}", gxt.variant());
        println!("  encoding: {}", gxt.encoding());
        println!("  layout:   {}", gxt.layout());
        println!(
            "  tables:   {} ({} entries)",
            gxt.len(),
            gxt.total_entries()
        );

        let width = gxt.table_names().map(str::len).max().unwrap_or(0);
        for table in gxt.tables() {
            println!(
                "    {:<width$}  {}",
                table.name().cyan(),
                table.len(),
                width = width
            );
        }

        Ok(())
    }
}
