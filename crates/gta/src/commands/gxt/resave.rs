use clap::{Args, ValueEnum};
use gta_gxt::{LoadOptions, TextEncoding};
use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, io::Write, path::PathBuf};
use tracing::info;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Encoding {
    Utf16,
    Windows1252,
}

impl From<Encoding> for TextEncoding {
    fn from(value: Encoding) -> Self {
        match value {
            Encoding::Utf16 => TextEncoding::Utf16,
            Encoding::Windows1252 => TextEncoding::Windows1252,
        }
    }
}

#[derive(Args)]
pub struct ResaveArgs {
    /// An input GXT file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The output GXT file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Text encoding to write, defaults to the input's
    #[arg(short, long, value_enum)]
    encoding: Option<Encoding>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ResaveArgs {
    pub fn handle(&self) -> Result<()> {
        let mut gxt = super::open(&self.file, &LoadOptions::default())?;
        if let Some(encoding) = self.encoding {
            gxt.set_encoding(encoding.into());
        }

        let bytes = gxt.write(Vec::new())?;

        info!("writing {}", self.output.display());
        let mut out = if !self.overwrite {
            File::create_new(&self.output)
                .into_diagnostic()
                .context(format!("creating {}", &self.output.display()))?
        } else {
            File::create(&self.output)
                .into_diagnostic()
                .context(format!("creating {}", &self.output.display()))?
        };
        out.write_all(&bytes).into_diagnostic()?;

        Ok(())
    }
}
