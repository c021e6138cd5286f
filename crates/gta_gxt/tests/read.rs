use std::path::PathBuf;

use gta_gxt::{
    error::{Error, FormatError, Result},
    hash::key_hash,
    FormatVariant, GxtFile, Layout, LoadOptions, TextEncoding,
};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), name))
}

#[traced_test]
#[test]
fn parse_single_table() -> Result<()> {
    let gxt = GxtFile::open(resource("single_table.gxt"), &LoadOptions::default())?;

    assert_eq!(gxt.variant(), FormatVariant::LegacyStringKeyed);
    assert_eq!(gxt.layout(), Layout::SingleTable);
    assert_eq!(gxt.encoding(), TextEncoding::Utf16);
    assert_eq!(gxt.table_names().collect::<Vec<_>>(), vec!["MAIN"]);

    let main = gxt.table("MAIN").expect("MAIN table");
    assert_eq!(main.len(), 4);
    assert_eq!(main.get_by_name("FEP_STA"), Some("START GAME"));
    assert_eq!(main.get_by_name("ga_1"), Some("~g~Hello"));
    assert_eq!(main.get_by_name("CRED212"), Some("Rockstar North"));
    assert_eq!(main.key_name(key_hash("FEC_OK")), Some("FEC_OK"));

    Ok(())
}

#[traced_test]
#[test]
fn parse_multi_table() -> Result<()> {
    let gxt = GxtFile::open(resource("multi_table.gxt"), &LoadOptions::default())?;

    assert_eq!(gxt.variant(), FormatVariant::LegacyStringKeyed);
    assert_eq!(gxt.layout(), Layout::MultiTable);
    assert_eq!(
        gxt.table_names().collect::<Vec<_>>(),
        vec!["MAIN", "FINALE", "INTRO"]
    );
    assert_eq!(gxt.total_entries(), 7);

    let (table, value) = gxt.find_by_name("INT_A").expect("INT_A entry");
    assert_eq!(table.name(), "INTRO");
    assert_eq!(value, "Welcome to Vice City");

    assert_eq!(
        gxt.table("finale").and_then(|t| t.get_by_name("FIN_1")),
        Some("~r~Game over")
    );

    Ok(())
}

#[traced_test]
#[test]
fn parse_hash_keyed() -> Result<()> {
    let gxt = GxtFile::open(resource("hash_keyed.gxt"), &LoadOptions::default())?;

    assert_eq!(gxt.variant(), FormatVariant::HashKeyed);
    assert_eq!(gxt.encoding(), TextEncoding::Windows1252);
    assert_eq!(gxt.table_names().collect::<Vec<_>>(), vec!["MAIN", "INTRO"]);

    let main = gxt.table("MAIN").expect("MAIN table");
    assert_eq!(main.get(0x60A1BD54), Some("OK"));
    assert_eq!(main.get_by_name("FEM_CF"), Some("Caf\u{e9}"));
    assert_eq!(main.get_by_name("FEH_BRI"), Some("Brightness\u{2122}"));
    assert_eq!(main.key_name(key_hash("FEM_OK")), None);

    assert_eq!(
        gxt.table("INTRO").and_then(|t| t.get_by_name("INT_A")),
        Some("Welcome to San Andreas")
    );

    Ok(())
}

#[test]
fn parse_without_key_names() -> Result<()> {
    let options = LoadOptions::builder().preserve_key_names(false).build();
    let gxt = GxtFile::open(resource("multi_table.gxt"), &options)?;

    assert!(gxt.tables().all(|t| !t.preserves_key_names()));
    assert_eq!(
        gxt.table("MAIN").and_then(|t| t.get_by_name("FEC_OK")),
        Some("OK")
    );

    Ok(())
}

#[test]
fn missing_file() {
    let result = GxtFile::open(resource("missing.gxt"), &LoadOptions::default());
    assert!(matches!(result, Err(Error::NotFound(path)) if path.ends_with("missing.gxt")));
}

#[test]
fn truncated_file() -> Result<()> {
    let mut bytes = std::fs::read(resource("hash_keyed.gxt"))?;
    bytes.truncate(bytes.len() - 10);

    let result = GxtFile::read(std::io::Cursor::new(bytes), &LoadOptions::default());
    assert!(result.as_ref().is_err_and(Error::is_format_error));
    assert!(matches!(
        result,
        Err(Error::Format(FormatError::Truncated))
    ));

    Ok(())
}
