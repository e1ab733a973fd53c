use super::*;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::io::Cursor;
use tempfile::TempDir;

// =========================================================================
// Fixtures
// =========================================================================

fn write_address_sheet(dir: &Path, rows: &[(&str, &str)]) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Address").unwrap();
    sheet.write_string(0, 1, "Name").unwrap();
    for (i, (address, name)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *address).unwrap();
        sheet.write_string(row, 1, *name).unwrap();
    }
    let path = dir.join("addresses.xlsx");
    workbook.save(&path).unwrap();
    path
}

const EXPORT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<GroupAddress-Export xmlns="http://knx.org/xml/ga-export/01">
  <GroupAddress Name="a" Address="1/1/1" />
  <GroupAddress Name="b" Address="1/1/3" />
</GroupAddress-Export>
"#;

// =========================================================================
// Path helpers
// =========================================================================

#[test]
fn test_ensure_extension_case_insensitive() {
    assert!(ensure_extension(Path::new("a.xlsx"), "xlsx").is_ok());
    assert!(ensure_extension(Path::new("A.XLSX"), "xlsx").is_ok());
    assert!(ensure_extension(Path::new("a.xls"), "xlsx").is_err());
    assert!(ensure_extension(Path::new("noext"), "xml").is_err());
}

#[test]
fn test_default_outputs() {
    assert_eq!(
        default_merge_output(Path::new("/tmp/export.xml")),
        PathBuf::from("/tmp/export_updated.xml")
    );
    assert_eq!(
        default_yaml_output(Path::new("data/points.xlsx")),
        PathBuf::from("data/points.yaml")
    );
}

// =========================================================================
// Interactive prompt
// =========================================================================

#[test]
fn test_prompt_field_names() {
    let headers = vec!["Address".to_string(), "Name".to_string()];
    let input = Cursor::new("addr\n\n");
    let mut output = Vec::new();

    let mapping = prompt_field_names(&headers, input, &mut output).unwrap();

    assert_eq!(mapping.resolve("Address"), "addr");
    assert_eq!(mapping.resolve("Name"), "Name");
    assert_eq!(mapping.len(), 1);
    let prompts = String::from_utf8(output).unwrap();
    assert!(prompts.contains("'Address'"));
    assert!(prompts.contains("'Name'"));
}

#[test]
fn test_prompt_field_names_stops_at_eof() {
    let headers = vec!["A".to_string(), "B".to_string()];
    let mapping = prompt_field_names(&headers, Cursor::new("x\n"), Vec::new()).unwrap();
    assert_eq!(mapping.resolve("A"), "x");
    assert_eq!(mapping.resolve("B"), "B");
}

// =========================================================================
// Commands
// =========================================================================

#[test]
fn test_merge_writes_default_output() {
    let dir = TempDir::new().unwrap();
    let excel = write_address_sheet(dir.path(), &[("1/1/1", "Light A"), ("1/1/2", "Light B")]);
    let xml = dir.path().join("export.xml");
    fs::write(&xml, EXPORT_XML).unwrap();

    merge(excel, xml, None, true).unwrap();

    let out = fs::read_to_string(dir.path().join("export_updated.xml")).unwrap();
    assert!(out.contains(r#"Name="Light A""#));
    assert!(out.contains(r#"Name="b""#));
}

#[test]
fn test_merge_nothing_updated_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let excel = write_address_sheet(dir.path(), &[("9/9/9", "Nowhere")]);
    let xml = dir.path().join("export.xml");
    fs::write(&xml, EXPORT_XML).unwrap();

    merge(excel, xml, None, false).unwrap();

    assert!(!dir.path().join("export_updated.xml").exists());
}

#[test]
fn test_merge_rejects_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let excel = write_address_sheet(dir.path(), &[]);
    let txt = dir.path().join("export.txt");
    fs::write(&txt, EXPORT_XML).unwrap();

    let result = merge(excel, txt, None, false);
    assert!(matches!(result, Err(BridgeError::Validation(_))));
}

#[test]
fn test_convert_with_pairs_and_file() {
    let dir = TempDir::new().unwrap();
    let excel = write_address_sheet(dir.path(), &[("1/1/1", "Light A")]);
    let mapping_file = dir.path().join("mapping.json");
    fs::write(&mapping_file, r#"{"Address": "ga", "Name": "label"}"#).unwrap();
    let output = dir.path().join("out.yaml");

    convert(
        excel,
        Some(output.clone()),
        vec!["Name=title".to_string()],
        Some(mapping_file),
        false,
        true,
    )
    .unwrap();

    let yaml = fs::read_to_string(output).unwrap();
    assert_eq!(yaml, "- ga: \"1/1/1\"\n  title: \"Light A\"\n");
}

#[test]
fn test_convert_bad_pair() {
    let dir = TempDir::new().unwrap();
    let excel = write_address_sheet(dir.path(), &[]);
    let result = convert(excel, None, vec!["oops".to_string()], None, false, false);
    assert!(matches!(result, Err(BridgeError::Validation(_))));
}

#[test]
fn test_headers_missing_file() {
    let result = headers(PathBuf::from("/nonexistent/file.xlsx"), false);
    assert!(matches!(result, Err(BridgeError::Io(_))));
}
