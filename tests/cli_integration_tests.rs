//! CLI Integration Tests
//!
//! Runs the `sheetbridge` binary against files in a temp directory.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::{address_sheet, knx_export, xlsx, Num, Text};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sheetbridge() -> Command {
    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    sheetbridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetbridge"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    sheetbridge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_no_subcommand() {
    sheetbridge().assert().failure();
}

#[test]
fn test_merge_help() {
    sheetbridge()
        .args(["merge", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'Address' and 'Name'"));
}

// ═══════════════════════════════════════════════════════════════════════════
// MERGE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_merge_default_output() {
    let dir = TempDir::new().unwrap();
    let excel = write(&dir, "names.xlsx", &address_sheet(&[("1/1/1", "Light A")]));
    let xml = write(&dir, "export.xml", knx_export(&["1/1/1", "1/1/9"]).as_bytes());

    sheetbridge()
        .arg("merge")
        .arg(&excel)
        .arg(&xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge Complete"))
        .stdout(predicate::str::contains("Updated: 1"))
        .stdout(predicate::str::contains("Skipped: 1"));

    let out = fs::read_to_string(dir.path().join("export_updated.xml")).unwrap();
    assert!(out.contains(r#"Name="Light A" Address="1/1/1""#));
    assert!(out.contains(r#"Name="GA 1" Address="1/1/9""#));
}

#[test]
fn test_merge_explicit_output() {
    let dir = TempDir::new().unwrap();
    let excel = write(&dir, "names.xlsx", &address_sheet(&[("1/1/1", "Light A")]));
    let xml = write(&dir, "export.xml", knx_export(&["1/1/1"]).as_bytes());
    let output = dir.path().join("named.xml");

    sheetbridge()
        .arg("merge")
        .arg(&excel)
        .arg(&xml)
        .arg("-o")
        .arg(&output)
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("group addresses visited"));

    assert!(output.exists());
    assert!(!dir.path().join("export_updated.xml").exists());
}

#[test]
fn test_merge_nothing_updated_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let excel = write(&dir, "names.xlsx", &address_sheet(&[("9/9/9", "x")]));
    let xml = write(&dir, "export.xml", knx_export(&["1/1/1"]).as_bytes());

    sheetbridge()
        .arg("merge")
        .arg(&excel)
        .arg(&xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("No records updated"));

    assert!(!dir.path().join("export_updated.xml").exists());
}

#[test]
fn test_merge_rejects_wrong_extension() {
    let dir = TempDir::new().unwrap();
    let excel = write(&dir, "names.csv", b"Address,Name\n");
    let xml = write(&dir, "export.xml", knx_export(&["1/1/1"]).as_bytes());

    sheetbridge()
        .arg("merge")
        .arg(&excel)
        .arg(&xml)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a .xlsx file"));
}

#[test]
fn test_merge_missing_columns_fails() {
    let dir = TempDir::new().unwrap();
    let excel = write(&dir, "names.xlsx", &xlsx(&[vec![Text("Addr"), Text("Label")]]));
    let xml = write(&dir, "export.xml", knx_export(&["1/1/1"]).as_bytes());

    sheetbridge()
        .arg("merge")
        .arg(&excel)
        .arg(&xml)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation"));
}

#[test]
fn test_merge_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let xml = write(&dir, "export.xml", knx_export(&["1/1/1"]).as_bytes());

    sheetbridge()
        .arg("merge")
        .arg(dir.path().join("absent.xlsx"))
        .arg(&xml)
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERT
// ═══════════════════════════════════════════════════════════════════════════

fn points(dir: &TempDir) -> PathBuf {
    write(
        dir,
        "points.xlsx",
        &xlsx(&[
            vec![Text("Address"), Text("Name"), Text("Dpt")],
            vec![Text("1/1/1"), Text("Light A"), Num(1.0)],
        ]),
    )
}

#[test]
fn test_convert_default_output() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);

    sheetbridge()
        .arg("convert")
        .arg(&excel)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows: 1"));

    let yaml = fs::read_to_string(dir.path().join("points.yaml")).unwrap();
    assert_eq!(yaml, "- Address: \"1/1/1\"\n  Name: \"Light A\"\n  Dpt: 1\n");
}

#[test]
fn test_convert_with_map_pairs() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);
    let output = dir.path().join("out.yaml");

    sheetbridge()
        .arg("convert")
        .arg(&excel)
        .args(["-m", "Address=addr", "--map", "Name=label"])
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let yaml = fs::read_to_string(&output).unwrap();
    assert_eq!(yaml, "- addr: \"1/1/1\"\n  label: \"Light A\"\n  Dpt: 1\n");
}

#[test]
fn test_convert_map_pairs_override_mapping_file() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);
    let mapping = write(
        &dir,
        "mapping.json",
        br#"{"Address": "from_file", "Dpt": "datapoint"}"#,
    );

    sheetbridge()
        .arg("convert")
        .arg(&excel)
        .arg("--mapping-file")
        .arg(&mapping)
        .args(["-m", "Address=addr"])
        .assert()
        .success();

    let yaml = fs::read_to_string(dir.path().join("points.yaml")).unwrap();
    assert!(yaml.starts_with("- addr: "));
    assert!(yaml.contains("  datapoint: 1\n"));
}

#[test]
fn test_convert_interactive() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);

    sheetbridge()
        .arg("convert")
        .arg(&excel)
        .arg("--interactive")
        .write_stdin("addr\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output key for 'Address'"));

    let yaml = fs::read_to_string(dir.path().join("points.yaml")).unwrap();
    assert_eq!(yaml, "- addr: \"1/1/1\"\n  Name: \"Light A\"\n  Dpt: 1\n");
}

#[test]
fn test_convert_invalid_map_pair() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);

    sheetbridge()
        .arg("convert")
        .arg(&excel)
        .args(["-m", "Address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FROM=TO"));
}

#[test]
fn test_convert_invalid_mapping_file() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);
    let mapping = write(&dir, "mapping.json", b"[1, 2]");

    sheetbridge()
        .arg("convert")
        .arg(&excel)
        .arg("--mapping-file")
        .arg(&mapping)
        .assert()
        .failure();

    assert!(!dir.path().join("points.yaml").exists());
}

// ═══════════════════════════════════════════════════════════════════════════
// HEADERS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_headers_lines() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);

    sheetbridge()
        .arg("headers")
        .arg(&excel)
        .assert()
        .success()
        .stdout("Address\nName\nDpt\n");
}

#[test]
fn test_headers_json() {
    let dir = TempDir::new().unwrap();
    let excel = points(&dir);

    sheetbridge()
        .arg("headers")
        .arg(&excel)
        .arg("--json")
        .assert()
        .success()
        .stdout("[\"Address\",\"Name\",\"Dpt\"]\n");
}
