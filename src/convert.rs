//! Spreadsheet → YAML conversion
//!
//! Each data row becomes one ordered mapping. Column headers become keys,
//! optionally renamed through a [`FieldMapping`].

use crate::error::{BridgeError, BridgeResult};
use crate::excel::ExcelImporter;
use crate::types::{FieldMapping, Sheet};
use crate::writer::{Record, YamlWriter};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Result of a YAML conversion
#[derive(Debug, Clone, PartialEq)]
pub struct YamlExport {
    pub content: String,
    /// Data rows processed, header excluded
    pub row_count: usize,
}

/// Convert the first worksheet of `excel` to a YAML sequence of records.
pub fn excel_to_yaml(excel: &[u8], mapping: &FieldMapping) -> BridgeResult<YamlExport> {
    let sheet = ExcelImporter::new(excel).import()?;
    let records = build_records(&sheet, mapping);
    let content = YamlWriter::new().write_records(&records);

    info!(rows = records.len(), renamed = mapping.len(), "converted spreadsheet to YAML");
    Ok(YamlExport {
        content,
        row_count: records.len(),
    })
}

/// Output key per column; blank headers keep no key.
pub fn resolve_keys(header: &[Option<String>], mapping: &FieldMapping) -> Vec<Option<String>> {
    header
        .iter()
        .map(|h| h.as_deref().map(|name| mapping.resolve(name).to_string()))
        .collect()
}

/// Zip every data row against the resolved keys, in row and column order.
pub fn build_records(sheet: &Sheet, mapping: &FieldMapping) -> Vec<Record> {
    let keys = resolve_keys(&sheet.header, mapping);

    sheet
        .rows
        .iter()
        .map(|row| {
            let mut record = Record::new();
            for (key, value) in keys.iter().zip(row) {
                record.insert(key.clone(), value.clone());
            }
            record
        })
        .collect()
}

impl FieldMapping {
    /// Parse a flat JSON object of strings. Anything else degrades to the
    /// identity mapping.
    pub fn from_json(json: &str) -> FieldMapping {
        if json.trim().is_empty() {
            return FieldMapping::new();
        }
        match serde_json::from_str::<HashMap<String, String>>(json) {
            Ok(fields) => fields.into_iter().collect(),
            Err(e) => {
                warn!("ignoring invalid field mapping: {}", e);
                FieldMapping::new()
            }
        }
    }

    /// Strict JSON mapping read from a file
    pub fn from_json_file(path: &Path) -> BridgeResult<FieldMapping> {
        let content = fs::read_to_string(path)?;
        let fields: HashMap<String, String> = serde_json::from_str(&content)?;
        Ok(fields.into_iter().collect())
    }

    /// Parse `FROM=TO` pairs. Only the first `=` splits.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> BridgeResult<FieldMapping> {
        pairs
            .iter()
            .map(|pair| {
                let pair = pair.as_ref();
                pair.split_once('=')
                    .map(|(from, to)| (from.to_string(), to.to_string()))
                    .ok_or_else(|| {
                        BridgeError::Validation(format!(
                            "Invalid field mapping '{}', expected FROM=TO",
                            pair
                        ))
                    })
            })
            .collect()
    }
}
