use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

//==============================================================================
// Cell values
//==============================================================================

/// A single spreadsheet cell, typed at read time.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl CellValue {
    /// Integer-valued floats become `Int` so they serialize without a fraction.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
            CellValue::Int(value as i64)
        } else {
            CellValue::Float(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }
}

impl fmt::Display for CellValue {
    /// String form used for attribute values and lookup keys.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

//==============================================================================
// Sheet
//==============================================================================

/// The first worksheet of a workbook, anchored at A1.
///
/// `header` is row 1; blank header cells are `None`. Every data row is
/// padded with `CellValue::Null` to the sheet width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub header: Vec<Option<String>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(header: Vec<Option<String>>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { header, rows }
    }

    /// Index of the first header cell named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.as_deref() == Some(name))
    }

    /// Non-blank header names in column order.
    pub fn header_names(&self) -> Vec<String> {
        self.header.iter().flatten().cloned().collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

//==============================================================================
// Field mapping
//==============================================================================

/// Renames spreadsheet columns to output keys. Unmapped columns keep their name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: HashMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.fields.insert(from.into(), to.into());
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn extend(&mut self, other: FieldMapping) {
        self.fields.extend(other.fields);
    }

    /// Output key for `header`. An empty override falls back to the header.
    pub fn resolve<'a>(&'a self, header: &'a str) -> &'a str {
        match self.fields.get(header) {
            Some(mapped) if !mapped.is_empty() => mapped,
            _ => header,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
