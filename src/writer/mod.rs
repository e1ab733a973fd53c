//! YAML writer for spreadsheet records
//!
//! `serde_yaml` picks scalar styles on its own and cannot be told to
//! double-quote every string, so records are emitted by hand:
//! - block sequence of block mappings (`- key: value`)
//! - keys in insertion order, never sorted
//! - text values always double-quoted, numbers/booleans/null bare
//! - non-ASCII text passed through verbatim

use crate::types::CellValue;
use serde_yaml::Value;
use std::fmt::Write as _;

/// Longest key YAML accepts without an explicit `? ` indicator
const MAX_IMPLICIT_KEY_CHARS: usize = 1024;

/// One output record: ordered keys, a `None` key is a YAML `null` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(Option<String>, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: Option<String>, value: CellValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = Option<&str>> {
        self.entries.iter().map(|(k, _)| k.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates YAML text for a sequence of records
#[derive(Debug, Default)]
pub struct YamlWriter {
    out: String,
}

impl YamlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a full document from `records`
    pub fn write_records(mut self, records: &[Record]) -> String {
        if records.is_empty() {
            self.out.push_str("[]\n");
            return self.out;
        }

        for record in records {
            self.write_record(record);
        }
        self.out
    }

    fn write_record(&mut self, record: &Record) {
        if record.is_empty() {
            self.out.push_str("- {}\n");
            return;
        }

        for (i, (key, value)) in record.entries.iter().enumerate() {
            let indent = if i == 0 { "- " } else { "  " };
            let key = render_key(key.as_deref());
            let value = render_value(value);
            if key.chars().count() > MAX_IMPLICIT_KEY_CHARS {
                let _ = writeln!(self.out, "{}? {}\n  : {}", indent, key, value);
            } else {
                let _ = writeln!(self.out, "{}{}: {}", indent, key, value);
            }
        }
    }
}

/// Render a mapping key, plain when it reads back as the same string
pub fn render_key(key: Option<&str>) -> String {
    match key {
        None => "null".to_string(),
        Some(k) if is_plain_safe(k) => k.to_string(),
        Some(k) => double_quote(k),
    }
}

/// Render a scalar value per the quoting rule
pub fn render_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => "null".to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => format_float(*f),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Text(s) => double_quote(s),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        let repr = format!("{:?}", f);
        match repr.split_once('e') {
            // YAML 1.1 floats need a dot in the mantissa and a signed exponent.
            Some((mantissa, exponent)) => {
                let dot = if mantissa.contains('.') { "" } else { ".0" };
                let sign = if exponent.starts_with('-') { "" } else { "+" };
                format!("{}{}e{}{}", mantissa, dot, sign, exponent)
            }
            None => repr,
        }
    }
}

/// A plain scalar is safe when it is a single trimmed line that parses back
/// to the identical string.
fn is_plain_safe(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.chars().any(needs_escape) {
        return false;
    }
    matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(ref parsed)) if parsed == s)
}

fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
}

/// Double-quoted YAML scalar
pub fn double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{0c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            '\u{feff}' => out.push_str("\\uFEFF"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
