//! Excel input module
//!
//! Reads the first worksheet of an .xlsx workbook into a [`Sheet`](crate::types::Sheet)
//! and exposes header discovery for building field mappings.

mod importer;

pub use importer::{read_headers, ExcelImporter};
