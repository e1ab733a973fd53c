//! knx-sheetbridge - spreadsheet helpers for KNX projects
//!
//! This library provides two independent transformations over in-memory
//! spreadsheet buffers:
//!
//! - Merge the `Name` column of a spreadsheet into the `GroupAddress`
//!   elements of a KNX group-address export, matched on `Address`.
//! - Convert a spreadsheet to a YAML sequence of records, with optional
//!   column renaming and strict scalar quoting.
//!
//! # Example
//!
//! ```no_run
//! use knx_sheetbridge::{excel_to_yaml, merge_group_address_names, FieldMapping};
//!
//! let excel = std::fs::read("addresses.xlsx")?;
//! let xml = std::fs::read("export.xml")?;
//!
//! let report = merge_group_address_names(&excel, &xml)?;
//! println!("updated {} / skipped {}", report.updated, report.skipped);
//!
//! let mapping = FieldMapping::from_json(r#"{"Address": "addr"}"#);
//! let export = excel_to_yaml(&excel, &mapping)?;
//! println!("{} rows\n{}", export.row_count, export.content);
//! # Ok::<(), knx_sheetbridge::error::BridgeError>(())
//! ```

pub mod api;
pub mod cli;
pub mod convert;
pub mod error;
pub mod excel;
pub mod merge;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use convert::{excel_to_yaml, YamlExport};
pub use error::{BridgeError, BridgeResult};
pub use excel::read_headers;
pub use merge::{merge_group_address_names, MergeReport};
pub use types::{CellValue, FieldMapping, Sheet};
