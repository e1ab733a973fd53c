//! Excel importer implementation - Excel (.xlsx) → Sheet

use crate::error::{BridgeError, BridgeResult};
use crate::types::{CellValue, Sheet};
use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::io::Cursor;
use tracing::debug;

/// Rendering of date and time cells
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Excel importer reading the first worksheet of an in-memory .xlsx file
pub struct ExcelImporter<'a> {
    bytes: &'a [u8],
}

impl<'a> ExcelImporter<'a> {
    /// Create a new Excel importer over raw .xlsx bytes
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Import the first worksheet into a Sheet
    pub fn import(&self) -> BridgeResult<Sheet> {
        let range = self.first_sheet_range()?;
        let sheet = self.process_sheet(&range);
        debug!(
            columns = sheet.header.len(),
            rows = sheet.row_count(),
            "imported worksheet"
        );
        Ok(sheet)
    }

    /// Non-empty header cells of row 1, in column order
    pub fn headers(&self) -> BridgeResult<Vec<String>> {
        Ok(self.import()?.header_names())
    }

    fn first_sheet_range(&self) -> BridgeResult<Range<Data>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(self.bytes))
            .map_err(|e| BridgeError::Spreadsheet(format!("Failed to open Excel file: {}", e)))?;

        workbook
            .worksheet_range_at(0)
            .ok_or_else(|| BridgeError::Spreadsheet("Workbook has no worksheets".to_string()))?
            .map_err(|e| BridgeError::Spreadsheet(format!("Failed to read worksheet: {}", e)))
    }

    /// Lay the used range out on a grid anchored at A1.
    ///
    /// calamine ranges start at the first used cell; row 1 must stay the
    /// header even when leading rows or columns are empty.
    fn process_sheet(&self, range: &Range<Data>) -> Sheet {
        let Some((end_row, end_col)) = range.end() else {
            return Sheet::default();
        };

        let mut grid = (0..=end_row).map(|row| {
            (0..=end_col)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(Self::convert_cell)
                        .unwrap_or(CellValue::Null)
                })
                .collect::<Vec<_>>()
        });

        let header = grid
            .next()
            .map(|cells| cells.iter().map(Self::header_name).collect())
            .unwrap_or_default();
        let rows = grid.collect();

        Sheet::new(header, rows)
    }

    /// Convert one calamine cell to a CellValue
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Null,
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::from_f64(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => CellValue::Text(format_datetime(&naive)),
                None => CellValue::from_f64(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }

    /// Header cell rendered as a column name; blank cells have none
    fn header_name(cell: &CellValue) -> Option<String> {
        match cell {
            CellValue::Null => None,
            CellValue::Text(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Read the non-empty header names of the first worksheet
pub fn read_headers(bytes: &[u8]) -> BridgeResult<Vec<String>> {
    ExcelImporter::new(bytes).headers()
}
