//! Shared fixtures: in-memory workbooks and KNX exports

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

/// A fixture cell
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Num(f64),
    Bool(bool),
    Empty,
}

pub use Cell::{Bool, Empty, Num, Text};

/// Build an .xlsx workbook whose first sheet holds `rows`, starting at A1
pub fn xlsx(rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, c, *s).unwrap();
                }
                Cell::Num(n) => {
                    sheet.write_number(r, c, *n).unwrap();
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(r, c, *b).unwrap();
                }
                Cell::Empty => {}
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Address/Name workbook from text pairs
pub fn address_sheet(pairs: &[(&'static str, &'static str)]) -> Vec<u8> {
    let mut rows = vec![vec![Text("Address"), Text("Name")]];
    rows.extend(pairs.iter().map(|&(a, n)| vec![Text(a), Text(n)]));
    xlsx(&rows)
}

/// A KNX group-address export with one GroupAddress per address
pub fn knx_export(addresses: &[&str]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <GroupAddress-Export xmlns=\"http://knx.org/xml/ga-export/01\">\n\
         \x20 <GroupRange Name=\"Main\" RangeStart=\"2048\" RangeEnd=\"4095\">\n",
    );
    for (i, address) in addresses.iter().enumerate() {
        xml.push_str(&format!(
            "    <GroupAddress Name=\"GA {}\" Address=\"{}\" />\n",
            i, address
        ));
    }
    xml.push_str("  </GroupRange>\n</GroupAddress-Export>\n");
    xml
}
