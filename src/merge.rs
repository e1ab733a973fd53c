//! Address-Name merge into KNX group-address exports
//!
//! Names from a spreadsheet are written into the `Name` attribute of every
//! `GroupAddress` element whose `Address` matches a spreadsheet row. The XML
//! is rewritten as a stream: everything except the matched start tags passes
//! through untouched, so prefixes and namespace declarations survive as-is.

use crate::error::{BridgeError, BridgeResult};
use crate::excel::ExcelImporter;
use crate::types::{CellValue, Sheet};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use std::collections::HashMap;
use tracing::{debug, info};

/// Namespace of KNX ETS group-address exports
pub const KNX_GA_NAMESPACE: &str = "http://knx.org/xml/ga-export/01";

const GROUP_ADDRESS_TAG: &[u8] = b"GroupAddress";
const ADDRESS_ATTR: &[u8] = b"Address";
const NAME_ATTR: &str = "Name";

/// Spreadsheet column holding the key
pub const ADDRESS_COLUMN: &str = "Address";
/// Spreadsheet column holding the value
pub const NAME_COLUMN: &str = "Name";

/// Result of a merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Serialized XML, UTF-8, with declaration
    pub xml: Vec<u8>,
    pub updated: usize,
    pub skipped: usize,
}

impl MergeReport {
    /// Number of `GroupAddress` elements visited
    pub fn total(&self) -> usize {
        self.updated + self.skipped
    }
}

/// Trimmed address → raw name cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressNameTable {
    names: HashMap<String, CellValue>,
}

impl AddressNameTable {
    /// Build from the `Address` and `Name` columns. Later rows win.
    pub fn from_sheet(sheet: &Sheet) -> BridgeResult<Self> {
        let (address_idx, name_idx) = match (
            sheet.column_index(ADDRESS_COLUMN),
            sheet.column_index(NAME_COLUMN),
        ) {
            (Some(a), Some(n)) => (a, n),
            _ => {
                return Err(BridgeError::Validation(format!(
                    "Spreadsheet must contain '{}' and '{}' columns",
                    ADDRESS_COLUMN, NAME_COLUMN
                )))
            }
        };

        let mut names = HashMap::new();
        for row in &sheet.rows {
            let address = row
                .get(address_idx)
                .map(|cell| cell.to_string())
                .unwrap_or_default();
            let address = address.trim();
            if address.is_empty() {
                continue;
            }
            let name = row.get(name_idx).cloned().unwrap_or(CellValue::Null);
            names.insert(address.to_string(), name);
        }

        Ok(Self { names })
    }

    pub fn get(&self, address: &str) -> Option<&CellValue> {
        self.names.get(address)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Merge spreadsheet names into a KNX group-address export.
pub fn merge_group_address_names(excel: &[u8], xml: &[u8]) -> BridgeResult<MergeReport> {
    let sheet = ExcelImporter::new(excel).import()?;
    let table = AddressNameTable::from_sheet(&sheet)?;
    debug!(addresses = table.len(), "built address-name table");

    let report = apply_names(&table, xml)?;
    info!(
        updated = report.updated,
        skipped = report.skipped,
        "merged names into group addresses"
    );
    Ok(report)
}

/// Rewrite `xml`, setting `Name` on every matching `GroupAddress`.
pub fn apply_names(table: &AddressNameTable, xml: &[u8]) -> BridgeResult<MergeReport> {
    let xml = xml.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(xml);
    let mut reader = NsReader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 64));

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;

    let mut updated = 0;
    let mut skipped = 0;
    let mut first = true;
    let mut shape = DocumentShape::default();

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        if first {
            first = false;
            match event {
                // Replaced by the declaration above; the following newline passes through.
                Event::Decl(_) => continue,
                Event::Eof => break,
                _ => writer.get_mut().push(b'\n'),
            }
        }
        shape.observe(&event)?;

        let event = match event {
            Event::Start(e) if is_group_address(&ns, &e) => {
                Event::Start(patch_element(&e, table, &mut updated, &mut skipped)?)
            }
            Event::Empty(e) if is_group_address(&ns, &e) => {
                Event::Empty(patch_element(&e, table, &mut updated, &mut skipped)?)
            }
            Event::Eof => break,
            other => other,
        };
        write_event(&mut writer, event)?;
    }
    shape.finish()?;

    Ok(MergeReport {
        xml: writer.into_inner(),
        updated,
        skipped,
    })
}

/// Well-formedness the reader does not check on its own: exactly one root
/// element, closed before end of input, and nothing but whitespace,
/// comments or PIs around it.
#[derive(Debug, Default)]
struct DocumentShape {
    depth: usize,
    root_seen: bool,
}

impl DocumentShape {
    fn observe(&mut self, event: &Event) -> BridgeResult<()> {
        match event {
            Event::Start(_) | Event::Empty(_) if self.depth == 0 && self.root_seen => {
                return Err(BridgeError::Xml(
                    "junk after document element".to_string(),
                ));
            }
            Event::Text(text)
                if self.depth == 0 && !text.iter().all(|b| b.is_ascii_whitespace()) =>
            {
                return Err(BridgeError::Xml(
                    "text outside the document element".to_string(),
                ));
            }
            Event::CData(_) if self.depth == 0 => {
                return Err(BridgeError::Xml(
                    "text outside the document element".to_string(),
                ));
            }
            _ => {}
        }

        match event {
            Event::Start(_) => {
                self.depth += 1;
                self.root_seen = true;
            }
            Event::Empty(_) => self.root_seen = true,
            Event::End(_) => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }

    fn finish(&self) -> BridgeResult<()> {
        if !self.root_seen {
            return Err(BridgeError::Xml("no element found".to_string()));
        }
        if self.depth > 0 {
            return Err(BridgeError::Xml(format!(
                "unexpected end of input, {} element(s) left open",
                self.depth
            )));
        }
        Ok(())
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> BridgeResult<()> {
    writer
        .write_event(event)
        .map_err(|e| BridgeError::Xml(format!("failed to write XML: {}", e)))
}

fn is_group_address(ns: &ResolveResult, e: &BytesStart) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == KNX_GA_NAMESPACE.as_bytes())
        && e.local_name().as_ref() == GROUP_ADDRESS_TAG
}

/// Copy of `e` with `Name` set when its address is in `table`.
fn patch_element(
    e: &BytesStart,
    table: &AddressNameTable,
    updated: &mut usize,
    skipped: &mut usize,
) -> BridgeResult<BytesStart<'static>> {
    let attributes = e.attributes().collect::<Result<Vec<Attribute>, _>>()?;

    let address = match attributes.iter().find(|a| a.key.as_ref() == ADDRESS_ATTR) {
        Some(attr) => attr.unescape_value()?.into_owned(),
        None => String::new(),
    };
    if address.is_empty() {
        debug!("skipping GroupAddress without Address attribute");
        *skipped += 1;
        return Ok(e.clone().into_owned());
    }

    let address = address.trim();
    let Some(name) = table.get(address) else {
        debug!(address, "skipping address not found in spreadsheet");
        *skipped += 1;
        return Ok(e.clone().into_owned());
    };

    let name = name.to_string();
    debug!(address, name = %name, "updated group address");
    *updated += 1;

    let mut patched = e.clone().into_owned();
    patched.clear_attributes();
    let mut replaced = false;
    for attr in attributes {
        if attr.key.as_ref() == NAME_ATTR.as_bytes() {
            patched.push_attribute((NAME_ATTR, name.as_str()));
            replaced = true;
        } else {
            patched.push_attribute(attr);
        }
    }
    if !replaced {
        patched.push_attribute((NAME_ATTR, name.as_str()));
    }
    Ok(patched)
}
