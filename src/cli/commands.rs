use crate::convert::excel_to_yaml;
use crate::error::{BridgeError, BridgeResult};
use crate::excel::read_headers;
use crate::merge::merge_group_address_names;
use crate::types::FieldMapping;
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Fail unless `path` ends in `.{extension}` (case-insensitive)
pub fn ensure_extension(path: &Path, extension: &str) -> BridgeResult<()> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

    if matches {
        Ok(())
    } else {
        Err(BridgeError::Validation(format!(
            "{} must be a .{} file",
            path.display(),
            extension
        )))
    }
}

fn file_stem_or_default(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output")
        .to_string()
}

/// `export.xml` → `export_updated.xml`, next to the input
pub fn default_merge_output(xml: &Path) -> PathBuf {
    xml.with_file_name(format!("{}_updated.xml", file_stem_or_default(xml)))
}

/// `addresses.xlsx` → `addresses.yaml`, next to the input
pub fn default_yaml_output(excel: &Path) -> PathBuf {
    excel.with_file_name(format!("{}.yaml", file_stem_or_default(excel)))
}

/// Ask for an output key per header; empty input keeps the original name.
pub fn prompt_field_names<R: BufRead, W: Write>(
    headers: &[String],
    mut input: R,
    mut output: W,
) -> BridgeResult<FieldMapping> {
    let mut mapping = FieldMapping::new();
    for header in headers {
        write!(
            output,
            "Output key for '{}' (leave empty to keep the original name): ",
            header
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim();
        if !answer.is_empty() {
            mapping.insert(header.clone(), answer);
        }
    }
    Ok(mapping)
}

/// Execute the merge command
pub fn merge(
    excel: PathBuf,
    xml: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "🔗 Sheetbridge - Merge names into group addresses".bold().green());
    println!("   Spreadsheet: {}", excel.display());
    println!("   XML:         {}\n", xml.display());

    ensure_extension(&excel, "xlsx")?;
    ensure_extension(&xml, "xml")?;

    if verbose {
        println!("{}", "📖 Reading input files...".cyan());
    }
    let excel_bytes = fs::read(&excel)?;
    let xml_bytes = fs::read(&xml)?;

    let report = merge_group_address_names(&excel_bytes, &xml_bytes)?;

    if verbose {
        println!(
            "   {} group addresses visited\n",
            report.total().to_string().bright_blue()
        );
    }

    if report.updated == 0 {
        println!(
            "{}",
            format!(
                "⚠️  No records updated ({} skipped), nothing written",
                report.skipped
            )
            .yellow()
        );
        return Ok(());
    }

    let output = output.unwrap_or_else(|| default_merge_output(&xml));
    fs::write(&output, &report.xml)?;

    println!("{}", "✅ Merge Complete!".bold().green());
    println!("   Updated: {}", report.updated.to_string().bold().green());
    println!("   Skipped: {}", report.skipped.to_string().yellow());
    println!("   XML file: {}\n", output.display());

    Ok(())
}

/// Execute the convert command
pub fn convert(
    excel: PathBuf,
    output: Option<PathBuf>,
    maps: Vec<String>,
    mapping_file: Option<PathBuf>,
    interactive: bool,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "🔥 Sheetbridge - Spreadsheet to YAML".bold().green());
    println!("   Input: {}\n", excel.display());

    ensure_extension(&excel, "xlsx")?;
    let excel_bytes = fs::read(&excel)?;

    let mut mapping = match &mapping_file {
        Some(path) => FieldMapping::from_json_file(path)?,
        None => FieldMapping::new(),
    };
    mapping.extend(FieldMapping::from_pairs(&maps)?);

    if interactive {
        let headers = read_headers(&excel_bytes)?;
        let stdin = io::stdin();
        let prompted = prompt_field_names(&headers, stdin.lock(), io::stdout())?;
        mapping.extend(prompted);
        println!();
    }

    if verbose && !mapping.is_empty() {
        println!("   {} column(s) renamed\n", mapping.len());
    }

    let export = excel_to_yaml(&excel_bytes, &mapping)?;

    let output = output.unwrap_or_else(|| default_yaml_output(&excel));
    fs::write(&output, export.content.as_bytes())?;

    println!("{}", "✅ Conversion Complete!".bold().green());
    println!("   Rows: {}", export.row_count.to_string().bold().green());
    println!("   YAML file: {}\n", output.display());

    Ok(())
}

/// Execute the headers command
pub fn headers(excel: PathBuf, json: bool) -> BridgeResult<()> {
    ensure_extension(&excel, "xlsx")?;
    let headers = read_headers(&fs::read(&excel)?)?;

    if json {
        println!("{}", serde_json::to_string(&headers)?);
    } else {
        for header in &headers {
            println!("{}", header);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
