//! Format-to-text extraction.
//!
//! Turns supported files into plain text: UTF-8 text and markdown,
//! delimited tables, spreadsheets, PDF (text layer only) and DOCX.

use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::core::error::{KbaseError, Result};

/// File formats the loader knows how to turn into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Csv,
    Tsv,
    /// Excel or OpenDocument workbook, every sheet
    Spreadsheet,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" | "md" | "markdown" | "text" => Some(Self::PlainText),
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Spreadsheet),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Extract plain text from a file of a supported format
pub fn extract_text(path: &Path) -> Result<String> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| KbaseError::LoadFailed(format!("Unsupported file type: {path:?}")))?;

    match format {
        DocumentFormat::PlainText => read_utf8(path),
        DocumentFormat::Csv => table_to_text(&read_utf8(path)?, b','),
        DocumentFormat::Tsv => table_to_text(&read_utf8(path)?, b'\t'),
        DocumentFormat::Spreadsheet => extract_spreadsheet_text(path),
        DocumentFormat::Pdf => extract_pdf_text(path),
        DocumentFormat::Docx => extract_docx_text(path),
    }
}

fn read_utf8(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            KbaseError::LoadFailed(format!("Not valid UTF-8: {path:?}"))
        } else {
            KbaseError::LoadFailed(format!("Failed to read {path:?}: {e}"))
        }
    })
}

/// Flatten a delimited table into one line per row.
///
/// The header row is joined as-is; in data rows empty cells become
/// `N/A`. Cells are separated by `", "`.
pub fn table_to_text(content: &str, delimiter: u8) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut lines = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| KbaseError::LoadFailed(format!("Malformed table row: {e}")))?;

        let cells: Vec<&str> = if row_idx == 0 {
            record.iter().collect()
        } else {
            record
                .iter()
                .map(|v| if v.is_empty() { "N/A" } else { v })
                .collect()
        };
        lines.push(cells.join(", "));
    }

    Ok(lines.join("\n"))
}

fn extract_spreadsheet_text(path: &Path) -> Result<String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| KbaseError::LoadFailed(format!("Failed to open workbook {path:?}: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let rows: Vec<Vec<String>> = range
                    .rows()
                    .map(|row| row.iter().map(cell_to_string).collect())
                    .collect();
                let text = sheet_to_text(&name, &rows);
                if text.is_empty() {
                    tracing::debug!("Sheet '{}' of {:?} is empty", name, path);
                } else {
                    sheets.push(text);
                }
            }
            Err(e) => tracing::warn!("Skipping sheet '{}' of {:?}: {}", name, path, e),
        }
    }

    Ok(sheets.join("\n"))
}

/// Render one workbook cell. Whole floats print without a fraction.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}

/// Flatten one sheet into lines of `"{sheet}: cell, cell, ..."`.
///
/// The first non-blank row is the header and is kept as-is; in later
/// rows empty cells become `N/A`. Blank rows are dropped.
pub fn sheet_to_text(sheet: &str, rows: &[Vec<String>]) -> String {
    let mut lines = Vec::new();
    for row in rows.iter().filter(|r| r.iter().any(|c| !c.is_empty())) {
        let cells: Vec<&str> = if lines.is_empty() {
            row.iter().map(String::as_str).collect()
        } else {
            row.iter()
                .map(|c| if c.is_empty() { "N/A" } else { c.as_str() })
                .collect()
        };
        lines.push(format!("{sheet}: {}", cells.join(", ")));
    }
    lines.join("\n")
}

fn extract_pdf_text(path: &Path) -> Result<String> {
    // pdf-extract panics on some malformed inputs
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text(path)
    }));

    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(KbaseError::LoadFailed(format!(
            "Failed to extract PDF text from {path:?}: {e}"
        ))),
        Err(_) => Err(KbaseError::LoadFailed(format!(
            "PDF extractor crashed on {path:?}"
        ))),
    }
}

fn extract_docx_text(path: &Path) -> Result<String> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| KbaseError::LoadFailed(format!("Invalid DOCX archive {path:?}: {e}")))?;

    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| KbaseError::LoadFailed(format!("No word/document.xml in {path:?}")))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| KbaseError::LoadFailed(format!("Failed to read DOCX body: {e}")))?;

    Ok(docx_xml_to_text(&xml))
}

/// Pull paragraph text out of a DOCX `word/document.xml` body.
///
/// Text runs (`<w:t>`) are concatenated, every paragraph (`<w:p>`)
/// starts a new line, `<w:tab/>` and `<w:br/>` map to tab and newline.
pub fn docx_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    let mut in_text = false;
    let mut chars = xml.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            if in_text {
                out.push(c);
            }
            continue;
        }

        let mut tag = String::new();
        for tc in chars.by_ref() {
            if tc == '>' {
                break;
            }
            tag.push(tc);
        }

        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("");

        match name {
            "w:t" if !self_closing => in_text = true,
            "/w:t" => in_text = false,
            "w:p" if !self_closing => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            "w:tab" => out.push('\t'),
            "w:br" => out.push('\n'),
            _ => {}
        }
    }

    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
