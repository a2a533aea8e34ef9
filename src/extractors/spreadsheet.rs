// src/extractors/spreadsheet.rs
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};

use super::section::{Row, SectionLocator};
use super::{FormatExtractor, RawStatement, SourceFile};
use crate::model::{FileFormat, ParserOptions};
use crate::utils::error::ExtractError;

const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Excel/ODS workbook extractor. Every sheet is flattened into rows, with the
/// sheet name as the first row so a sheet called "貸借対照表" acts as a heading.
pub struct SpreadsheetExtractor;

impl FormatExtractor for SpreadsheetExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::Spreadsheet
    }

    fn extract(&self, source: &SourceFile, options: &ParserOptions) -> Result<RawStatement, ExtractError> {
        let mut reader = BufReader::with_capacity(options.buffer_size(READ_BUFFER_SIZE), File::open(&source.path)?);
        let mut bytes = Vec::with_capacity(source.size as usize);
        reader.read_to_end(&mut bytes)?;

        let (rows, notes) = workbook_rows(bytes, options)?;
        tracing::info!("Read {} rows from {}", rows.len(), source.path.display());

        let locator = SectionLocator::from_options(options, &source.stem());
        let mut raw = locator.analyze(&rows);
        raw.notes.extend(notes);
        Ok(raw)
    }
}

/// Flattens all sheets of a workbook held in memory. Sheets that fail to
/// load are reported in the returned notes and skipped.
pub fn workbook_rows(bytes: Vec<u8>, options: &ParserOptions) -> Result<(Vec<Row>, Vec<String>), ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_owned();
    tracing::debug!("Workbook sheets: {:?}", sheet_names);

    let mut rows = Vec::new();
    let mut notes = Vec::new();
    for name in sheet_names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                rows.push(vec![name.clone()]);
                rows.extend(range_rows(&range, options.skip_rows));
                // Keep the next sheet's content out of this sheet's sections.
                rows.extend(std::iter::repeat_with(|| vec![String::new()]).take(options.blank_line_threshold.max(1)));
            }
            Err(e) => {
                tracing::warn!("Skipping sheet '{}': {}", name, e);
                notes.push(format!("Sheet '{}' could not be read: {}", name, e));
            }
        }
    }
    Ok((rows, notes))
}

pub fn range_rows(range: &Range<Data>, skip_rows: usize) -> Vec<Row> {
    range
        .rows()
        .skip(skip_rows)
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.to_string(),
        _ => cell.to_string(),
    }
}
