// src/extractors/csv.rs
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use super::encoding::{resolve_encoding, DecodingReader};
use super::section::{Row, SectionLocator};
use super::{FormatExtractor, RawStatement, SourceFile};
use crate::model::{FileFormat, ParserOptions};
use crate::utils::error::ExtractError;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Delimited text (CSV/TSV) extractor.
pub struct CsvExtractor;

impl FormatExtractor for CsvExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::DelimitedText
    }

    fn extract(&self, source: &SourceFile, options: &ParserOptions) -> Result<RawStatement, ExtractError> {
        let file = File::open(&source.path)?;
        let mut reader = BufReader::with_capacity(options.buffer_size(READ_BUFFER_SIZE), file);

        let encoding = resolve_encoding(options.encoding.as_deref(), reader.fill_buf()?)?;
        let delimiter = effective_delimiter(source, options);
        tracing::debug!(
            "Reading {} as {} (delimiter {:?}, streaming {})",
            source.path.display(), encoding.name(), delimiter as char, options.streaming
        );

        let mut notes = Vec::new();
        let rows = if options.streaming {
            let (rows, decoder) = read_rows(DecodingReader::new(reader, encoding), delimiter, options.skip_rows)?;
            if decoder.had_errors() {
                notes.push(format!("Malformed {} sequences were replaced while decoding", encoding.name()));
            }
            rows
        } else {
            let mut bytes = Vec::with_capacity(source.size as usize);
            reader.read_to_end(&mut bytes)?;
            let (text, _, had_errors) = encoding.decode(&bytes);
            if had_errors {
                notes.push(format!("Malformed {} sequences were replaced while decoding", encoding.name()));
            }
            read_rows(text.as_bytes(), delimiter, options.skip_rows)?.0
        };
        tracing::info!("Read {} rows from {}", rows.len(), source.path.display());

        let locator = SectionLocator::from_options(options, &source.stem());
        let mut raw = locator.analyze(&rows);
        raw.encoding = Some(encoding.name().to_string());
        raw.notes.extend(notes);
        Ok(raw)
    }
}

// A .tsv file keeps its tab unless the caller picked something other than the default.
fn effective_delimiter(source: &SourceFile, options: &ParserOptions) -> u8 {
    let is_tsv = source
        .path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv && options.delimiter == b',' {
        b'\t'
    } else {
        options.delimiter
    }
}

/// Reads every record as a row of cells, returning the inner reader so the
/// caller can inspect it afterwards.
pub fn read_rows<R: Read>(reader: R, delimiter: u8, skip_rows: usize) -> Result<(Vec<Row>, R), ExtractError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records().skip(skip_rows) {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((rows, rdr.into_inner()))
}
