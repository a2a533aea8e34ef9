// src/extractors/pdf.rs
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::section::{Row, SectionLocator};
use super::{FormatExtractor, RawStatement, SourceFile};
use crate::model::{FileFormat, ParserOptions};
use crate::utils::error::ExtractError;

const READ_BUFFER_SIZE: usize = 256 * 1024;

/// PDF extractor working on the document's text layer.
pub struct PdfExtractor;

impl FormatExtractor for PdfExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::Pdf
    }

    fn extract(&self, source: &SourceFile, options: &ParserOptions) -> Result<RawStatement, ExtractError> {
        // The text layer needs the whole document; streaming only bounds the read buffer.
        let bytes = read_bytes(&source.path, source.size, options.buffer_size(READ_BUFFER_SIZE))?;

        // pdf-extract panics on some malformed documents instead of returning an error.
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|_| ExtractError::Pdf("PDF parser aborted on malformed input".to_string()))?
            .map_err(|e| ExtractError::Pdf(format!("Failed to extract text from PDF: {}", e)))?;
        tracing::debug!("Extracted {} characters of text from {}", text.len(), source.path.display());

        let mut notes = Vec::new();
        if text.trim().is_empty() {
            tracing::warn!("No text layer in {}", source.path.display());
            notes.push(if options.use_ocr {
                "PDF has no text layer and OCR is not available in this build".to_string()
            } else {
                "PDF has no text layer (scanned document?)".to_string()
            });
        }

        let rows = text_to_rows(&text);
        let locator = SectionLocator::from_options(options, &source.stem());
        let mut raw = locator.analyze(&rows);
        raw.notes.extend(notes);
        Ok(raw)
    }
}

fn read_bytes(path: &Path, size_hint: u64, buffer_size: usize) -> Result<Vec<u8>, ExtractError> {
    let mut reader = BufReader::with_capacity(buffer_size, File::open(path)?);
    let mut bytes = Vec::with_capacity(size_hint as usize);
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Splits extracted text into single-cell rows. Page breaks become blank
/// lines so they can close a section like any other gap.
pub fn text_to_rows(text: &str) -> Vec<Row> {
    text.replace('\u{c}', "\n\n")
        .lines()
        .map(|line| vec![line.trim_end_matches('\r').to_string()])
        .collect()
}
