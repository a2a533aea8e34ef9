// src/model/options.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::statement::ParsedStatement;

/// Files larger than this are rejected outright.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
/// Files larger than this switch to streaming mode.
pub const STREAMING_THRESHOLD: u64 = 10 * 1024 * 1024;
/// Chunk size used when streaming is switched on automatically.
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;
/// Files processed concurrently per batch window.
pub const BATCH_WINDOW: usize = 3;

/// Parser configuration. Every field has a default, so callers only set
/// what they care about:
///
/// ```ignore
/// let options = ParserOptions { strict: true, ..Default::default() };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Read the input incrementally. Forced on for files over 10 MB.
    pub streaming: bool,
    /// Buffer size for streaming reads. Defaults to 5 MB when streaming is forced.
    pub chunk_size: Option<usize>,
    /// Accepted for compatibility; there is no OCR engine, a PDF without a
    /// text layer only produces a warning.
    pub use_ocr: bool,
    /// Encoding label for delimited text (e.g. "shift_jis"). `None` auto-detects.
    pub encoding: Option<String>,
    /// Field delimiter for delimited text.
    pub delimiter: u8,
    /// Leading rows to ignore in delimited text and spreadsheets.
    pub skip_rows: usize,
    /// Missing statement sections abort the parse instead of becoming warnings.
    pub strict: bool,
    /// Log section boundaries and, with `debug_dir`, dump annotated text.
    pub debug: bool,
    pub debug_dir: Option<PathBuf>,
    /// Consecutive blank lines that terminate a section.
    pub blank_line_threshold: usize,
    /// Leading lines scanned for company name and securities code.
    pub header_scan_rows: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            streaming: false,
            chunk_size: None,
            use_ocr: false,
            encoding: None,
            delimiter: b',',
            skip_rows: 0,
            strict: false,
            debug: false,
            debug_dir: None,
            blank_line_threshold: 5,
            header_scan_rows: 20,
        }
    }
}

impl ParserOptions {
    /// Applies the size-driven defaults for a file of `file_size` bytes.
    pub fn resolved_for_size(&self, file_size: u64) -> Self {
        let mut resolved = self.clone();
        if file_size > STREAMING_THRESHOLD {
            resolved.streaming = true;
            resolved.chunk_size.get_or_insert(DEFAULT_CHUNK_SIZE);
        }
        resolved
    }

    /// Effective read buffer size: the configured chunk size when streaming,
    /// otherwise `fallback`.
    pub fn buffer_size(&self, fallback: usize) -> usize {
        match (self.streaming, self.chunk_size) {
            (true, Some(size)) if size > 0 => size,
            (true, _) => DEFAULT_CHUNK_SIZE,
            _ => fallback,
        }
    }
}

/// Uniform envelope returned by every entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ParsedStatement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Wall-clock milliseconds.
    pub duration: u64,
}

impl ParserResult {
    pub fn success(data: ParsedStatement, warnings: Vec<String>, duration: u64) -> Self {
        Self { success: true, data: Some(data), error: None, warnings, duration }
    }

    pub fn failure(error: impl Into<String>, duration: u64) -> Self {
        Self { success: false, data: None, error: Some(error.into()), warnings: Vec::new(), duration }
    }
}
