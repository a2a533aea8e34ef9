// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::model::StatementKind;

// Errors raised while turning a single token into a typed value.
// These are recoverable at the line-item level.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Invalid amount format: '{0}'")]
    InvalidAmountFormat(String),

    #[error("Invalid date format: '{0}'")]
    InvalidDateFormat(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Section not found: {0} heading could not be located")]
    SectionNotFound(StatementKind),

    #[error("PDF extraction error: {0}")]
    Pdf(String),

    #[error("Spreadsheet extraction error: {0}")]
    Spreadsheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error), // Automatically convert csv errors

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("I/O error during extraction: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// Top-level error for a single parse call. Never crosses the orchestrator
// boundary; it is rendered into `ParserResult.error` there.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File size {size} bytes exceeds the maximum allowed size of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extractor task failed: {0}")]
    Task(String),

    #[error("Processing failed: {0}")]
    Processing(String),
}
