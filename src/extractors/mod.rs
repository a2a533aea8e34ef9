// src/extractors/mod.rs
pub mod csv;
pub mod detect;
pub mod encoding;
pub mod pdf;
pub mod section;
pub mod spreadsheet;

use std::path::{Path, PathBuf};

use crate::model::{FileFormat, ParserOptions, StatementKind, Unit};
use crate::utils::error::ExtractError;

// Re-export key extraction types for convenience
pub use self::csv::CsvExtractor;
pub use self::pdf::PdfExtractor;
pub use self::section::{Row, SectionLocator};
pub use self::spreadsheet::SpreadsheetExtractor;

/// The file an extractor works on.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>, size: u64) -> Self {
        Self { path: path.as_ref().to_path_buf(), size }
    }

    /// File name without extension, used as a fallback company name.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One `(label, amount)` line found inside a section. `amount` is `None` for
/// caption lines (group headings such as "流動資産") that carry no figure.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub label: String,
    pub amount: Option<String>,
    pub depth: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    pub kind: StatementKind,
    pub heading: String,
    pub start_line: usize,
    pub end_line: usize,
    pub unit: Option<Unit>,
    pub items: Vec<RawItem>,
}

/// Per-section extraction outcome. Whether `Missing` is fatal is decided
/// by the assembler, not here.
#[derive(Debug)]
pub enum SectionOutcome {
    Extracted(RawSection),
    Missing(ExtractError),
}

impl SectionOutcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self, SectionOutcome::Extracted(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCompany {
    pub name: Option<String>,
    pub security_code: Option<String>,
    pub industry: Option<String>,
}

/// Everything an extractor found in a document, before normalization.
#[derive(Debug)]
pub struct RawStatement {
    pub company: RawCompany,
    /// Start and end date tokens, exactly as written.
    pub period: Option<(String, String)>,
    pub period_number: Option<u32>,
    pub document_unit: Option<Unit>,
    pub balance_sheet: SectionOutcome,
    pub income_statement: SectionOutcome,
    pub cash_flow_statement: SectionOutcome,
    pub line_count: usize,
    pub encoding: Option<String>,
    /// Non-fatal extractor observations, surfaced as warnings.
    pub notes: Vec<String>,
}

impl RawStatement {
    pub fn section(&self, kind: StatementKind) -> &SectionOutcome {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlowStatement => &self.cash_flow_statement,
        }
    }
}

/// A per-format extractor: reads its native source and produces the raw
/// statement. Implementations are blocking and run on tokio's blocking pool.
pub trait FormatExtractor: Send + Sync {
    fn format(&self) -> FileFormat;

    fn extract(&self, source: &SourceFile, options: &ParserOptions) -> Result<RawStatement, ExtractError>;
}
