// src/model/mod.rs
pub mod options;
pub mod statement;

pub use options::{
    ParserOptions, ParserResult, BATCH_WINDOW, DEFAULT_CHUNK_SIZE, MAX_FILE_SIZE,
    STREAMING_THRESHOLD,
};
pub use statement::{
    AccountItem, Amount, BalanceSheet, CashFlowStatement, CompanyInfo, FileFormat, FiscalPeriod,
    IncomeStatement, ParsedStatement, SectionInfo, StatementKind, StatementMetadata, Unit,
};
