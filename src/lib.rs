// src/lib.rs
//! Parses Japanese financial statements (balance sheet, income statement,
//! cash flow statement) from PDF, spreadsheet and CSV files into one
//! normalized model.

pub mod assembler;
pub mod extractors;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod postprocess;
pub mod storage;
pub mod utils;

pub use model::{ParsedStatement, ParserOptions, ParserResult};
pub use orchestrator::{parse_statement, parse_statements, StatementParser};
pub use utils::ParseError;
