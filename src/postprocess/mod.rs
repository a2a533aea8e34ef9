// src/postprocess/mod.rs
pub mod export;
pub mod stats;
pub mod validate;

pub use export::{export_results_to_json, export_to_json};
pub use stats::{statement_statistics, summarize_results, BatchStatistics, StatementStatistics};
pub use validate::{validate_statement, ValidationReport};
