// src/postprocess/stats.rs
use serde::Serialize;

use crate::model::{AccountItem, ParsedStatement, ParserResult};

/// Aggregate figures over a batch of parse results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    /// Share of successful files, 0.0 for an empty batch.
    pub success_rate: f64,
    pub total_duration: u64,
    pub average_duration: f64,
    pub max_duration: u64,
    pub warning_count: usize,
    pub balance_sheets: usize,
    pub income_statements: usize,
    pub cash_flow_statements: usize,
}

pub fn summarize_results(results: &[ParserResult]) -> BatchStatistics {
    let total_files = results.len();
    let successful = results.iter().filter(|r| r.success).count();
    let total_duration: u64 = results.iter().map(|r| r.duration).sum();
    let data: Vec<&ParsedStatement> = results.iter().filter_map(|r| r.data.as_ref()).collect();

    let ratio = |part: f64| if total_files == 0 { 0.0 } else { part / total_files as f64 };

    BatchStatistics {
        total_files,
        successful,
        failed: total_files - successful,
        success_rate: ratio(successful as f64),
        total_duration,
        average_duration: ratio(total_duration as f64),
        max_duration: results.iter().map(|r| r.duration).max().unwrap_or(0),
        warning_count: results.iter().map(|r| r.warnings.len()).sum(),
        balance_sheets: data.iter().filter(|d| d.balance_sheet.is_some()).count(),
        income_statements: data.iter().filter(|d| d.income_statement.is_some()).count(),
        cash_flow_statements: data.iter().filter(|d| d.cash_flow_statement.is_some()).count(),
    }
}

/// Item counts for one parsed statement. Nested sub-items are counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementStatistics {
    pub sections_present: usize,
    pub balance_sheet_items: usize,
    pub income_statement_items: usize,
    pub cash_flow_items: usize,
    pub total_items: usize,
    pub skipped_items: usize,
    pub unmapped_accounts: usize,
}

fn count<'a>(items: impl Iterator<Item = &'a AccountItem>) -> usize {
    items.map(AccountItem::count).sum()
}

pub fn statement_statistics(statement: &ParsedStatement) -> StatementStatistics {
    let balance_sheet_items = statement.balance_sheet.as_ref().map_or(0, |bs| count(bs.items()));
    let income_statement_items = statement.income_statement.as_ref().map_or(0, |is| count(is.items()));
    let cash_flow_items = statement.cash_flow_statement.as_ref().map_or(0, |cf| count(cf.items()));

    StatementStatistics {
        sections_present: [
            statement.balance_sheet.is_some(),
            statement.income_statement.is_some(),
            statement.cash_flow_statement.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count(),
        balance_sheet_items,
        income_statement_items,
        cash_flow_items,
        total_items: balance_sheet_items + income_statement_items + cash_flow_items,
        skipped_items: statement.metadata.skipped_items,
        unmapped_accounts: statement.metadata.unmapped_accounts.len(),
    }
}
