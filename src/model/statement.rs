// src/model/statement.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::NormalizeError;

/// Magnitude a figure was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    Yen,
    ThousandYen,
    MillionYen,
    HundredMillionYen,
}

impl Unit {
    /// Multiplier that converts a value in this unit to yen.
    pub fn multiplier(self) -> f64 {
        match self {
            Unit::Yen => 1.0,
            Unit::ThousandYen => 1e3,
            Unit::MillionYen => 1e6,
            Unit::HundredMillionYen => 1e8,
        }
    }
}

/// A monetary figure as written in the source document.
///
/// Fields are private so an `Amount` cannot be altered after construction;
/// `value` is guaranteed finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    value: f64,
    unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    original: Option<String>,
}

impl Amount {
    pub fn new(value: f64, unit: Unit, original: Option<String>) -> Result<Self, NormalizeError> {
        if !value.is_finite() {
            return Err(NormalizeError::InvalidAmountFormat(
                original.unwrap_or_else(|| value.to_string()),
            ));
        }
        Ok(Self { value, unit, original })
    }

    /// Placeholder used for totals the assembler leaves to downstream consumers.
    pub fn zero() -> Self {
        Self { value: 0.0, unit: Unit::Yen, original: None }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// Value converted to base currency (yen).
    pub fn to_yen(&self) -> f64 {
        self.value * self.unit.multiplier()
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

/// A single labeled figure, possibly with nested detail lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<AccountItem>,
}

impl AccountItem {
    /// Number of items in this subtree, the item itself included.
    pub fn count(&self) -> usize {
        1 + self.sub_items.iter().map(AccountItem::count).sum::<usize>()
    }

    /// Depth-first walk over the item and its descendants.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &AccountItem> + '_> {
        Box::new(std::iter::once(self).chain(self.sub_items.iter().flat_map(|s| s.walk())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year_end: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub current_assets: Vec<AccountItem>,
    pub fixed_assets: Vec<AccountItem>,
    pub deferred_assets: Vec<AccountItem>,
    pub current_liabilities: Vec<AccountItem>,
    pub fixed_liabilities: Vec<AccountItem>,
    pub net_assets: Vec<AccountItem>,
    pub other_items: Vec<AccountItem>,
    pub total_current_assets: Amount,
    pub total_fixed_assets: Amount,
    pub total_assets: Amount,
    pub total_current_liabilities: Amount,
    pub total_fixed_liabilities: Amount,
    pub total_liabilities: Amount,
    pub total_net_assets: Amount,
    pub total_liabilities_and_net_assets: Amount,
}

impl BalanceSheet {
    pub fn items(&self) -> impl Iterator<Item = &AccountItem> {
        self.current_assets
            .iter()
            .chain(&self.fixed_assets)
            .chain(&self.deferred_assets)
            .chain(&self.current_liabilities)
            .chain(&self.fixed_liabilities)
            .chain(&self.net_assets)
            .chain(&self.other_items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub revenue: Vec<AccountItem>,
    pub cost_of_sales: Vec<AccountItem>,
    pub selling_general_admin: Vec<AccountItem>,
    pub non_operating_income: Vec<AccountItem>,
    pub non_operating_expenses: Vec<AccountItem>,
    pub extraordinary_income: Vec<AccountItem>,
    pub extraordinary_losses: Vec<AccountItem>,
    pub income_taxes: Vec<AccountItem>,
    pub other_items: Vec<AccountItem>,
    pub gross_profit: Amount,
    pub operating_income: Amount,
    pub ordinary_income: Amount,
    pub income_before_taxes: Amount,
    pub net_income: Amount,
}

impl IncomeStatement {
    pub fn items(&self) -> impl Iterator<Item = &AccountItem> {
        self.revenue
            .iter()
            .chain(&self.cost_of_sales)
            .chain(&self.selling_general_admin)
            .chain(&self.non_operating_income)
            .chain(&self.non_operating_expenses)
            .chain(&self.extraordinary_income)
            .chain(&self.extraordinary_losses)
            .chain(&self.income_taxes)
            .chain(&self.other_items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    pub operating_activities: Vec<AccountItem>,
    pub investing_activities: Vec<AccountItem>,
    pub financing_activities: Vec<AccountItem>,
    pub other_items: Vec<AccountItem>,
    pub operating_cash_flow: Amount,
    pub investing_cash_flow: Amount,
    pub financing_cash_flow: Amount,
    pub net_change_in_cash: Amount,
    pub cash_at_end_of_period: Amount,
}

impl CashFlowStatement {
    pub fn items(&self) -> impl Iterator<Item = &AccountItem> {
        self.operating_activities
            .iter()
            .chain(&self.investing_activities)
            .chain(&self.financing_activities)
            .chain(&self.other_items)
    }
}

/// Which of the three statements a section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlowStatement,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::BalanceSheet,
        StatementKind::IncomeStatement,
        StatementKind::CashFlowStatement,
    ];
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::BalanceSheet => "balance sheet",
            StatementKind::IncomeStatement => "income statement",
            StatementKind::CashFlowStatement => "cash flow statement",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    Pdf,
    Spreadsheet,
    DelimitedText,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Pdf => "PDF",
            FileFormat::Spreadsheet => "spreadsheet",
            FileFormat::DelimitedText => "delimited text",
        };
        f.write_str(name)
    }
}

/// Where a section was found and the unit it declared, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub kind: StatementKind,
    pub heading: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementMetadata {
    pub source_file: String,
    pub format: FileFormat,
    pub file_size: u64,
    pub parsed_at: DateTime<Utc>,
    pub streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// True when no period was found and the trailing-year fallback was used.
    pub period_is_default: bool,
    pub line_count: usize,
    pub skipped_items: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped_accounts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionInfo>,
}

/// Top-level result of parsing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStatement {
    pub company: CompanyInfo,
    pub period: FiscalPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_sheet: Option<BalanceSheet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_statement: Option<IncomeStatement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_flow_statement: Option<CashFlowStatement>,
    pub metadata: StatementMetadata,
}

impl ParsedStatement {
    pub fn has_any_section(&self) -> bool {
        self.balance_sheet.is_some()
            || self.income_statement.is_some()
            || self.cash_flow_statement.is_some()
    }

    /// All top-level items across the statements that are present.
    pub fn all_items(&self) -> Vec<&AccountItem> {
        let mut items: Vec<&AccountItem> = Vec::new();
        if let Some(bs) = &self.balance_sheet {
            items.extend(bs.items());
        }
        if let Some(is) = &self.income_statement {
            items.extend(is.items());
        }
        if let Some(cf) = &self.cash_flow_statement {
            items.extend(cf.items());
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_rejects_non_finite() {
        assert!(Amount::new(f64::NAN, Unit::Yen, None).is_err());
        assert!(Amount::new(f64::INFINITY, Unit::Yen, Some("x".into())).is_err());
        let ok = Amount::new(12.0, Unit::MillionYen, Some("12百万円".into())).unwrap();
        assert_eq!(ok.to_yen(), 12_000_000.0);
        assert_eq!(ok.original(), Some("12百万円"));
    }

    #[test]
    fn test_item_count_includes_sub_items() {
        let leaf = AccountItem {
            code: None,
            name: "建物".into(),
            name_en: None,
            amount: Amount::zero(),
            sub_items: vec![],
        };
        let parent = AccountItem {
            code: None,
            name: "有形固定資産".into(),
            name_en: None,
            amount: Amount::zero(),
            sub_items: vec![leaf.clone(), leaf],
        };
        assert_eq!(parent.count(), 3);
        assert_eq!(parent.walk().count(), 3);
    }
}
