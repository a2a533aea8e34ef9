// src/postprocess/validate.rs
use serde::Serialize;

use crate::model::{AccountItem, ParsedStatement};

/// Outcome of a structural check. Errors make the statement unusable for
/// analysis; warnings flag low-confidence data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_statement(statement: &ParsedStatement) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !statement.has_any_section() {
        report.errors.push("No financial statement section is present".to_string());
    }

    let period = &statement.period;
    if period.start_date >= period.end_date {
        report.errors.push(format!(
            "Fiscal period start {} is not before end {}",
            period.start_date, period.end_date
        ));
    }

    if statement.company.name.trim().is_empty() {
        report.errors.push("Company name is empty".to_string());
    }

    if let Some(code) = &statement.company.security_code {
        if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
            report.errors.push(format!("Security code '{}' is not a 4-digit code", code));
        }
    }

    if let Some(month) = statement.company.fiscal_year_end {
        if !(1..=12).contains(&month) {
            report.errors.push(format!("Fiscal year end month {} is out of range", month));
        }
    }

    for item in statement.all_items().into_iter().flat_map(AccountItem::walk) {
        if !item.amount.value().is_finite() {
            report.errors.push(format!("Amount of '{}' is not a finite number", item.name));
        }
    }

    if statement.metadata.period_is_default {
        report.warnings.push("Fiscal period is a default guess".to_string());
    }
    let item_counts = [
        ("Balance sheet", statement.balance_sheet.as_ref().map(|s| s.items().count())),
        ("Income statement", statement.income_statement.as_ref().map(|s| s.items().count())),
        ("Cash flow statement", statement.cash_flow_statement.as_ref().map(|s| s.items().count())),
    ];
    for (label, count) in item_counts {
        if count == Some(0) {
            report.warnings.push(format!("{} has no items", label));
        }
    }
    if statement.metadata.skipped_items > 0 {
        report
            .warnings
            .push(format!("{} line(s) were skipped during extraction", statement.metadata.skipped_items));
    }
    if !statement.metadata.unmapped_accounts.is_empty() {
        report.warnings.push(format!(
            "{} account name(s) are not in the dictionary",
            statement.metadata.unmapped_accounts.len()
        ));
    }

    report
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{
        Amount, BalanceSheet, CashFlowStatement, CompanyInfo, FileFormat, FiscalPeriod, IncomeStatement,
        StatementMetadata, Unit,
    };
    use chrono::{NaiveDate, Utc};

    fn item(name: &str, value: f64, sub_items: Vec<AccountItem>) -> AccountItem {
        AccountItem {
            code: None,
            name: name.to_string(),
            name_en: None,
            amount: Amount::new(value, Unit::MillionYen, None).unwrap(),
            sub_items,
        }
    }

    /// A small but complete statement shared by the post-processing tests.
    pub(crate) fn sample_statement() -> ParsedStatement {
        ParsedStatement {
            company: CompanyInfo {
                name: "サンプル株式会社".into(),
                security_code: Some("1234".into()),
                fiscal_year_end: Some(3),
                ..Default::default()
            },
            period: FiscalPeriod {
                start_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                period: Some(12),
                fiscal_year: Some(2024),
            },
            balance_sheet: Some(BalanceSheet {
                fixed_assets: vec![item(
                    "有形固定資産",
                    300.0,
                    vec![item("建物", 200.0, vec![]), item("土地", 100.0, vec![])],
                )],
                ..Default::default()
            }),
            income_statement: Some(IncomeStatement {
                revenue: vec![item("売上高", 1000.0, vec![])],
                ..Default::default()
            }),
            cash_flow_statement: Some(CashFlowStatement::default()),
            metadata: StatementMetadata {
                source_file: "sample.csv".into(),
                format: FileFormat::DelimitedText,
                file_size: 128,
                parsed_at: Utc::now(),
                streaming: false,
                chunk_size: None,
                encoding: Some("UTF-8".into()),
                period_is_default: false,
                line_count: 10,
                skipped_items: 0,
                unmapped_accounts: vec![],
                sections: vec![],
            },
        }
    }

    #[test]
    fn test_sample_is_valid_with_empty_cash_flow_warning() {
        let report = validate_statement(&sample_statement());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.warnings, vec!["Cash flow statement has no items".to_string()]);
    }

    #[test]
    fn test_reversed_period_is_an_error() {
        let mut statement = sample_statement();
        std::mem::swap(&mut statement.period.start_date, &mut statement.period.end_date);
        let report = validate_statement(&statement);
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("not before"));
    }

    #[test]
    fn test_structural_errors() {
        let mut statement = sample_statement();
        statement.balance_sheet = None;
        statement.income_statement = None;
        statement.cash_flow_statement = None;
        statement.company.name = " ".into();
        statement.company.security_code = Some("12A4".into());
        statement.company.fiscal_year_end = Some(13);
        let report = validate_statement(&statement);
        assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
    }

    #[test]
    fn test_low_confidence_warnings() {
        let mut statement = sample_statement();
        statement.metadata.period_is_default = true;
        statement.metadata.skipped_items = 2;
        statement.metadata.unmapped_accounts = vec!["謎の勘定".into()];
        let report = validate_statement(&statement);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 4);
    }
}
