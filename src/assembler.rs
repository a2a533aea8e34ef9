// src/assembler.rs
use chrono::{Datelike, NaiveDate, Utc};

use crate::extractors::{RawSection, RawStatement, SectionOutcome, SourceFile};
use crate::model::{
    AccountItem, BalanceSheet, CashFlowStatement, CompanyInfo, FileFormat, FiscalPeriod,
    IncomeStatement, ParsedStatement, ParserOptions, SectionInfo, StatementKind, StatementMetadata, Unit,
};
use crate::normalize::account::{collapse_whitespace, normalize_account};
use crate::normalize::amount::parse_amount_with_default;
use crate::normalize::date::parse_date;
use crate::utils::error::ParseError;

/// Output of a successful assembly: the statement plus every non-fatal
/// problem met on the way.
#[derive(Debug)]
pub struct Assembly {
    pub statement: ParsedStatement,
    pub warnings: Vec<String>,
}

// --- Group keywords (first match wins, so order matters) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalanceSheetGroup {
    CurrentAssets,
    FixedAssets,
    DeferredAssets,
    CurrentLiabilities,
    FixedLiabilities,
    NetAssets,
}

const BALANCE_SHEET_GROUPS: &[(BalanceSheetGroup, &[&str])] = &[
    (BalanceSheetGroup::DeferredAssets, &["繰延資産", "創立費", "開業費", "株式交付費", "社債発行費", "開発費"]),
    (
        BalanceSheetGroup::NetAssets,
        &["純資産", "株主資本", "資本金", "資本剰余金", "利益剰余金", "自己株式", "評価差額", "換算差額",
          "換算調整", "包括利益累計", "新株予約権", "非支配株主持分"],
    ),
    (BalanceSheetGroup::FixedLiabilities, &["長期未払", "長期預り", "長期前受"]),
    (
        BalanceSheetGroup::CurrentLiabilities,
        &["流動負債", "1年内", "１年内", "買掛金", "支払手形", "短期借入", "未払", "前受", "預り", "賞与引当"],
    ),
    (BalanceSheetGroup::FixedLiabilities, &["固定負債", "社債", "長期借入", "退職給付", "繰延税金負債"]),
    (
        BalanceSheetGroup::FixedAssets,
        &["固定資産", "投資有価証券", "関係会社", "建物", "構築物", "機械", "車両", "工具", "土地",
          "建設仮勘定", "のれん", "ソフトウ", "長期貸付", "長期前払", "長期未収", "繰延税金資産", "投資", "敷金", "差入保証金"],
    ),
    (
        BalanceSheetGroup::CurrentAssets,
        &["流動資産", "現金", "預金", "売掛金", "受取手形", "電子記録債権", "有価証券", "棚卸", "商品",
          "製品", "仕掛品", "原材料", "貯蔵品", "前払", "未収", "短期貸付"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncomeStatementGroup {
    Revenue,
    CostOfSales,
    SellingGeneralAdmin,
    NonOperatingIncome,
    NonOperatingExpenses,
    ExtraordinaryIncome,
    ExtraordinaryLosses,
    IncomeTaxes,
}

const INCOME_STATEMENT_GROUPS: &[(IncomeStatementGroup, &[&str])] = &[
    (
        IncomeStatementGroup::NonOperatingIncome,
        &["営業外収益", "受取利息", "受取配当金", "有価証券利息", "為替差益", "持分法による投資利益", "雑収入"],
    ),
    (
        IncomeStatementGroup::NonOperatingExpenses,
        &["営業外費用", "支払利息", "為替差損", "持分法による投資損失", "雑損失", "雑支出"],
    ),
    (IncomeStatementGroup::ExtraordinaryIncome, &["特別利益", "売却益", "受贈益", "戻入益"]),
    (IncomeStatementGroup::ExtraordinaryLosses, &["特別損失", "減損損失", "売却損", "除却損", "評価損", "災害"]),
    (IncomeStatementGroup::IncomeTaxes, &["法人税"]),
    (IncomeStatementGroup::CostOfSales, &["売上原価", "製造原価", "期首商品", "期末商品", "当期商品仕入"]),
    (IncomeStatementGroup::SellingGeneralAdmin, &["販売費", "一般管理費", "販管費"]),
    (IncomeStatementGroup::Revenue, &["売上高", "売上収益", "営業収益", "売上"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CashFlowGroup {
    Operating,
    Investing,
    Financing,
}

const CASH_FLOW_GROUPS: &[(CashFlowGroup, &[&str])] = &[
    (CashFlowGroup::Operating, &["営業活動"]),
    (CashFlowGroup::Investing, &["投資活動"]),
    (CashFlowGroup::Financing, &["財務活動"]),
];

// Profit lines are derived figures, not items.
const PROFIT_LINES: &[&str] = &[
    "売上総利益", "売上総損失", "営業利益", "営業損失", "経常利益", "経常損失",
    "税金等調整前当期純利益", "税金等調整前当期純損失", "税引前当期純利益", "税引前当期純損失",
    "当期純利益", "当期純損失", "親会社株主に帰属する当期純", "非支配株主に帰属する当期純", "包括利益",
];

const CASH_FLOW_TOTALS: &[&str] = &[
    "営業活動によるキャッシュ・フロー",
    "投資活動によるキャッシュ・フロー",
    "財務活動によるキャッシュ・フロー",
    "現金及び現金同等物の増減額",
    "現金及び現金同等物の増加額",
    "現金及び現金同等物の減少額",
    "現金及び現金同等物の期首残高",
    "現金及び現金同等物の期末残高",
];

fn classify<G: Copy>(name: &str, groups: &[(G, &[&str])]) -> Option<G> {
    groups
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| name.contains(kw)))
        .map(|(group, _)| *group)
}

fn is_subtotal(name: &str, kind: StatementKind) -> bool {
    if name.contains("合計") || name == "小計" || name.to_lowercase().starts_with("total") {
        return true;
    }
    match kind {
        StatementKind::BalanceSheet => false,
        StatementKind::IncomeStatement => PROFIT_LINES.iter().any(|line| name.starts_with(line)),
        StatementKind::CashFlowStatement => {
            CASH_FLOW_TOTALS.iter().any(|line| name.starts_with(line))
                || name.to_lowercase().starts_with("net cash")
        }
    }
}

// --- Item tree building ---

#[derive(Default)]
struct Tally {
    skipped_items: usize,
    unmapped: Vec<String>,
}

struct Open<G> {
    depth: usize,
    group: Option<G>,
    item: AccountItem,
}

// Closes every open item at `depth` or deeper, attaching it to its parent
// or emitting it as a top-level item.
fn close_to<G>(stack: &mut Vec<Open<G>>, depth: usize, out: &mut Vec<(Option<G>, AccountItem)>) {
    while stack.last().map_or(false, |open| open.depth >= depth) {
        let Some(closed) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.item.sub_items.push(closed.item),
            None => out.push((closed.group, closed.item)),
        }
    }
}

/// Normalizes a section's raw items into a tree of account items tagged with
/// the group they belong to. Captions steer the group of what follows them;
/// subtotals are dropped.
fn build_items<G: Copy>(
    section: &RawSection,
    groups: &[(G, &[&str])],
    tally: &mut Tally,
) -> Vec<(Option<G>, AccountItem)> {
    let default_unit = section.unit.unwrap_or(Unit::Yen);
    let mut out = Vec::new();
    let mut stack: Vec<Open<G>> = Vec::new();
    let mut context: Option<G> = None;

    for raw in &section.items {
        let Some(token) = &raw.amount else {
            close_to(&mut stack, raw.depth, &mut out);
            context = classify(&collapse_whitespace(&raw.label), groups);
            continue;
        };

        let account = normalize_account(&raw.label);
        if is_subtotal(&account.name, section.kind) {
            close_to(&mut stack, raw.depth, &mut out);
            // "小計" sits in the middle of the operating activities block
            if account.name != "小計" {
                context = None;
            }
            continue;
        }

        let amount = match parse_amount_with_default(token, default_unit) {
            Ok(amount) => amount,
            Err(e) => {
                tracing::debug!("Skipping line {} ('{}'): {}", raw.line, raw.label, e);
                tally.skipped_items += 1;
                continue;
            }
        };

        if !account.mapped && !tally.unmapped.contains(&account.name) {
            tally.unmapped.push(account.name.clone());
        }

        close_to(&mut stack, raw.depth, &mut out);
        let keyword_group = classify(&account.name, groups);
        if stack.is_empty() && keyword_group.is_some() {
            context = keyword_group;
        }
        stack.push(Open {
            depth: raw.depth,
            group: keyword_group.or(context),
            item: AccountItem {
                code: None,
                name: account.name,
                name_en: account.name_en.map(str::to_string),
                amount,
                sub_items: Vec::new(),
            },
        });
    }
    close_to(&mut stack, 0, &mut out);
    out
}

fn build_balance_sheet(section: &RawSection, tally: &mut Tally) -> BalanceSheet {
    let mut bs = BalanceSheet::default();
    for (group, item) in build_items(section, BALANCE_SHEET_GROUPS, tally) {
        let target = match group {
            Some(BalanceSheetGroup::CurrentAssets) => &mut bs.current_assets,
            Some(BalanceSheetGroup::FixedAssets) => &mut bs.fixed_assets,
            Some(BalanceSheetGroup::DeferredAssets) => &mut bs.deferred_assets,
            Some(BalanceSheetGroup::CurrentLiabilities) => &mut bs.current_liabilities,
            Some(BalanceSheetGroup::FixedLiabilities) => &mut bs.fixed_liabilities,
            Some(BalanceSheetGroup::NetAssets) => &mut bs.net_assets,
            None => &mut bs.other_items,
        };
        target.push(item);
    }
    bs
}

fn build_income_statement(section: &RawSection, tally: &mut Tally) -> IncomeStatement {
    let mut is = IncomeStatement::default();
    for (group, item) in build_items(section, INCOME_STATEMENT_GROUPS, tally) {
        let target = match group {
            Some(IncomeStatementGroup::Revenue) => &mut is.revenue,
            Some(IncomeStatementGroup::CostOfSales) => &mut is.cost_of_sales,
            Some(IncomeStatementGroup::SellingGeneralAdmin) => &mut is.selling_general_admin,
            Some(IncomeStatementGroup::NonOperatingIncome) => &mut is.non_operating_income,
            Some(IncomeStatementGroup::NonOperatingExpenses) => &mut is.non_operating_expenses,
            Some(IncomeStatementGroup::ExtraordinaryIncome) => &mut is.extraordinary_income,
            Some(IncomeStatementGroup::ExtraordinaryLosses) => &mut is.extraordinary_losses,
            Some(IncomeStatementGroup::IncomeTaxes) => &mut is.income_taxes,
            None => &mut is.other_items,
        };
        target.push(item);
    }
    is
}

fn build_cash_flow_statement(section: &RawSection, tally: &mut Tally) -> CashFlowStatement {
    let mut cf = CashFlowStatement::default();
    for (group, item) in build_items(section, CASH_FLOW_GROUPS, tally) {
        let target = match group {
            Some(CashFlowGroup::Operating) => &mut cf.operating_activities,
            Some(CashFlowGroup::Investing) => &mut cf.investing_activities,
            Some(CashFlowGroup::Financing) => &mut cf.financing_activities,
            None => &mut cf.other_items,
        };
        target.push(item);
    }
    cf
}

fn section_info(section: &RawSection, items: impl Iterator<Item = usize>) -> SectionInfo {
    SectionInfo {
        kind: section.kind,
        heading: section.heading.clone(),
        start_line: section.start_line,
        end_line: section.end_line,
        unit: section.unit,
        item_count: items.sum(),
    }
}

// --- Period ---

/// Fallback period when a document names none: the Japanese fiscal year
/// (April to March) ending in `today`'s calendar year.
pub fn default_period(today: NaiveDate) -> FiscalPeriod {
    let year = today.year();
    FiscalPeriod {
        start_date: NaiveDate::from_ymd_opt(year - 1, 4, 1).unwrap_or(NaiveDate::MIN),
        end_date: NaiveDate::from_ymd_opt(year, 3, 31).unwrap_or(NaiveDate::MAX),
        period: None,
        fiscal_year: Some(year),
    }
}

fn resolve_period(raw: &RawStatement, warnings: &mut Vec<String>) -> (FiscalPeriod, bool) {
    let parsed = raw.period.as_ref().map(|(start, end)| (parse_date(start), parse_date(end)));

    let (mut period, is_default) = match parsed {
        Some((Ok(start_date), Ok(end_date))) => (
            FiscalPeriod { start_date, end_date, period: None, fiscal_year: Some(end_date.year()) },
            false,
        ),
        other => {
            if let Some((start, end)) = other {
                for e in [start.err(), end.err()].into_iter().flatten() {
                    tracing::warn!("{}", e);
                }
            }
            let fallback = default_period(Utc::now().date_naive());
            warnings.push(format!(
                "Fiscal period not found; defaulting to {} - {} (low confidence)",
                fallback.start_date, fallback.end_date
            ));
            (fallback, true)
        }
    };
    period.period = raw.period_number;
    (period, is_default)
}

// --- Assembly ---

/// Turns an extractor's raw findings into a `ParsedStatement`.
///
/// A section the extractor could not find is fatal when `options.strict`
/// is set and a warning otherwise.
pub fn assemble(
    raw: RawStatement,
    source: &SourceFile,
    format: FileFormat,
    options: &ParserOptions,
) -> Result<Assembly, ParseError> {
    let mut warnings: Vec<String> = raw.notes.clone();
    let (period, period_is_default) = resolve_period(&raw, &mut warnings);

    let company = CompanyInfo {
        name: raw.company.name.clone().unwrap_or_else(|| {
            tracing::debug!("No company name found, using file name");
            source.stem()
        }),
        name_en: None,
        security_code: raw.company.security_code.clone(),
        industry: raw.company.industry.clone(),
        fiscal_year_end: if period_is_default { None } else { Some(period.end_date.month()) },
    };

    let RawStatement {
        balance_sheet,
        income_statement,
        cash_flow_statement,
        line_count,
        encoding,
        ..
    } = raw;

    let mut present: Vec<RawSection> = Vec::new();
    for outcome in [balance_sheet, income_statement, cash_flow_statement] {
        match outcome {
            SectionOutcome::Extracted(section) => present.push(section),
            SectionOutcome::Missing(e) if options.strict => return Err(e.into()),
            SectionOutcome::Missing(e) => {
                tracing::warn!("{}", e);
                warnings.push(e.to_string());
            }
        }
    }

    let mut tally = Tally::default();
    let mut sections = Vec::new();
    let mut statement = ParsedStatement {
        company,
        period,
        balance_sheet: None,
        income_statement: None,
        cash_flow_statement: None,
        metadata: StatementMetadata {
            source_file: source
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format,
            file_size: source.size,
            parsed_at: Utc::now(),
            streaming: options.streaming,
            chunk_size: if options.streaming { options.chunk_size } else { None },
            encoding,
            period_is_default,
            line_count,
            skipped_items: 0,
            unmapped_accounts: Vec::new(),
            sections: Vec::new(),
        },
    };

    for section in &present {
        match section.kind {
            StatementKind::BalanceSheet => {
                let bs = build_balance_sheet(section, &mut tally);
                sections.push(section_info(section, bs.items().map(AccountItem::count)));
                statement.balance_sheet = Some(bs);
            }
            StatementKind::IncomeStatement => {
                let is = build_income_statement(section, &mut tally);
                sections.push(section_info(section, is.items().map(AccountItem::count)));
                statement.income_statement = Some(is);
            }
            StatementKind::CashFlowStatement => {
                let cf = build_cash_flow_statement(section, &mut tally);
                sections.push(section_info(section, cf.items().map(AccountItem::count)));
                statement.cash_flow_statement = Some(cf);
            }
        }
    }

    if tally.skipped_items > 0 {
        warnings.push(format!("{} line(s) with unreadable amounts were skipped", tally.skipped_items));
    }
    if !statement.has_any_section() {
        warnings.push("No financial statement sections were found".to_string());
    }

    statement.metadata.skipped_items = tally.skipped_items;
    statement.metadata.unmapped_accounts = tally.unmapped;
    statement.metadata.sections = sections;

    tracing::debug!(
        "Assembled {} items for '{}' with {} warning(s)",
        statement.all_items().len(),
        statement.company.name,
        warnings.len()
    );
    Ok(Assembly { statement, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{Row, SectionLocator};
    use crate::utils::error::ExtractError;

    fn raw(text: &str) -> RawStatement {
        let rows: Vec<Row> = text.lines().map(|line| vec![line.to_string()]).collect();
        SectionLocator::default().analyze(&rows)
    }

    fn run(text: &str, options: &ParserOptions) -> Result<Assembly, ParseError> {
        let source = SourceFile::new("kessan_2024.txt", text.len() as u64);
        assemble(raw(text), &source, FileFormat::DelimitedText, options)
    }

    fn names(items: &[AccountItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    const FULL: &str = "\
山田製作所株式会社（証券コード 6501）
自 2023年4月1日 至 2024年3月31日
貸借対照表
（単位：百万円）
資産の部
流動資産
　現金預金　1,000
　売掛金　500
　貸倒引当金　△10
　流動資産合計　1,490
固定資産
　有形固定資産　2,000
　　建物　1,500
　　土地　500
　投資有価証券　300
　固定資産合計　2,300
資産合計　3,790
負債の部
流動負債
　買掛金　400
　リース債務　20
固定負債
　長期借入金　900
純資産の部
　資本金　1,000
損益計算書
売上高 10,000
売上原価 6,000
売上総利益 4,000
販売費及び一般管理費 2,500
営業利益 1,500
営業外収益
　受取利息 10
　謎の収益 5
経常利益 1,515
法人税、住民税及び事業税 400
当期純利益 1,115
キャッシュ・フロー計算書
Ⅰ　営業活動によるキャッシュ・フロー
　減価償却費 200
　小計 1,800
　法人税等の支払額 △300
営業活動によるキャッシュ・フロー 1,500
Ⅱ　投資活動によるキャッシュ・フロー
　有形固定資産の取得による支出 △700
";

    #[test]
    fn test_balance_sheet_groups_and_subtotals() {
        let assembly = run(FULL, &ParserOptions::default()).unwrap();
        let bs = assembly.statement.balance_sheet.unwrap();
        assert_eq!(names(&bs.current_assets), vec!["現金及び預金", "売掛金", "貸倒引当金"]);
        assert_eq!(names(&bs.fixed_assets), vec!["有形固定資産", "投資有価証券"]);
        assert_eq!(names(&bs.current_liabilities), vec!["買掛金", "リース債務"]);
        assert_eq!(names(&bs.fixed_liabilities), vec!["長期借入金"]);
        assert_eq!(names(&bs.net_assets), vec!["資本金"]);
        assert!(bs.other_items.is_empty());
        assert_eq!(bs.total_assets.value(), 0.0);
    }

    #[test]
    fn test_sub_items_nest_by_depth() {
        let assembly = run(FULL, &ParserOptions::default()).unwrap();
        let bs = assembly.statement.balance_sheet.unwrap();
        let ppe = &bs.fixed_assets[0];
        assert_eq!(names(&ppe.sub_items), vec!["建物", "土地"]);
        assert_eq!(ppe.sub_items[0].amount.to_yen(), 1_500_000_000.0);
    }

    #[test]
    fn test_section_unit_and_negative_markers() {
        let assembly = run(FULL, &ParserOptions::default()).unwrap();
        let bs = assembly.statement.balance_sheet.unwrap();
        let cash = &bs.current_assets[0];
        assert_eq!(cash.amount.unit(), Unit::MillionYen);
        assert_eq!(cash.amount.original(), Some("1,000"));
        assert_eq!(cash.name_en.as_deref(), Some("Cash and deposits"));
        assert_eq!(bs.current_assets[2].amount.value(), -10.0);
    }

    #[test]
    fn test_income_statement_groups() {
        let assembly = run(FULL, &ParserOptions::default()).unwrap();
        let is = assembly.statement.income_statement.unwrap();
        assert_eq!(names(&is.revenue), vec!["売上高"]);
        assert_eq!(names(&is.cost_of_sales), vec!["売上原価"]);
        assert_eq!(names(&is.selling_general_admin), vec!["販売費及び一般管理費"]);
        assert_eq!(names(&is.non_operating_income), vec!["受取利息", "謎の収益"]);
        assert_eq!(names(&is.income_taxes), vec!["法人税、住民税及び事業税"]);
        assert!(is.other_items.is_empty(), "profit lines must not be items: {:?}", is.other_items);
    }

    #[test]
    fn test_cash_flow_captions_steer_groups() {
        let assembly = run(FULL, &ParserOptions::default()).unwrap();
        let cf = assembly.statement.cash_flow_statement.unwrap();
        assert_eq!(names(&cf.operating_activities), vec!["減価償却費", "法人税等の支払額"]);
        assert_eq!(names(&cf.investing_activities), vec!["有形固定資産の取得による支出"]);
    }

    #[test]
    fn test_long_term_prepaid_and_payable_are_fixed() {
        let text = "\
貸借対照表
流動資産
　前払費用 10
　長期前払費用 30
流動負債
　未払金 20
　長期未払金 40
　長期預り金 5
　1年内返済予定の長期借入金 100
";
        let assembly = run(text, &ParserOptions::default()).unwrap();
        let bs = assembly.statement.balance_sheet.unwrap();
        assert_eq!(names(&bs.current_assets), vec!["前払費用"]);
        assert_eq!(names(&bs.fixed_assets), vec!["長期前払費用"]);
        assert_eq!(names(&bs.fixed_liabilities), vec!["長期未払金", "長期預り金"]);
        assert_eq!(bs.current_liabilities.len(), 2);
        assert_eq!(bs.current_liabilities[0].name, "未払金");
    }

    #[test]
    fn test_spaced_negative_figures_keep_their_sign() {
        let text = "\
キャッシュ・フロー計算書
営業活動によるキャッシュ・フロー
　法人税等の支払額 △ 300
　為替差損 ( 20 )
";
        let assembly = run(text, &ParserOptions::default()).unwrap();
        let cf = assembly.statement.cash_flow_statement.unwrap();
        assert_eq!(names(&cf.operating_activities), vec!["法人税等の支払額", "為替差損"]);
        assert_eq!(cf.operating_activities[0].amount.value(), -300.0);
        assert_eq!(cf.operating_activities[1].amount.value(), -20.0);
    }

    #[test]
    fn test_metadata_and_company() {
        let assembly = run(FULL, &ParserOptions::default()).unwrap();
        let statement = assembly.statement;
        assert_eq!(statement.company.name, "山田製作所株式会社");
        assert_eq!(statement.company.security_code.as_deref(), Some("6501"));
        assert_eq!(statement.company.fiscal_year_end, Some(3));
        assert_eq!(statement.period.fiscal_year, Some(2024));
        assert!(!statement.metadata.period_is_default);
        assert!(statement.metadata.unmapped_accounts.contains(&"謎の収益".to_string()));
        assert_eq!(statement.metadata.sections.len(), 3);
        assert_eq!(statement.metadata.source_file, "kessan_2024.txt");
        assert!(assembly.warnings.is_empty(), "unexpected warnings: {:?}", assembly.warnings);
    }

    const INCOME_ONLY: &str = "\
損益計算書
売上高 1,000
売上原価 600
";

    #[test]
    fn test_missing_sections_become_warnings() {
        let assembly = run(INCOME_ONLY, &ParserOptions::default()).unwrap();
        assert!(assembly.statement.income_statement.is_some());
        assert!(assembly.statement.balance_sheet.is_none());
        assert!(assembly.warnings.iter().any(|w| w.contains("balance sheet")));
        assert!(assembly.statement.metadata.period_is_default);
        assert_eq!(assembly.statement.company.name, "kessan_2024");
    }

    #[test]
    fn test_strict_mode_fails_on_missing_section() {
        let options = ParserOptions { strict: true, ..Default::default() };
        let err = run(INCOME_ONLY, &options).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Extraction(ExtractError::SectionNotFound(StatementKind::BalanceSheet))
        ));
    }

    #[test]
    fn test_unreadable_amounts_are_skipped() {
        let text = "損益計算書\n売上高 1.2.3\n売上原価 600\n";
        let assembly = run(text, &ParserOptions::default()).unwrap();
        let is = assembly.statement.income_statement.unwrap();
        assert!(is.revenue.is_empty());
        assert_eq!(names(&is.cost_of_sales), vec!["売上原価"]);
        assert_eq!(assembly.statement.metadata.skipped_items, 1);
    }

    #[test]
    fn test_default_period_is_previous_april_to_march() {
        let period = default_period(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(period.fiscal_year, Some(2025));
    }
}
