// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

use super::{RawCompany, RawItem, RawSection, RawStatement, SectionOutcome};
use crate::model::{ParserOptions, StatementKind, Unit};
use crate::normalize::amount::{to_ascii_numeric, unit_from_suffix};
use crate::normalize::date::DATE_TOKEN_RE;
use crate::utils::debug_dump;
use crate::utils::error::ExtractError;

/// One logical line of a document: a single cell for PDF text, the record's
/// fields for CSV and spreadsheets.
pub type Row = Vec<String>;

// --- Constants ---
// Real headings are short; longer lines mentioning a statement are prose.
const MAX_HEADING_CHARS: usize = 40;
const MAX_CAPTION_CHARS: usize = 40;
// Lines after a heading searched for a unit declaration.
const UNIT_LOOKAHEAD: usize = 3;

const NIL_MARKERS: [&str; 7] = ["-", "－", "―", "—", "ー", "‐", "−"];

// Standalone signs that belong to the figure after them.
const SIGN_MARKERS: [&str; 5] = ["△", "▲", "−", "－", "-"];

const ENTITY_MARKERS: [&str; 10] = [
    "株式会社", "(株)", "（株）", "㈱", "有限会社", "合同会社",
    "Co., Ltd.", "Co.,Ltd.", "Inc.", "Corporation",
];

// --- Heading keywords (matched against the lowercased line) ---
const BALANCE_SHEET_HEADINGS: &[&str] = &[
    "貸借対照表",
    "財政状態計算書",
    "balance sheet",
    "statement of financial position",
    "statements of financial position",
];
const INCOME_STATEMENT_HEADINGS: &[&str] = &[
    "損益計算書",
    "損益及び包括利益計算書",
    "income statement",
    "statement of income",
    "statements of income",
    "statement of operations",
    "statements of operations",
    "profit and loss",
];
const CASH_FLOW_HEADINGS: &[&str] = &[
    "キャッシュ・フロー計算書",
    "キャッシュフロー計算書",
    "キャッシュ･フロー計算書",
    "statement of cash flows",
    "statements of cash flows",
    "cash flow statement",
];

// --- Regex Patterns (Lazy Static) ---
// Table-of-contents entries end in a page number, often after leader dots.
static TOC_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:…|‥|\.{3,}|・{3,}|･{3,}|\s)\s*[0-9０-９]{1,3}\s*$")
        .expect("Failed to compile TOC_ENTRY_RE")
});

static AMOUNT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[(（]?[-−ー－‐△▲]?[0-9０-９][0-9０-９,，、.．]*[)）]?(?:億円|百万円|百萬円|千円|円)?$")
        .expect("Failed to compile AMOUNT_TOKEN_RE")
});

// "<label><amount>" with nothing in between. The label may open with a
// number followed by a word ("1年内..."), but never ends in a digit. The katakana
// long-vowel mark is not a minus here: it ends labels like "キャッシュ・フロー".
static GLUED_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>(?:[0-9０-９]+[^0-9０-９\s])?[^0-9０-９]*[^0-9０-９\s(（\-−－‐△▲])(?P<amount>[(（]?[-−－‐△▲]?[0-9０-９][0-9０-９,，、.．]*[)）]?(?:億円|百万円|百萬円|千円|円)?)$")
        .expect("Failed to compile GLUED_ITEM_RE")
});

static UNIT_DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"単位\s*[:：]?\s*(億円|百万円|百萬円|千円|円)").expect("Failed to compile UNIT_DECLARATION_RE")
});

static UNIT_DECLARATION_EN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)in\s+(hundreds\s+of\s+millions|millions|thousands)\s+of\s+yen")
        .expect("Failed to compile UNIT_DECLARATION_EN_RE")
});

static ENUMERATION_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[ⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩ]+[.．、]?\s*|[IVX]+\.\s*|[(（][0-9０-９a-zA-Zア-ン]{1,2}[)）]\s*|[0-9０-９]{1,2}[.．]\s*|[①-⑳]\s*|※[0-9０-９]*\s*)+")
        .expect("Failed to compile ENUMERATION_PREFIX_RE")
});

static FOOTNOTE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*※[0-9０-９,，]*$").expect("Failed to compile FOOTNOTE_SUFFIX_RE")
});

static LABELED_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:証券コード|コード番号|銘柄コード|(?i:securities\s+code|stock\s+code))\s*[:：]?\s*([0-9０-９]{4})\b")
        .expect("Failed to compile LABELED_CODE_RE")
});

static BRACKETED_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(（\[【]\s*([0-9０-９]{4})\s*[)）\]】]").expect("Failed to compile BRACKETED_CODE_RE")
});

// Four digits standing alone on the company line, e.g. "トヨタ自動車株式会社 7203".
static STANDALONE_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)([0-9０-９]{4})(?:\s+|$)").expect("Failed to compile STANDALONE_CODE_RE")
});

static COMPANY_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:会社名|商号|提出会社名|(?i:company\s+name))\s*[:：]?\s*").expect("Failed to compile COMPANY_LABEL_RE")
});

static EMPTY_BRACKETS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(（\[【]\s*[)）\]】]").expect("Failed to compile EMPTY_BRACKETS_RE")
});

static INDUSTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:業種|(?i:industry))\s*[:：]\s*(\S+)").expect("Failed to compile INDUSTRY_RE")
});

static PERIOD_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"第\s*([0-9０-９]{1,3})\s*期").expect("Failed to compile PERIOD_NUMBER_RE")
});

// --- Locator ---
/// Finds statement sections, company details and the fiscal period in a
/// sequence of rows. Shared by every format extractor.
#[derive(Debug, Clone)]
pub struct SectionLocator {
    blank_line_threshold: usize,
    header_scan_rows: usize,
    debug: bool,
    debug_path: Option<PathBuf>,
}

impl Default for SectionLocator {
    fn default() -> Self {
        Self::from_options(&ParserOptions::default(), "")
    }
}

impl SectionLocator {
    pub fn from_options(options: &ParserOptions, source_stem: &str) -> Self {
        let debug_path = if options.debug {
            options
                .debug_dir
                .as_ref()
                .map(|dir| dir.join(format!("{}_annotated.txt", source_stem)))
        } else {
            None
        };
        Self {
            blank_line_threshold: options.blank_line_threshold.max(1),
            header_scan_rows: options.header_scan_rows,
            debug: options.debug,
            debug_path,
        }
    }

    /// Runs every search over the rows and packages the findings.
    pub fn analyze(&self, rows: &[Row]) -> RawStatement {
        let lines: Vec<String> = rows.iter().map(|row| line_text(row)).collect();
        tracing::debug!("Analyzing {} lines", lines.len());

        let document_unit = lines.iter().find_map(|line| detect_unit(line));

        let locate = |kind: StatementKind| match self.extract_section(rows, &lines, kind, document_unit) {
            Ok(section) => SectionOutcome::Extracted(section),
            Err(e) => {
                tracing::debug!("{}", e);
                SectionOutcome::Missing(e)
            }
        };
        let balance_sheet = locate(StatementKind::BalanceSheet);
        let income_statement = locate(StatementKind::IncomeStatement);
        let cash_flow_statement = locate(StatementKind::CashFlowStatement);

        if self.debug {
            self.report_sections(&lines, [&balance_sheet, &income_statement, &cash_flow_statement]);
        }

        RawStatement {
            company: self.find_company(rows),
            period: find_period(&lines),
            period_number: find_period_number(&lines),
            document_unit,
            balance_sheet,
            income_statement,
            cash_flow_statement,
            line_count: lines.len(),
            encoding: None,
            notes: Vec::new(),
        }
    }

    /// Locates one statement and extracts its items.
    pub fn extract_section(
        &self,
        rows: &[Row],
        lines: &[String],
        kind: StatementKind,
        document_unit: Option<Unit>,
    ) -> Result<RawSection, ExtractError> {
        let candidates: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_heading(line, kind))
            .map(|(i, _)| i)
            .collect();

        if candidates.is_empty() {
            return Err(ExtractError::SectionNotFound(kind));
        }

        // The first heading followed by actual figures wins; leftover
        // mentions (cover pages, notes) come back empty.
        let mut first_empty: Option<RawSection> = None;
        for start in candidates {
            let end = self.section_end(lines, start);
            let unit = lines[start..(start + 1 + UNIT_LOOKAHEAD).min(end)]
                .iter()
                .find_map(|line| detect_unit(line))
                .or(document_unit);
            let items: Vec<RawItem> = (start + 1..end)
                .filter(|i| detect_unit(&lines[*i]).is_none())
                .filter_map(|i| parse_row(&rows[i], i))
                .collect();

            let section = RawSection {
                kind,
                heading: lines[start].trim().to_string(),
                start_line: start,
                end_line: end,
                unit,
                items,
            };

            if section.items.iter().any(|item| item.amount.is_some()) {
                tracing::debug!(
                    "Selected {} heading at line {}: '{}' (ends at {})",
                    kind, start, section.heading, end
                );
                return Ok(section);
            }
            tracing::trace!("Skipping {} heading at line {} - no figures follow", kind, start);
            if first_empty.is_none() {
                first_empty = Some(section);
            }
        }

        first_empty.ok_or(ExtractError::SectionNotFound(kind))
    }

    /// End (exclusive) of the section whose heading is at `start`: the next
    /// statement heading, or the first line of a long enough blank run.
    pub fn section_end(&self, lines: &[String], start: usize) -> usize {
        let mut blank_run = 0;
        for (offset, line) in lines.iter().enumerate().skip(start + 1) {
            if line.trim().is_empty() {
                blank_run += 1;
                if blank_run >= self.blank_line_threshold {
                    return offset + 1 - blank_run;
                }
                continue;
            }
            blank_run = 0;
            if is_any_heading(line) {
                return offset;
            }
        }
        lines.len()
    }

    /// Scans the first rows for a company name, securities code and industry.
    pub fn find_company(&self, rows: &[Row]) -> RawCompany {
        let mut company = RawCompany::default();

        for row in rows.iter().take(self.header_scan_rows) {
            let line = line_text(row);

            if company.security_code.is_none() {
                company.security_code = LABELED_CODE_RE
                    .captures(&line)
                    .or_else(|| BRACKETED_CODE_RE.captures(&line))
                    .map(|caps| ascii_digits(&caps[1]));
            }

            if company.industry.is_none() {
                company.industry = INDUSTRY_RE.captures(&line).map(|caps| caps[1].to_string());
            }

            if company.name.is_none() {
                company.name = row
                    .iter()
                    .find(|cell| ENTITY_MARKERS.iter().any(|marker| cell.contains(marker)))
                    .map(|cell| clean_company_name(cell))
                    .filter(|name| !name.is_empty());

                // "7203" alone in a cell of the company row, or beside the name
                if company.name.is_some() && company.security_code.is_none() {
                    company.security_code = row
                        .iter()
                        .map(|cell| cell.trim())
                        .find(|cell| cell.chars().count() == 4 && cell.chars().all(|c| to_ascii_numeric(c).is_ascii_digit()))
                        .map(ascii_digits)
                        .or_else(|| standalone_code(&line).map(|code| ascii_digits(code.as_str())));
                }
            }
        }

        company
    }

    fn report_sections(&self, lines: &[String], outcomes: [&SectionOutcome; 3]) {
        let mut markers: Vec<(usize, usize, String)> = Vec::new();
        for outcome in outcomes {
            match outcome {
                SectionOutcome::Extracted(section) => {
                    tracing::info!(
                        "{}: lines {}..{} ({} items, unit {:?})",
                        section.kind, section.start_line, section.end_line, section.items.len(), section.unit
                    );
                    markers.push((section.start_line, section.end_line, section.kind.to_string()));
                }
                SectionOutcome::Missing(e) => tracing::info!("{}", e),
            }
        }

        if let Some(path) = &self.debug_path {
            if let Err(e) = debug_dump::save_annotated_text(lines, &markers, path) {
                tracing::warn!("Failed to write annotated debug text: {}", e);
            }
        }
    }
}

// --- Line helpers ---

/// Cells joined with single spaces, empty cells dropped. Leading whitespace
/// of a single-cell row is kept because it carries indentation.
pub fn line_text(row: &Row) -> String {
    match row.as_slice() {
        [single] => single.trim_end().to_string(),
        cells => cells
            .iter()
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn is_heading(line: &str, kind: StatementKind) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_HEADING_CHARS {
        return false;
    }
    let lower = trimmed.to_lowercase();
    let keywords = match kind {
        StatementKind::BalanceSheet => BALANCE_SHEET_HEADINGS,
        StatementKind::IncomeStatement => INCOME_STATEMENT_HEADINGS,
        StatementKind::CashFlowStatement => CASH_FLOW_HEADINGS,
    };
    if !keywords.iter().any(|kw| lower.contains(kw)) {
        return false;
    }
    if TOC_ENTRY_RE.is_match(trimmed) {
        tracing::trace!("Heading candidate looks like a ToC entry: '{}'", trimmed);
        return false;
    }
    true
}

pub fn is_any_heading(line: &str) -> bool {
    StatementKind::ALL.iter().any(|kind| is_heading(line, *kind))
}

/// Unit declared on a line, e.g. "（単位：百万円）" or "(in millions of yen)".
pub fn detect_unit(line: &str) -> Option<Unit> {
    if let Some(caps) = UNIT_DECLARATION_RE.captures(line) {
        return unit_from_suffix(&caps[1]);
    }
    UNIT_DECLARATION_EN_RE.captures(line).map(|caps| {
        let scale = caps[1].to_lowercase();
        if scale.starts_with("hundreds") {
            Unit::HundredMillionYen
        } else if scale == "millions" {
            Unit::MillionYen
        } else {
            Unit::ThousandYen
        }
    })
}

pub fn is_amount_token(token: &str) -> bool {
    AMOUNT_TOKEN_RE.is_match(token.trim())
}

fn is_nil_marker(token: &str) -> bool {
    NIL_MARKERS.contains(&token.trim())
}

/// Turns a row into a raw item. Rows without a label (page numbers, column
/// headers made of years) yield `None`.
pub fn parse_row(row: &Row, line: usize) -> Option<RawItem> {
    let first = row.iter().position(|cell| !cell.trim().is_empty())?;
    let filled = row.iter().filter(|cell| !cell.trim().is_empty()).count();

    if filled == 1 {
        let mut item = parse_text_line(&row[first], line)?;
        item.depth += first;
        return Some(item);
    }

    // Cell row: label is the first non-figure cell, the figure is the
    // rightmost amount after it (current period).
    let label_idx = row
        .iter()
        .position(|cell| !cell.trim().is_empty() && !is_amount_token(cell) && !is_nil_marker(cell))?;
    let amount = row[label_idx + 1..]
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| is_amount_token(cell) || is_nil_marker(cell))
        .last()
        .map(amount_or_zero);

    make_item(&row[label_idx], amount, label_idx, line)
}

/// Parses a free text line such as "　売上高　　1,234　　1,456".
pub fn parse_text_line(text: &str, line: usize) -> Option<RawItem> {
    let depth = indentation_depth(text);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Whitespace-separated: trailing figure tokens, everything before is the label.
    let tokens = join_detached_figures(trimmed.split_whitespace().collect());
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let mut split = tokens.len();
    while split > 0 {
        let token = tokens[split - 1];
        let is_suffix = unit_from_suffix(token).is_some() && split >= 2 && is_amount_token(tokens[split - 2]);
        if is_amount_token(token) || is_nil_marker(token) || is_suffix {
            split -= 1;
        } else {
            break;
        }
    }

    if split < tokens.len() {
        if split == 0 {
            return None;
        }
        let label = tokens[..split].join(" ");
        let figures = &tokens[split..];
        let amount = current_period_figure(figures);
        return make_item(&label, Some(amount), depth, line);
    }

    if let Some(caps) = GLUED_ITEM_RE.captures(trimmed) {
        return make_item(&caps["label"], Some(caps["amount"].to_string()), depth, line);
    }

    // Caption line
    if trimmed.chars().count() <= MAX_CAPTION_CHARS {
        return make_item(trimmed, None, depth, line);
    }
    None
}

// Re-attaches signs and brackets spaced away from their digits:
// "△ 300" becomes "△300" and "( 1,234 )" becomes "(1,234)".
fn join_detached_figures(tokens: Vec<&str>) -> Vec<String> {
    let mut bracketed: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.starts_with(['(', '（']) && !token.ends_with([')', '）']) {
            if let Some(close) = (i + 1..tokens.len()).find(|&j| tokens[j].ends_with([')', '）'])) {
                let joined = tokens[i..=close].concat();
                if is_amount_token(&joined) {
                    bracketed.push(joined);
                    i = close + 1;
                    continue;
                }
            }
        }
        bracketed.push(token.to_string());
        i += 1;
    }

    let mut joined: Vec<String> = Vec::with_capacity(bracketed.len());
    let mut iter = bracketed.into_iter().peekable();
    while let Some(token) = iter.next() {
        if SIGN_MARKERS.contains(&token.as_str()) {
            if let Some(next) = iter.next_if(|next| is_amount_token(next) && !next.starts_with(['(', '（'])) {
                joined.push(format!("{}{}", token, next));
                continue;
            }
        }
        joined.push(token);
    }
    joined
}

// Rightmost figure, with a detached unit suffix ("1,234 百万円") re-attached.
fn current_period_figure(figures: &[&str]) -> String {
    match figures {
        [.., number, suffix] if unit_from_suffix(suffix).is_some() => format!("{}{}", number, suffix),
        [.., last] => amount_or_zero(last),
        [] => "0".to_string(),
    }
}

fn amount_or_zero(token: &str) -> String {
    if is_nil_marker(token) {
        "0".to_string()
    } else {
        token.trim().to_string()
    }
}

fn make_item(raw_label: &str, amount: Option<String>, depth: usize, line: usize) -> Option<RawItem> {
    let label = clean_label(raw_label);
    if label.is_empty() || label.chars().all(|c| to_ascii_numeric(c).is_ascii_digit() || c.is_ascii_punctuation()) {
        return None;
    }
    Some(RawItem { label, amount, depth, line })
}

/// Strips enumeration prefixes ("Ⅰ", "(1)", "①") and footnote marks.
pub fn clean_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = ENUMERATION_PREFIX_RE.replace(trimmed, "");
    FOOTNOTE_SUFFIX_RE.replace(without_prefix.trim(), "").trim().to_string()
}

// One level per full-width space or per two ASCII spaces.
fn indentation_depth(text: &str) -> usize {
    let mut ascii_spaces = 0;
    let mut levels = 0;
    for c in text.chars() {
        match c {
            '\u{3000}' => levels += 1,
            ' ' => ascii_spaces += 1,
            '\t' => levels += 1,
            _ => break,
        }
    }
    levels + ascii_spaces / 2
}

fn standalone_code(text: &str) -> Option<regex::Match<'_>> {
    STANDALONE_CODE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find(|code| !text[code.end()..].trim_start().starts_with('年'))
}

fn clean_company_name(cell: &str) -> String {
    let without_codes = LABELED_CODE_RE.replace_all(cell.trim(), " ");
    let without_codes = BRACKETED_CODE_RE.replace_all(&without_codes, " ");
    let without_codes = match standalone_code(&without_codes).map(|code| code.range()) {
        Some(range) => format!("{} {}", &without_codes[..range.start], &without_codes[range.end..]),
        None => without_codes.into_owned(),
    };
    let without_label = COMPANY_LABEL_RE.replace(without_codes.trim(), "");
    let without_brackets = EMPTY_BRACKETS_RE.replace_all(&without_label, "");
    without_brackets.trim().to_string()
}

fn ascii_digits(text: &str) -> String {
    text.chars().map(to_ascii_numeric).filter(|c| c.is_ascii_digit()).collect()
}

/// First `<date> ... <date>` pair, on one line or split across a
/// "自 ..." / "至 ..." line pair.
pub fn find_period(lines: &[String]) -> Option<(String, String)> {
    for (i, line) in lines.iter().enumerate() {
        let dates: Vec<&str> = DATE_TOKEN_RE.find_iter(line).map(|m| m.as_str()).collect();
        if dates.len() >= 2 {
            return Some((dates[0].to_string(), dates[1].to_string()));
        }
        if dates.len() == 1 && opens_range(line) {
            if let Some(next) = lines.get(i + 1) {
                if let Some(end) = DATE_TOKEN_RE.find(next) {
                    return Some((dates[0].to_string(), end.as_str().to_string()));
                }
            }
        }
    }
    None
}

fn opens_range(line: &str) -> bool {
    line.contains('自') || line.contains("から") || line.to_lowercase().contains("from")
}

pub fn find_period_number(lines: &[String]) -> Option<u32> {
    lines.iter().find_map(|line| {
        PERIOD_NUMBER_RE
            .captures(line)
            .and_then(|caps| ascii_digits(&caps[1]).parse().ok())
    })
}
