// src/normalize/account.rs
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical vocabulary entry for a line-item label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalAccount {
    pub name: &'static str,
    pub name_en: &'static str,
}

/// Result of normalizing one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAccount {
    pub name: String,
    pub name_en: Option<&'static str>,
    pub mapped: bool,
}

// (label as it appears in filings, canonical name, English name)
const ACCOUNT_TABLE: &[(&str, &str, &str)] = &[
    // --- Balance sheet: assets ---
    ("現金及び預金", "現金及び預金", "Cash and deposits"),
    ("現金預金", "現金及び預金", "Cash and deposits"),
    ("現金・預金", "現金及び預金", "Cash and deposits"),
    ("Cash and deposits", "現金及び預金", "Cash and deposits"),
    ("受取手形及び売掛金", "受取手形及び売掛金", "Notes and accounts receivable - trade"),
    ("受取手形", "受取手形", "Notes receivable - trade"),
    ("売掛金", "売掛金", "Accounts receivable - trade"),
    ("電子記録債権", "電子記録債権", "Electronically recorded monetary claims"),
    ("有価証券", "有価証券", "Securities"),
    ("商品及び製品", "商品及び製品", "Merchandise and finished goods"),
    ("仕掛品", "仕掛品", "Work in process"),
    ("原材料及び貯蔵品", "原材料及び貯蔵品", "Raw materials and supplies"),
    ("棚卸資産", "棚卸資産", "Inventories"),
    ("Inventories", "棚卸資産", "Inventories"),
    ("前払費用", "前払費用", "Prepaid expenses"),
    ("未収入金", "未収入金", "Accounts receivable - other"),
    ("短期貸付金", "短期貸付金", "Short-term loans receivable"),
    ("貸倒引当金", "貸倒引当金", "Allowance for doubtful accounts"),
    ("建物及び構築物", "建物及び構築物", "Buildings and structures"),
    ("建物", "建物", "Buildings"),
    ("機械装置及び運搬具", "機械装置及び運搬具", "Machinery, equipment and vehicles"),
    ("工具、器具及び備品", "工具、器具及び備品", "Tools, furniture and fixtures"),
    ("工具器具備品", "工具、器具及び備品", "Tools, furniture and fixtures"),
    ("土地", "土地", "Land"),
    ("建設仮勘定", "建設仮勘定", "Construction in progress"),
    ("有形固定資産", "有形固定資産", "Property, plant and equipment"),
    ("有形固定資産合計", "有形固定資産合計", "Total property, plant and equipment"),
    ("無形固定資産", "無形固定資産", "Intangible assets"),
    ("無形固定資産合計", "無形固定資産合計", "Total intangible assets"),
    ("のれん", "のれん", "Goodwill"),
    ("ソフトウエア", "ソフトウエア", "Software"),
    ("ソフトウェア", "ソフトウエア", "Software"),
    ("投資有価証券", "投資有価証券", "Investment securities"),
    ("関係会社株式", "関係会社株式", "Shares of subsidiaries and associates"),
    ("長期貸付金", "長期貸付金", "Long-term loans receivable"),
    ("繰延税金資産", "繰延税金資産", "Deferred tax assets"),
    ("投資その他の資産", "投資その他の資産", "Investments and other assets"),
    ("投資その他の資産合計", "投資その他の資産合計", "Total investments and other assets"),
    ("流動資産合計", "流動資産合計", "Total current assets"),
    ("固定資産合計", "固定資産合計", "Total non-current assets"),
    ("繰延資産合計", "繰延資産合計", "Total deferred assets"),
    ("資産合計", "資産合計", "Total assets"),
    ("資産の部合計", "資産合計", "Total assets"),
    ("総資産", "資産合計", "Total assets"),
    ("Total assets", "資産合計", "Total assets"),
    // --- Balance sheet: liabilities ---
    ("支払手形及び買掛金", "支払手形及び買掛金", "Notes and accounts payable - trade"),
    ("支払手形", "支払手形", "Notes payable - trade"),
    ("買掛金", "買掛金", "Accounts payable - trade"),
    ("短期借入金", "短期借入金", "Short-term borrowings"),
    ("1年内返済予定の長期借入金", "1年内返済予定の長期借入金", "Current portion of long-term borrowings"),
    ("未払金", "未払金", "Accounts payable - other"),
    ("未払費用", "未払費用", "Accrued expenses"),
    ("未払法人税等", "未払法人税等", "Income taxes payable"),
    ("前受金", "前受金", "Advances received"),
    ("預り金", "預り金", "Deposits received"),
    ("賞与引当金", "賞与引当金", "Provision for bonuses"),
    ("社債", "社債", "Bonds payable"),
    ("長期借入金", "長期借入金", "Long-term borrowings"),
    ("退職給付に係る負債", "退職給付に係る負債", "Retirement benefit liability"),
    ("退職給付引当金", "退職給付引当金", "Provision for retirement benefits"),
    ("繰延税金負債", "繰延税金負債", "Deferred tax liabilities"),
    ("流動負債合計", "流動負債合計", "Total current liabilities"),
    ("固定負債合計", "固定負債合計", "Total non-current liabilities"),
    ("負債合計", "負債合計", "Total liabilities"),
    ("Total liabilities", "負債合計", "Total liabilities"),
    // --- Balance sheet: net assets ---
    ("資本金", "資本金", "Share capital"),
    ("資本剰余金", "資本剰余金", "Capital surplus"),
    ("利益剰余金", "利益剰余金", "Retained earnings"),
    ("自己株式", "自己株式", "Treasury shares"),
    ("株主資本合計", "株主資本合計", "Total shareholders' equity"),
    ("その他有価証券評価差額金", "その他有価証券評価差額金", "Valuation difference on available-for-sale securities"),
    ("為替換算調整勘定", "為替換算調整勘定", "Foreign currency translation adjustment"),
    ("新株予約権", "新株予約権", "Share acquisition rights"),
    ("非支配株主持分", "非支配株主持分", "Non-controlling interests"),
    ("純資産合計", "純資産合計", "Total net assets"),
    ("Total net assets", "純資産合計", "Total net assets"),
    ("負債純資産合計", "負債純資産合計", "Total liabilities and net assets"),
    ("負債及び純資産合計", "負債純資産合計", "Total liabilities and net assets"),
    // --- Income statement ---
    ("売上高", "売上高", "Net sales"),
    ("売上収益", "売上高", "Net sales"),
    ("営業収益", "売上高", "Net sales"),
    ("Net sales", "売上高", "Net sales"),
    ("Revenue", "売上高", "Net sales"),
    ("売上原価", "売上原価", "Cost of sales"),
    ("Cost of sales", "売上原価", "Cost of sales"),
    ("売上総利益", "売上総利益", "Gross profit"),
    ("売上総利益金額", "売上総利益", "Gross profit"),
    ("Gross profit", "売上総利益", "Gross profit"),
    ("販売費及び一般管理費", "販売費及び一般管理費", "Selling, general and administrative expenses"),
    ("販売費・一般管理費", "販売費及び一般管理費", "Selling, general and administrative expenses"),
    ("販管費", "販売費及び一般管理費", "Selling, general and administrative expenses"),
    ("営業利益", "営業利益", "Operating profit"),
    ("営業利益金額", "営業利益", "Operating profit"),
    ("Operating income", "営業利益", "Operating profit"),
    ("営業外収益合計", "営業外収益合計", "Total non-operating income"),
    ("受取利息", "受取利息", "Interest income"),
    ("受取配当金", "受取配当金", "Dividend income"),
    ("営業外費用合計", "営業外費用合計", "Total non-operating expenses"),
    ("支払利息", "支払利息", "Interest expenses"),
    ("経常利益", "経常利益", "Ordinary profit"),
    ("経常利益金額", "経常利益", "Ordinary profit"),
    ("特別利益合計", "特別利益合計", "Total extraordinary income"),
    ("固定資産売却益", "固定資産売却益", "Gain on sale of non-current assets"),
    ("特別損失合計", "特別損失合計", "Total extraordinary losses"),
    ("減損損失", "減損損失", "Impairment losses"),
    ("税金等調整前当期純利益", "税金等調整前当期純利益", "Profit before income taxes"),
    ("税引前当期純利益", "税金等調整前当期純利益", "Profit before income taxes"),
    ("法人税、住民税及び事業税", "法人税、住民税及び事業税", "Income taxes - current"),
    ("法人税住民税及び事業税", "法人税、住民税及び事業税", "Income taxes - current"),
    ("法人税等調整額", "法人税等調整額", "Income taxes - deferred"),
    ("法人税等合計", "法人税等合計", "Total income taxes"),
    ("当期純利益", "当期純利益", "Profit"),
    ("当期純利益金額", "当期純利益", "Profit"),
    ("Net income", "当期純利益", "Profit"),
    ("親会社株主に帰属する当期純利益", "親会社株主に帰属する当期純利益", "Profit attributable to owners of parent"),
    // --- Cash flow statement ---
    ("営業活動によるキャッシュ・フロー", "営業活動によるキャッシュ・フロー", "Cash flows from operating activities"),
    ("営業活動によるキャッシュフロー", "営業活動によるキャッシュ・フロー", "Cash flows from operating activities"),
    ("投資活動によるキャッシュ・フロー", "投資活動によるキャッシュ・フロー", "Cash flows from investing activities"),
    ("投資活動によるキャッシュフロー", "投資活動によるキャッシュ・フロー", "Cash flows from investing activities"),
    ("財務活動によるキャッシュ・フロー", "財務活動によるキャッシュ・フロー", "Cash flows from financing activities"),
    ("財務活動によるキャッシュフロー", "財務活動によるキャッシュ・フロー", "Cash flows from financing activities"),
    ("減価償却費", "減価償却費", "Depreciation"),
    ("有形固定資産の取得による支出", "有形固定資産の取得による支出", "Purchase of property, plant and equipment"),
    ("配当金の支払額", "配当金の支払額", "Dividends paid"),
    ("現金及び現金同等物の増減額", "現金及び現金同等物の増減額", "Net increase (decrease) in cash and cash equivalents"),
    ("現金及び現金同等物の期首残高", "現金及び現金同等物の期首残高", "Cash and cash equivalents at beginning of period"),
    ("現金及び現金同等物の期末残高", "現金及び現金同等物の期末残高", "Cash and cash equivalents at end of period"),
];

// Built once, read concurrently afterwards; never mutated.
static ACCOUNT_MAP: Lazy<HashMap<&'static str, CanonicalAccount>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(ACCOUNT_TABLE.len() * 2);
    for &(label, name, name_en) in ACCOUNT_TABLE {
        let entry = CanonicalAccount { name, name_en };
        map.insert(label, entry);
        map.insert(name, entry);
    }
    map
});

/// Maps a free-text label to its canonical name. Unknown labels come back
/// whitespace-normalized but otherwise untouched.
pub fn normalize_account_name(raw: &str) -> String {
    normalize_account(raw).name
}

/// Looks a label up in the canonical dictionary (exact match after
/// whitespace normalization, no fuzzy matching).
pub fn lookup_account(raw: &str) -> Option<CanonicalAccount> {
    ACCOUNT_MAP.get(collapse_whitespace(raw).as_str()).copied()
}

/// Full normalization result, including whether the dictionary knew the label.
pub fn normalize_account(raw: &str) -> NormalizedAccount {
    let trimmed = collapse_whitespace(raw);
    match ACCOUNT_MAP.get(trimmed.as_str()) {
        Some(entry) => NormalizedAccount {
            name: entry.name.to_string(),
            name_en: Some(entry.name_en),
            mapped: true,
        },
        None => {
            tracing::debug!("Unmapped account name: '{}'", trimmed);
            NormalizedAccount { name: trimmed, name_en: None, mapped: false }
        }
    }
}

/// Trims the label and removes internal whitespace runs. A single space is
/// kept only between two ASCII characters so English labels stay readable.
pub fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for token in raw.split_whitespace() {
        let joins_ascii = out.chars().last().map_or(false, |c| c.is_ascii())
            && token.chars().next().map_or(false, |c| c.is_ascii());
        if joins_ascii {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

/// Number of labels (aliases and canonical names) the dictionary knows.
pub fn dictionary_size() -> usize {
    ACCOUNT_MAP.len()
}
