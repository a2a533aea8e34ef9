// src/normalize/amount.rs
use crate::model::{Amount, Unit};
use crate::utils::error::NormalizeError;

// Longest first: "百万円" and "千円" both end in "円".
const UNIT_SUFFIXES: [(&str, Unit); 5] = [
    ("億円", Unit::HundredMillionYen),
    ("百万円", Unit::MillionYen),
    ("百萬円", Unit::MillionYen),
    ("千円", Unit::ThousandYen),
    ("円", Unit::Yen),
];

const THOUSANDS_SEPARATORS: [char; 3] = [',', '、', '，'];
const MINUS_VARIANTS: [char; 6] = ['−', 'ー', '－', '‐', '△', '▲'];

/// Parses a locale-formatted figure such as `"1,234,567円"`, `"123百万円"`,
/// `"(1,234)円"` or `"１，２３４円"`. A token without a unit suffix is in yen.
pub fn parse_amount(token: &str) -> Result<Amount, NormalizeError> {
    parse_amount_with_default(token, Unit::Yen)
}

/// Like [`parse_amount`], but a token without a suffix is taken to be in
/// `default_unit` (the unit a table declared in its header).
pub fn parse_amount_with_default(token: &str, default_unit: Unit) -> Result<Amount, NormalizeError> {
    let invalid = || NormalizeError::InvalidAmountFormat(token.to_string());

    // 1. Thousands separators and stray whitespace
    let stripped: String = token
        .chars()
        .filter(|c| !THOUSANDS_SEPARATORS.contains(c) && !c.is_whitespace())
        .collect();

    // 2. Magnitude suffix
    let (body, unit) = split_unit_suffix(&stripped).unwrap_or((stripped.as_str(), default_unit));

    // 3-4. Full-width characters and minus variants
    let mut cleaned: String = body.chars().map(to_ascii_numeric).collect();

    // 5. Parenthesised negatives
    if cleaned.len() > 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }

    // 6. Parse
    if cleaned.is_empty() || !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: f64 = cleaned.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    Amount::new(value, unit, Some(token.to_string()))
}

/// Base-currency value of an amount.
pub fn to_yen(amount: &Amount) -> f64 {
    amount.to_yen()
}

/// Returns the unit a suffix names, e.g. `"百万円"` -> `MillionYen`.
pub fn unit_from_suffix(text: &str) -> Option<Unit> {
    UNIT_SUFFIXES
        .iter()
        .find(|(suffix, _)| text.trim() == *suffix)
        .map(|(_, unit)| *unit)
}

fn split_unit_suffix(token: &str) -> Option<(&str, Unit)> {
    UNIT_SUFFIXES
        .iter()
        .find_map(|(suffix, unit)| token.strip_suffix(suffix).map(|body| (body, *unit)))
}

/// Maps full-width digits and punctuation to ASCII, and every minus variant to `-`.
pub(crate) fn to_ascii_numeric(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        '．' => '.',
        '（' => '(',
        '）' => ')',
        '＋' => '+',
        c if MINUS_VARIANTS.contains(&c) => '-',
        c => c,
    }
}
