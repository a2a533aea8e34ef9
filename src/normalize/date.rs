// src/normalize/date.rs
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::utils::error::NormalizeError;

// Gregorian year = base + era year.
const ERA_BASE_YEARS: [(&str, i32); 5] = [
    ("令和", 2018),
    ("平成", 1988),
    ("昭和", 1925),
    ("大正", 1911),
    ("明治", 1867),
];

static ERA_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(令和|平成|昭和|大正|明治)\s*(元|\d{1,2})\s*年").expect("Failed to compile ERA_YEAR_RE")
});

// Tried in order, first match wins.
static GREGORIAN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日",
        r"(\d{4})/(\d{1,2})/(\d{1,2})",
        r"(\d{4})-(\d{1,2})-(\d{1,2})",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

/// Matches any single date the normalizer understands; used by the
/// extractors to find period ranges in running text.
pub static DATE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:令和|平成|昭和|大正|明治)\s*(?:元|[0-9０-９]{1,2})|[0-9０-９]{4})\s*年\s*[0-9０-９]{1,2}\s*月\s*[0-9０-９]{1,2}\s*日|[0-9]{4}/[0-9]{1,2}/[0-9]{1,2}|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
    )
    .expect("Failed to compile DATE_TOKEN_RE")
});

/// Parses `YYYY年MM月DD日`, `YYYY/MM/DD`, `YYYY-MM-DD` or an era date such
/// as `令和6年3月31日` into a calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, NormalizeError> {
    let invalid = || NormalizeError::InvalidDateFormat(text.to_string());

    let ascii: String = text
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '／' => '/',
            c => c,
        })
        .collect();

    // Era substitution first: the result still carries 年 for the patterns below.
    let gregorian = ERA_YEAR_RE.replace_all(&ascii, |caps: &Captures| {
        let base = era_base_year(&caps[1]).unwrap_or_default();
        let era_year = match &caps[2] {
            "元" => 1,
            digits => digits.parse::<i32>().unwrap_or_default(),
        };
        format!("{}年", base + era_year)
    });

    for pattern in GREGORIAN_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&gregorian) {
            let year: i32 = caps[1].parse().map_err(|_| invalid())?;
            let month: u32 = caps[2].parse().map_err(|_| invalid())?;
            let day: u32 = caps[3].parse().map_err(|_| invalid())?;
            return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid);
        }
    }

    Err(invalid())
}

/// Gregorian offset for a Japanese era name.
pub fn era_base_year(era: &str) -> Option<i32> {
    ERA_BASE_YEARS
        .iter()
        .find(|(name, _)| *name == era)
        .map(|(_, base)| *base)
}
