//! 金额解析

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$?(\d{1,3}(?:,\d{3})+\.\d+|\d+\.\d+)").expect("valid amount pattern")
    })
}

fn leading_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]?\d+(?:\.\d+)?").expect("valid number pattern"))
}

/// 从一段文本中解析金额
///
/// 取第一个 `数字.数字`（可带 `$` 和千分位逗号）；找不到时退回到文本开头的纯数字。
/// 都没有时返回 None。
pub fn parse_amount(text: &str) -> Option<Decimal> {
    if let Some(caps) = amount_pattern().captures(text) {
        let digits = caps[1].replace(',', "");
        return Decimal::from_str(&digits).ok();
    }

    leading_number_pattern()
        .find(text.trim())
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}
