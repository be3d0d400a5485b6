use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn order_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+-\d+-\d+$").expect("valid order id pattern"))
}

/// 订单号，三段以 `-` 分隔的数字
///
/// 全系统唯一的主键，分配后不再变化。按字符串排序。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// 校验并构造订单号，不符合格式时返回 None
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        order_id_pattern()
            .is_match(text)
            .then(|| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 订单中的一件商品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// 商品描述，页面上为空时为 None
    #[serde(rename = "item")]
    pub description: Option<String>,
    /// 价格，无法解析时为 None
    pub price: Option<Decimal>,
}

/// 一笔信用卡扣款
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Option<String>,
    pub amount: Option<Decimal>,
}

/// 从订单详情页提取出的完整订单
///
/// `items` 一定非空；`transactions` 可以为空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: OrderId,
    /// 页面原文中的下单日期，例如 `January 5, 2023`
    pub date: String,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_requires_three_numeric_groups() {
        assert!(OrderId::parse("123-4567890-1234567").is_some());
        assert_eq!(OrderId::parse("  1-2-3\n").unwrap().as_str(), "1-2-3");
        assert!(OrderId::parse("123-456").is_none());
        assert!(OrderId::parse("D01-4567890-1234567").is_none());
        assert!(OrderId::parse("").is_none());
    }

    #[test]
    fn detail_reads_legacy_numeric_amounts() {
        let json = serde_json::json!({
            "id": "1-2-3",
            "date": "January 5, 2023",
            "total": 42.1,
            "items": [{ "item": "Widget", "price": 42.1 }],
            "transactions": [{ "date": "January 6, 2023", "amount": null }]
        });

        let detail: OrderDetail = serde_json::from_value(json).unwrap();
        assert_eq!(detail.total, Decimal::new(421, 1));
        assert_eq!(detail.items[0].description.as_deref(), Some("Widget"));
        assert_eq!(detail.transactions[0].amount, None);
    }
}
