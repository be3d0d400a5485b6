//! 表格导出 - 业务能力层
//!
//! 把订单详情展开成制表符分隔的平表：每个商品 × 每笔扣款一行。

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{OrderDetail, OrderId};

pub const HEADER: [&str; 11] = [
    "#",
    "Date",
    "Total",
    "Order Number",
    "Link",
    "Item",
    "Description",
    "Price",
    "Payment Type",
    "Charge Date",
    "Charge Amount",
];

const PAYMENT_CARD: &str = "CC Charge";
const PAYMENT_OTHER: &str = "Other";

const DATE_FORMATS: [&str; 4] = ["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

/// 生成导出文本
///
/// 订单按存储顺序编号（从 1 开始），商品在订单内编号（从 1 开始）。
/// 没有扣款记录的订单，每个商品输出一行 `Other`。
pub fn to_tsv(details: &IndexMap<OrderId, OrderDetail>, config: &Config) -> String {
    let mut lines: Vec<Vec<String>> = vec![HEADER.iter().map(|h| h.to_string()).collect()];

    for (order_index, (order_id, detail)) in details.iter().enumerate() {
        let order_date = format_date(&detail.date);
        let link = config.order_link(order_id);

        for (item_index, item) in detail.items.iter().enumerate() {
            let item_line = vec![
                (order_index + 1).to_string(),
                order_date.clone(),
                detail.total.to_string(),
                order_id.to_string(),
                link.clone(),
                (item_index + 1).to_string(),
                item.description.clone().unwrap_or_default(),
                money_cell(item.price),
            ];

            if detail.transactions.is_empty() {
                let mut line = item_line;
                line.extend([PAYMENT_OTHER.to_string(), String::new(), String::new()]);
                lines.push(line);
                continue;
            }

            for transaction in &detail.transactions {
                let mut line = item_line.clone();
                line.extend([
                    PAYMENT_CARD.to_string(),
                    transaction.date.as_deref().map(format_date).unwrap_or_default(),
                    money_cell(transaction.amount),
                ]);
                lines.push(line);
            }
        }
    }

    debug!("导出 {} 行数据（不含表头）", lines.len() - 1);

    lines
        .iter()
        .map(|line| line.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 把页面上的日期改写为 `YYYY-MM-DD`；无法识别时原样返回
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| {
            warn!("无法识别的日期格式: {:?}", raw);
            trimmed.to_string()
        })
}

fn money_cell(amount: Option<Decimal>) -> String {
    amount.map(|a| a.to_string()).unwrap_or_default()
}
