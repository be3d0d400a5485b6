//! 订单详情提取 - 业务能力层
//!
//! 输入是已加载的订单打印详情页 HTML，输出订单详情或一个说明缺了哪个字段的失败原因。
//! 页面结构在不同时期并不一致，这里按标签文字加结构位置来定位，不依赖固定的选择器。

use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractError;
use crate::models::{OrderDetail, OrderId, OrderItem, Transaction};
use crate::services::money::parse_amount;
use crate::services::tree_search::{deepest_match, TreeNode};

const ORDER_NUMBER_MARKER: &str = "Amazon.com order number";
const ORDER_DATE_MARKER: &str = "Order Placed:";
const ORDER_TOTAL_MARKER: &str = "Order Total:";
const ITEMS_TABLE_MARKER: &str = "Items Ordered";
const TRANSACTIONS_TABLE_MARKER: &str = "Credit Card transactions";

/// 页面内提取结果的序列化形式：`{ "data": … }` 或 `{ "error": "…" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractOutcome {
    Data(OrderDetail),
    Error(String),
}

impl From<Result<OrderDetail, ExtractError>> for ExtractOutcome {
    fn from(result: Result<OrderDetail, ExtractError>) -> Self {
        match result {
            Ok(detail) => ExtractOutcome::Data(detail),
            Err(e) => ExtractOutcome::Error(e.to_string()),
        }
    }
}

/// 从订单详情页提取订单
///
/// 订单号、日期、总额按顺序检查，缺任何一个立即失败，不再继续后面的字段。
pub fn extract_order_detail(html: &str) -> Result<OrderDetail, ExtractError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let order_number = label_value(&root, ORDER_NUMBER_MARKER);
    debug!("orderNumber {:?}", order_number);
    let id = order_number
        .as_deref()
        .and_then(OrderId::parse)
        .ok_or(ExtractError::NoOrderNumber)?;

    let date = label_value(&root, ORDER_DATE_MARKER);
    debug!("orderDate {:?}", date);
    let date = date.ok_or(ExtractError::NoOrderDate)?;

    let total_text = deepest_match(&root, "b", ORDER_TOTAL_MARKER)
        .map(|label| label.text_content().trim().to_string())
        .unwrap_or_default();
    let total = parse_amount(&total_text);
    debug!("orderTotal {:?}", total);
    let total = total.ok_or(ExtractError::NoOrderTotal)?;

    let items: Vec<OrderItem> = table_rows(&root, ITEMS_TABLE_MARKER)
        .iter()
        .map(parse_item_row)
        .collect();
    debug!("items {:?}", items);
    if items.is_empty() {
        return Err(ExtractError::NoItems);
    }

    let transactions: Vec<Transaction> = table_rows(&root, TRANSACTIONS_TABLE_MARKER)
        .iter()
        .map(|row| parse_transaction_row(&row.text_content()))
        .collect();
    debug!("transactions {:?}", transactions);

    Ok(OrderDetail {
        id,
        date,
        total,
        items,
        transactions,
    })
}

/// 标签元素后一个兄弟节点的文本
fn label_value(root: &ElementRef<'_>, marker: &str) -> Option<String> {
    let label = deepest_match(root, "b", marker)?;
    let sibling = label.next_sibling()?;
    let text = match sibling.value() {
        Node::Text(text) => text.trim().to_string(),
        _ => ElementRef::wrap(sibling)?.text_content().trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// 含有 marker 的最深表格中，除表头外的所有行
fn table_rows<'a>(root: &ElementRef<'a>, marker: &str) -> Vec<ElementRef<'a>> {
    let Some(table) = deepest_match(root, "table", marker) else {
        return Vec::new();
    };
    let mut rows = Vec::new();
    collect_rows(&table, &mut rows);
    rows.into_iter().skip(1).collect()
}

fn collect_rows<'a>(node: &ElementRef<'a>, rows: &mut Vec<ElementRef<'a>>) {
    for child in node.child_nodes() {
        if child.tag() == "tr" {
            rows.push(child);
        }
        collect_rows(&child, rows);
    }
}

fn cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.child_nodes()
        .into_iter()
        .filter(|cell| cell.tag() == "td")
        .collect()
}

/// 商品行：第一格里 `<i>` 的文字是描述，第二格是价格
fn parse_item_row(row: &ElementRef<'_>) -> OrderItem {
    let cells = cells(row);
    let description = cells
        .first()
        .and_then(first_emphasis)
        .and_then(|i| collapse_whitespace(&i.text_content()));
    let price = cells
        .get(1)
        .and_then(|cell| parse_amount(cell.text_content().trim()));
    OrderItem { description, price }
}

fn first_emphasis<'a>(cell: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    cell.child_nodes().into_iter().find_map(|child| {
        if child.tag() == "i" {
            Some(child)
        } else {
            first_emphasis(&child)
        }
    })
}

/// 扣款行文本按 `:` 切分：第二段是日期，第三段是金额
///
/// 例如 `Visa ending in 1234: January 6, 2023: $42.10`。
pub fn parse_transaction_row(text: &str) -> Transaction {
    let parts: Vec<&str> = text.trim().split(':').map(str::trim).collect();
    let date = parts
        .get(1)
        .filter(|date| !date.is_empty())
        .map(|date| date.to_string());
    let amount = parts.get(2).and_then(|amount| parse_amount(amount));
    Transaction { date, amount }
}

/// 连续空白合并为一个空格；结果为空时返回 None
fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
