//! 订单列表页提取

use std::sync::OnceLock;

use scraper::{Html, Selector};
use tracing::debug;

use crate::models::OrderId;

fn bdi_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("bdi").expect("valid bdi selector"))
}

/// 提取列表页上出现的所有订单号（按页面顺序）
///
/// 订单号写在 `<bdi>` 里；不符合订单号格式的 `<bdi>` 文本被忽略。
pub fn extract_order_ids(html: &str) -> Vec<OrderId> {
    let document = Html::parse_document(html);
    let mut ids = Vec::new();

    for element in document.select(bdi_selector()) {
        let text: String = element.text().collect();
        match OrderId::parse(&text) {
            Some(id) => ids.push(id),
            None => debug!("忽略非订单号文本: {:?}", text.trim()),
        }
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_bdi_order_number() {
        let html = r#"
            <div class="order-card">
              <span>ORDER # <bdi dir="ltr">111-0000001-0000001</bdi></span>
            </div>
            <div class="order-card">
              <span>ORDER # <bdi dir="ltr"> 111-0000002-0000002 </bdi></span>
            </div>
            <bdi>Jane Doe</bdi>
        "#;

        let ids: Vec<String> = extract_order_ids(html)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["111-0000001-0000001", "111-0000002-0000002"]);
    }

    #[test]
    fn page_without_orders_is_empty() {
        assert!(extract_order_ids("<html><body><p>No orders</p></body></html>").is_empty());
    }
}
