//! 单个订单详情页的解析

use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::{AppResult, ExtractError};
use crate::infrastructure::{BrowsingHost, ContextId};
use crate::models::{OrderDetail, OrderId};
use crate::services::extract_order_detail;

fn order_id_param() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"orderID=(\d+-\d+-\d+)").expect("valid orderID pattern"))
}

/// 从页面地址的 `orderID` 参数中取订单号
pub fn order_id_from_url(url: &str) -> Option<OrderId> {
    order_id_param()
        .captures(url)
        .and_then(|caps| OrderId::parse(&caps[1]))
}

/// 解析上下文中已加载的订单详情页
///
/// 外层错误是宿主故障（脚本执行失败等）；内层是页面结构问题。
/// 没有给出订单号时，从页面地址中解析，解析不到即失败。
pub async fn parse_order_detail(
    host: &dyn BrowsingHost,
    context: ContextId,
    order_id: Option<&OrderId>,
) -> AppResult<Result<OrderDetail, ExtractError>> {
    let order_id = match order_id {
        Some(id) => id.clone(),
        None => {
            let url = host.current_url(context).await?.unwrap_or_default();
            match order_id_from_url(&url) {
                Some(id) => id,
                None => {
                    info!("上下文 {} 的地址中没有订单号", context);
                    return Ok(Err(ExtractError::NoOrderId { url }));
                }
            }
        }
    };

    info!("[订单 {}] 解析订单详情，上下文 {}", order_id, context);
    let html = host.document_html(context).await?;
    let result = extract_order_detail(&html);

    if let Ok(detail) = &result {
        if detail.id != order_id {
            warn!(
                "[订单 {}] 页面上的订单号是 {}，以请求的订单号为准",
                order_id, detail.id
            );
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_order_id_query_parameter() {
        let url = "https://www.amazon.com/gp/css/summary/print.html?ie=UTF8&orderID=111-2222222-3333333";
        assert_eq!(order_id_from_url(url).unwrap().as_str(), "111-2222222-3333333");
        assert!(order_id_from_url("https://www.amazon.com/gp/css/summary/print.html").is_none());
        assert!(order_id_from_url("https://x/?orderID=abc").is_none());
    }
}
