use serde::{Deserialize, Serialize};

use crate::config::Config;

/// 当前浏览页面的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
    None,
    OrderHistory,
    OrderDetail,
}

impl PageKind {
    /// 根据页面地址判断页面类型
    pub fn classify(url: Option<&str>, config: &Config) -> Self {
        match url {
            Some(url) if url.starts_with(&config.listing_prefix()) => PageKind::OrderHistory,
            Some(url) if url.starts_with(&config.detail_prefix()) => PageKind::OrderDetail,
            _ => PageKind::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::None => "none",
            PageKind::OrderHistory => "orderHistory",
            PageKind::OrderDetail => "orderDetail",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_pages() {
        let config = Config::default();
        assert_eq!(
            PageKind::classify(Some(&config.listing_url(2024, 0)), &config),
            PageKind::OrderHistory
        );
        assert_eq!(
            PageKind::classify(
                Some("https://www.amazon.com/gp/css/summary/print.html?ie=UTF8&orderID=1-2-3"),
                &config
            ),
            PageKind::OrderDetail
        );
        assert_eq!(PageKind::classify(Some("https://example.com/"), &config), PageKind::None);
        assert_eq!(PageKind::classify(None, &config), PageKind::None);
    }

    #[test]
    fn serializes_like_the_stored_flag() {
        let json = serde_json::to_value(PageKind::OrderHistory).unwrap();
        assert_eq!(json, serde_json::json!("orderHistory"));
    }
}
