//! 订单发现流程 - 流程层
//!
//! 逐页浏览某一年的订单列表，收集订单号。
//! 只有两种停止条件：某一页一个订单号都没有，或偏移达到上限。
//! 不满一页但非空的页面不会停止翻页。

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::infrastructure::BrowsingHost;
use crate::repository::OrdersRepository;
use crate::services::{extract_order_ids, RefreshPublisher};
use crate::utils::logging;

/// 发现流程统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// 实际导航的列表页数量
    pub pages_visited: usize,
    /// 各页提取到的订单号总数（含重复）
    pub ids_found: usize,
    /// 是否因为偏移上限而停止
    pub reached_limit: bool,
}

pub struct DiscoveryFlow {
    config: Config,
}

impl DiscoveryFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// 在活动上下文中遍历 `year` 的订单列表
    pub async fn run(
        &self,
        host: &dyn BrowsingHost,
        repo: &mut OrdersRepository,
        publisher: &RefreshPublisher,
        year: i32,
    ) -> Result<DiscoveryReport> {
        self.config.validate()?;
        let context = host.active_context().await?;
        info!(
            "[年份 {}] 开始获取订单号，上下文 {}，每页 {}，上限 {}",
            year, context, self.config.orders_per_page, self.config.order_index_limit
        );

        let mut report = DiscoveryReport::default();
        let mut start_index = self.config.start_index;

        loop {
            if start_index >= self.config.order_index_limit {
                info!("[年份 {}] 已达到订单偏移上限 {}", year, self.config.order_index_limit);
                report.reached_limit = true;
                break;
            }

            let url = self.config.listing_url(year, start_index);
            logging::log_listing_page(year, start_index);
            host.navigate(context, &url)
                .await
                .with_context(|| format!("无法打开订单列表页: {}", url))?;
            report.pages_visited += 1;

            let html = host
                .document_html(context)
                .await
                .with_context(|| format!("无法读取订单列表页: {}", url))?;
            let order_ids = extract_order_ids(&html);
            if order_ids.is_empty() {
                info!("[年份 {}] 没有更多订单", year);
                break;
            }

            info!("[年份 {}] 偏移 {} 找到 {} 个订单号", year, start_index, order_ids.len());
            report.ids_found += order_ids.len();
            repo.merge(year, &order_ids).await?;
            publisher.publish_update().await;

            start_index += self.config.orders_per_page;
        }

        Ok(report)
    }
}
