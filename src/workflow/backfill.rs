//! 订单详情补全流程 - 流程层
//!
//! 反复取出第一个还没有详情的订单号，在后台页中打开它的详情页并解析。
//! 任何一页解析失败都立即停止整个流程：这通常意味着页面结构变了，继续下去只会写入错误数据。
//! 失败的页面保持打开，方便人工查看。

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::Config;
use crate::error::ExtractError;
use crate::infrastructure::BrowsingHost;
use crate::models::OrderId;
use crate::repository::OrdersRepository;
use crate::services::RefreshPublisher;
use crate::workflow::parse_order_detail;

/// 补全流程结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillOutcome {
    /// 所有已知订单都有了详情
    Completed { saved: usize },
    /// 在某个订单上解析失败而停止
    Halted {
        saved: usize,
        order_id: OrderId,
        reason: ExtractError,
    },
}

impl BackfillOutcome {
    pub fn saved(&self) -> usize {
        match self {
            BackfillOutcome::Completed { saved } | BackfillOutcome::Halted { saved, .. } => *saved,
        }
    }
}

pub struct BackfillFlow {
    config: Config,
}

impl BackfillFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub async fn run(
        &self,
        host: &dyn BrowsingHost,
        repo: &mut OrdersRepository,
        publisher: &RefreshPublisher,
    ) -> Result<BackfillOutcome> {
        let mut saved = 0;

        loop {
            let Some(order_id) = repo.next_without_detail().cloned() else {
                info!("没有更多缺少详情的订单");
                return Ok(BackfillOutcome::Completed { saved });
            };

            info!("[订单 {}] 获取订单详情", order_id);
            let url = self.config.detail_url(&order_id);
            let context = host
                .open_background_context(&url)
                .await
                .with_context(|| format!("无法打开订单详情页: {}", url))?;

            match parse_order_detail(host, context, Some(&order_id)).await? {
                Ok(detail) => {
                    repo.save_detail(order_id, detail).await?;
                    host.close_context(context).await?;
                    publisher.publish_update().await;
                    saved += 1;
                }
                Err(reason) => {
                    error!("[订单 {}] 解析订单详情失败: {}", order_id, reason);
                    return Ok(BackfillOutcome::Halted {
                        saved,
                        order_id,
                        reason,
                    });
                }
            }
        }
    }
}
