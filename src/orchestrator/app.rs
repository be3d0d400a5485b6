//! 应用主结构 - 编排层

use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Datelike;
use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use crate::browser::{self, ChromiumHost};
use crate::config::Config;
use crate::error::{AppError, BrowserError, ConfigError, ExtractError};
use crate::infrastructure::storage::{put, KEY_PAGE_KIND};
use crate::infrastructure::{BroadcastNotifier, BrowsingHost, JsonFileStore, KeyValueStore};
use crate::models::{OrderDetail, PageKind};
use crate::repository::OrdersRepository;
use crate::services::RefreshPublisher;
use crate::utils::logging;
use crate::workflow::{parse_order_detail, BackfillFlow, BackfillOutcome, DiscoveryFlow, DiscoveryReport};

/// 可以选择的年份：今年以及之前四年
pub fn selectable_years(current_year: i32) -> RangeInclusive<i32> {
    (current_year - 4)..=current_year
}

/// 单任务守卫
///
/// 持有期间其他发现或补全流程无法开始。
pub struct RunGuard {
    _permit: OwnedSemaphorePermit,
}

/// 应用主结构
pub struct App {
    config: Config,
    host: Option<Arc<dyn BrowsingHost>>,
    store: Arc<dyn KeyValueStore>,
    notifier: BroadcastNotifier,
    publisher: RefreshPublisher,
    run_slot: Arc<Semaphore>,
}

impl App {
    /// 连接浏览器并打开本地存储
    pub async fn initialize(config: Config) -> Result<Self> {
        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            Some(&config.listing_prefix()),
        )
        .await?;
        let host = ChromiumHost::new(browser, page, Duration::from_millis(config.settle_delay_ms)).await?;
        let store = JsonFileStore::new(&config.storage_path);

        Ok(Self::with_parts(config, Arc::new(host), Arc::new(store)))
    }

    /// 不连接浏览器，只用于导出和查看状态
    pub fn offline(config: Config) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.storage_path));
        Self::assemble(config, None, store)
    }

    /// 用现成的浏览宿主和存储组装应用
    pub fn with_parts(config: Config, host: Arc<dyn BrowsingHost>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::assemble(config, Some(host), store)
    }

    fn assemble(config: Config, host: Option<Arc<dyn BrowsingHost>>, store: Arc<dyn KeyValueStore>) -> Self {
        let notifier = BroadcastNotifier::default();
        let publisher = RefreshPublisher::new(store.clone(), Arc::new(notifier.clone()));
        Self {
            config,
            host,
            store,
            notifier,
            publisher,
            run_slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// 打开进度视图：标记界面已打开并订阅刷新通知
    pub async fn watch_refresh(&self) -> Result<broadcast::Receiver<()>> {
        let receiver = self.notifier.subscribe();
        self.publisher.mark_ui_open().await?;
        Ok(receiver)
    }

    /// 关闭进度视图
    pub async fn close_refresh_view(&self) -> Result<()> {
        self.publisher.mark_ui_closed().await?;
        Ok(())
    }

    fn host(&self) -> Result<&dyn BrowsingHost, AppError> {
        self.host
            .as_deref()
            .ok_or(AppError::Browser(BrowserError::NotConnected))
    }

    /// 尝试开始一个写仓库的流程，已有流程在运行时失败
    pub fn begin_run(&self) -> Result<RunGuard, AppError> {
        self.run_slot
            .clone()
            .try_acquire_owned()
            .map(|permit| RunGuard { _permit: permit })
            .map_err(|_| AppError::RunInProgress)
    }

    /// 加载最新的仓库
    pub async fn repository(&self) -> Result<OrdersRepository> {
        OrdersRepository::load(self.store.clone())
            .await
            .context("无法加载订单仓库")
    }

    /// 获取某一年的全部订单号
    pub async fn discover(&self, year: i32) -> Result<DiscoveryReport> {
        let today = chrono::Local::now().year();
        if !selectable_years(today).contains(&year) {
            return Err(AppError::Config(ConfigError::YearOutOfRange {
                year,
                earliest: today - 4,
                latest: today,
            })
            .into());
        }

        let _guard = self.begin_run()?;
        let mut repo = self.repository().await?;
        let report = DiscoveryFlow::new(&self.config)
            .run(self.host()?, &mut repo, &self.publisher, year)
            .await?;

        let known = repo.orders_by_year().get(&year).map_or(0, |ids| ids.len());
        logging::log_discovery_complete(year, &report, known);
        Ok(report)
    }

    /// 补全所有缺少详情的订单
    pub async fn backfill(&self) -> Result<BackfillOutcome> {
        let _guard = self.begin_run()?;
        let mut repo = self.repository().await?;
        let outcome = BackfillFlow::new(&self.config)
            .run(self.host()?, &mut repo, &self.publisher)
            .await?;

        logging::log_backfill_outcome(&outcome, repo.missing_count());
        Ok(outcome)
    }

    /// 解析活动上下文中的详情页，只记录结果不保存
    pub async fn parse_current(&self) -> Result<Result<OrderDetail, ExtractError>> {
        self.classify_active_page().await?;
        let host = self.host()?;
        let context = host.active_context().await?;
        let result = parse_order_detail(host, context, None).await?;
        match &result {
            Ok(detail) => info!("[订单 {}] 解析结果: {:?}", detail.id, detail),
            Err(e) => warn!("解析失败: {}", e),
        }
        Ok(result)
    }

    /// 判断活动上下文的页面类型并记录到存储
    pub async fn classify_active_page(&self) -> Result<PageKind> {
        let host = self.host()?;
        let context = host.active_context().await?;
        let url = host.current_url(context).await?;
        let kind = PageKind::classify(url.as_deref(), &self.config);
        info!("当前页面类型: {} ({:?})", kind.as_str(), url);
        put(self.store.as_ref(), KEY_PAGE_KIND, &kind).await?;
        Ok(kind)
    }

    /// 生成导出表格；给出路径时写入文件
    pub async fn export(&self, output: Option<&Path>) -> Result<String> {
        let repo = self.repository().await?;
        let tsv = repo.export(&self.config);
        if let Some(path) = output {
            tokio::fs::write(path, format!("{}\n", tsv))
                .await
                .with_context(|| format!("无法写入导出文件: {}", path.display()))?;
            info!("导出已写入: {}", path.display());
        }
        Ok(tsv)
    }

    /// 按年份列出已知订单，标记是否已有详情
    pub async fn status(&self) -> Result<String> {
        let repo = self.repository().await?;
        let mut lines = Vec::new();
        for (year, ids) in repo.orders_by_year() {
            lines.push(format!("{} ({})", year, ids.len()));
            for (index, id) in ids.iter().enumerate() {
                let mark = if repo.detail_for(id).is_some() { "✓" } else { " " };
                lines.push(format!("  {:>3}. [{}] {}", index + 1, mark, id));
            }
        }
        lines.push(progress_line(&repo));
        Ok(lines.join("\n"))
    }

    /// 一行进度摘要
    pub async fn progress(&self) -> Result<String> {
        let repo = self.repository().await?;
        Ok(progress_line(&repo))
    }
}

fn progress_line(repo: &OrdersRepository) -> String {
    format!(
        "共 {} 个订单，{} 个缺少详情",
        repo.known_count(),
        repo.missing_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_years_are_selectable() {
        let years = selectable_years(2026);
        assert!(years.contains(&2026));
        assert!(years.contains(&2022));
        assert!(!years.contains(&2021));
        assert!(!years.contains(&2027));
    }
}
