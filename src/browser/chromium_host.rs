//! 基于 chromiumoxide 的浏览宿主实现

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::EventLoadEventFired;
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::LoadSignals;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::{BrowsingHost, ContextId, JsExecutor};

/// Chromium 浏览宿主
///
/// 持有 Browser 和所有打开的页面；每个页面一个 JsExecutor。
pub struct ChromiumHost {
    browser: Browser,
    active: ContextId,
    executors: Mutex<HashMap<ContextId, JsExecutor>>,
    next_id: AtomicU64,
    signals: Arc<LoadSignals>,
    settle_delay: Duration,
}

impl ChromiumHost {
    /// 以已选好的页面作为活动上下文创建宿主
    pub async fn new(browser: Browser, active_page: Page, settle_delay: Duration) -> AppResult<Self> {
        let host = Self {
            browser,
            active: ContextId(0),
            executors: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            signals: Arc::new(LoadSignals::new()),
            settle_delay,
        };
        let active = host.track(active_page).await?;
        Ok(Self { active, ..host })
    }

    /// 为页面分配编号，并把它的加载完成事件接到 LoadSignals
    async fn track(&self, page: Page) -> AppResult<ContextId> {
        let context = ContextId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut loads = page.event_listener::<EventLoadEventFired>().await?;

        let signals = self.signals.clone();
        tokio::spawn(async move {
            while loads.next().await.is_some() {
                let woken = signals.notify(context);
                debug!("上下文 {} 加载完成，唤醒 {} 个等待", context, woken);
            }
        });

        self.executors()
            .insert(context, JsExecutor::new(page));
        Ok(context)
    }

    fn executor(&self, context: ContextId) -> AppResult<JsExecutor> {
        self.executors()
            .get(&context)
            .cloned()
            .ok_or(AppError::Browser(BrowserError::UnknownContext { context: context.0 }))
    }

    fn executors(&self) -> std::sync::MutexGuard<'_, HashMap<ContextId, JsExecutor>> {
        self.executors.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn settle(&self, url: &str, loaded: oneshot::Receiver<()>) -> AppResult<()> {
        loaded.await.map_err(|e| AppError::navigation_failed(url, e))?;
        debug!("页面已加载，{}ms 后继续: {}", self.settle_delay.as_millis(), url);
        sleep(self.settle_delay).await;
        Ok(())
    }
}

#[async_trait]
impl BrowsingHost for ChromiumHost {
    async fn active_context(&self) -> AppResult<ContextId> {
        Ok(self.active)
    }

    async fn navigate(&self, context: ContextId, url: &str) -> AppResult<()> {
        let executor = self.executor(context)?;
        let loaded = self.signals.register(context);
        executor
            .page()
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        self.settle(url, loaded).await
    }

    async fn open_background_context(&self, url: &str) -> AppResult<ContextId> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .background(true)
            .build()
            .map_err(|e| {
                AppError::Browser(BrowserError::PageCreationFailed { source: e.into() })
            })?;
        let page = self.browser.new_page(params).await.map_err(|e| {
            AppError::Browser(BrowserError::PageCreationFailed {
                source: Box::new(e),
            })
        })?;

        let context = self.track(page).await?;
        info!("已打开后台页面 {}", context);
        self.navigate(context, url).await?;
        Ok(context)
    }

    async fn close_context(&self, context: ContextId) -> AppResult<()> {
        let executor = self
            .executors()
            .remove(&context)
            .ok_or(AppError::Browser(BrowserError::UnknownContext { context: context.0 }))?;
        self.signals.forget(context);
        executor.page().clone().close().await?;
        debug!("已关闭页面 {}", context);
        Ok(())
    }

    async fn current_url(&self, context: ContextId) -> AppResult<Option<String>> {
        let executor = self.executor(context)?;
        Ok(executor.page().url().await?)
    }

    async fn document_html(&self, context: ContextId) -> AppResult<String> {
        self.executor(context)?.document_html().await
    }
}
