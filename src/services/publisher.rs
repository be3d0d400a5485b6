//! 刷新通知 - 业务能力层
//!
//! 数据写入后通知界面刷新。推送是尽力而为的：失败只把界面标记为已关闭，不向调用方报错。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::infrastructure::storage::{get_or, put, KEY_UI_OPEN};
use crate::infrastructure::{KeyValueStore, UiNotifier};

#[derive(Clone)]
pub struct RefreshPublisher {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn UiNotifier>,
}

impl RefreshPublisher {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn UiNotifier>) -> Self {
        Self { store, notifier }
    }

    /// 界面打开时推送一次刷新
    pub async fn publish_update(&self) {
        let open = match self.is_ui_open().await {
            Ok(open) => open,
            Err(e) => {
                warn!("读取界面状态失败: {}", e);
                return;
            }
        };
        if !open {
            return;
        }

        if let Err(e) = self.notifier.push_refresh().await {
            warn!("推送界面刷新失败: {}", e);
            if let Err(e) = self.mark_ui_closed().await {
                warn!("标记界面关闭失败: {}", e);
            }
        } else {
            debug!("已推送界面刷新");
        }
    }

    pub async fn is_ui_open(&self) -> AppResult<bool> {
        get_or(self.store.as_ref(), KEY_UI_OPEN, false).await
    }

    pub async fn mark_ui_open(&self) -> AppResult<()> {
        put(self.store.as_ref(), KEY_UI_OPEN, &true).await
    }

    pub async fn mark_ui_closed(&self) -> AppResult<()> {
        put(self.store.as_ref(), KEY_UI_OPEN, &false).await
    }
}
