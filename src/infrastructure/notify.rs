//! 界面通知通道 - 基础设施层

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{AppError, AppResult};

/// 向界面推送"数据已变化"
#[async_trait]
pub trait UiNotifier: Send + Sync {
    async fn push_refresh(&self) -> AppResult<()>;
}

/// 基于 tokio broadcast 的通知通道
///
/// 没有任何订阅者时推送失败，调用方据此把界面标记为已关闭。
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<()>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl UiNotifier for BroadcastNotifier {
    async fn push_refresh(&self) -> AppResult<()> {
        self.sender
            .send(())
            .map(|_| ())
            .map_err(|_| AppError::Other("没有正在监听的界面".to_string()))
    }
}
