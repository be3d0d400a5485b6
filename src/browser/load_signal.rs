//! 页面加载完成信号
//!
//! 每次等待注册一个一次性 future，按上下文编号分组；
//! 收到该上下文的加载完成事件时全部兑现并注销。

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::infrastructure::ContextId;

#[derive(Default)]
pub struct LoadSignals {
    waiters: Mutex<HashMap<ContextId, Vec<oneshot::Sender<()>>>>,
}

impl LoadSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记对下一次加载完成的等待，必须在触发导航之前调用
    pub fn register(&self, context: ContextId) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().entry(context).or_default().push(tx);
        rx
    }

    /// 兑现该上下文的全部等待，返回被唤醒的数量
    pub fn notify(&self, context: ContextId) -> usize {
        let waiters = self.lock().remove(&context).unwrap_or_default();
        waiters
            .into_iter()
            .filter_map(|tx| tx.send(()).ok())
            .count()
    }

    /// 丢弃该上下文的全部等待（上下文已关闭）
    pub fn forget(&self, context: ContextId) {
        self.lock().remove(&context);
    }

    pub fn pending(&self, context: ContextId) -> usize {
        self.lock().get(&context).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ContextId, Vec<oneshot::Sender<()>>>> {
        self.waiters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_once_and_deregisters() {
        let signals = LoadSignals::new();
        let rx = signals.register(ContextId(1));
        assert_eq!(signals.pending(ContextId(1)), 1);

        assert_eq!(signals.notify(ContextId(1)), 1);
        assert!(rx.await.is_ok());
        assert_eq!(signals.pending(ContextId(1)), 0);
        assert_eq!(signals.notify(ContextId(1)), 0);
    }

    #[tokio::test]
    async fn other_contexts_are_not_woken() {
        let signals = LoadSignals::new();
        let mut first = signals.register(ContextId(1));
        let _second = signals.register(ContextId(2));

        signals.notify(ContextId(2));
        assert!(first.try_recv().is_err());
        assert_eq!(signals.pending(ContextId(1)), 1);
    }

    #[tokio::test]
    async fn forgetting_drops_the_waiter() {
        let signals = LoadSignals::new();
        let rx = signals.register(ContextId(7));
        signals.forget(ContextId(7));
        assert!(rx.await.is_err());
    }
}
