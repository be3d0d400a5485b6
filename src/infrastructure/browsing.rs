//! 浏览宿主接口 - 基础设施层
//!
//! 流程层只通过这个 trait 使用浏览器：导航、开关后台页、读取已加载文档。

use std::fmt;

use async_trait::async_trait;

use crate::error::AppResult;

/// 浏览上下文（标签页）编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 浏览宿主
///
/// 同一时刻只有一个导航在进行；所有等待只受"页面加载完成"信号约束，没有超时。
#[async_trait]
pub trait BrowsingHost: Send + Sync {
    /// 当前活动的浏览上下文
    async fn active_context(&self) -> AppResult<ContextId>;

    /// 让指定上下文导航到 url，并等待加载完成
    async fn navigate(&self, context: ContextId, url: &str) -> AppResult<()>;

    /// 在不抢焦点的新上下文中打开 url，并等待加载完成
    async fn open_background_context(&self, url: &str) -> AppResult<ContextId>;

    async fn close_context(&self, context: ContextId) -> AppResult<()>;

    /// 上下文当前地址
    async fn current_url(&self, context: ContextId) -> AppResult<Option<String>>;

    /// 在已加载的页面内执行提取例程，取回文档 HTML
    async fn document_html(&self, context: ContextId) -> AppResult<String>;
}
