use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult, BrowserError};

/// 连接到已开启调试端口的浏览器，并挑选工作页面
///
/// 优先选择地址以 `preferred_prefix` 开头的页面（已登录的订单页），
/// 其次是第一个已有页面，都没有时新建空白页。
pub async fn connect_to_browser_and_page(
    port: u16,
    preferred_prefix: Option<&str>,
) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);
    debug!("优先页面前缀: {:?}", preferred_prefix);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    if let Some(prefix) = preferred_prefix {
        for p in pages.iter() {
            if let Ok(Some(url)) = p.url().await {
                debug!("检查页面地址: {}", url);
                if url.starts_with(prefix) {
                    info!("✓ 找到订单页面: {}", url);
                    return Ok((browser, p.clone()));
                }
            }
        }
        debug!("未找到订单页面，使用第一个页面");
    }

    if let Some(first) = pages.into_iter().next() {
        return Ok((browser, first));
    }

    debug!("创建空白页面");
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建空白页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;
    Ok((browser, page))
}
