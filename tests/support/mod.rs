//! 测试用的浏览宿主：按 url 返回预设的 HTML，并记录所有导航

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use order_harvest::error::{AppError, AppResult, BrowserError};
use order_harvest::{BrowsingHost, ContextId};

const EMPTY_PAGE: &str = "<html><body></body></html>";

#[derive(Default)]
struct FakeState {
    next_id: u64,
    loaded: HashMap<ContextId, String>,
    navigations: Vec<String>,
    opened: Vec<String>,
    closed: Vec<ContextId>,
}

pub struct FakeHost {
    pages: HashMap<String, String>,
    state: Mutex<FakeState>,
}

impl FakeHost {
    /// 活动上下文 #0 停在 `initial_url`
    pub fn new(initial_url: &str) -> Self {
        let mut state = FakeState {
            next_id: 1,
            ..Default::default()
        };
        state.loaded.insert(ContextId(0), initial_url.to_string());
        Self {
            pages: HashMap::new(),
            state: Mutex::new(state),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> Vec<ContextId> {
        self.state.lock().unwrap().closed.clone()
    }

    fn url_of(&self, context: ContextId) -> AppResult<String> {
        self.state
            .lock()
            .unwrap()
            .loaded
            .get(&context)
            .cloned()
            .ok_or(AppError::Browser(BrowserError::UnknownContext { context: context.0 }))
    }
}

#[async_trait]
impl BrowsingHost for FakeHost {
    async fn active_context(&self) -> AppResult<ContextId> {
        Ok(ContextId(0))
    }

    async fn navigate(&self, context: ContextId, url: &str) -> AppResult<()> {
        self.url_of(context)?;
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.loaded.insert(context, url.to_string());
        Ok(())
    }

    async fn open_background_context(&self, url: &str) -> AppResult<ContextId> {
        let mut state = self.state.lock().unwrap();
        let context = ContextId(state.next_id);
        state.next_id += 1;
        state.opened.push(url.to_string());
        state.loaded.insert(context, url.to_string());
        Ok(context)
    }

    async fn close_context(&self, context: ContextId) -> AppResult<()> {
        self.url_of(context)?;
        let mut state = self.state.lock().unwrap();
        state.loaded.remove(&context);
        state.closed.push(context);
        Ok(())
    }

    async fn current_url(&self, context: ContextId) -> AppResult<Option<String>> {
        Ok(Some(self.url_of(context)?))
    }

    async fn document_html(&self, context: ContextId) -> AppResult<String> {
        let url = self.url_of(context)?;
        Ok(self
            .pages
            .get(&url)
            .cloned()
            .unwrap_or_else(|| EMPTY_PAGE.to_string()))
    }
}

/// 一页订单列表
pub fn listing_page(ids: &[&str]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| format!(r#"<div class="order-card">ORDER # <bdi dir="ltr">{}</bdi></div>"#, id))
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

/// 一张订单打印详情页
pub fn detail_page(id: &str, date: &str, total: &str, items: &[(&str, &str)], charges: &[(&str, &str)]) -> String {
    let item_rows: String = items
        .iter()
        .map(|(name, price)| format!("<tr><td>1 of: <i>{}</i><br>Sold by: Shop</td><td>{}</td></tr>", name, price))
        .collect();
    let charge_table = if charges.is_empty() {
        String::new()
    } else {
        let rows: String = charges
            .iter()
            .map(|(date, amount)| format!("<tr><td>Visa ending in 4242: {}: {}</td></tr>", date, amount))
            .collect();
        format!(
            "<table><tr><td><b>Credit Card transactions</b></td></tr>{}</table>",
            rows
        )
    };

    format!(
        r#"<html><body><table><tr><td>
            <b>Amazon.com order number: </b> {id}<br>
            <b>Order Placed:</b> {date}<br>
            <b>Order Total: {total}</b>
            <table>
              <tr><td><b>Items Ordered</b></td><td><b>Price</b></td></tr>
              {item_rows}
            </table>
            {charge_table}
        </td></tr></table></body></html>"#
    )
}
