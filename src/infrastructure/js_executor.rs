//! JS 执行器 - 基础设施层
//!
//! 持有一个 page 资源，只暴露"在页面内执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::AppResult;

/// 取出当前已加载文档完整标记的页面内例程
const DOCUMENT_HTML_JS: &str = "document.documentElement.outerHTML";

/// JS 执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 暴露 eval() 能力
/// - 不认识订单，不处理业务流程
#[derive(Clone)]
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航等其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// 页面内抛出的异常由宿主报告为 CDP 错误，原样向上传递。
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 读取当前文档的 HTML
    pub async fn document_html(&self) -> AppResult<String> {
        self.eval_as::<String>(DOCUMENT_HTML_JS).await
    }
}
