use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::OrderId;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 站点根地址（不带末尾斜杠）
    pub site_base_url: String,
    /// 每个列表页的订单数量
    pub orders_per_page: u32,
    /// 列表页起始偏移
    pub start_index: u32,
    /// 列表页偏移上限，达到后停止翻页
    pub order_index_limit: u32,
    /// 页面加载完成后的等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 本地存储文件
    pub storage_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            site_base_url: "https://www.amazon.com".to_string(),
            orders_per_page: 10,
            start_index: 0,
            order_index_limit: 360,
            settle_delay_ms: 100,
            storage_path: "order_harvest.json".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值加环境变量覆盖
    pub fn from_env() -> AppResult<Self> {
        let config = Self::default().with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载，再用环境变量覆盖
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::FileParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 检查会让翻页无法结束的取值
    pub fn validate(&self) -> AppResult<()> {
        if self.orders_per_page == 0 {
            return Err(AppError::Config(ConfigError::InvalidValue {
                field: "orders_per_page",
                reason: "每页订单数必须大于 0",
            }));
        }
        Ok(())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.browser_debug_port),
            site_base_url: std::env::var("SITE_BASE_URL").unwrap_or(self.site_base_url),
            orders_per_page: std::env::var("ORDERS_PER_PAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.orders_per_page),
            start_index: self.start_index,
            order_index_limit: std::env::var("ORDER_INDEX_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.order_index_limit),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.settle_delay_ms),
            storage_path: std::env::var("STORAGE_PATH").unwrap_or(self.storage_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 订单列表页地址
    pub fn listing_url(&self, year: i32, start_index: u32) -> String {
        format!(
            "{}/your-orders/orders?timeFilter=year-{}&startIndex={}",
            self.site_base_url, year, start_index
        )
    }

    /// 订单打印详情页地址
    pub fn detail_url(&self, order_id: &OrderId) -> String {
        format!(
            "{}/gp/css/summary/print.html?ie=UTF8&orderID={}",
            self.site_base_url, order_id
        )
    }

    /// 导出表格里的订单链接
    pub fn order_link(&self, order_id: &OrderId) -> String {
        format!(
            "{}/gp/your-account/order-details?ie=UTF8&orderID={}",
            self.site_base_url, order_id
        )
    }

    pub fn listing_prefix(&self) -> String {
        format!("{}/your-orders/orders", self.site_base_url)
    }

    pub fn detail_prefix(&self) -> String {
        format!("{}/gp/css/summary/print.html", self.site_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_listing_and_detail_urls() {
        let config = Config::default();
        let id = OrderId::parse("123-4567890-1234567").unwrap();

        assert_eq!(
            config.listing_url(2023, 20),
            "https://www.amazon.com/your-orders/orders?timeFilter=year-2023&startIndex=20"
        );
        assert_eq!(
            config.detail_url(&id),
            "https://www.amazon.com/gp/css/summary/print.html?ie=UTF8&orderID=123-4567890-1234567"
        );
        assert!(config.order_link(&id).ends_with("order-details?ie=UTF8&orderID=123-4567890-1234567"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("order_index_limit = 50\n").unwrap();
        assert_eq!(config.order_index_limit, 50);
        assert_eq!(config.orders_per_page, 10);
        assert_eq!(config.settle_delay_ms, 100);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = Config {
            orders_per_page: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidValue { field: "orders_per_page", .. })
        ));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_page_size_in_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "orders_per_page = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("orders_per_page"));
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::FileReadFailed { .. })));
        assert!(err.to_string().contains("读取配置文件失败"));
    }
}
