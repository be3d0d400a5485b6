//! 本地键值存储 - 基础设施层
//!
//! 语义：`get(key, default)` / `set(key, value)`，后写覆盖先写，没有版本检查。

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 年份 → 订单号列表
pub const KEY_ORDERS_BY_YEAR: &str = "ordersByYear";
/// 订单号 → 订单详情
pub const KEY_ORDER_DETAILS: &str = "orderDetails";
/// 界面是否打开
pub const KEY_UI_OPEN: &str = "aohdPopupOpen";
/// 当前页面类型
pub const KEY_PAGE_KIND: &str = "aohdCurrentPageType";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>>;

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()>;
}

/// 读取并反序列化；键不存在时返回 default
pub async fn get_or<T>(store: &dyn KeyValueStore, key: &str, default: T) -> AppResult<T>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(JsonValue::Null) | None => Ok(default),
        Some(value) => serde_json::from_value(value).map_err(|e| AppError::corrupt_value(key, e)),
    }
}

/// 序列化并写入
pub async fn put<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_value(value).map_err(|e| AppError::corrupt_value(key, e))?;
    store.set(key, json).await
}

/// 以单个 JSON 文档保存在磁盘上的存储
///
/// 每次 `set` 都重写整个文件。
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> AppResult<Map<String, JsonValue>> {
        let display = self.path.display().to_string();
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(AppError::storage_read_failed(display, e)),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|e| AppError::corrupt_value(display, e))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);

        let display = self.path.display().to_string();
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| AppError::corrupt_value(key, e))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::storage_write_failed(display, e))?;
        debug!("存储已写入: {} ({})", key, self.path.display());
        Ok(())
    }
}

/// 进程内存储
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, JsonValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
