use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 本地存储错误
    Storage(StorageError),
    /// 配置错误
    Config(ConfigError),
    /// 已有任务在运行
    RunInProgress,
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Storage(e) => write!(f, "存储错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::RunInProgress => write!(f, "已有抓取任务在运行"),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Storage(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::RunInProgress | AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览上下文不存在（已关闭或从未打开）
    UnknownContext { context: u64 },
    /// 当前命令没有连接浏览器
    NotConnected,
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
            BrowserError::UnknownContext { context } => {
                write!(f, "浏览上下文 #{} 不存在", context)
            }
            BrowserError::NotConnected => write!(f, "未连接浏览器"),
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::UnknownContext { .. } | BrowserError::NotConnected => None,
        }
    }
}

/// 本地存储错误
#[derive(Debug)]
pub enum StorageError {
    /// 读取存储文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入存储文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 存储内容无法解析
    CorruptValue {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ReadFailed { path, source } => {
                write!(f, "读取存储失败 ({}): {}", path, source)
            }
            StorageError::WriteFailed { path, source } => {
                write!(f, "写入存储失败 ({}): {}", path, source)
            }
            StorageError::CorruptValue { key, source } => {
                write!(f, "存储键 {} 内容无法解析: {}", key, source)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::ReadFailed { source, .. }
            | StorageError::WriteFailed { source, .. }
            | StorageError::CorruptValue { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 年份超出可选范围
    YearOutOfRange { year: i32, earliest: i32, latest: i32 },
    /// 配置项取值无效
    InvalidValue { field: &'static str, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "读取配置文件失败 ({}): {}", path, source)
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
            ConfigError::YearOutOfRange {
                year,
                earliest,
                latest,
            } => {
                write!(f, "年份 {} 不在可选范围 [{}, {}] 内", year, earliest, latest)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "配置项 {} 无效: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(StorageError::CorruptValue {
            key: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储写入错误
    pub fn storage_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储读取错误
    pub fn storage_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储内容损坏错误
    pub fn corrupt_value(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::CorruptValue {
            key: key.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 订单详情提取失败原因
///
/// 每个变体只对应一个找不到的字段，消息原文会直接出现在日志中供操作人员排查。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("no order number found")]
    NoOrderNumber,
    #[error("no order date found")]
    NoOrderDate,
    #[error("no order total found")]
    NoOrderTotal,
    #[error("no items found")]
    NoItems,
    #[error("no order ID found in URL '{url}'")]
    NoOrderId { url: String },
}
