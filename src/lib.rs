//! # Order Harvest
//!
//! 通过浏览器逐页读取电商订单历史，抓取每个订单的详情，保存到本地并导出为平表。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 浏览宿主、键值存储、界面通知三个协作者接口
//! - `browser/` - 基于 chromiumoxide 的浏览宿主实现和加载完成信号
//! - `JsExecutor` - 每个页面一个，提供 eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单个页面或单份数据
//! - `tree_search` / `detail_extractor` / `listing_extractor` - 页面提取
//! - `exporter` - 平表导出
//! - `RefreshPublisher` - 界面刷新通知
//!
//! ### ③ 仓库（Repository）
//! - `OrdersRepository` - 年份索引 + 订单详情，每次修改都整体写回存储
//!
//! ### ④ 流程层（Workflow）
//! - `DiscoveryFlow` - 列表页翻页，收集订单号
//! - `BackfillFlow` - 逐个补全订单详情，首次失败即停止
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator::App` - 资源管理、单任务守卫、命令分发

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ExtractError};
pub use infrastructure::{BrowsingHost, ContextId, JsExecutor, KeyValueStore};
pub use models::{OrderDetail, OrderId};
pub use orchestrator::App;
pub use repository::OrdersRepository;
pub use workflow::{BackfillFlow, BackfillOutcome, DiscoveryFlow, DiscoveryReport};
